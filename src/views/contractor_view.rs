use std::sync::Arc;

use super::require_role;
use crate::{
    db::contractordb::ContractorExt,
    dtos::inspectiondtos::JobScope,
    models::{
        contractormodel::Contractor,
        inspectionmodel::{Inspection, JobStatus},
        usermodel::{User, UserRole},
    },
    service::{
        coordinator::PortalCoordinator, error::ServiceError, lifecycle_service::ACCEPTABLE_STATUSES,
    },
};

#[derive(Debug)]
pub struct ContractorView<'a> {
    pub(super) coordinator: &'a PortalCoordinator,
    pub(super) actor: User,
}

impl<'a> ContractorView<'a> {
    pub fn new(coordinator: &'a PortalCoordinator, actor: User) -> Result<Self, ServiceError> {
        require_role(&actor, UserRole::Contractor)?;
        Ok(Self { coordinator, actor })
    }

    pub fn actor(&self) -> &User {
        &self.actor
    }

    /// The vetting profile linked to this contractor, if an admin has
    /// created one.
    pub async fn profile(&self) -> Result<Option<Contractor>, ServiceError> {
        Ok(self
            .coordinator
            .db_client()
            .get_contractor_by_user(&self.actor.id)
            .await?)
    }

    /// Every inspection, assigned or not.
    pub async fn inspections(&self) -> Result<Arc<Vec<Inspection>>, ServiceError> {
        self.coordinator.list_inspections().await
    }

    /// Unheld jobs a contractor could accept right now.
    pub async fn available_jobs(&self) -> Result<Vec<Inspection>, ServiceError> {
        let inspections = self.inspections().await?;
        Ok(inspections
            .iter()
            .filter(|i| i.contractor_id.is_none() && ACCEPTABLE_STATUSES.contains(&i.status))
            .cloned()
            .collect())
    }

    pub async fn my_jobs(&self) -> Result<Vec<Inspection>, ServiceError> {
        let inspections = self.inspections().await?;
        Ok(inspections
            .iter()
            .filter(|i| i.is_held_by(&self.actor.id))
            .cloned()
            .collect())
    }

    pub async fn jobs(&self, scope: JobScope) -> Result<Vec<Inspection>, ServiceError> {
        match scope {
            JobScope::All => Ok(self.inspections().await?.as_ref().clone()),
            JobScope::Available => self.available_jobs().await,
            JobScope::Mine => self.my_jobs().await,
        }
    }

    pub async fn accept_job(&self, job_id: &str) -> Result<Inspection, ServiceError> {
        self.coordinator.lifecycle().accept_job(job_id, &self.actor).await
    }

    pub async fn update_job_status(&self, job_id: &str, status: JobStatus) -> Result<Inspection, ServiceError> {
        self.coordinator
            .lifecycle()
            .update_job_status(job_id, status, &self.actor)
            .await
    }
}
