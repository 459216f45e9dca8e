use std::{collections::BTreeMap, sync::Arc};

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use super::require_role;
use crate::{
    db::{contractordb::ContractorExt, userdb::UserExt},
    dtos::contractordtos::SaveContractorDto,
    models::{
        contractormodel::{Contractor, VettingStatus},
        inspectionmodel::{Inspection, JobStatus},
        usermodel::{User, UserRole, UserStatus},
    },
    service::{coordinator::PortalCoordinator, error::ServiceError},
    utils::{currency::format_usd, ids::generate_id},
};

#[derive(Debug, Serialize, PartialEq)]
pub struct AdminDashboard {
    pub users: usize,
    pub contractors: usize,
    pub inspections: usize,
    #[serde(rename = "byStatus")]
    pub by_status: BTreeMap<JobStatus, usize>,
    #[serde(rename = "pendingVetting")]
    pub pending_vetting: usize,
    #[serde(rename = "expiredInsurance")]
    pub expired_insurance: usize,
    #[serde(rename = "totalMargin")]
    pub total_margin: String,
}

/// Full read/write surface; the only role that manages vetting and the
/// user collection.
#[derive(Debug)]
pub struct AdminView<'a> {
    pub(super) coordinator: &'a PortalCoordinator,
    pub(super) actor: User,
}

impl<'a> AdminView<'a> {
    pub fn new(coordinator: &'a PortalCoordinator, actor: User) -> Result<Self, ServiceError> {
        require_role(&actor, UserRole::Admin)?;
        Ok(Self { coordinator, actor })
    }

    pub fn actor(&self) -> &User {
        &self.actor
    }

    pub async fn users(&self) -> Result<Arc<Vec<User>>, ServiceError> {
        self.coordinator.list_users().await
    }

    pub async fn contractors(&self) -> Result<Arc<Vec<Contractor>>, ServiceError> {
        self.coordinator.list_contractors().await
    }

    pub async fn inspections(&self) -> Result<Arc<Vec<Inspection>>, ServiceError> {
        self.coordinator.list_inspections().await
    }

    pub async fn set_user_status(&self, user_id: &str, status: UserStatus) -> Result<User, ServiceError> {
        if user_id == self.actor.id && status != UserStatus::Active {
            return Err(ServiceError::Validation(
                "administrators cannot deactivate their own account".to_string(),
            ));
        }

        let user = self
            .coordinator
            .db_client()
            .update_user_status(user_id, status)
            .await
            .map_err(|_| ServiceError::UserNotFound(user_id.to_string()))?;

        tracing::info!("user {} set to {} by {}", user.id, status.to_str(), self.actor.id);
        Ok(user)
    }

    pub async fn contractor(&self, contractor_id: &str) -> Result<Contractor, ServiceError> {
        self.coordinator
            .db_client()
            .get_contractor(contractor_id)
            .await?
            .ok_or_else(|| ServiceError::ContractorNotFound(contractor_id.to_string()))
    }

    /// Creates a profile, or replaces the one named by `body.id`. A linked
    /// user must be a contractor that no other profile is linked to.
    pub async fn save_contractor(&self, body: SaveContractorDto) -> Result<Contractor, ServiceError> {
        body.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let saved = self
            .coordinator
            .db_client()
            .transact(|tx| {
                if let Some(user_id) = body.user_id.as_deref() {
                    let user = tx
                        .user(user_id)
                        .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))?;
                    if user.role != UserRole::Contractor {
                        return Err(ServiceError::Validation(format!(
                            "user {} is not a contractor",
                            user_id
                        )));
                    }
                    if let Some(linked) = tx.contractor_by_user(user_id) {
                        if body.id.as_deref() != Some(linked.id.as_str()) {
                            return Err(ServiceError::Validation(format!(
                                "user {} is already linked to profile {}",
                                user_id, linked.id
                            )));
                        }
                    }
                }

                let contractor = Contractor {
                    id: body.id.clone().unwrap_or_default(),
                    user_id: body.user_id,
                    name: body.name,
                    company: body.company,
                    skills: body.skills,
                    rating: body.rating,
                    jobs_completed: body.jobs_completed,
                    status: body.status,
                    vetting_status: body.vetting_status,
                    license_number: body.license_number,
                    invite_code: body.invite_code,
                    insurance_expiry: body.insurance_expiry,
                    references: body.references,
                };

                match body.id {
                    Some(id) => {
                        let existing = tx
                            .contractor_mut(&id)
                            .map_err(|_| ServiceError::ContractorNotFound(id.clone()))?;
                        *existing = contractor.clone();
                        Ok(contractor)
                    }
                    None => {
                        let contractor = Contractor {
                            id: generate_id("c-", |candidate| tx.contractor(candidate).is_some()),
                            ..contractor
                        };
                        tx.insert_contractor(contractor.clone())?;
                        Ok(contractor)
                    }
                }
            })
            .await?;

        tracing::info!("contractor profile {} saved by {}", saved.id, self.actor.id);
        Ok(saved)
    }

    pub async fn remove_contractor(&self, contractor_id: &str) -> Result<Contractor, ServiceError> {
        let removed = self
            .coordinator
            .db_client()
            .delete_contractor(contractor_id)
            .await
            .map_err(|_| ServiceError::ContractorNotFound(contractor_id.to_string()))?;

        tracing::info!("contractor profile {} removed by {}", contractor_id, self.actor.id);
        Ok(removed)
    }

    pub async fn set_vetting_status(
        &self,
        contractor_id: &str,
        vetting_status: VettingStatus,
    ) -> Result<Contractor, ServiceError> {
        let contractor = self
            .coordinator
            .db_client()
            .update_vetting_status(contractor_id, vetting_status)
            .await
            .map_err(|_| ServiceError::ContractorNotFound(contractor_id.to_string()))?;

        tracing::info!(
            "contractor {} vetting set to {} by {}",
            contractor_id,
            vetting_status.to_str(),
            self.actor.id
        );
        Ok(contractor)
    }

    pub async fn update_job_status(&self, job_id: &str, status: JobStatus) -> Result<Inspection, ServiceError> {
        self.coordinator
            .lifecycle()
            .update_job_status(job_id, status, &self.actor)
            .await
    }

    pub async fn assign_job(&self, job_id: &str, contractor_user_id: &str) -> Result<Inspection, ServiceError> {
        self.coordinator
            .lifecycle()
            .assign_job(job_id, contractor_user_id, &self.actor)
            .await
    }

    pub async fn override_job_status(&self, job_id: &str, status: JobStatus) -> Result<Inspection, ServiceError> {
        self.coordinator
            .lifecycle()
            .override_job_status(job_id, status, &self.actor)
            .await
    }

    pub async fn dashboard(&self) -> Result<AdminDashboard, ServiceError> {
        let snapshot = self.coordinator.db_client().snapshot().await;
        let today = Utc::now().date_naive();

        let mut by_status = BTreeMap::new();
        for inspection in snapshot.inspections.iter() {
            *by_status.entry(inspection.status).or_insert(0) += 1;
        }

        let total_margin: BigDecimal = snapshot.inspections.iter().map(|i| i.total_margin()).sum();

        Ok(AdminDashboard {
            users: snapshot.users.len(),
            contractors: snapshot.contractors.len(),
            inspections: snapshot.inspections.len(),
            by_status,
            pending_vetting: snapshot
                .contractors
                .iter()
                .filter(|c| c.vetting_status.awaiting_review())
                .count(),
            expired_insurance: snapshot
                .contractors
                .iter()
                .filter(|c| {
                    c.vetting_status == VettingStatus::ExpiredInsurance || c.insurance_expired(today)
                })
                .count(),
            total_margin: format_usd(&total_margin),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::Config;

    async fn admin_view(coordinator: &PortalCoordinator) -> AdminView<'_> {
        let admin = coordinator
            .resolve_session("dustin@flashfixturnover.com", "admin123")
            .await
            .unwrap();
        AdminView::new(coordinator, admin).unwrap()
    }

    fn profile(user_id: Option<String>) -> SaveContractorDto {
        SaveContractorDto {
            id: None,
            user_id,
            name: "Jane Doe".to_string(),
            company: "Doe Repairs".to_string(),
            skills: BTreeSet::from(["Plumbing".to_string()]),
            rating: 4.8,
            jobs_completed: 0,
            status: Default::default(),
            vetting_status: VettingStatus::Pending,
            license_number: Some("LIC-42".to_string()),
            invite_code: Some("FF-PRO-2025".to_string()),
            insurance_expiry: None,
            references: vec![],
        }
    }

    #[tokio::test]
    async fn admin_sees_all_collections() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let view = admin_view(&coordinator).await;

        assert_eq!(view.users().await.unwrap().len(), 1);
        assert_eq!(view.contractors().await.unwrap().len(), 1);
        assert_eq!(view.inspections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_links_only_to_contractor_users() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let jane = coordinator.resolve_session("jane@contractor.com", "").await.unwrap();
        let marge = coordinator.resolve_session("marge@springfield.org", "").await.unwrap();
        let view = admin_view(&coordinator).await;

        let err = view.save_contractor(profile(Some(marge.id))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let saved = view.save_contractor(profile(Some(jane.id.clone()))).await.unwrap();
        assert!(saved.id.starts_with("c-"));
        assert_eq!(saved.user_id, Some(jane.id));
        assert_eq!(view.contractors().await.unwrap().len(), 2);

        let mut update = profile(saved.user_id.clone());
        update.id = Some(saved.id.clone());
        update.rating = 3.0;
        let updated = view.save_contractor(update).await.unwrap();
        assert_eq!(updated.rating, 3.0);
        assert_eq!(view.contractors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn contractor_user_links_to_one_profile_only() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let jane = coordinator.resolve_session("jane@contractor.com", "").await.unwrap();
        let view = admin_view(&coordinator).await;

        let first = view.save_contractor(profile(Some(jane.id.clone()))).await.unwrap();
        let err = view.save_contractor(profile(Some(jane.id.clone()))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut relink_bob = profile(Some(jane.id.clone()));
        relink_bob.id = Some("c1".to_string());
        let err = view.save_contractor(relink_bob).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let linked = coordinator
            .db_client()
            .get_contractor_by_user(&jane.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.id, first.id);
        assert_eq!(view.contractors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn removed_profile_is_not_recreated_by_an_update() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let view = admin_view(&coordinator).await;
        let mut update = profile(None);
        update.id = Some("c1".to_string());

        view.remove_contractor("c1").await.unwrap();
        let err = view.save_contractor(update).await.unwrap_err();

        assert_eq!(err, ServiceError::ContractorNotFound("c1".to_string()));
        assert!(view.contractors().await.unwrap().is_empty());
        assert_eq!(
            view.contractor("c1").await.unwrap_err(),
            ServiceError::ContractorNotFound("c1".to_string())
        );
    }

    #[tokio::test]
    async fn vetting_and_removal() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let view = admin_view(&coordinator).await;

        let bob = view.set_vetting_status("c1", VettingStatus::ExpiredInsurance).await.unwrap();
        assert_eq!(bob.vetting_status, VettingStatus::ExpiredInsurance);
        assert_eq!(view.dashboard().await.unwrap().expired_insurance, 1);

        view.remove_contractor("c1").await.unwrap();
        assert!(view.contractors().await.unwrap().is_empty());
        let err = view.set_vetting_status("c1", VettingStatus::Approved).await.unwrap_err();
        assert_eq!(err, ServiceError::ContractorNotFound("c1".to_string()));
    }

    #[tokio::test]
    async fn user_status_management() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let marge = coordinator.resolve_session("marge@springfield.org", "").await.unwrap();
        let view = admin_view(&coordinator).await;

        let user = view.set_user_status(&marge.id, UserStatus::Inactive).await.unwrap();
        assert_eq!(user.status, UserStatus::Inactive);

        let err = view.set_user_status("u1", UserStatus::Inactive).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = view.set_user_status("u-ghost", UserStatus::Active).await.unwrap_err();
        assert_eq!(err, ServiceError::UserNotFound("u-ghost".to_string()));
    }

    #[tokio::test]
    async fn dashboard_counts_seed_data() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let view = admin_view(&coordinator).await;

        let dashboard = view.dashboard().await.unwrap();

        assert_eq!(dashboard.users, 1);
        assert_eq!(dashboard.inspections, 1);
        assert_eq!(dashboard.by_status.get(&JobStatus::ReportSent), Some(&1));
        assert_eq!(dashboard.pending_vetting, 0);
        assert_eq!(dashboard.total_margin, "$70.00");
    }

    #[tokio::test]
    async fn admin_drives_job_through_assignment() {
        let coordinator = PortalCoordinator::from_config(&Config::demo());
        let jane = coordinator.resolve_session("jane@contractor.com", "").await.unwrap();
        let view = admin_view(&coordinator).await;

        view.update_job_status("1", JobStatus::Approved).await.unwrap();
        let job = view.assign_job("1", &jane.id).await.unwrap();
        assert_eq!(job.status, JobStatus::Assigned);

        let job = view.override_job_status("1", JobStatus::Inspected).await.unwrap();
        assert_eq!(job.status, JobStatus::Inspected);
    }
}
