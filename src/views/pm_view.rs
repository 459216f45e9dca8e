use std::sync::Arc;

use validator::Validate;

use super::require_role;
use crate::{
    db::{
        contractordb::ContractorExt,
        inspectiondb::{next_inspection_id, InspectionExt},
        Collections,
    },
    dtos::inspectiondtos::{CreateInspectionDto, EditInspectionDto, RepairItemDto, RepriceRepairDto},
    models::{
        inspectionmodel::{Inspection, JobStatus, RepairItem},
        usermodel::{User, UserRole},
    },
    service::{coordinator::PortalCoordinator, error::ServiceError},
    utils::{currency::ensure_non_negative, ids::generate_id},
};

/// Property manager surface. Every inspection is visible to every
/// property manager; ownership is recorded but not used for filtering.
#[derive(Debug)]
pub struct PmView<'a> {
    pub(super) coordinator: &'a PortalCoordinator,
    pub(super) actor: User,
}

fn repair_id_taken(tx: &Collections, candidate: &str) -> bool {
    tx.inspections
        .iter()
        .any(|inspection| inspection.repair(candidate).is_some())
}

fn validate_repair(body: &RepairItemDto) -> Result<(), ServiceError> {
    body.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    ensure_non_negative("Estimated cost", &body.estimated_cost).map_err(ServiceError::Validation)?;
    ensure_non_negative("Contractor price", &body.contractor_price).map_err(ServiceError::Validation)
}

fn build_repair(tx: &Collections, body: RepairItemDto, pending: &[RepairItem]) -> RepairItem {
    let id = generate_id("r-", |candidate| {
        repair_id_taken(tx, candidate) || pending.iter().any(|r| r.id == candidate)
    });
    RepairItem::new(
        id,
        body.task,
        body.description,
        body.estimated_cost,
        body.contractor_price,
        body.category,
    )
}

fn job_mut<'t>(tx: &'t mut Collections, job_id: &str) -> Result<&'t mut Inspection, ServiceError> {
    tx.inspection_mut(job_id)
        .map_err(|_| ServiceError::JobNotFound(job_id.to_string()))
}

impl<'a> PmView<'a> {
    pub fn new(coordinator: &'a PortalCoordinator, actor: User) -> Result<Self, ServiceError> {
        require_role(&actor, UserRole::PropertyManager)?;
        Ok(Self { coordinator, actor })
    }

    pub fn actor(&self) -> &User {
        &self.actor
    }

    pub async fn inspections(&self) -> Result<Arc<Vec<Inspection>>, ServiceError> {
        self.coordinator.list_inspections().await
    }

    pub async fn inspection(&self, job_id: &str) -> Result<Inspection, ServiceError> {
        self.coordinator
            .db_client()
            .get_inspection(job_id)
            .await?
            .ok_or_else(|| ServiceError::JobNotFound(job_id.to_string()))
    }

    /// Inspections whose PM name matches, or all of them without a filter.
    pub async fn inspections_by_pm(&self, pm_name: Option<&str>) -> Result<Vec<Inspection>, ServiceError> {
        let inspections = self.inspections().await?;
        Ok(inspections
            .iter()
            .filter(|i| pm_name.map_or(true, |name| i.pm_name.eq_ignore_ascii_case(name)))
            .cloned()
            .collect())
    }

    pub async fn contractor_count(&self) -> Result<usize, ServiceError> {
        Ok(self.coordinator.db_client().get_contractor_count().await?)
    }

    pub async fn create_inspection(&self, body: CreateInspectionDto) -> Result<Inspection, ServiceError> {
        body.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        ensure_non_negative("Inspection fee", &body.inspection_fee).map_err(ServiceError::Validation)?;
        for repair in &body.repairs {
            validate_repair(repair)?;
        }

        let actor = &self.actor;
        let inspection = self
            .coordinator
            .db_client()
            .transact(|tx| {
                let mut repairs: Vec<RepairItem> = Vec::with_capacity(body.repairs.len());
                for repair in body.repairs {
                    let item = build_repair(tx, repair, &repairs);
                    repairs.push(item);
                }

                let inspection = Inspection {
                    id: next_inspection_id(tx),
                    address: body.address,
                    pm_name: body.pm_name.unwrap_or_else(|| actor.name.clone()),
                    pm_id: Some(actor.id.clone()),
                    date: body.date,
                    status: JobStatus::Scheduled,
                    inspection_fee: body.inspection_fee,
                    repairs,
                    contractor_id: None,
                    completion_date: None,
                };
                tx.insert_inspection(inspection.clone())?;
                Ok::<_, ServiceError>(inspection)
            })
            .await?;

        tracing::info!("inspection {} created by {}", inspection.id, actor.id);
        Ok(inspection)
    }

    /// Changes address, date or fee. Status and assignment are untouched.
    pub async fn edit_inspection(&self, job_id: &str, body: EditInspectionDto) -> Result<Inspection, ServiceError> {
        body.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        if let Some(fee) = &body.inspection_fee {
            ensure_non_negative("Inspection fee", fee).map_err(ServiceError::Validation)?;
        }

        self.coordinator
            .db_client()
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;
                if let Some(address) = body.address {
                    job.address = address;
                }
                if let Some(date) = body.date {
                    job.date = date;
                }
                if let Some(fee) = body.inspection_fee {
                    job.inspection_fee = fee;
                }
                Ok(job.clone())
            })
            .await
    }

    pub async fn add_repair(&self, job_id: &str, body: RepairItemDto) -> Result<Inspection, ServiceError> {
        validate_repair(&body)?;

        self.coordinator
            .db_client()
            .transact(|tx| {
                if tx.inspection(job_id).is_none() {
                    return Err(ServiceError::JobNotFound(job_id.to_string()));
                }
                let item = build_repair(tx, body, &[]);
                let job = job_mut(tx, job_id)?;
                job.repairs.push(item);
                Ok(job.clone())
            })
            .await
    }

    pub async fn reprice_repair(
        &self,
        job_id: &str,
        repair_id: &str,
        body: RepriceRepairDto,
    ) -> Result<Inspection, ServiceError> {
        ensure_non_negative("Estimated cost", &body.estimated_cost).map_err(ServiceError::Validation)?;
        ensure_non_negative("Contractor price", &body.contractor_price).map_err(ServiceError::Validation)?;

        self.coordinator
            .db_client()
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;
                let repair = job.repair_mut(repair_id).ok_or_else(|| ServiceError::RepairNotFound {
                    job_id: job_id.to_string(),
                    repair_id: repair_id.to_string(),
                })?;
                repair.reprice(body.estimated_cost, body.contractor_price);
                Ok(job.clone())
            })
            .await
    }

    pub async fn remove_repair(&self, job_id: &str, repair_id: &str) -> Result<Inspection, ServiceError> {
        self.coordinator
            .db_client()
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;
                let position = job
                    .repairs
                    .iter()
                    .position(|r| r.id == repair_id)
                    .ok_or_else(|| ServiceError::RepairNotFound {
                        job_id: job_id.to_string(),
                        repair_id: repair_id.to_string(),
                    })?;
                job.repairs.remove(position);
                Ok(job.clone())
            })
            .await
    }
}
