use std::sync::Arc;

use async_trait::async_trait;

use super::db::{DBClient, StoreError};
use crate::models::contractormodel::{Contractor, VettingStatus};

#[async_trait]
pub trait ContractorExt {
    async fn get_contractor(&self, contractor_id: &str) -> Result<Option<Contractor>, StoreError>;

    async fn get_contractor_by_user(&self, user_id: &str) -> Result<Option<Contractor>, StoreError>;

    async fn get_contractors(&self) -> Result<Arc<Vec<Contractor>>, StoreError>;

    async fn get_contractor_count(&self) -> Result<usize, StoreError>;

    async fn delete_contractor(&self, contractor_id: &str) -> Result<Contractor, StoreError>;

    async fn update_vetting_status(
        &self,
        contractor_id: &str,
        vetting_status: VettingStatus,
    ) -> Result<Contractor, StoreError>;
}

#[async_trait]
impl ContractorExt for DBClient {
    async fn get_contractor(&self, contractor_id: &str) -> Result<Option<Contractor>, StoreError> {
        Ok(self.snapshot().await.contractor(contractor_id).cloned())
    }

    async fn get_contractor_by_user(&self, user_id: &str) -> Result<Option<Contractor>, StoreError> {
        Ok(self.snapshot().await.contractor_by_user(user_id).cloned())
    }

    async fn get_contractors(&self) -> Result<Arc<Vec<Contractor>>, StoreError> {
        Ok(self.snapshot().await.contractors)
    }

    async fn get_contractor_count(&self) -> Result<usize, StoreError> {
        Ok(self.snapshot().await.contractors.len())
    }

    async fn delete_contractor(&self, contractor_id: &str) -> Result<Contractor, StoreError> {
        self.transact(|tx| {
            let contractors = tx.contractors_mut();
            let position = contractors
                .iter()
                .position(|c| c.id == contractor_id)
                .ok_or_else(|| StoreError::MissingRecord {
                    collection: "contractor",
                    id: contractor_id.to_string(),
                })?;
            Ok(contractors.remove(position))
        })
        .await
    }

    async fn update_vetting_status(
        &self,
        contractor_id: &str,
        vetting_status: VettingStatus,
    ) -> Result<Contractor, StoreError> {
        self.transact(|tx| {
            let contractor = tx.contractor_mut(contractor_id)?;
            contractor.vetting_status = vetting_status;
            Ok(contractor.clone())
        })
        .await
    }
}
