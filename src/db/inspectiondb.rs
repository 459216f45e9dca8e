use std::sync::Arc;

use async_trait::async_trait;

use super::db::{Collections, DBClient, StoreError};
use crate::models::inspectionmodel::Inspection;

/// Next free numeric inspection id; inspections are numbered "1", "2", ...
pub fn next_inspection_id(collections: &Collections) -> String {
    let highest = collections
        .inspections
        .iter()
        .filter_map(|i| i.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (highest + 1).to_string()
}

#[async_trait]
pub trait InspectionExt {
    async fn get_inspection(&self, inspection_id: &str) -> Result<Option<Inspection>, StoreError>;

    async fn get_inspections(&self) -> Result<Arc<Vec<Inspection>>, StoreError>;
}

#[async_trait]
impl InspectionExt for DBClient {
    async fn get_inspection(&self, inspection_id: &str) -> Result<Option<Inspection>, StoreError> {
        Ok(self.snapshot().await.inspection(inspection_id).cloned())
    }

    async fn get_inspections(&self) -> Result<Arc<Vec<Inspection>>, StoreError> {
        Ok(self.snapshot().await.inspections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inspectionmodel::JobStatus;

    #[tokio::test]
    async fn next_id_follows_highest_numeric_id() {
        let db = DBClient::seeded("admin@example.com");
        let mut job = db.get_inspection("1").await.unwrap().unwrap();

        assert_eq!(next_inspection_id(&db.snapshot().await), "2");

        job.id = "41".to_string();
        job.status = JobStatus::Scheduled;
        db.transact(|tx| tx.insert_inspection(job)).await.unwrap();

        assert_eq!(db.get_inspections().await.unwrap().len(), 2);
        assert_eq!(next_inspection_id(&db.snapshot().await), "42");
    }
}
