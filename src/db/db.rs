// db/db.rs
use std::{collections::BTreeSet, sync::Arc};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, TimeZone, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{
    contractormodel::{Contractor, ContractorStatus, VettingStatus},
    inspectionmodel::{Inspection, JobStatus, RepairItem},
    usermodel::{User, UserRole, UserStatus},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{collection} record {id} already exists")]
    DuplicateId { collection: &'static str, id: String },

    #[error("{collection} record {id} does not exist")]
    MissingRecord { collection: &'static str, id: String },
}

/// The three process-wide collections. Each is an immutable snapshot;
/// writers replace a collection instead of editing it in place.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub users: Arc<Vec<User>>,
    pub contractors: Arc<Vec<Contractor>>,
    pub inspections: Arc<Vec<Inspection>>,
}

impl Collections {
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn contractor(&self, contractor_id: &str) -> Option<&Contractor> {
        self.contractors.iter().find(|c| c.id == contractor_id)
    }

    pub fn inspection(&self, inspection_id: &str) -> Option<&Inspection> {
        self.inspections.iter().find(|i| i.id == inspection_id)
    }

    /// Profile linked to a Contractor-role user. At most one exists.
    pub fn contractor_by_user(&self, user_id: &str) -> Option<&Contractor> {
        self.contractors
            .iter()
            .find(|c| c.user_id.as_deref() == Some(user_id))
    }

    pub fn users_mut(&mut self) -> &mut Vec<User> {
        Arc::make_mut(&mut self.users)
    }

    pub fn contractors_mut(&mut self) -> &mut Vec<Contractor> {
        Arc::make_mut(&mut self.contractors)
    }

    pub fn inspections_mut(&mut self) -> &mut Vec<Inspection> {
        Arc::make_mut(&mut self.inspections)
    }

    pub fn insert_user(&mut self, user: User) -> Result<(), StoreError> {
        if self.user(&user.id).is_some() {
            return Err(StoreError::DuplicateId { collection: "user", id: user.id });
        }
        self.users_mut().push(user);
        Ok(())
    }

    pub fn insert_contractor(&mut self, contractor: Contractor) -> Result<(), StoreError> {
        if self.contractor(&contractor.id).is_some() {
            return Err(StoreError::DuplicateId {
                collection: "contractor",
                id: contractor.id,
            });
        }
        self.contractors_mut().push(contractor);
        Ok(())
    }

    pub fn insert_inspection(&mut self, inspection: Inspection) -> Result<(), StoreError> {
        if self.inspection(&inspection.id).is_some() {
            return Err(StoreError::DuplicateId {
                collection: "inspection",
                id: inspection.id,
            });
        }
        self.inspections_mut().push(inspection);
        Ok(())
    }

    pub fn user_mut(&mut self, user_id: &str) -> Result<&mut User, StoreError> {
        self.users_mut()
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::MissingRecord { collection: "user", id: user_id.to_string() })
    }

    pub fn contractor_mut(&mut self, contractor_id: &str) -> Result<&mut Contractor, StoreError> {
        self.contractors_mut()
            .iter_mut()
            .find(|c| c.id == contractor_id)
            .ok_or_else(|| StoreError::MissingRecord {
                collection: "contractor",
                id: contractor_id.to_string(),
            })
    }

    pub fn inspection_mut(&mut self, inspection_id: &str) -> Result<&mut Inspection, StoreError> {
        self.inspections_mut()
            .iter_mut()
            .find(|i| i.id == inspection_id)
            .ok_or_else(|| StoreError::MissingRecord {
                collection: "inspection",
                id: inspection_id.to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct DBClient {
    collections: RwLock<Collections>,
}

impl DBClient {
    pub fn new(collections: Collections) -> Self {
        DBClient {
            collections: RwLock::new(collections),
        }
    }

    /// Store preloaded with the portal's demo records.
    pub fn seeded(master_admin_email: &str) -> Self {
        DBClient::new(seed_collections(master_admin_email))
    }

    /// Current snapshot of every collection.
    pub async fn snapshot(&self) -> Collections {
        self.collections.read().await.clone()
    }

    /// Runs `apply` against a staged copy of the collections while holding
    /// the write lock. The copy replaces the live collections only when
    /// `apply` succeeds, so a failed command leaves nothing behind.
    pub async fn transact<T, E, F>(&self, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut Collections) -> Result<T, E>,
    {
        let mut live = self.collections.write().await;
        let mut staged = live.clone();
        let value = apply(&mut staged)?;
        *live = staged;
        Ok(value)
    }
}

fn seed_collections(master_admin_email: &str) -> Collections {
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let inspection_date =
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_else(|| Utc::now().date_naive());

    let admin = User {
        id: "u1".to_string(),
        name: "Dustin (Admin)".to_string(),
        email: master_admin_email.to_string(),
        role: UserRole::Admin,
        status: UserStatus::Active,
        created_at,
        last_login: None,
        company_name: None,
        portfolio_size: None,
        is_setup_complete: None,
    };

    let contractor = Contractor {
        id: "c1".to_string(),
        user_id: None,
        name: "Bob Builder".to_string(),
        company: "Bob's Fixit".to_string(),
        skills: BTreeSet::from(["General".to_string()]),
        rating: 5.0,
        jobs_completed: 12,
        status: ContractorStatus::Active,
        vetting_status: VettingStatus::Approved,
        license_number: None,
        invite_code: None,
        insurance_expiry: None,
        references: vec![],
    };

    let inspection = Inspection {
        id: "1".to_string(),
        address: "742 Evergreen Terrace".to_string(),
        pm_name: "Marge Simpson".to_string(),
        pm_id: None,
        date: inspection_date,
        status: JobStatus::ReportSent,
        inspection_fee: BigDecimal::from(149),
        repairs: vec![RepairItem::new(
            "r1",
            "Living Room Repaint",
            "Match existing eggshell white",
            BigDecimal::from(450),
            BigDecimal::from(380),
            "Painting",
        )],
        contractor_id: None,
        completion_date: None,
    };

    Collections {
        users: Arc::new(vec![admin]),
        contractors: Arc::new(vec![contractor]),
        inspections: Arc::new(vec![inspection]),
    }
}
