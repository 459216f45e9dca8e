use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractorStatus {
    #[default]
    Active,
    Inactive,
}

/// Background and insurance approval state of a contractor profile.
/// Independent of any job status.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum VettingStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "Pending Review")]
    Pending,
    Approved,
    Rejected,
    #[serde(rename = "Expired Insurance")]
    ExpiredInsurance,
}

impl VettingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            VettingStatus::NotStarted => "Not Started",
            VettingStatus::Pending => "Pending Review",
            VettingStatus::Approved => "Approved",
            VettingStatus::Rejected => "Rejected",
            VettingStatus::ExpiredInsurance => "Expired Insurance",
        }
    }

    pub fn awaiting_review(&self) -> bool {
        matches!(self, VettingStatus::NotStarted | VettingStatus::Pending)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contractor {
    pub id: String,
    /// Id of the Contractor-role user this profile belongs to.
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub company: String,
    pub skills: BTreeSet<String>,
    pub rating: f32,
    #[serde(rename = "jobsCompleted")]
    pub jobs_completed: u32,
    pub status: ContractorStatus,
    #[serde(rename = "vettingStatus")]
    pub vetting_status: VettingStatus,
    #[serde(rename = "licenseNumber", skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(rename = "inviteCode", skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    #[serde(rename = "insuranceExpiry", skip_serializing_if = "Option::is_none")]
    pub insurance_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Contractor {
    pub fn insurance_expired(&self, today: NaiveDate) -> bool {
        self.insurance_expiry.is_some_and(|expiry| expiry < today)
    }
}
