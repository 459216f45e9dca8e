use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::contractormodel::{ContractorStatus, Reference, VettingStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveContractorDto {
    /// Present when updating an existing profile.
    pub id: Option<String>,

    #[serde(rename = "userId")]
    pub user_id: Option<String>,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,

    #[serde(default)]
    pub skills: BTreeSet<String>,

    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    #[serde(default)]
    pub rating: f32,

    #[serde(rename = "jobsCompleted", default)]
    pub jobs_completed: u32,

    #[serde(default)]
    pub status: ContractorStatus,

    #[serde(rename = "vettingStatus", default)]
    pub vetting_status: VettingStatus,

    #[serde(rename = "licenseNumber")]
    pub license_number: Option<String>,

    #[serde(rename = "inviteCode")]
    pub invite_code: Option<String>,

    #[serde(rename = "insuranceExpiry")]
    pub insurance_expiry: Option<NaiveDate>,

    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VettingUpdateDto {
    #[serde(rename = "vettingStatus")]
    pub vetting_status: VettingStatus,
}
