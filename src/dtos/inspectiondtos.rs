use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::inspectionmodel::JobStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RepairItemDto {
    #[validate(length(min = 1, message = "Task is required"))]
    pub task: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "estimatedCost")]
    pub estimated_cost: BigDecimal,

    #[serde(rename = "contractorPrice")]
    pub contractor_price: BigDecimal,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInspectionDto {
    #[validate(length(min = 1, max = 200, message = "Address must be between 1 and 200 characters"))]
    pub address: String,

    /// Defaults to the creating property manager's name.
    #[serde(rename = "pmName")]
    pub pm_name: Option<String>,

    pub date: NaiveDate,

    #[serde(rename = "inspectionFee")]
    pub inspection_fee: BigDecimal,

    #[validate]
    #[serde(default)]
    pub repairs: Vec<RepairItemDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditInspectionDto {
    #[validate(length(min = 1, max = 200, message = "Address must be between 1 and 200 characters"))]
    pub address: Option<String>,

    pub date: Option<NaiveDate>,

    #[serde(rename = "inspectionFee")]
    pub inspection_fee: Option<BigDecimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepriceRepairDto {
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: BigDecimal,

    #[serde(rename = "contractorPrice")]
    pub contractor_price: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobStatusDto {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignJobDto {
    #[validate(length(min = 1, message = "Contractor id is required"))]
    #[serde(rename = "contractorId")]
    pub contractor_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    #[default]
    All,
    Available,
    Mine,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobListQueryDto {
    pub scope: Option<JobScope>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InspectionQueryDto {
    pub pm_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
