use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    #[serde(rename = "PM")]
    PropertyManager,
    #[serde(rename = "CONTRACTOR")]
    Contractor,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::PropertyManager => "PM",
            UserRole::Contractor => "CONTRACTOR",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Prefix used for generated user ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            UserRole::PropertyManager => "u-pm-",
            UserRole::Contractor => "u-c-",
            UserRole::Admin => "u-a-",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    pub fn to_str(&self) -> &str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "lastLogin", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    // Account setup fields
    #[serde(rename = "companyName", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(rename = "portfolioSize", skip_serializing_if = "Option::is_none")]
    pub portfolio_size: Option<String>,

    #[serde(rename = "isSetupComplete", skip_serializing_if = "Option::is_none")]
    pub is_setup_complete: Option<bool>,
}

/// A user record before the store has assigned its id and creation time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub id_prefix: &'static str,
    pub company_name: Option<String>,
    pub portfolio_size: Option<String>,
    pub is_setup_complete: Option<bool>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        NewUser {
            name: name.into(),
            email: email.into(),
            role,
            id_prefix: role.id_prefix(),
            company_name: None,
            portfolio_size: None,
            is_setup_complete: None,
        }
    }

    pub fn with_id_prefix(mut self, prefix: &'static str) -> Self {
        self.id_prefix = prefix;
        self
    }

    pub fn into_user(self, id: String, created_at: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
            status: UserStatus::Active,
            created_at,
            last_login: None,
            company_name: self.company_name,
            portfolio_size: self.portfolio_size,
            is_setup_complete: self.is_setup_complete,
        }
    }
}
