// service/auth_service.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::{
    config::Config,
    db::{userdb::UserExt, DBClient},
    dtos::userdtos::RegisterUserDto,
    models::usermodel::{NewUser, User, UserRole, UserStatus},
    service::error::ServiceError,
};

/// Turns an email/password pair into a user. Implementations may create
/// the user as a side effect.
#[async_trait]
pub trait CredentialResolver: Send + Sync + std::fmt::Debug {
    async fn resolve(
        &self,
        db_client: &DBClient,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError>;
}

/// Demo access strategy. Only the master admin is password protected;
/// every other address either matches an existing user or is provisioned
/// on the spot.
#[derive(Debug, Clone)]
pub struct DemoCredentialResolver {
    master_admin_email: String,
    admin_secret: String,
    contractor_email_marker: String,
}

impl DemoCredentialResolver {
    pub fn new(
        master_admin_email: impl Into<String>,
        admin_secret: impl Into<String>,
        contractor_email_marker: impl Into<String>,
    ) -> Self {
        Self {
            master_admin_email: master_admin_email.into(),
            admin_secret: admin_secret.into(),
            contractor_email_marker: contractor_email_marker.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.master_admin_email.clone(),
            config.admin_secret.clone(),
            config.contractor_email_marker.clone(),
        )
    }

    fn admin_secret_matches(&self, password: &str) -> bool {
        bool::from(password.as_bytes().ct_eq(self.admin_secret.as_bytes()))
    }

    /// Role a fresh address would be provisioned with, if any.
    fn provisioned_role(&self, email: &str) -> Option<UserRole> {
        if email.contains(self.contractor_email_marker.as_str()) {
            Some(UserRole::Contractor)
        } else if email.contains('@') {
            Some(UserRole::PropertyManager)
        } else {
            None
        }
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[async_trait]
impl CredentialResolver for DemoCredentialResolver {
    async fn resolve(
        &self,
        db_client: &DBClient,
        email: &str,
        password: &str,
    ) -> Result<User, ServiceError> {
        if email == self.master_admin_email {
            if !self.admin_secret_matches(password) {
                tracing::warn!("rejected master admin login with wrong secret");
                return Err(ServiceError::InvalidCredentials);
            }
            return db_client
                .get_user(None, Some(email))
                .await?
                .filter(|user| user.role == UserRole::Admin)
                .ok_or(ServiceError::InvalidCredentials);
        }

        if let Some(existing) = db_client.get_user(None, Some(email)).await? {
            return Ok(existing);
        }

        let role = self
            .provisioned_role(email)
            .ok_or(ServiceError::InvalidCredentials)?;

        let user = db_client
            .save_user(NewUser::new(local_part(email), email, role))
            .await?;

        tracing::info!("provisioned {} user {} for {}", role.to_str(), user.id, email);
        Ok(user)
    }
}

#[derive(Debug, Clone)]
pub struct AuthService {
    db_client: Arc<DBClient>,
    resolver: Arc<dyn CredentialResolver>,
    contractor_invite_code: String,
}

impl AuthService {
    pub fn new(
        db_client: Arc<DBClient>,
        resolver: Arc<dyn CredentialResolver>,
        contractor_invite_code: impl Into<String>,
    ) -> Self {
        Self {
            db_client,
            resolver,
            contractor_invite_code: contractor_invite_code.into(),
        }
    }

    pub async fn resolve_session(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .resolver
            .resolve(&self.db_client, email, password)
            .await
            .inspect_err(|e| tracing::info!("login failed for {}: {}", email, e))?;

        if user.status == UserStatus::Inactive {
            tracing::info!("login refused for inactive user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let user = self.db_client.touch_last_login(&user.id, Utc::now()).await?;
        tracing::info!("user {} logged in as {}", user.id, user.role.to_str());
        Ok(user)
    }

    pub async fn register_user(&self, body: RegisterUserDto) -> Result<User, ServiceError> {
        body.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let role = body
            .role
            .ok_or_else(|| ServiceError::Validation("Role is required".to_string()))?;

        if role == UserRole::Contractor
            && body.invite_code.as_deref() != Some(self.contractor_invite_code.as_str())
        {
            return Err(ServiceError::Validation(
                "A valid contractor invite code is required".to_string(),
            ));
        }

        // Email uniqueness is not enforced for registrations.
        if self.db_client.get_user(None, Some(&body.email)).await?.is_some() {
            tracing::warn!("registering a second account for {}", body.email);
        }

        let new_user = NewUser {
            company_name: body.company_name,
            portfolio_size: body.portfolio_size,
            is_setup_complete: body.is_setup_complete,
            ..NewUser::new(body.name, body.email, role).with_id_prefix("u-")
        };

        let user = self.db_client.save_user(new_user).await?;
        tracing::info!("registered {} user {}", role.to_str(), user.id);
        Ok(user)
    }
}
