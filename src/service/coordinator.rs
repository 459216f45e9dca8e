// service/coordinator.rs
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    db::{contractordb::ContractorExt, inspectiondb::InspectionExt, userdb::UserExt, DBClient},
    dtos::userdtos::RegisterUserDto,
    models::{
        contractormodel::Contractor,
        inspectionmodel::{Inspection, JobStatus},
        usermodel::{User, UserStatus},
    },
    service::{
        auth_service::{AuthService, CredentialResolver, DemoCredentialResolver},
        error::ServiceError,
        lifecycle_service::{LifecycleService, TransitionPolicy},
    },
    views::RoleView,
};

/// Owns the portal's collections and the current session, and hands out
/// the role view matching whoever is logged in.
///
/// The session slot holds a user id only. Every command re-reads that user
/// from the store, so a deactivated or removed account loses access at
/// once.
#[derive(Debug)]
pub struct PortalCoordinator {
    db_client: Arc<DBClient>,
    auth_service: AuthService,
    lifecycle_service: LifecycleService,
    session: RwLock<Option<String>>,
}

impl PortalCoordinator {
    pub fn new(
        db_client: Arc<DBClient>,
        resolver: Arc<dyn CredentialResolver>,
        contractor_invite_code: &str,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            auth_service: AuthService::new(db_client.clone(), resolver, contractor_invite_code),
            lifecycle_service: LifecycleService::new(db_client.clone(), policy),
            db_client,
            session: RwLock::new(None),
        }
    }

    /// Seeded store with the demo credential strategy.
    pub fn from_config(config: &Config) -> Self {
        let db_client = Arc::new(DBClient::seeded(&config.master_admin_email));
        let resolver = Arc::new(DemoCredentialResolver::from_config(config));
        Self::new(
            db_client,
            resolver,
            &config.contractor_invite_code,
            config.lifecycle_policy,
        )
    }

    pub fn db_client(&self) -> &Arc<DBClient> {
        &self.db_client
    }

    pub fn lifecycle(&self) -> &LifecycleService {
        &self.lifecycle_service
    }

    /// Checks credentials without touching the session slot. Token-based
    /// callers identify the user per request instead.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        self.auth_service.resolve_session(email, password).await
    }

    /// Registers a user without touching the session slot.
    pub async fn create_account(&self, body: RegisterUserDto) -> Result<User, ServiceError> {
        self.auth_service.register_user(body).await
    }

    pub async fn resolve_session(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self.authenticate(email, password).await?;
        *self.session.write().await = Some(user.id.clone());
        Ok(user)
    }

    pub async fn register_user(&self, body: RegisterUserDto) -> Result<User, ServiceError> {
        let user = self.create_account(body).await?;
        *self.session.write().await = Some(user.id.clone());
        Ok(user)
    }

    pub async fn logout(&self) {
        if let Some(user_id) = self.session.write().await.take() {
            tracing::info!("user {} logged out", user_id);
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session_user().await.ok()
    }

    async fn session_user(&self) -> Result<User, ServiceError> {
        let user_id = self
            .session
            .read()
            .await
            .clone()
            .ok_or(ServiceError::NotAuthenticated)?;

        match self.db_client.get_user(Some(user_id.as_str()), None).await? {
            Some(user) if user.status != UserStatus::Inactive => Ok(user),
            _ => {
                tracing::info!("session for {} ended, account no longer usable", user_id);
                let mut session = self.session.write().await;
                if session.as_deref() == Some(user_id.as_str()) {
                    *session = None;
                }
                Err(ServiceError::NotAuthenticated)
            }
        }
    }

    /// Accepts a job on behalf of the session user.
    pub async fn accept_job(&self, job_id: &str) -> Result<Inspection, ServiceError> {
        let actor = self.session_user().await?;
        self.lifecycle_service.accept_job(job_id, &actor).await
    }

    /// Moves a job on behalf of the session user.
    pub async fn update_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
    ) -> Result<Inspection, ServiceError> {
        let actor = self.session_user().await?;
        self.lifecycle_service.update_job_status(job_id, status, &actor).await
    }

    pub async fn list_users(&self) -> Result<Arc<Vec<User>>, ServiceError> {
        Ok(self.db_client.get_users().await?)
    }

    pub async fn list_contractors(&self) -> Result<Arc<Vec<Contractor>>, ServiceError> {
        Ok(self.db_client.get_contractors().await?)
    }

    pub async fn list_inspections(&self) -> Result<Arc<Vec<Inspection>>, ServiceError> {
        Ok(self.db_client.get_inspections().await?)
    }

    /// View for the session user.
    pub async fn dispatch(&self) -> Result<RoleView<'_>, ServiceError> {
        let user = self.session_user().await?;
        Ok(self.view_for(user))
    }

    pub fn view_for(&self, user: User) -> RoleView<'_> {
        RoleView::for_user(self, user)
    }
}
