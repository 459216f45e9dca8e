use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::db::{DBClient, StoreError};
use crate::{
    models::usermodel::{NewUser, User, UserStatus},
    utils::ids::generate_id,
};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    async fn get_users(&self) -> Result<Arc<Vec<User>>, StoreError>;

    async fn save_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, StoreError>;

    async fn touch_last_login(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<User, StoreError>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let snapshot = self.snapshot().await;
        let user = match (user_id, email) {
            (Some(user_id), _) => snapshot.user(user_id),
            (None, Some(email)) => snapshot.user_by_email(email),
            (None, None) => None,
        };
        Ok(user.cloned())
    }

    async fn get_users(&self) -> Result<Arc<Vec<User>>, StoreError> {
        Ok(self.snapshot().await.users)
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.transact(|tx| {
            let id = generate_id(new_user.id_prefix, |candidate| tx.user(candidate).is_some());
            let user = new_user.into_user(id, Utc::now());
            tx.insert_user(user.clone())?;
            Ok(user)
        })
        .await
    }

    async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, StoreError> {
        self.transact(|tx| {
            let user = tx.user_mut(user_id)?;
            user.status = status;
            Ok(user.clone())
        })
        .await
    }

    async fn touch_last_login(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        self.transact(|tx| {
            let user = tx.user_mut(user_id)?;
            user.last_login = Some(at);
            Ok(user.clone())
        })
        .await
    }
}
