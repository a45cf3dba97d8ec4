//! [`UserStore`] over PostgreSQL.

use async_trait::async_trait;
use studynudge_core::profile::{NewUser, SettingsUpdate, UserMutation, UserProfile};
use studynudge_core::types::UserId;
use studynudge_engine::{StoreError, UserStore};

use crate::repositories::UserRepo;
use crate::DbPool;

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a driver error onto the store contract. Unique violations become
/// conflicts; everything else is a backend failure.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    tracing::error!(error = %err, "User store query failed");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn load(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let row = UserRepo::find_by_id(&self.pool, id).await.map_err(store_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn apply_mutation(&self, id: UserId, mutation: &UserMutation) -> Result<(), StoreError> {
        if mutation.is_empty() {
            return Ok(());
        }
        let found = UserRepo::apply_mutation(&self.pool, id, mutation)
            .await
            .map_err(store_error)?;
        if !found {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = UserRepo::list_active(&self.pool).await.map_err(store_error)?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    async fn find_by_channel_key(
        &self,
        channel_key: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let row = UserRepo::find_by_channel_key(&self.pool, channel_key)
            .await
            .map_err(store_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = UserRepo::find_by_handle(&self.pool, handle)
            .await
            .map_err(store_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn create(&self, input: &NewUser) -> Result<UserProfile, StoreError> {
        let row = UserRepo::create(&self.pool, uuid::Uuid::new_v4(), input)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn update_settings(
        &self,
        id: UserId,
        update: &SettingsUpdate,
    ) -> Result<Option<UserProfile>, StoreError> {
        let row = UserRepo::update_settings(&self.pool, id, update)
            .await
            .map_err(store_error)?;
        Ok(row.map(UserProfile::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}
