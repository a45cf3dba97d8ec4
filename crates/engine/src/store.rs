//! In-memory [`UserStore`], used by tests and by the API's test harness.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use studynudge_core::profile::{
    NewUser, NotificationFrequency, SettingsUpdate, UserMutation, UserProfile,
};
use studynudge_core::types::UserId;
use tokio::sync::RwLock;

use crate::ports::{StoreError, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, UserProfile>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with fully-formed profiles.
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn insert(&self, user: UserProfile) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn snapshot(&self, id: UserId) -> Option<UserProfile> {
        self.users.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn load(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn apply_mutation(&self, id: UserId, mutation: &UserMutation) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        mutation.apply_to(user);
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<UserProfile>, StoreError> {
        let users = self.users.read().await;
        let mut active: Vec<UserProfile> = users
            .values()
            .filter(|u| u.notification_frequency != NotificationFrequency::None)
            .cloned()
            .collect();
        active.sort_by_key(|u| u.created_at);
        Ok(active)
    }

    async fn find_by_channel_key(
        &self,
        channel_key: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.channel_key == channel_key).cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.handle == handle).cloned())
    }

    async fn create(&self, input: &NewUser) -> Result<UserProfile, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.handle == input.handle) {
            return Err(StoreError::Conflict(format!(
                "handle '{}' already exists",
                input.handle
            )));
        }

        let user = UserProfile {
            id: uuid::Uuid::new_v4(),
            handle: input.handle.clone(),
            channel_key: input.channel_key.clone(),
            topics: NewUser::DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            difficulties: NewUser::DEFAULT_DIFFICULTIES.to_vec(),
            notification_frequency: NotificationFrequency::default(),
            timezone: Some(input.timezone.clone()),
            current_question: None,
            last_notified_at: None,
            last_reset_at: None,
            study_plan_slug: None,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_settings(
        &self,
        id: UserId,
        update: &SettingsUpdate,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }
}
