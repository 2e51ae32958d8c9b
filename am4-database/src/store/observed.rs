use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{Lookup, UserStore};
use crate::error::Result;
use crate::model::user::{NewUser, UserChanges, UserRecord};

/// Callback run after a user update has been persisted.
pub trait UpdateObserver: Send + Sync {
    fn after_update(&self, user: &UserRecord);
}

impl<F> UpdateObserver for F
where
    F: Fn(&UserRecord) + Send + Sync,
{
    fn after_update(&self, user: &UserRecord) {
        self(user);
    }
}

/// Registered lifecycle callbacks for the `users` collection.
#[derive(Clone, Default)]
pub struct UserHooks {
    after_update: Vec<Arc<dyn UpdateObserver>>,
}

impl UserHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_after_update<O>(&mut self, observer: O) -> &mut Self
    where
        O: UpdateObserver + 'static,
    {
        self.after_update.push(Arc::new(observer));
        self
    }

    pub fn dispatch_after_update(&self, user: &UserRecord) {
        for observer in &self.after_update {
            observer.after_update(user);
        }
    }
}

impl fmt::Debug for UserHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserHooks")
            .field("after_update", &self.after_update.len())
            .finish()
    }
}

/// A store that fires [`UserHooks`] around the writes of an inner store.
///
/// Observers run inline once the inner update has returned, so they always
/// see the committed record. Failed updates fire nothing.
#[derive(Clone)]
pub struct ObservedUserStore {
    inner: Arc<dyn UserStore>,
    hooks: UserHooks,
}

impl fmt::Debug for ObservedUserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedUserStore")
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl ObservedUserStore {
    pub fn new(inner: Arc<dyn UserStore>, hooks: UserHooks) -> Self {
        Self { inner, hooks }
    }
}

#[async_trait]
impl UserStore for ObservedUserStore {
    async fn find_by_discord_id(&self, discord_id: i64) -> Result<Lookup<UserRecord>> {
        self.inner.find_by_discord_id(discord_id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Lookup<UserRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Lookup<UserRecord>> {
        self.inner.find_by_username(username).await
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord> {
        self.inner.create(user).await
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<UserRecord> {
        let user = self.inner.update(id, changes).await?;
        self.hooks.dispatch_after_update(&user);
        Ok(user)
    }
}
