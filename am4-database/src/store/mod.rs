//! The persistence boundary for user records.
//!
//! Reads return a [`Lookup`] so that "no such row" is a value, not an error;
//! any `Err` from a store is a genuine failure the caller must not mask.

mod memory;
mod observed;
mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::user::{NewUser, UserChanges, UserRecord};

pub use memory::MemoryUserStore;
pub use observed::{ObservedUserStore, UpdateObserver, UserHooks};

/// Result of a keyed read.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_discord_id(&self, discord_id: i64) -> Result<Lookup<UserRecord>>;

    async fn find_by_id(&self, id: i64) -> Result<Lookup<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> Result<Lookup<UserRecord>>;

    /// Insert a user. A taken `discord_id` yields
    /// [`DbError::DuplicateDiscordId`](crate::DbError::DuplicateDiscordId);
    /// any other uniqueness violation yields `DbError::Conflict`.
    async fn create(&self, user: &NewUser) -> Result<UserRecord>;

    /// Apply a partial update. A missing `id` yields `DbError::NotFound`.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<UserRecord>;
}

impl fmt::Debug for dyn UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserStore")
    }
}
