use std::collections::BTreeMap;

use am4_utils::time::now_unix_secs;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Lookup, UserStore};
use crate::error::{DbError, Result};
use crate::model::user::{NewUser, UserChanges, UserRecord};

#[derive(Debug)]
struct StoredUser {
    record: UserRecord,
    password_hash: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<i64, StoredUser>,
}

impl MemoryState {
    fn find(&self, predicate: impl Fn(&UserRecord) -> bool) -> Option<&StoredUser> {
        self.users.values().find(|stored| predicate(&stored.record))
    }
}

/// Process-local user store with the same uniqueness rules as the `users`
/// table. Every write holds the lock across its check and insert.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: RwLock<MemoryState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn password_hash(&self, id: i64) -> Option<String> {
        self.state
            .read()
            .await
            .users
            .get(&id)
            .map(|stored| stored.password_hash.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_discord_id(&self, discord_id: i64) -> Result<Lookup<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .find(|user| user.discord_id == discord_id)
            .map(|stored| stored.record.clone())
            .into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Lookup<UserRecord>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|stored| stored.record.clone()).into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Lookup<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .find(|user| user.username == username)
            .map(|stored| stored.record.clone())
            .into())
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord> {
        let mut state = self.state.write().await;

        if state.find(|existing| existing.discord_id == user.discord_id).is_some() {
            return Err(DbError::DuplicateDiscordId(user.discord_id));
        }
        if state.find(|existing| existing.username == user.username).is_some() {
            return Err(DbError::Conflict(format!(
                "username `{}` is already taken",
                user.username
            )));
        }

        state.last_id += 1;
        let id = state.last_id;
        let record = user.clone().into_record(id, now_unix_secs());
        state.users.insert(
            id,
            StoredUser {
                record: record.clone(),
                password_hash: user.password_hash.clone(),
            },
        );

        Ok(record)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<UserRecord> {
        let mut state = self.state.write().await;

        if let Some(discord_id) = changes.discord_id {
            let taken = state
                .find(|existing| existing.discord_id == discord_id && existing.id != id)
                .is_some();
            if taken {
                return Err(DbError::DuplicateDiscordId(discord_id));
            }
        }

        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("user {id}")))?;

        changes.apply_to(&mut stored.record);
        stored.record.updated_at = now_unix_secs();

        Ok(stored.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryUserStore;
    use crate::error::DbError;
    use crate::model::user::{NewUser, UserChanges};
    use crate::store::{Lookup, UserStore};

    fn new_user(username: &str, discord_id: i64) -> NewUser {
        NewUser::from_discord(username, "Air Test", "REALISM", discord_id, "hash")
    }

    #[tokio::test]
    async fn create_then_find_by_every_key() {
        let store = MemoryUserStore::new();
        let created = store.create(&new_user("pilot", 99)).await.unwrap();

        assert_eq!(
            store.find_by_discord_id(99).await.unwrap(),
            Lookup::Found(created.clone())
        );
        assert_eq!(
            store.find_by_id(created.id).await.unwrap(),
            Lookup::Found(created.clone())
        );
        assert_eq!(
            store.find_by_username("pilot").await.unwrap(),
            Lookup::Found(created)
        );
        assert_eq!(store.find_by_discord_id(100).await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn duplicate_discord_id_is_its_own_error() {
        let store = MemoryUserStore::new();
        store.create(&new_user("pilot", 99)).await.unwrap();

        let err = store.create(&new_user("other", 99)).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateDiscordId(99)));

        let err = store.create(&new_user("pilot", 100)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_applies_changes_and_rejects_unknown_ids() {
        let store = MemoryUserStore::new();
        let created = store.create(&new_user("pilot", 99)).await.unwrap();

        let changes = UserChanges {
            email: Some("pilot@example.com".to_owned()),
            ..UserChanges::default()
        };
        let updated = store.update(created.id, &changes).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("pilot@example.com"));

        let err = store.update(created.id + 1, &changes).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_cannot_steal_a_discord_id() {
        let store = MemoryUserStore::new();
        store.create(&new_user("first", 1)).await.unwrap();
        let second = store.create(&new_user("second", 2)).await.unwrap();

        let changes = UserChanges {
            discord_id: Some(1),
            ..UserChanges::default()
        };
        let err = store.update(second.id, &changes).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateDiscordId(1)));
    }
}
