use async_trait::async_trait;

use super::{Lookup, UserStore};
use crate::database::Database;
use crate::error::Result;
use crate::impls::users;
use crate::model::user::{NewUser, UserChanges, UserRecord};

#[async_trait]
impl UserStore for Database {
    #[tracing::instrument(skip(self))]
    async fn find_by_discord_id(&self, discord_id: i64) -> Result<Lookup<UserRecord>> {
        users::find_user_by_discord_id(self, discord_id)
            .await
            .map(Lookup::from)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Lookup<UserRecord>> {
        users::find_user_by_id(self, id).await.map(Lookup::from)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Lookup<UserRecord>> {
        users::find_user_by_username(self, username)
            .await
            .map(Lookup::from)
    }

    #[tracing::instrument(skip(self, user), fields(discord_id = user.discord_id))]
    async fn create(&self, user: &NewUser) -> Result<UserRecord> {
        users::insert_user(self, user).await
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<UserRecord> {
        users::update_user(self, id, changes).await
    }
}
