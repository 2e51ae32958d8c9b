use std::sync::Arc;

use am4_database::{DbError, Lookup, NewUser, UserRecord, UserStore};
use tracing::{debug, info, warn};

use crate::credentials::CredentialHasher;
use crate::error::ProvisioningError;

/// A find-or-create request from the Discord side.
///
/// No field is validated: empty strings and a zero `discord_id` are stored
/// as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub username: String,
    pub game_name: String,
    pub game_mode: String,
    pub discord_id: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Provisioned {
    Found(UserRecord),
    Created(UserRecord),
}

impl Provisioned {
    pub fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn record(&self) -> &UserRecord {
        match self {
            Self::Found(user) | Self::Created(user) => user,
        }
    }

    pub fn into_parts(self) -> (UserRecord, bool) {
        match self {
            Self::Found(user) => (user, false),
            Self::Created(user) => (user, true),
        }
    }
}

/// Finds or creates the user behind a Discord id.
///
/// Relies on the store rejecting a second row for the same `discord_id`: the
/// loser of a concurrent create re-reads and reports the winner as found.
#[derive(Debug)]
pub struct UserProvisioningService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
}

impl UserProvisioningService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    #[tracing::instrument(skip(self, request), fields(discord_id = request.discord_id))]
    pub async fn provision(
        &self,
        request: ProvisionRequest,
    ) -> Result<Provisioned, ProvisioningError> {
        if let Lookup::Found(user) = self.store.find_by_discord_id(request.discord_id).await? {
            debug!(user_id = user.id, "existing user found");
            return Ok(Provisioned::Found(user));
        }

        // The credential is a placeholder equal to the username.
        let password_hash = self.hasher.hash_blocking(request.username.clone()).await?;
        let new_user = NewUser::from_discord(
            request.username,
            request.game_name,
            request.game_mode,
            request.discord_id,
            password_hash,
        );

        match self.store.create(&new_user).await {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "user created");
                Ok(Provisioned::Created(user))
            }
            Err(DbError::DuplicateDiscordId(discord_id)) => {
                warn!("discord_id claimed by a concurrent request; reading it back");
                match self.store.find_by_discord_id(discord_id).await? {
                    Lookup::Found(user) => Ok(Provisioned::Found(user)),
                    Lookup::NotFound => Err(ProvisioningError::ConflictUnresolved(discord_id)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
