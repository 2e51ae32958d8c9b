use am4_database::DbError;

use crate::credentials::CredentialError;

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The insert lost a uniqueness race, yet the winning row could not be read back.
    #[error("discord_id {0} conflicted on create but no record could be read back")]
    ConflictUnresolved(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error(transparent)]
    Database(#[from] DbError),
}
