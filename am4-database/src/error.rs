/// Errors surfaced by the persistence layer.
///
/// "No such row" is not an error on the read path; lookups return
/// [`crate::Lookup::NotFound`] instead. Everything here is a real failure.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("a user with discord_id {0} already exists")]
    DuplicateDiscordId(i64),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
