use am4_core::{ProvisioningError, SettingsError};
use am4_database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Database(#[from] DbError),
}

fn database_status(err: &DbError) -> StatusCode {
    match err {
        DbError::DuplicateDiscordId(_) | DbError::Conflict(_) => StatusCode::CONFLICT,
        DbError::NotFound(_) => StatusCode::NOT_FOUND,
        DbError::Sqlx(_) | DbError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Provisioning(ProvisioningError::Database(e)) => database_status(e),
            Self::Provisioning(ProvisioningError::ConflictUnresolved(_)) => StatusCode::CONFLICT,
            Self::Provisioning(ProvisioningError::Credential(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Settings(SettingsError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::Settings(SettingsError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Settings(SettingsError::Database(e)) | Self::Database(e) => database_status(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = ?self, "request failed");
            "Something went wrong while processing your request.".to_owned()
        } else {
            self.to_string()
        };

        let body = json!({
            "code": status.as_u16(),
            "message": message,
            "data": {},
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use am4_core::{ProvisioningError, SettingsError};
    use am4_database::DbError;
    use axum::http::StatusCode;

    use super::ApiError;

    #[test]
    fn statuses_follow_the_failure_kind() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ProvisioningError::Database(DbError::Internal("down".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProvisioningError::Database(DbError::Conflict("username".into())).into(),
                StatusCode::CONFLICT,
            ),
            (
                ProvisioningError::ConflictUnresolved(1).into(),
                StatusCode::CONFLICT,
            ),
            (
                SettingsError::Invalid("load".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (SettingsError::UserNotFound(4).into(), StatusCode::NOT_FOUND),
            (
                SettingsError::Database(DbError::DuplicateDiscordId(1)).into(),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }
}
