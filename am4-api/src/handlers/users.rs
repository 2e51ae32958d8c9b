use am4_core::AppState;
use am4_database::{Lookup, UserChanges, UserRecord};
use am4_utils::parse::parse_discord_id;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::payload::{ApiResponse, FromDiscordPayload};

type UserResponse = Json<ApiResponse<UserRecord>>;

/// Find the user behind a Discord id, creating it on first contact.
/// Both outcomes answer 200; `message` tells them apart.
pub async fn from_discord(
    State(state): State<AppState>,
    payload: Result<Json<FromDiscordPayload>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (user, created) = state
        .provisioning
        .provision(payload.into())
        .await?
        .into_parts();

    let message = if created { "created" } else { "found" };
    Ok(Json(ApiResponse::new(message, user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<UserResponse, ApiError> {
    match state.users.find_by_id(id).await? {
        Lookup::Found(user) => Ok(Json(ApiResponse::new("found", user))),
        Lookup::NotFound => Err(ApiError::NotFound(format!("user {id} not found"))),
    }
}

pub async fn get_user_by_discord(
    State(state): State<AppState>,
    Path(raw_discord_id): Path<String>,
) -> Result<UserResponse, ApiError> {
    let discord_id = parse_discord_id(&raw_discord_id)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid discord_id `{raw_discord_id}`")))?;

    match state.users.find_by_discord_id(discord_id).await? {
        Lookup::Found(user) => Ok(Json(ApiResponse::new("found", user))),
        Lookup::NotFound => Err(ApiError::NotFound(format!(
            "no user with discord_id {discord_id}"
        ))),
    }
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    changes: Result<Json<UserChanges>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(changes) = changes.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user = state.settings.update(id, &changes).await?;
    Ok(Json(ApiResponse::new("updated", user)))
}
