use am4_core::AppState;
use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payload;

pub use middleware::AdminToken;
pub use error::ApiError;

/// Prefix of the internal user routes.
pub const USERS_PATH: &str = "/api/_core/users";

#[derive(Clone, Debug, Default)]
pub struct ApiConfig {
    pub require_admin_auth: bool,
    pub admin_token: Option<AdminToken>,
}

pub fn router(state: AppState, config: ApiConfig) -> Router {
    let mut users = Router::new()
        .route("/from_discord", post(handlers::users::from_discord))
        .route("/by_discord/{discord_id}", get(handlers::users::get_user_by_discord))
        .route("/{id}", get(handlers::users::get_user))
        .route("/{id}/settings", patch(handlers::users::update_settings));

    if config.require_admin_auth {
        users = users.layer(from_fn_with_state(
            config.admin_token,
            middleware::admin_auth,
        ));
    }

    Router::new()
        .nest(USERS_PATH, users)
        .layer(from_fn(middleware::activity_logger))
        .with_state(state)
}
