use std::fmt;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Bearer token accepted by [`admin_auth`]. Never printed.
#[derive(Clone)]
pub struct AdminToken(String);

impl AdminToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len() && bool::from(expected.ct_eq(candidate))
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken([REDACTED])")
    }
}

/// Log one line per request with its outcome and latency.
pub async fn activity_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        warn!(%method, %path, status, elapsed_ms, "request failed");
    } else {
        info!(%method, %path, status, elapsed_ms, "request handled");
    }

    response
}

/// Require `Authorization: Bearer <admin token>`. With no token configured
/// every request is refused.
pub async fn admin_auth(
    State(expected): State<Option<AdminToken>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = expected else {
        warn!("admin auth failed: no token configured");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(auth_value) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("admin auth failed: missing Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(token) = auth_value.strip_prefix("Bearer ") else {
        warn!("admin auth failed: invalid Authorization format");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if expected.matches(token.trim()) {
        Ok(next.run(request).await)
    } else {
        warn!("admin auth failed: invalid token");
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::AdminToken;

    #[test]
    fn tokens_compare_exactly() {
        let token = AdminToken::new("s3cret");
        assert!(token.matches("s3cret"));
        assert!(!token.matches("s3cre"));
        assert!(!token.matches("s3cret!"));
        assert!(!token.matches(""));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = AdminToken::new("s3cret");
        assert!(!format!("{token:?}").contains("s3cret"));
    }
}
