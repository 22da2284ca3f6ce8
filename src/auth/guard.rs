//! Per-request authentication gate.
//!
//! Runs ahead of every protected handler; a rejected request never
//! reaches the handler, so no protected operation can leave partial side
//! effects. Rejections are terminal, there is no fallback path.

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::token::{TokenCodec, TokenError};

/// The verified identity attached to admitted requests.
#[derive(Debug, Clone)]
pub struct Subject(pub String);

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if token.is_empty() || parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Middleware gating protected routes on a valid access token.
///
/// Missing token, bad signature and expired token all answer 401; the
/// distinction is kept in the logs only.
pub async fn require_token(
    Extension(codec): Extension<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token_from_header);

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "Missing authentication token").into_response();
    };

    match codec.verify(token) {
        Ok(subject) => {
            request.extensions_mut().insert(Subject(subject));
            next.run(request).await
        }
        Err(TokenError::Expired) => {
            debug!("rejected expired token");
            (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
        }
        Err(_) => {
            debug!("rejected token with invalid signature");
            (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
        }
    }
}
