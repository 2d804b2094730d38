//! Token middleware.
//!
//! Accepts the token from the `token` header, or from `Authorization: Bearer`.
//! A verified [`Principal`] is stored in the request extensions for handlers.

use crate::{
    api::state::AppState,
    core::auth::{Principal, verify_token},
    errors::{Error, Result},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

const TOKEN_HEADER: &str = "token";

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    raw.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
    })
}

/// Rejects the request with 401 unless it carries a valid token.
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let Some(token) = presented_token(request.headers()) else {
        warn!(path = %request.uri().path(), "request without token");
        return Err(Error::Unauthorized {
            message: "no authorization token provided".to_string(),
        });
    };

    let secret = state.settings.jwt_secret()?;
    let principal: Principal = verify_token(secret, token.trim()).inspect_err(|e| {
        warn!(path = %request.uri().path(), "token rejected: {e}");
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_header_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer b"));
        assert_eq!(presented_token(&headers), Some("b"));

        headers.insert(TOKEN_HEADER, HeaderValue::from_static("t"));
        assert_eq!(presented_token(&headers), Some("t"));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(presented_token(&headers), None);
    }
}
