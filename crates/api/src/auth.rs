//! Basic-auth middleware (spec.md §6): the API key is the Basic-auth
//! username, the password is always empty. Unlike the teacher's JWT-based
//! `AuthUser` extractor (which decodes a bearer token and trusts its
//! claims), there is no token issuance here - the accepted key set is
//! static process configuration, so this is a `from_fn` layer rather than
//! a `FromRequestParts` extractor.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use std::sync::Arc;

use sdlc_synth_domain::ApiError;

use crate::AppState;

fn decode_basic_username(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Auth)?;

    let encoded = header.strip_prefix("Basic ").ok_or(ApiError::Auth)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::Auth)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ApiError::Auth)?;

    // username:password, password expected empty.
    let username = decoded.split_once(':').map(|(u, _)| u).unwrap_or(&decoded);
    if username.is_empty() {
        return Err(ApiError::Auth);
    }
    Ok(username.to_string())
}

/// `axum::middleware::from_fn_with_state` layer: rejects with 401 before the
/// handler runs when the Basic-auth username isn't in `state.config.api_keys`.
/// `/health` is mounted outside this layer (liveness must not depend on auth).
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let username = match decode_basic_username(request.headers()) {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    if !state.config.api_keys.iter().any(|k| k == &username) {
        return ApiError::Auth.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn basic_header(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode(value);
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        headers
    }

    #[test]
    fn decodes_username_with_empty_password() {
        let headers = basic_header("dev-key:");
        assert_eq!(decode_basic_username(&headers).unwrap(), "dev-key");
    }

    #[test]
    fn missing_header_is_auth_error() {
        assert!(matches!(
            decode_basic_username(&HeaderMap::new()),
            Err(ApiError::Auth)
        ));
    }

    #[test]
    fn empty_username_is_auth_error() {
        let headers = basic_header(":");
        assert!(matches!(decode_basic_username(&headers), Err(ApiError::Auth)));
    }
}
