use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use crate::infrastructure::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("application state unavailable")]
    MissingState,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AuthError::MissingState => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Missing | AuthError::Invalid => StatusCode::UNAUTHORIZED,
        };
        (
            status,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(serde_json::json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

/// Proof that the request carried the configured API token. Handlers that
/// take it as an argument reject the request before their body runs.
#[derive(Clone, Copy, Debug)]
pub struct ApiToken;

#[async_trait]
impl FromRequestParts<()> for ApiToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &()) -> Result<Self, Self::Rejection> {
        let Some(state) = parts.extensions.get::<Arc<AppState>>() else {
            return Err(AuthError::MissingState);
        };

        let token = bearer_token(&parts.headers)?;
        if token_matches(token, &state.config.auth.api_token) {
            Ok(ApiToken)
        } else {
            warn!("rejected request with invalid api token");
            Err(AuthError::Invalid)
        }
    }
}

/// Extracts the raw credential bytes of an `Authorization: Bearer <token>`
/// header. The scheme is matched case-insensitively; the token is left as-is,
/// non-ASCII bytes included.
pub fn bearer_token(headers: &HeaderMap) -> Result<&[u8], AuthError> {
    let Some(header_value) = headers.get(header::AUTHORIZATION) else {
        return Err(AuthError::Missing);
    };
    let bytes = header_value.as_bytes();
    let Some(space) = bytes.iter().position(|b| *b == b' ') else {
        return Err(AuthError::Missing);
    };
    let (scheme, token) = (&bytes[..space], &bytes[space + 1..]);
    if !scheme.eq_ignore_ascii_case(b"bearer") {
        return Err(AuthError::Missing);
    }
    Ok(token)
}

/// Byte-for-byte comparison in constant time. An empty secret never matches.
pub fn token_matches(presented: &[u8], expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    presented.ct_eq(expected.as_bytes()).into()
}
