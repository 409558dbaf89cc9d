//! Guest session extractor.
//!
//! Guests are identified only by an opaque session key the client sends with
//! each request. The key is read from the `x-session-id` header, then from a
//! `session_id` query parameter, and falls back to [`SessionKey::DEFAULT`].

use axum::{
    extract::{FromRequestParts, Query},
    http::{StatusCode, request::Parts},
};
use serde::Deserialize;

use corner_shop_core::SessionKey;

use crate::error::AppError;

/// The HTTP header carrying the guest session key.
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

/// The session key of the calling guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestSession(pub SessionKey);

fn parse_key(raw: &str) -> Result<SessionKey, AppError> {
    SessionKey::parse(raw)
        .map_err(|e| AppError::Rejected(StatusCode::BAD_REQUEST, format!("invalid session id: {e}")))
}

impl<S> FromRequestParts<S> for GuestSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(value) = parts.headers.get(SESSION_HEADER) {
            let raw = value.to_str().map_err(|_| {
                AppError::Rejected(
                    StatusCode::BAD_REQUEST,
                    "invalid session id: not ASCII".to_owned(),
                )
            })?;
            if !raw.is_empty() {
                return parse_key(raw).map(Self);
            }
        }

        if let Ok(Query(query)) = Query::<SessionQuery>::try_from_uri(&parts.uri)
            && let Some(raw) = query.session_id.filter(|s| !s.is_empty())
        {
            return parse_key(&raw).map(Self);
        }

        Ok(Self(SessionKey::default()))
    }
}
