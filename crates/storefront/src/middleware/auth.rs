//! Admin authentication extractors.
//!
//! Admin requests carry `Authorization: Bearer <ADMIN_API_KEY>`. The key is
//! compared in constant time against the configured one.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::config::admin_key_matches;
use crate::db::Store;
use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|t| !t.is_empty())
}

/// Extractor that requires a valid admin bearer token.
///
/// Rejects with 401 on a missing or wrong token, and with 500 when the
/// server has no admin key configured.
///
/// # Example
///
/// ```rust,ignore
/// async fn delete_product(
///     _admin: RequireAdmin,
///     Path(id): Path<ProductId>,
/// ) -> Result<StatusCode> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S: Store> FromRequestParts<AppState<S>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let configured = state
            .config()
            .admin_api_key
            .as_ref()
            .ok_or_else(|| AppError::Internal("ADMIN_API_KEY is not configured".to_owned()))?;
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

        if !admin_key_matches(configured, token) {
            tracing::warn!(path = %parts.uri.path(), "rejected admin token");
            return Err(AppError::Unauthorized("invalid admin token".to_owned()));
        }
        Ok(Self)
    }
}

/// Extractor that reports whether the caller is an admin, never rejecting.
///
/// Callers without a valid token are treated as guests. When a token is
/// presented but cannot be checked, the cause is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalAdmin(pub bool);

impl<S: Store> FromRequestParts<AppState<S>> for OptionalAdmin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(false));
        };
        let Some(configured) = state.config().admin_api_key.as_ref() else {
            tracing::warn!("bearer token presented but ADMIN_API_KEY is not configured; treating caller as guest");
            return Ok(Self(false));
        };
        if !admin_key_matches(configured, token) {
            tracing::info!("invalid admin token; treating caller as guest");
            return Ok(Self(false));
        }
        Ok(Self(true))
    }
}
