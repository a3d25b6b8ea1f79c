//! Request extractors for the resolved identity
//!
//! [`require_auth`](super::require_auth) and
//! [`require_table_session`](super::require_table_session) resolve the caller
//! once and store it in request extensions; these extractors read it back.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::GuestSession;

use crate::auth::middleware::authenticate_token;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        // 路由未经过 require_auth 时直接校验
        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_from_header);

        let Some(token) = token else {
            security_log!(WARN, "auth_missing", uri = %parts.uri);
            return Err(AppError::not_authenticated());
        };

        let user = authenticate_token(&state.get_jwt_service(), token, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Guest session resolved by the table-session gate
///
/// Handlers mounted behind the gate take this instead of re-fetching the session.
#[derive(Debug, Clone)]
pub struct Guest(pub GuestSession);

impl<S: Send + Sync> FromRequestParts<S> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<GuestSession>()
            .cloned()
            .map(Guest)
            .ok_or_else(|| AppError::new(ErrorCode::SessionCredentialsMissing))
    }
}
