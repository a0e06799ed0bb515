//! # Authentication Boundary
//!
//! The gateway in front of this service authenticates callers and injects
//! identity headers; routing/middleware concerns stay outside the core.
//! This module models that boundary as an extractor: handlers declare
//! [`AuthUser`] and receive the asserted identity, or the request is
//! rejected before the handler runs.
//!
//! Headers:
//! - `x-solara-user` — caller's user id (UUID), required.
//! - `x-solara-role` — `user` (default) or `admin`.
//! - `x-solara-profile` — `consumer` (default) or `contractor`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use solara_core::{RequesterRole, UserId};
use solara_kyc::ProfileType;

use crate::error::AppError;

/// Header carrying the authenticated user id.
pub const USER_HEADER: &str = "x-solara-user";
/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-solara-role";
/// Header carrying the caller's profile type.
pub const PROFILE_HEADER: &str = "x-solara-profile";

/// The authenticated caller, as asserted by the gateway.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The caller's user id.
    pub user_id: UserId,
    /// The caller's capability class.
    pub role: RequesterRole,
    /// The caller's profile type, for KYC requirement sets.
    pub profile: ProfileType,
}

impl AuthUser {
    /// Reject non-admin callers on admin-only routes.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "admin capability required".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let raw_user = header(USER_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing identity header".to_string()))?;
        let user_id = raw_user
            .parse::<Uuid>()
            .map(UserId)
            .map_err(|_| AppError::Unauthorized("malformed identity header".to_string()))?;

        let role = match header(ROLE_HEADER) {
            Some(raw) => RequesterRole::parse(&raw)
                .ok_or_else(|| AppError::Unauthorized(format!("unknown role {raw:?}")))?,
            None => RequesterRole::User,
        };

        let profile = match header(PROFILE_HEADER) {
            Some(raw) => ProfileType::parse(&raw)
                .ok_or_else(|| AppError::Unauthorized(format!("unknown profile {raw:?}")))?,
            None => ProfileType::Consumer,
        };

        Ok(AuthUser {
            user_id,
            role,
            profile,
        })
    }
}
