use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::{Credential, Role},
};

/// An admitted login, stored in request extensions for handlers
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session for an admitted credential
    pub fn open(credential: &Credential) -> Self {
        Self {
            token: Uuid::new_v4(),
            username: credential.username.clone(),
            name: credential.name.clone(),
            role: credential.role,
            created_at: Utc::now(),
        }
    }

    /// True once the session is at least `ttl` old
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at >= ttl
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Forbidden` unless the session belongs to an admin
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".to_string()))
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <uuid>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
}

/// Middleware that admits only requests carrying a live session token.
///
/// The matching `Session` is inserted into the request extensions; requests
/// without one, or with an expired one, are answered with 401 before
/// reaching the handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let session = state.session(token).await.ok_or(AppError::Unauthorized)?;

    tracing::debug!(username = %session.username, "Session admitted");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
