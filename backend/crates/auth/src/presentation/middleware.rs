//! Auth Middleware
//!
//! Guard placed in front of every dashboard route. Only the bootstrapped
//! admin account gets through.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::cookie::extract_cookie;
use std::sync::Arc;

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<S> {
    pub repo: Arc<S>,
    pub config: Arc<AuthConfig>,
}

impl<S> Clone for AuthMiddlewareState<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware that requires a live admin session
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_admin<S>(
    State(state): State<AuthMiddlewareState<S>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    S: SessionRepository + Send + Sync + 'static,
{
    let token = extract_cookie(req.headers(), state.config.cookie_name());

    CheckSessionUseCase::new(state.repo.clone(), state.config.clone())
        .execute(token.as_deref())
        .await?;

    Ok(next.run(req).await)
}
