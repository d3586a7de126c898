//! Check Session Use Case
//!
//! Resolves a session token to the admin account or rejects it.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Returns the admin's id for a live session.
    ///
    /// - no token, unknown token or expired session: `SessionInvalid`
    /// - live session of any other account: `Forbidden`
    pub async fn execute(&self, token: Option<&str>) -> AuthResult<UserId> {
        let token = token.ok_or(AuthError::SessionInvalid)?;

        let session = self
            .session_repo
            .find(token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired_at(Utc::now()) {
            self.session_repo.delete(&session.token).await?;
            return Err(AuthError::SessionInvalid);
        }

        if session.user_id != self.config.admin_user_id {
            return Err(AuthError::Forbidden);
        }

        Ok(session.user_id)
    }
}
