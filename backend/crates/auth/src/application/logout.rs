//! Logout Use Case

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Delete the session behind `token`. Missing tokens are a no-op.
    pub async fn execute(&self, token: Option<&str>) -> AuthResult<()> {
        if let Some(token) = token {
            self.session_repo.delete(token).await?;
            tracing::info!("Session ended by logout");
        }
        Ok(())
    }
}
