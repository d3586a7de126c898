//! Login Use Case
//!
//! Verifies a username and password and issues a server-side session.

use std::sync::Arc;

use chrono::Utc;
use platform::password::{ClearTextPassword, PasswordPolicyError};

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_name::{UserName, UserNameError};
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginOutput {
    /// Opaque token for the session cookie
    pub session_token: String,
}

pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let user_name = match UserName::new(&input.username) {
            Ok(name) => name,
            Err(UserNameError::Empty) => {
                return Err(AuthError::InvalidInput("username is required".to_string()));
            }
            Err(UserNameError::TooLong { .. }) => return Err(AuthError::InvalidCredentials),
        };

        let password = match ClearTextPassword::new(&input.password) {
            Ok(password) => password,
            Err(PasswordPolicyError::Empty) => {
                return Err(AuthError::InvalidInput("password is required".to_string()));
            }
            Err(PasswordPolicyError::TooLong { .. }) => return Err(AuthError::InvalidCredentials),
        };

        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.password_hash.verify(&password) {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session::issue(user.user_id, self.config.session_ttl, now);
        self.session_repo.create(&session).await?;
        self.user_repo.record_login(user.user_id, now).await?;

        tracing::info!(
            user_id = %user.user_id,
            expires_at = %session.expires_at,
            "User logged in"
        );

        Ok(LoginOutput {
            session_token: session.token,
        })
    }
}
