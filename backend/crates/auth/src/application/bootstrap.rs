//! Admin bootstrap
//!
//! Makes sure the configured operator account exists before the server
//! accepts requests. An existing account keeps its stored password.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

pub struct EnsureAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> EnsureAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, username: &str, password: &str) -> AuthResult<UserId> {
        let user_name =
            UserName::new(username).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if let Some(existing) = self.user_repo.find_by_user_name(&user_name).await? {
            tracing::debug!(user_id = %existing.user_id, "Admin account already present");
            return Ok(existing.user_id);
        }

        let password_hash = ClearTextPassword::new(password)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user_id = self
            .user_repo
            .create(&NewUser {
                user_name,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user_id, "Created admin account");

        Ok(user_id)
    }
}
