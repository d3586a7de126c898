//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::value_object::user_name::UserName;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user and return its id
    async fn create(&self, user: &NewUser) -> AuthResult<UserId>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Stamp the last successful login
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a newly issued session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by token, expired or not
    async fn find(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Delete a session; deleting an unknown token is not an error
    async fn delete(&self, token: &str) -> AuthResult<()>;

    /// Delete every session that expired before `now`, returning the count
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
