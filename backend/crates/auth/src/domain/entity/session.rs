//! Session Entity
//!
//! Server-side session referenced by the opaque token in the `session`
//! cookie. A user may hold several sessions at once.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;

#[derive(Debug, Clone)]
pub struct Session {
    /// Random URL-safe token, the primary key
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for `user_id` that lives for `ttl`.
    pub fn issue(user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            token: platform::crypto::session_token(),
            user_id,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_absolute_expiry() {
        let now = Utc::now();
        let session = Session::issue(UserId::from_i32(1), Duration::hours(24), now);
        assert_eq!(session.expires_at, now + Duration::hours(24));
        assert!(!session.is_expired_at(now));
        assert!(!session.is_expired_at(now + Duration::hours(23)));
        assert!(session.is_expired_at(now + Duration::hours(24)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let now = Utc::now();
        let a = Session::issue(UserId::from_i32(1), Duration::hours(1), now);
        let b = Session::issue(UserId::from_i32(1), Duration::hours(1), now);
        assert_ne!(a.token, b.token);
    }
}
