//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

/// Bytes of entropy in a session token (256 bits)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random URL-safe base64 token with `len` bytes of entropy
pub fn random_token(len: usize) -> String {
    general_purpose::URL_SAFE.encode(random_bytes(len))
}

/// New session token
pub fn session_token() -> String {
    random_token(SESSION_TOKEN_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_shape() {
        let token = session_token();
        // 32 bytes -> 44 base64 chars with padding
        assert_eq!(token.len(), 44);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
        );
    }

    #[test]
    fn test_session_tokens_differ() {
        assert_ne!(session_token(), session_token());
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
    }
}
