//! Data Transfer Objects

use serde::Deserialize;

/// POST /api/login body. Missing fields read as empty and are rejected
/// by the use case with 400.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"admin"}"#).unwrap();
        assert_eq!(req.username, "admin");
        assert!(req.password.is_empty());
    }
}
