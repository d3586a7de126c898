//! Tracker Error Types
//!
//! Pipeline failures (per registry source, per TLS probe, per mail send)
//! and the crate-level `TrackerError` that integrates with the unified
//! `kernel::error::AppError` system.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Tracker-specific result type alias
pub type TrackerResult<T> = Result<T, TrackerError>;

// ============================================================================
// Registry
// ============================================================================

/// Why one registry source could not produce a registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The source has no record of the domain
    #[error("no registration record")]
    NotFound,

    /// The source has no server for this TLD
    #[error("unsupported TLD: {0}")]
    Unsupported(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unparseable response: {0}")]
    Parse(String),

    /// A record was found but carries no expiration date
    #[error("record has no expiration date")]
    MissingExpiration,
}

impl RegistryError {
    /// True for answers that mean "the data does not exist" rather than
    /// "the source could not be asked"
    pub fn is_absent_data(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound | RegistryError::MissingExpiration | RegistryError::Unsupported(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: RegistryError,
}

/// Every registry source failed for a domain. The stored record must be
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ResolutionError {
    pub domain: String,
    pub attempts: Vec<SourceFailure>,
}

impl ResolutionError {
    /// Every source answered, and none had usable data
    pub fn no_data_anywhere(&self) -> bool {
        !self.attempts.is_empty() && self.attempts.iter().all(|a| a.error.is_absent_data())
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration lookup failed for {}", self.domain)?;
        if self.attempts.is_empty() {
            return f.write_str(" (no sources configured)");
        }
        f.write_str(" (")?;
        for (i, attempt) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", attempt.source, attempt.error)?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// Certificate / Transport
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("peer presented no certificate")]
    NoPeerCertificate,

    #[error("unparseable certificate: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mail delivery failed: {0}")]
pub struct TransportError(pub String);

// ============================================================================
// Tracker Error
// ============================================================================

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Certificate fetch for {host} failed: {source}")]
    Certificate {
        host: String,
        #[source]
        source: CertificateError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Resolution(_) | TrackerError::Certificate { .. } => {
                StatusCode::BAD_GATEWAY
            }
            TrackerError::Storage(_) | TrackerError::Transport(_) | TrackerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::InvalidInput(_) => ErrorKind::BadRequest,
            TrackerError::NotFound(_) => ErrorKind::NotFound,
            TrackerError::Resolution(_) | TrackerError::Certificate { .. } => ErrorKind::BadGateway,
            TrackerError::Storage(_) | TrackerError::Transport(_) | TrackerError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    fn log(&self) {
        match self {
            TrackerError::Storage(e) => {
                tracing::error!(error = %e, "Tracker storage error");
            }
            TrackerError::Internal(msg) => {
                tracing::error!(message = %msg, "Tracker internal error");
            }
            TrackerError::Resolution(e) if e.no_data_anywhere() => {
                tracing::info!(error = %e, "Domain unknown to every registry source");
            }
            TrackerError::Resolution(e) => {
                tracing::warn!(error = %e, "Registry lookup failed");
            }
            TrackerError::Certificate { host, source } => {
                tracing::warn!(host = %host, error = %source, "Certificate fetch failed");
            }
            TrackerError::Transport(e) => {
                tracing::warn!(error = %e, "Mail transport failed");
            }
            _ => {
                tracing::debug!(error = %self, "Tracker error");
            }
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            // SQLSTATE decides the status (unique/foreign key violations are 409)
            TrackerError::Storage(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(source: &'static str, error: RegistryError) -> SourceFailure {
        SourceFailure { source, error }
    }

    #[test]
    fn test_resolution_error_lists_every_attempt() {
        let err = ResolutionError {
            domain: "example.com".into(),
            attempts: vec![
                failure("rdap", RegistryError::Network("timeout".into())),
                failure("whois", RegistryError::MissingExpiration),
            ],
        };
        assert_eq!(
            err.to_string(),
            "registration lookup failed for example.com \
             (rdap: network error: timeout; whois: record has no expiration date)"
        );
        assert!(!err.no_data_anywhere());
    }

    #[test]
    fn test_no_data_anywhere_distinguishes_absence_from_breakage() {
        let absent = ResolutionError {
            domain: "nope.example".into(),
            attempts: vec![
                failure("rdap", RegistryError::NotFound),
                failure("whois", RegistryError::MissingExpiration),
            ],
        };
        assert!(absent.no_data_anywhere());

        let broken = ResolutionError {
            domain: "example.com".into(),
            attempts: vec![failure("rdap", RegistryError::Parse("eof".into()))],
        };
        assert!(!broken.no_data_anywhere());

        let nothing_tried = ResolutionError {
            domain: "example.com".into(),
            attempts: vec![],
        };
        assert!(!nothing_tried.no_data_anywhere());
    }

    #[test]
    fn test_unknown_domain_still_answers_bad_gateway() {
        let absent = TrackerError::Resolution(ResolutionError {
            domain: "nope.example".into(),
            attempts: vec![failure("rdap", RegistryError::NotFound)],
        });
        assert_eq!(absent.into_response().status(), StatusCode::BAD_GATEWAY);

        let broken = TrackerError::Resolution(ResolutionError {
            domain: "example.com".into(),
            attempts: vec![failure("rdap", RegistryError::Network("reset".into()))],
        });
        assert_eq!(broken.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TrackerError::InvalidInput("domain".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(TrackerError::NotFound("Domain").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            TrackerError::Resolution(ResolutionError {
                domain: "example.com".into(),
                attempts: vec![],
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TrackerError::Certificate {
                host: "example.com".into(),
                source: CertificateError::NoPeerCertificate,
            }
            .kind(),
            ErrorKind::BadGateway
        );
    }

    #[test]
    fn test_storage_errors_use_kernel_mapping() {
        let resp = TrackerError::Storage(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = TrackerError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
