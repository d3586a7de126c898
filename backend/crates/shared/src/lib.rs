//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - the unified HTTP-facing error type and its classification
//! - typed integer identifiers for persisted records
//! - a JSON extractor that reports malformed bodies as 400
//!
//! Only things with the same meaning in every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
