//! Domain and TLS Certificate Expiration Tracker
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, change detection, repository traits
//! - `application/` - Use cases, the refresh pipeline, scheduled jobs
//! - `infra/` - Postgres storage, RDAP/WHOIS/DoH/TLS clients, SMTP mailer
//! - `presentation/` - HTTP handlers, DTOs, guarded router
//!
//! ## Refresh Pipeline
//! - Registration data comes from RDAP, falling back to WHOIS
//! - A stored record is only overwritten by a successful fetch
//! - Assets are processed one at a time, paced, each under a time budget
//! - Reminders go out once per run, only when something is due

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    CertificateRefreshJob, DomainRefreshJob, FallbackResolver, NameserverDriftJob, Notifier,
    RefreshScope, TrackerConfig, TrackerServices,
};
pub use error::{TrackerError, TrackerResult};
pub use infra::postgres::PgTrackerRepository;
pub use presentation::{TrackerAppState, tracker_router};
