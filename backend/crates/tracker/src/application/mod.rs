//! Application Layer
//!
//! Use cases, the refresh pipeline and its scheduled jobs.

pub mod add_certificate;
pub mod add_domain;
pub mod catalog;
pub mod config;
pub mod cycle;
pub mod jobs;
pub mod nameserver_drift;
pub mod notifier;
pub mod ports;
pub mod refresh_certificates;
pub mod refresh_domains;
pub mod reminders;
pub mod render;
pub mod resolver;

// Re-exports
pub use add_certificate::{AddCertificateInput, AddCertificateOutput, AddCertificateUseCase};
pub use add_domain::{AddDomainInput, AddDomainOutput, AddDomainUseCase};
pub use catalog::{CertificateCatalog, ClientCatalog, DomainCatalog, EditDomainInput};
pub use config::TrackerConfig;
pub use cycle::{CyclePhase, RefreshOutcome};
pub use jobs::{
    CERTIFICATE_REFRESH_JOB, CertificateRefreshJob, DOMAIN_REFRESH_ALL_JOB, DOMAIN_REFRESH_JOB,
    DomainRefreshJob, NAMESERVER_CHECK_JOB, NameserverDriftJob, TrackerServices,
};
pub use nameserver_drift::{DriftOutcome, NameserverDriftUseCase};
pub use notifier::{Delivery, Notifier};
pub use ports::{CertificateFetcher, DnsResolver, Mailer, RegistrySource};
pub use refresh_certificates::RefreshCertificatesUseCase;
pub use refresh_domains::{RefreshDomainsUseCase, RefreshScope};
pub use reminders::{CertificateRemindersUseCase, DomainRemindersUseCase, ReminderOutcome};
pub use render::Notification;
pub use resolver::FallbackResolver;
