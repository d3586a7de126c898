//! Domain Layer
//!
//! Entities, value objects, pure services and repository traits.

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

// Re-exports
pub use entities::{
    Client, DnsSnapshot, LeafCertificate, NameserverChangeEvent, Registration, TrackedCertificate,
    TrackedDomain,
};
pub use repository::{CertificateRepository, ClientRepository, DomainRepository};
pub use value_objects::{DomainName, LeadTime, Nameservers, RecordType, Urgency};
