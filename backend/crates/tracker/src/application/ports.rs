//! Outbound Ports
//!
//! Network collaborators of the pipeline. Implemented in `infra/`, faked in
//! tests. Object safe so adapters can be mixed behind `Arc<dyn _>`.

use async_trait::async_trait;

use crate::application::render::Notification;
use crate::domain::entities::{LeafCertificate, Registration};
use crate::domain::value_objects::{DomainName, RecordType};
use crate::error::{CertificateError, RegistryError, TransportError};

/// One registry protocol (RDAP, WHOIS, ...)
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Short name recorded on the domain row and in logs
    fn name(&self) -> &'static str;

    async fn lookup(&self, domain: &DomainName) -> Result<Registration, RegistryError>;
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Record values for `domain`.
    ///
    /// Transport or decode failures yield an empty list. Empty means
    /// "no data available", never "the record does not exist".
    async fn resolve_records(&self, domain: &DomainName, record_type: RecordType) -> Vec<String>;
}

#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Leaf certificate presented by `host:443`
    async fn fetch_leaf_certificate(
        &self,
        host: &DomainName,
    ) -> Result<LeafCertificate, CertificateError>;
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), TransportError>;
}
