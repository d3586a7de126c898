//! Repository Traits
//!
//! Storage seams for the tracker. Every method is a single statement so
//! concurrent refresh cycles resolve per row, last write wins.

use kernel::id::{CertificateId, ClientId, DomainId};

use crate::domain::entities::{
    Client, DnsSnapshot, LeafCertificate, NewTrackedCertificate, NewTrackedDomain, Registration,
    TrackedCertificate, TrackedDomain,
};
use crate::domain::value_objects::Nameservers;
use crate::error::TrackerResult;

#[trait_variant::make(ClientRepository: Send)]
pub trait LocalClientRepository {
    async fn list_clients(&self) -> TrackerResult<Vec<Client>>;

    async fn create_client(&self, name: &str) -> TrackerResult<ClientId>;

    /// Returns false when no client has this id
    async fn delete_client(&self, id: ClientId) -> TrackerResult<bool>;
}

#[trait_variant::make(DomainRepository: Send)]
pub trait LocalDomainRepository {
    async fn list_domains(&self) -> TrackerResult<Vec<TrackedDomain>>;

    async fn insert_domain(&self, domain: &NewTrackedDomain) -> TrackerResult<DomainId>;

    /// Overwrite everything a registry refresh produces.
    /// Returns false when the domain was deleted in the meantime.
    async fn update_registration(
        &self,
        id: DomainId,
        registration: &Registration,
        dns: &DnsSnapshot,
    ) -> TrackerResult<bool>;

    /// Returns false when the domain was deleted in the meantime
    async fn update_nameservers(&self, id: DomainId, nameservers: &Nameservers)
    -> TrackerResult<bool>;

    /// Reassign the owning client and replace the note.
    /// Returns false when no domain has this id.
    async fn update_domain_metadata(
        &self,
        id: DomainId,
        client_id: ClientId,
        notes: Option<&str>,
    ) -> TrackerResult<bool>;

    async fn delete_domain(&self, id: DomainId) -> TrackerResult<bool>;
}

#[trait_variant::make(CertificateRepository: Send)]
pub trait LocalCertificateRepository {
    async fn list_certificates(&self) -> TrackerResult<Vec<TrackedCertificate>>;

    async fn insert_certificate(
        &self,
        certificate: &NewTrackedCertificate,
    ) -> TrackerResult<CertificateId>;

    /// Returns false when the certificate was deleted in the meantime
    async fn update_certificate(&self, id: CertificateId, leaf: &LeafCertificate)
    -> TrackerResult<bool>;

    async fn delete_certificate(&self, id: CertificateId) -> TrackerResult<bool>;
}
