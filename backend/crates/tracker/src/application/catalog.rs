//! Catalog Use Cases
//!
//! Listing, editing and deleting tracked records and clients.

use std::sync::Arc;

use kernel::id::{CertificateId, ClientId, DomainId};

use crate::application::add_domain::{normalize_notes, parse_client_id};
use crate::domain::entities::{Client, TrackedCertificate, TrackedDomain};
use crate::domain::repository::{CertificateRepository, ClientRepository, DomainRepository};
use crate::error::{TrackerError, TrackerResult};

/// Maximum length of a client display name
pub const CLIENT_NAME_MAX_LENGTH: usize = 128;

fn parse_record_id(raw: i32) -> TrackerResult<i32> {
    if raw <= 0 {
        return Err(TrackerError::InvalidInput("id is required".into()));
    }
    Ok(raw)
}

#[derive(Debug, Clone)]
pub struct EditDomainInput {
    pub id: i32,
    pub client_id: i32,
    pub notes: Option<String>,
}

pub struct DomainCatalog<R>
where
    R: DomainRepository,
{
    repo: Arc<R>,
}

impl<R> DomainCatalog<R>
where
    R: DomainRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> TrackerResult<Vec<TrackedDomain>> {
        self.repo.list_domains().await
    }

    pub async fn edit(&self, input: EditDomainInput) -> TrackerResult<()> {
        let id = DomainId::from_i32(parse_record_id(input.id)?);
        let client_id = parse_client_id(input.client_id)?;

        let updated = self
            .repo
            .update_domain_metadata(id, client_id, normalize_notes(input.notes).as_deref())
            .await?;
        if !updated {
            return Err(TrackerError::NotFound("Domain"));
        }

        tracing::info!(domain_id = %id, client_id = %client_id, "Domain updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> TrackerResult<()> {
        let id = DomainId::from_i32(parse_record_id(id)?);
        if !self.repo.delete_domain(id).await? {
            return Err(TrackerError::NotFound("Domain"));
        }

        tracing::info!(domain_id = %id, "Domain deleted");
        Ok(())
    }
}

pub struct ClientCatalog<R>
where
    R: ClientRepository,
{
    repo: Arc<R>,
}

impl<R> ClientCatalog<R>
where
    R: ClientRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> TrackerResult<Vec<Client>> {
        self.repo.list_clients().await
    }

    pub async fn add(&self, name: &str) -> TrackerResult<ClientId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidInput("name is required".into()));
        }
        if name.chars().count() > CLIENT_NAME_MAX_LENGTH {
            return Err(TrackerError::InvalidInput(format!(
                "name must be at most {CLIENT_NAME_MAX_LENGTH} characters"
            )));
        }

        let id = self.repo.create_client(name).await?;
        tracing::info!(client_id = %id, name = %name, "Client added");
        Ok(id)
    }

    /// Fails with a conflict while domains or certificates still
    /// reference the client.
    pub async fn delete(&self, id: i32) -> TrackerResult<()> {
        let id = ClientId::from_i32(parse_record_id(id)?);
        if !self.repo.delete_client(id).await? {
            return Err(TrackerError::NotFound("Client"));
        }

        tracing::info!(client_id = %id, "Client deleted");
        Ok(())
    }
}

pub struct CertificateCatalog<R>
where
    R: CertificateRepository,
{
    repo: Arc<R>,
}

impl<R> CertificateCatalog<R>
where
    R: CertificateRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> TrackerResult<Vec<TrackedCertificate>> {
        self.repo.list_certificates().await
    }

    pub async fn delete(&self, id: i32) -> TrackerResult<()> {
        let id = CertificateId::from_i32(parse_record_id(id)?);
        if !self.repo.delete_certificate(id).await? {
            return Err(TrackerError::NotFound("Certificate"));
        }

        tracing::info!(certificate_id = %id, "Certificate deleted");
        Ok(())
    }
}
