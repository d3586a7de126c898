//! Add Domain Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{ClientId, DomainId};

use crate::application::config::TrackerConfig;
use crate::application::ports::DnsResolver;
use crate::application::resolver::{FallbackResolver, snapshot_dns};
use crate::domain::entities::NewTrackedDomain;
use crate::domain::repository::DomainRepository;
use crate::domain::services::cap_text_payload;
use crate::domain::value_objects::DomainName;
use crate::error::{TrackerError, TrackerResult};

/// Input DTO for add domain
#[derive(Debug, Clone)]
pub struct AddDomainInput {
    pub domain: String,
    pub client_id: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddDomainOutput {
    pub id: DomainId,
    pub domain: DomainName,
    pub expiration: DateTime<Utc>,
}

/// Resolves the registration synchronously; nothing is stored when every
/// registry source fails.
pub struct AddDomainUseCase<R>
where
    R: DomainRepository,
{
    repo: Arc<R>,
    resolver: Arc<FallbackResolver>,
    dns: Arc<dyn DnsResolver>,
    config: Arc<TrackerConfig>,
}

impl<R> AddDomainUseCase<R>
where
    R: DomainRepository,
{
    pub fn new(
        repo: Arc<R>,
        resolver: Arc<FallbackResolver>,
        dns: Arc<dyn DnsResolver>,
        config: Arc<TrackerConfig>,
    ) -> Self {
        Self {
            repo,
            resolver,
            dns,
            config,
        }
    }

    pub async fn execute(&self, input: AddDomainInput) -> TrackerResult<AddDomainOutput> {
        let domain = DomainName::parse(&input.domain)
            .map_err(|e| TrackerError::InvalidInput(e.to_string()))?;
        let client_id = parse_client_id(input.client_id)?;

        let mut registration = self.resolver.resolve(&domain).await?;
        let dns = snapshot_dns(self.dns.as_ref(), &domain).await;

        registration.raw_payload =
            cap_text_payload(registration.raw_payload, self.config.max_raw_payload_bytes);
        let expiration = registration.expiration;

        let id = self
            .repo
            .insert_domain(&NewTrackedDomain {
                domain: domain.clone(),
                client_id,
                notes: normalize_notes(input.notes),
                registration,
                dns,
            })
            .await?;

        tracing::info!(
            domain_id = %id,
            domain = %domain,
            expiration = %expiration,
            "Domain added"
        );

        Ok(AddDomainOutput {
            id,
            domain,
            expiration,
        })
    }
}

/// `clientID` must name a real row; ids start at 1
pub(crate) fn parse_client_id(raw: i32) -> TrackerResult<ClientId> {
    if raw <= 0 {
        return Err(TrackerError::InvalidInput("clientID is required".into()));
    }
    Ok(ClientId::from_i32(raw))
}

/// Blank notes are stored as NULL
pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
