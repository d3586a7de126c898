//! Add Certificate Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::CertificateId;

use crate::application::add_domain::{normalize_notes, parse_client_id};
use crate::application::config::TrackerConfig;
use crate::application::ports::CertificateFetcher;
use crate::domain::entities::NewTrackedCertificate;
use crate::domain::repository::CertificateRepository;
use crate::domain::services::cap_binary_payload;
use crate::domain::value_objects::DomainName;
use crate::error::{TrackerError, TrackerResult};

#[derive(Debug, Clone)]
pub struct AddCertificateInput {
    pub host: String,
    pub client_id: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AddCertificateOutput {
    pub id: CertificateId,
    pub common_name: String,
    pub expiration: DateTime<Utc>,
}

/// Runs one TLS probe; nothing is stored when it fails.
pub struct AddCertificateUseCase<R>
where
    R: CertificateRepository,
{
    repo: Arc<R>,
    fetcher: Arc<dyn CertificateFetcher>,
    config: Arc<TrackerConfig>,
}

impl<R> AddCertificateUseCase<R>
where
    R: CertificateRepository,
{
    pub fn new(
        repo: Arc<R>,
        fetcher: Arc<dyn CertificateFetcher>,
        config: Arc<TrackerConfig>,
    ) -> Self {
        Self {
            repo,
            fetcher,
            config,
        }
    }

    pub async fn execute(&self, input: AddCertificateInput) -> TrackerResult<AddCertificateOutput> {
        let host = DomainName::parse(&input.host)
            .map_err(|e| TrackerError::InvalidInput(e.to_string()))?;
        let client_id = parse_client_id(input.client_id)?;

        let mut leaf = self
            .fetcher
            .fetch_leaf_certificate(&host)
            .await
            .map_err(|source| TrackerError::Certificate {
                host: host.to_string(),
                source,
            })?;

        let der_len = leaf.der.len();
        leaf.der = cap_binary_payload(leaf.der, self.config.max_raw_payload_bytes);
        if leaf.der.is_empty() && der_len > 0 {
            tracing::warn!(host = %host, der_len, "Certificate exceeds retention cap, raw data not stored");
        }

        let common_name = leaf.common_name.clone();
        let expiration = leaf.not_after;

        let id = self
            .repo
            .insert_certificate(&NewTrackedCertificate {
                host: host.clone(),
                client_id,
                notes: normalize_notes(input.notes),
                leaf,
            })
            .await?;

        tracing::info!(
            certificate_id = %id,
            host = %host,
            common_name = %common_name,
            "Certificate added"
        );

        Ok(AddCertificateOutput {
            id,
            common_name,
            expiration,
        })
    }
}
