//! Certificate Refresh Use Case
//!
//! Probes every tracked host again and stores the leaf it presents now.

use std::sync::Arc;

use crate::application::config::TrackerConfig;
use crate::application::cycle::{self, CyclePhase, RefreshOutcome};
use crate::application::ports::CertificateFetcher;
use crate::domain::entities::TrackedCertificate;
use crate::domain::repository::CertificateRepository;
use crate::domain::services::cap_binary_payload;
use crate::error::{TrackerError, TrackerResult};

const CYCLE: &str = "certificate-refresh";

pub struct RefreshCertificatesUseCase<R>
where
    R: CertificateRepository,
{
    repo: Arc<R>,
    fetcher: Arc<dyn CertificateFetcher>,
    config: Arc<TrackerConfig>,
}

impl<R> RefreshCertificatesUseCase<R>
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

    pub async fn execute(&self) -> TrackerResult<RefreshOutcome> {
        cycle::enter(CYCLE, CyclePhase::Fetching);
        let certificates = self.repo.list_certificates().await?;

        let mut outcome = RefreshOutcome {
            examined: certificates.len(),
            ..Default::default()
        };

        for (i, certificate) in certificates.iter().enumerate() {
            if i > 0 && !self.config.certificate_pacing.is_zero() {
                tokio::time::sleep(self.config.certificate_pacing).await;
            }

            match tokio::time::timeout(self.config.asset_budget, self.refresh_one(certificate))
                .await
            {
                Ok(Ok(true)) => outcome.refreshed += 1,
                Ok(Ok(false)) => {
                    tracing::info!(host = %certificate.host, "Certificate deleted during refresh");
                    outcome.vanished += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!(host = %certificate.host, error = %e, "Certificate refresh failed");
                    outcome.failed += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        host = %certificate.host,
                        budget_secs = self.config.asset_budget.as_secs(),
                        "Certificate refresh timed out"
                    );
                    outcome.failed += 1;
                }
            }
        }

        cycle::enter(CYCLE, CyclePhase::Idle);
        Ok(outcome)
    }

    async fn refresh_one(&self, certificate: &TrackedCertificate) -> TrackerResult<bool> {
        let mut leaf = self
            .fetcher
            .fetch_leaf_certificate(&certificate.host)
            .await
            .map_err(|source| TrackerError::Certificate {
                host: certificate.host.to_string(),
                source,
            })?;

        let der_len = leaf.der.len();
        leaf.der = cap_binary_payload(leaf.der, self.config.max_raw_payload_bytes);
        if leaf.der.is_empty() && der_len > 0 {
            tracing::warn!(
                host = %certificate.host,
                der_len,
                "Certificate exceeds retention cap, raw data not stored"
            );
        }

        cycle::enter(CYCLE, CyclePhase::Persisting);
        if !self.repo.update_certificate(certificate.id, &leaf).await? {
            return Ok(false);
        }

        tracing::info!(
            host = %certificate.host,
            common_name = %leaf.common_name,
            not_after = %leaf.not_after,
            "Certificate refreshed"
        );
        Ok(true)
    }
}
