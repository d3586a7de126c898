//! Domain Refresh Use Case
//!
//! Re-resolves registration data for tracked domains, one at a time with a
//! pause in between. A failing domain is logged and skipped; only a failure
//! to list the domains aborts the cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::TrackerConfig;
use crate::application::cycle::{self, CyclePhase, RefreshOutcome};
use crate::application::ports::DnsResolver;
use crate::application::resolver::{FallbackResolver, snapshot_dns};
use crate::domain::entities::TrackedDomain;
use crate::domain::repository::DomainRepository;
use crate::domain::services::{cap_text_payload, is_due};
use crate::error::{TrackerError, TrackerResult};

const CYCLE: &str = "domain-refresh";

/// Which domains a cycle refetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Only domains inside the reminder window
    DueOnly,
    All,
}

pub struct RefreshDomainsUseCase<R>
where
    R: DomainRepository,
{
    repo: Arc<R>,
    resolver: Arc<FallbackResolver>,
    dns: Arc<dyn DnsResolver>,
    config: Arc<TrackerConfig>,
}

impl<R> RefreshDomainsUseCase<R>
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

    pub async fn execute(
        &self,
        scope: RefreshScope,
        now: DateTime<Utc>,
    ) -> TrackerResult<RefreshOutcome> {
        cycle::enter(CYCLE, CyclePhase::Fetching);
        let domains = self.repo.list_domains().await?;

        let mut outcome = RefreshOutcome {
            examined: domains.len(),
            ..Default::default()
        };
        let mut attempted = 0usize;

        for domain in &domains {
            if scope == RefreshScope::DueOnly
                && !is_due(domain.expiration, self.config.domain_lead, now)
            {
                outcome.skipped += 1;
                continue;
            }

            if attempted > 0 && !self.config.domain_pacing.is_zero() {
                tokio::time::sleep(self.config.domain_pacing).await;
            }
            attempted += 1;

            tracing::info!(domain = %domain.domain, "Refreshing domain");

            match tokio::time::timeout(self.config.asset_budget, self.refresh_one(domain)).await {
                Ok(Ok(true)) => outcome.refreshed += 1,
                Ok(Ok(false)) => {
                    tracing::info!(domain = %domain.domain, "Domain deleted during refresh");
                    outcome.vanished += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!(domain = %domain.domain, error = %e, "Domain refresh failed");
                    outcome.failed += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        domain = %domain.domain,
                        budget_secs = self.config.asset_budget.as_secs(),
                        "Domain refresh timed out"
                    );
                    outcome.failed += 1;
                }
            }
        }

        cycle::enter(CYCLE, CyclePhase::Idle);
        Ok(outcome)
    }

    /// Resolve, then overwrite the row. Nothing is written unless the
    /// resolve succeeded. False when the row no longer exists.
    async fn refresh_one(&self, domain: &TrackedDomain) -> TrackerResult<bool> {
        let mut registration = self
            .resolver
            .resolve(&domain.domain)
            .await
            .map_err(TrackerError::from)?;
        let dns = snapshot_dns(self.dns.as_ref(), &domain.domain).await;

        registration.raw_payload =
            cap_text_payload(registration.raw_payload, self.config.max_raw_payload_bytes);

        cycle::enter(CYCLE, CyclePhase::Persisting);
        if !self
            .repo
            .update_registration(domain.id, &registration, &dns)
            .await?
        {
            return Ok(false);
        }

        tracing::info!(
            domain = %domain.domain,
            expiration = %registration.expiration,
            source = registration.source,
            "Domain refreshed"
        );
        Ok(true)
    }
}
