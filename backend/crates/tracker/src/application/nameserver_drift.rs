//! Nameserver Drift Use Case
//!
//! Resolves the NS records of every initialized domain, stores sets that
//! moved, and sends one email listing the stored changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::TrackerConfig;
use crate::application::cycle::{self, CyclePhase};
use crate::application::notifier::{Delivery, Notifier};
use crate::application::ports::DnsResolver;
use crate::application::render::render_nameserver_changes;
use crate::domain::entities::NameserverChangeEvent;
use crate::domain::repository::DomainRepository;
use crate::domain::services::{NameserverCheck, check_nameservers};
use crate::domain::value_objects::RecordType;
use crate::error::TrackerResult;

const CYCLE: &str = "nameserver-check";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftOutcome {
    pub examined: usize,
    pub unchanged: usize,
    /// Domains with no stored nameservers yet
    pub not_initialized: usize,
    /// Resolver returned nothing; no comparison was made
    pub unavailable: usize,
    /// Changes detected but not stored
    pub write_failures: usize,
    /// Deleted while the run was in progress; nothing reported
    pub vanished: usize,
    /// Stored changes, in storage order
    pub changes: Vec<NameserverChangeEvent>,
    pub delivery: Delivery,
}

impl DriftOutcome {
    pub fn failed(&self) -> usize {
        self.unavailable + self.write_failures
    }
}

pub struct NameserverDriftUseCase<R>
where
    R: DomainRepository,
{
    repo: Arc<R>,
    dns: Arc<dyn DnsResolver>,
    notifier: Notifier,
    config: Arc<TrackerConfig>,
}

impl<R> NameserverDriftUseCase<R>
where
    R: DomainRepository,
{
    pub fn new(
        repo: Arc<R>,
        dns: Arc<dyn DnsResolver>,
        notifier: Notifier,
        config: Arc<TrackerConfig>,
    ) -> Self {
        Self {
            repo,
            dns,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> TrackerResult<DriftOutcome> {
        cycle::enter(CYCLE, CyclePhase::Fetching);
        let domains = self.repo.list_domains().await?;

        let mut outcome = DriftOutcome {
            examined: domains.len(),
            unchanged: 0,
            not_initialized: 0,
            unavailable: 0,
            write_failures: 0,
            vanished: 0,
            changes: Vec::new(),
            delivery: Delivery::Skipped,
        };

        for domain in &domains {
            if domain.nameservers.is_empty() {
                outcome.not_initialized += 1;
                continue;
            }

            // A timed out lookup counts as no data
            let resolved = tokio::time::timeout(
                self.config.asset_budget,
                self.dns.resolve_records(&domain.domain, RecordType::Ns),
            )
            .await
            .unwrap_or_default();

            match check_nameservers(&domain.nameservers, &resolved) {
                NameserverCheck::NotInitialized => outcome.not_initialized += 1,
                NameserverCheck::Unchanged => outcome.unchanged += 1,
                NameserverCheck::Unavailable => {
                    tracing::warn!(
                        domain = %domain.domain,
                        "No NS records resolved, skipping comparison"
                    );
                    outcome.unavailable += 1;
                }
                NameserverCheck::Changed { current } => {
                    cycle::enter(CYCLE, CyclePhase::Persisting);
                    match self.repo.update_nameservers(domain.id, &current).await {
                        Ok(false) => {
                            tracing::info!(
                                domain = %domain.domain,
                                "Domain deleted during nameserver check"
                            );
                            outcome.vanished += 1;
                        }
                        Ok(true) => {
                            tracing::info!(
                                domain = %domain.domain,
                                previous = %domain.nameservers,
                                current = %current,
                                "Nameserver change detected"
                            );
                            outcome.changes.push(NameserverChangeEvent {
                                domain: domain.domain.clone(),
                                previous: domain.nameservers.clone(),
                                current,
                                detected_at: now,
                            });
                        }
                        Err(e) => {
                            // Re-detected on the next run
                            tracing::warn!(
                                domain = %domain.domain,
                                error = %e,
                                "Failed to store new nameservers"
                            );
                            outcome.write_failures += 1;
                        }
                    }
                }
            }
        }

        cycle::enter(CYCLE, CyclePhase::Notifying);
        outcome.delivery = self
            .notifier
            .dispatch(render_nameserver_changes(&outcome.changes))
            .await;

        cycle::enter(CYCLE, CyclePhase::Idle);
        Ok(outcome)
    }
}
