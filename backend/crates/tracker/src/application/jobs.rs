//! Scheduled Jobs
//!
//! Adapters from the batch use cases to `platform::scheduler::Job`. Every
//! run takes a fresh configuration snapshot, so a reload applies from the
//! next run on.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use platform::config::ConfigStore;
use platform::scheduler::{Job, JobError, JobSummary};

use crate::application::config::TrackerConfig;
use crate::application::nameserver_drift::NameserverDriftUseCase;
use crate::application::notifier::{Delivery, Notifier};
use crate::application::ports::{CertificateFetcher, DnsResolver};
use crate::application::refresh_certificates::RefreshCertificatesUseCase;
use crate::application::refresh_domains::{RefreshDomainsUseCase, RefreshScope};
use crate::application::reminders::{CertificateRemindersUseCase, DomainRemindersUseCase};
use crate::application::resolver::FallbackResolver;
use crate::domain::repository::{CertificateRepository, DomainRepository};
use crate::error::TrackerError;

/// Weekly: refresh domains inside the lead window, then remind
pub const DOMAIN_REFRESH_JOB: &str = "domain-refresh";
/// Manual: refresh every domain, then remind
pub const DOMAIN_REFRESH_ALL_JOB: &str = "domain-refresh-all";
pub const NAMESERVER_CHECK_JOB: &str = "nameserver-check";
pub const CERTIFICATE_REFRESH_JOB: &str = "certificate-refresh";

/// Collaborators shared by the jobs and the HTTP handlers
pub struct TrackerServices<R> {
    pub repo: Arc<R>,
    pub resolver: Arc<FallbackResolver>,
    pub dns: Arc<dyn DnsResolver>,
    pub certificates: Arc<dyn CertificateFetcher>,
    pub notifier: Notifier,
}

impl<R> Clone for TrackerServices<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            resolver: self.resolver.clone(),
            dns: self.dns.clone(),
            certificates: self.certificates.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

fn snapshot(store: &ConfigStore) -> Result<Arc<TrackerConfig>, JobError> {
    TrackerConfig::from_app(&store.snapshot())
        .map(Arc::new)
        .map_err(|e| JobError::new(e.to_string()))
}

fn job_error(e: TrackerError) -> JobError {
    JobError::new(e.to_string())
}

fn delivery_note(delivery: Delivery) -> &'static str {
    match delivery {
        Delivery::Skipped => "no email",
        Delivery::Sent => "email sent",
        Delivery::Failed => "email failed",
    }
}

// ============================================================================
// Domain refresh + reminders
// ============================================================================

pub struct DomainRefreshJob<R> {
    services: TrackerServices<R>,
    config: Arc<ConfigStore>,
    scope: RefreshScope,
}

impl<R> DomainRefreshJob<R>
where
    R: DomainRepository + Send + Sync + 'static,
{
    pub fn new(services: TrackerServices<R>, config: Arc<ConfigStore>, scope: RefreshScope) -> Self {
        Self {
            services,
            config,
            scope,
        }
    }
}

#[async_trait]
impl<R> Job for DomainRefreshJob<R>
where
    R: DomainRepository + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        match self.scope {
            RefreshScope::DueOnly => DOMAIN_REFRESH_JOB,
            RefreshScope::All => DOMAIN_REFRESH_ALL_JOB,
        }
    }

    async fn run(&self) -> Result<JobSummary, JobError> {
        let config = snapshot(&self.config)?;
        let now = Utc::now();

        let refreshed = RefreshDomainsUseCase::new(
            self.services.repo.clone(),
            self.services.resolver.clone(),
            self.services.dns.clone(),
            config.clone(),
        )
        .execute(self.scope, now)
        .await
        .map_err(job_error)?;

        // Reads the rows just written
        let reminded = DomainRemindersUseCase::new(
            self.services.repo.clone(),
            self.services.notifier.clone(),
            config,
        )
        .execute(Utc::now())
        .await
        .map_err(job_error)?;

        Ok(
            JobSummary::new(refreshed.refreshed, refreshed.failed).with_note(format!(
                "{} examined, {} out of scope, {} due for reminder, {}",
                refreshed.examined,
                refreshed.skipped,
                reminded.due,
                delivery_note(reminded.delivery)
            )),
        )
    }
}

// ============================================================================
// Nameserver drift
// ============================================================================

pub struct NameserverDriftJob<R> {
    services: TrackerServices<R>,
    config: Arc<ConfigStore>,
}

impl<R> NameserverDriftJob<R>
where
    R: DomainRepository + Send + Sync + 'static,
{
    pub fn new(services: TrackerServices<R>, config: Arc<ConfigStore>) -> Self {
        Self { services, config }
    }
}

#[async_trait]
impl<R> Job for NameserverDriftJob<R>
where
    R: DomainRepository + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        NAMESERVER_CHECK_JOB
    }

    async fn run(&self) -> Result<JobSummary, JobError> {
        let config = snapshot(&self.config)?;

        let outcome = NameserverDriftUseCase::new(
            self.services.repo.clone(),
            self.services.dns.clone(),
            self.services.notifier.clone(),
            config,
        )
        .execute(Utc::now())
        .await
        .map_err(job_error)?;

        let processed = outcome.unchanged + outcome.changes.len();
        Ok(JobSummary::new(processed, outcome.failed()).with_note(format!(
            "{} changed, {} unresolved, {} not initialized, {} deleted mid-run, {}",
            outcome.changes.len(),
            outcome.unavailable,
            outcome.not_initialized,
            outcome.vanished,
            delivery_note(outcome.delivery)
        )))
    }
}

// ============================================================================
// Certificate refresh + reminders
// ============================================================================

pub struct CertificateRefreshJob<R> {
    services: TrackerServices<R>,
    config: Arc<ConfigStore>,
}

impl<R> CertificateRefreshJob<R>
where
    R: CertificateRepository + Send + Sync + 'static,
{
    pub fn new(services: TrackerServices<R>, config: Arc<ConfigStore>) -> Self {
        Self { services, config }
    }
}

#[async_trait]
impl<R> Job for CertificateRefreshJob<R>
where
    R: CertificateRepository + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        CERTIFICATE_REFRESH_JOB
    }

    async fn run(&self) -> Result<JobSummary, JobError> {
        let config = snapshot(&self.config)?;

        let refreshed = RefreshCertificatesUseCase::new(
            self.services.repo.clone(),
            self.services.certificates.clone(),
            config.clone(),
        )
        .execute()
        .await
        .map_err(job_error)?;

        let reminded = CertificateRemindersUseCase::new(
            self.services.repo.clone(),
            self.services.notifier.clone(),
            config,
        )
        .execute(Utc::now())
        .await
        .map_err(job_error)?;

        Ok(
            JobSummary::new(refreshed.refreshed, refreshed.failed).with_note(format!(
                "{} due for reminder, {}",
                reminded.due,
                delivery_note(reminded.delivery)
            )),
        )
    }
}
