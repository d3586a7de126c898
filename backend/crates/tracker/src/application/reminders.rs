//! Reminder Use Cases
//!
//! Select the assets inside their lead window and send one batched email.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::TrackerConfig;
use crate::application::cycle::{self, CyclePhase};
use crate::application::notifier::{Delivery, Notifier};
use crate::application::render::{render_certificate_reminders, render_domain_reminders};
use crate::domain::repository::{CertificateRepository, DomainRepository};
use crate::domain::services::select_due_for_reminder;
use crate::error::TrackerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderOutcome {
    pub due: usize,
    pub delivery: Delivery,
}

pub struct DomainRemindersUseCase<R>
where
    R: DomainRepository,
{
    repo: Arc<R>,
    notifier: Notifier,
    config: Arc<TrackerConfig>,
}

impl<R> DomainRemindersUseCase<R>
where
    R: DomainRepository,
{
    pub fn new(repo: Arc<R>, notifier: Notifier, config: Arc<TrackerConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> TrackerResult<ReminderOutcome> {
        let domains = self.repo.list_domains().await?;
        let due = select_due_for_reminder(&domains, self.config.domain_lead, now);

        tracing::info!(due = due.len(), "Domains due for an expiration reminder");

        cycle::enter("domain-reminders", CyclePhase::Notifying);
        let message =
            render_domain_reminders(&due, self.config.domain_lead, &self.config.dashboard_base, now);

        Ok(ReminderOutcome {
            due: due.len(),
            delivery: self.notifier.dispatch(message).await,
        })
    }
}

pub struct CertificateRemindersUseCase<R>
where
    R: CertificateRepository,
{
    repo: Arc<R>,
    notifier: Notifier,
    config: Arc<TrackerConfig>,
}

impl<R> CertificateRemindersUseCase<R>
where
    R: CertificateRepository,
{
    pub fn new(repo: Arc<R>, notifier: Notifier, config: Arc<TrackerConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> TrackerResult<ReminderOutcome> {
        let certificates = self.repo.list_certificates().await?;
        let due = select_due_for_reminder(&certificates, self.config.certificate_lead, now);

        tracing::info!(due = due.len(), "Certificates due for an expiration reminder");

        cycle::enter("certificate-reminders", CyclePhase::Notifying);
        let message = render_certificate_reminders(
            &due,
            self.config.certificate_lead,
            &self.config.dashboard_base,
            now,
        );

        Ok(ReminderOutcome {
            due: due.len(),
            delivery: self.notifier.dispatch(message).await,
        })
    }
}
