//! Named background jobs.
//!
//! A [`Scheduler`] owns a set of named [`Job`]s. Periodic entries run on their
//! own cadence in their own task; every entry can also be fired on demand.
//! Each run produces a [`JobReport`] that is handed to every registered
//! [`JobObserver`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Counters returned by a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    /// Items handled without error
    pub processed: usize,
    /// Items skipped because of an error
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JobSummary {
    pub fn new(processed: usize, failed: usize) -> Self {
        Self {
            processed,
            failed,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A run that could not do its work at all.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct JobError(pub String);

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> Result<JobSummary, JobError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduled,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobOutcome {
    Succeeded(JobSummary),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job: String,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Succeeded(_))
    }
}

/// Sink for run reports.
pub trait JobObserver: Send + Sync {
    fn on_report(&self, report: &JobReport);
}

/// Writes every report to the log.
pub struct TracingObserver;

impl JobObserver for TracingObserver {
    fn on_report(&self, report: &JobReport) {
        let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
        match &report.outcome {
            JobOutcome::Succeeded(summary) => tracing::info!(
                job = %report.job,
                trigger = ?report.trigger,
                processed = summary.processed,
                failed = summary.failed,
                elapsed_ms,
                "Job finished"
            ),
            JobOutcome::Failed { error } => tracing::error!(
                job = %report.job,
                trigger = ?report.trigger,
                error = %error,
                elapsed_ms,
                "Job failed"
            ),
        }
    }
}

/// Keeps the latest report of each job in memory.
#[derive(Default)]
pub struct JobHistory {
    last: Mutex<BTreeMap<String, JobReport>>,
}

impl JobHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Vec<JobReport> {
        self.lock().values().cloned().collect()
    }

    pub fn get(&self, job: &str) -> Option<JobReport> {
        self.lock().get(job).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, JobReport>> {
        self.last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobObserver for JobHistory {
    fn on_report(&self, report: &JobReport) {
        self.lock().insert(report.job.clone(), report.clone());
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),
}

struct Entry {
    job: Arc<dyn Job>,
    cadence: Option<Duration>,
}

/// Owner of the named jobs.
#[derive(Default)]
pub struct Scheduler {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
    observers: Vec<Arc<dyn JobObserver>>,
    run_on_startup: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job that runs every `cadence`.
    pub fn every(self, cadence: Duration, job: Arc<dyn Job>) -> Self {
        self.register(Some(cadence), job)
    }

    /// Register a job that only runs when triggered.
    pub fn on_demand(self, job: Arc<dyn Job>) -> Self {
        self.register(None, job)
    }

    pub fn observer(mut self, observer: Arc<dyn JobObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// First periodic tick fires immediately instead of after one cadence.
    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    fn register(mut self, cadence: Option<Duration>, job: Arc<dyn Job>) -> Self {
        let name = job.name().to_string();
        if self.entries.insert(name.clone(), Entry { job, cadence }).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Run one job to completion on the current task.
    pub async fn run_now(&self, name: &str, trigger: Trigger) -> Result<JobReport, SchedulerError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| SchedulerError::UnknownJob(name.to_string()))?;
        Ok(self.execute(entry.job.as_ref(), trigger).await)
    }

    /// Fire a job in the background.
    ///
    /// The run is independent of any scheduled run of the same job.
    pub fn trigger(self: &Arc<Self>, name: &str) -> Result<JoinHandle<()>, SchedulerError> {
        let job = self
            .entries
            .get(name)
            .map(|entry| entry.job.clone())
            .ok_or_else(|| SchedulerError::UnknownJob(name.to_string()))?;

        tracing::info!(job = %name, "Manual run requested");

        let scheduler = Arc::clone(self);
        Ok(tokio::spawn(async move {
            scheduler.execute(job.as_ref(), Trigger::Manual).await;
        }))
    }

    /// Spawn one task per periodic job.
    ///
    /// Successive runs of the same periodic job never overlap: the next tick
    /// is only awaited once the current run has returned.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.order
            .iter()
            .filter_map(|name| {
                let entry = self.entries.get(name)?;
                let cadence = entry.cadence?;
                let job = entry.job.clone();
                let scheduler = Arc::clone(self);

                let first_tick = if self.run_on_startup {
                    Instant::now()
                } else {
                    Instant::now() + cadence
                };

                tracing::info!(
                    job = %name,
                    cadence_secs = cadence.as_secs(),
                    "Periodic job scheduled"
                );

                Some(tokio::spawn(async move {
                    let mut ticker = tokio::time::interval_at(first_tick, cadence);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        scheduler.execute(job.as_ref(), Trigger::Scheduled).await;
                    }
                }))
            })
            .collect()
    }

    async fn execute(&self, job: &dyn Job, trigger: Trigger) -> JobReport {
        let started_at = Utc::now();
        let outcome = match job.run().await {
            Ok(summary) => JobOutcome::Succeeded(summary),
            Err(e) => JobOutcome::Failed {
                error: e.to_string(),
            },
        };

        let report = JobReport {
            job: job.name().to_string(),
            trigger,
            started_at,
            finished_at: Utc::now(),
            outcome,
        };

        for observer in &self.observers {
            observer.on_report(&report);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    struct CountingJob {
        name: &'static str,
        runs: AtomicUsize,
    }

    impl CountingJob {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                runs: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self) -> Result<JobSummary, JobError> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(JobSummary::new(n, 0))
        }
    }

    struct FailingJob;

    #[async_trait]
    impl Job for FailingJob {
        fn name(&self) -> &str {
            "broken"
        }

        async fn run(&self) -> Result<JobSummary, JobError> {
            Err(JobError::new("could not list domains"))
        }
    }

    struct SignallingJob(mpsc::UnboundedSender<()>);

    #[async_trait]
    impl Job for SignallingJob {
        fn name(&self) -> &str {
            "signal"
        }

        async fn run(&self) -> Result<JobSummary, JobError> {
            let _ = self.0.send(());
            Ok(JobSummary::default())
        }
    }

    #[tokio::test]
    async fn test_run_now_reports_to_observers() {
        let history = Arc::new(JobHistory::new());
        let job = CountingJob::new("counter");
        let scheduler = Scheduler::new()
            .on_demand(job.clone())
            .observer(history.clone());

        let report = scheduler.run_now("counter", Trigger::Scheduled).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.trigger, Trigger::Scheduled);
        assert_eq!(report.outcome, JobOutcome::Succeeded(JobSummary::new(1, 0)));

        let stored = history.get("counter").unwrap();
        assert_eq!(stored.outcome, report.outcome);
        assert!(stored.finished_at >= stored.started_at);
    }

    #[tokio::test]
    async fn test_failed_run_is_reported_not_propagated() {
        let history = Arc::new(JobHistory::new());
        let scheduler = Scheduler::new()
            .on_demand(Arc::new(FailingJob))
            .observer(history.clone());

        let report = scheduler.run_now("broken", Trigger::Manual).await.unwrap();
        assert_eq!(
            report.outcome,
            JobOutcome::Failed {
                error: "could not list domains".to_string()
            }
        );
        assert!(!history.get("broken").unwrap().is_success());
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let scheduler = Arc::new(Scheduler::new());
        assert_eq!(
            scheduler.run_now("nope", Trigger::Manual).await.unwrap_err(),
            SchedulerError::UnknownJob("nope".to_string())
        );
        assert!(scheduler.trigger("nope").is_err());
    }

    #[tokio::test]
    async fn test_trigger_runs_in_background() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Scheduler::new().on_demand(Arc::new(SignallingJob(tx))));

        let handle = scheduler.trigger("signal").unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_job_ticks_on_cadence() {
        let job = CountingJob::new("tick");
        let scheduler = Arc::new(Scheduler::new().every(Duration::from_secs(60), job.clone()));

        let handles = scheduler.start();
        assert_eq!(handles.len(), 1);

        // Nothing fires before the first full cadence.
        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(126)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);

        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_on_demand_jobs_are_not_started() {
        let scheduler = Arc::new(
            Scheduler::new()
                .on_demand(CountingJob::new("manual"))
                .every(Duration::from_secs(3600), CountingJob::new("hourly")),
        );
        let handles = scheduler.start();
        assert_eq!(handles.len(), 1);
        assert_eq!(
            scheduler.job_names().collect::<Vec<_>>(),
            vec!["manual", "hourly"]
        );
        for handle in handles {
            handle.abort();
        }
    }
}
