//! Expired session sweep, run at startup and on a schedule.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use platform::scheduler::{Job, JobError, JobSummary};

use crate::domain::repository::SessionRepository;

pub const SESSION_CLEANUP_JOB: &str = "session-cleanup";

pub struct SessionCleanupJob<S> {
    session_repo: Arc<S>,
}

impl<S> SessionCleanupJob<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }
}

#[async_trait]
impl<S> Job for SessionCleanupJob<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        SESSION_CLEANUP_JOB
    }

    async fn run(&self) -> Result<JobSummary, JobError> {
        let deleted = self
            .session_repo
            .delete_expired(Utc::now())
            .await
            .map_err(|e| JobError::new(e.to_string()))?;

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(JobSummary::new(deleted as usize, 0))
    }
}
