//! Refresh cycle bookkeeping shared by the batch use cases.

use std::fmt;

/// Where a refresh cycle currently is. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Persisting,
    Notifying,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Fetching => "fetching",
            CyclePhase::Persisting => "persisting",
            CyclePhase::Notifying => "notifying",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn enter(cycle: &'static str, phase: CyclePhase) {
    tracing::debug!(cycle, phase = %phase, "Refresh cycle phase");
}

/// Per-asset counters of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Rows read from storage
    pub examined: usize,
    pub refreshed: usize,
    /// Fetch, timeout or write failures
    pub failed: usize,
    /// Rows outside the refresh scope
    pub skipped: usize,
    /// Rows deleted while the batch ran; fetched data was dropped
    pub vanished: usize,
}
