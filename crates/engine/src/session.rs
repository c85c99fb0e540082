//! Per-pass state: identifier caches and outcome tallies.
//!
//! A [`SyncSession`] is created fresh for every pass and dropped with it.
//! The caches are a performance optimization only — they must never outlive
//! the pass or be shared with another one, which is why they live in an
//! owned value threaded through the pass instead of anywhere global.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use woosync_core::{CountryId, CurrencyId, PartnerId, ProductId, StateId};

/// Lifecycle of one sync pass: `Running → (Done | Error)`.
///
/// Recorded as a structured field on the orchestrator's pass log lines so
/// the transition is observable per `pass_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Running,
    Done,
    Error,
}

impl std::fmt::Display for PassState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of reconciling one remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A local record was created or updated.
    Success,
    /// The record was already imported; nothing was written.
    Skipped,
    /// The record failed in isolation; the pass continued.
    Failed,
}

/// Aggregate counts for one pass.
///
/// Invariant: `success + skipped + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PassReport {
    /// Tally one item outcome.
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Success => self.success += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }
}

impl std::fmt::Display for PassReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={} success={} skipped={} failed={}",
            self.total, self.success, self.skipped, self.failed
        )
    }
}

/// State private to one running pass.
///
/// Holds the natural-key → local-id caches the resolver consults before
/// hitting the store. Misses are not cached; reference data that failed to
/// resolve once is simply looked up again.
#[derive(Debug)]
pub struct SyncSession {
    /// Pass identifier, for correlating log lines.
    pub pass_id: Uuid,
    pub(crate) partners_by_email: HashMap<String, PartnerId>,
    pub(crate) products_by_key: HashMap<String, ProductId>,
    pub(crate) countries_by_code: HashMap<String, CountryId>,
    pub(crate) states_by_key: HashMap<(CountryId, String), StateId>,
    pub(crate) currencies_by_code: HashMap<String, CurrencyId>,
}

impl SyncSession {
    /// Start a fresh session with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            partners_by_email: HashMap::new(),
            products_by_key: HashMap::new(),
            countries_by_code: HashMap::new(),
            states_by_key: HashMap::new(),
            currencies_by_code: HashMap::new(),
        }
    }
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_state_display() {
        assert_eq!(PassState::Running.to_string(), "running");
        assert_eq!(PassState::Done.to_string(), "done");
        assert_eq!(PassState::Error.to_string(), "error");
    }

    #[test]
    fn test_report_tally_invariant() {
        let mut report = PassReport::default();
        report.record(ItemOutcome::Success);
        report.record(ItemOutcome::Success);
        report.record(ItemOutcome::Skipped);
        report.record(ItemOutcome::Failed);
        assert_eq!(report.total, 4);
        assert_eq!(report.success + report.skipped + report.failed, report.total);
    }

    #[test]
    fn test_report_display() {
        let mut report = PassReport::default();
        report.record(ItemOutcome::Skipped);
        assert_eq!(report.to_string(), "total=1 success=0 skipped=1 failed=0");
    }

    #[test]
    fn test_sessions_do_not_share_caches() {
        let mut a = SyncSession::new();
        a.partners_by_email
            .insert("a@x.com".to_string(), PartnerId::new(1));
        let b = SyncSession::new();
        assert!(b.partners_by_email.is_empty());
        assert_ne!(a.pass_id, b.pass_id);
    }
}
