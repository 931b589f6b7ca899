//! Store contracts consumed by the pipeline
//!
//! The orchestrator receives these as explicit values at construction, so
//! tests can substitute in-memory fakes for the database-backed stores.

use crate::types::{Finding, LogRecord, UsageEvent};

/// Append-only interaction log with an analyzed flag
pub trait LogStore {
    /// Fetch up to `limit` records not yet analyzed, in insertion order
    fn fetch_unanalyzed(&self, limit: usize) -> anyhow::Result<Vec<LogRecord>>;

    /// Flip the analyzed flag for the given ids.
    ///
    /// Idempotent: marking an already-analyzed id is a no-op.
    fn mark_analyzed(&self, ids: &[i64]) -> anyhow::Result<()>;
}

/// Persistence for flagged conversation issues
pub trait FindingsStore {
    fn save(&self, finding: &Finding) -> anyhow::Result<()>;
}

/// Best-effort token accounting per oracle call
pub trait UsageLedger {
    fn record(&self, event: &UsageEvent) -> anyhow::Result<()>;
}
