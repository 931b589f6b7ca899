//! The sweep orchestrator

use tracing::{error, info, warn};

use convosweep_classify::ChunkClassifier;
use convosweep_core::{
    chunk_count, chunks, mask_phone, FindingsStore, LogStore, SweepConfig, SweepSummary,
    UsageLedger,
};

use crate::correlate::correlate;

/// Drives one sweep over unanalyzed interaction logs.
///
/// Collaborators are injected at construction; the sweep itself runs on a
/// single logical thread of control, classifying chunks strictly in order.
pub struct Sweeper<'a> {
    log_store: &'a dyn LogStore,
    findings_store: &'a dyn FindingsStore,
    usage_ledger: &'a dyn UsageLedger,
    classifier: &'a dyn ChunkClassifier,
    config: SweepConfig,
}

impl<'a> Sweeper<'a> {
    pub fn new(
        log_store: &'a dyn LogStore,
        findings_store: &'a dyn FindingsStore,
        usage_ledger: &'a dyn UsageLedger,
        classifier: &'a dyn ChunkClassifier,
        config: SweepConfig,
    ) -> Self {
        Self {
            log_store,
            findings_store,
            usage_ledger,
            classifier,
            config,
        }
    }

    /// Run one sweep: retrieve, classify chunk by chunk, persist findings,
    /// then mark the whole retrieved batch analyzed.
    pub async fn run_sweep(&self) -> SweepSummary {
        // Retrieval is the only fail-closed step: if the store is
        // unreachable nothing gets marked analyzed and the sweep is safe to
        // retry wholesale.
        let records = match self.log_store.fetch_unanalyzed(self.config.batch_limit) {
            Ok(records) => records,
            Err(err) => {
                error!(%err, "failed to fetch unanalyzed logs");
                return SweepSummary {
                    analyzed: 0,
                    flagged: 0,
                    error: Some(err.to_string()),
                };
            }
        };

        if records.is_empty() {
            info!("no unanalyzed conversations found");
            return SweepSummary::default();
        }

        let total_chunks = chunk_count(records.len(), self.config.chunk_size);
        info!(
            records = records.len(),
            chunks = total_chunks,
            "starting conversation analysis"
        );

        let mut flagged = 0;
        for (index, chunk) in chunks(&records, self.config.chunk_size).enumerate() {
            // One bad chunk must not abort the sweep; it just contributes
            // no findings.
            let verdicts = match self.classifier.classify_chunk(chunk, self.usage_ledger).await {
                Ok(verdicts) => verdicts,
                Err(err) => {
                    warn!(
                        chunk = index + 1,
                        total = total_chunks,
                        %err,
                        "chunk classification failed"
                    );
                    continue;
                }
            };

            for finding in correlate(verdicts, chunk) {
                match self.findings_store.save(&finding) {
                    Ok(()) => flagged += 1,
                    Err(err) => warn!(
                        log_id = finding.log_id,
                        phone = %mask_phone(&finding.phone_number),
                        %err,
                        "failed to persist finding"
                    ),
                }
            }
        }

        // Every retrieved record is marked, including those from failed
        // chunks: retrieval already consumed them from the unanalyzed set
        // and failed chunks are not re-queued.
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        if let Err(err) = self.log_store.mark_analyzed(&ids) {
            error!(%err, "failed to mark logs analyzed");
            return SweepSummary {
                analyzed: 0,
                flagged,
                error: Some(err.to_string()),
            };
        }

        info!(analyzed = ids.len(), flagged, "analysis complete");
        SweepSummary {
            analyzed: ids.len(),
            flagged,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use convosweep_classify::ClassifyError;
    use convosweep_core::{Finding, IssueType, LogRecord, Severity, UsageEvent, Verdict};
    use std::cell::RefCell;

    fn sample_records(n: usize) -> Vec<LogRecord> {
        (1..=n as i64)
            .map(|id| LogRecord {
                id,
                phone_number: format!("+1555000{:04}", id),
                message_in: format!("message {}", id),
                message_out: "ok".to_string(),
                intent: None,
                analyzed: false,
            })
            .collect()
    }

    fn verdict(conversation_id: i64) -> Verdict {
        Verdict {
            conversation_id,
            issue_type: IssueType::PoorResponse,
            severity: Severity::Low,
            explanation: "response did not address the question".to_string(),
        }
    }

    #[derive(Default)]
    struct MemoryLogStore {
        records: Vec<LogRecord>,
        marked: RefCell<Vec<Vec<i64>>>,
        fail_fetch: bool,
    }

    impl LogStore for MemoryLogStore {
        fn fetch_unanalyzed(&self, limit: usize) -> anyhow::Result<Vec<LogRecord>> {
            if self.fail_fetch {
                anyhow::bail!("log store unreachable");
            }
            Ok(self.records.iter().take(limit).cloned().collect())
        }

        fn mark_analyzed(&self, ids: &[i64]) -> anyhow::Result<()> {
            self.marked.borrow_mut().push(ids.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryFindings {
        saved: RefCell<Vec<Finding>>,
        fail_saves: bool,
    }

    impl FindingsStore for MemoryFindings {
        fn save(&self, finding: &Finding) -> anyhow::Result<()> {
            if self.fail_saves {
                anyhow::bail!("findings store write failed");
            }
            self.saved.borrow_mut().push(finding.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryLedger {
        events: RefCell<Vec<UsageEvent>>,
    }

    impl UsageLedger for MemoryLedger {
        fn record(&self, event: &UsageEvent) -> anyhow::Result<()> {
            self.events.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    /// Scripted per-chunk outcomes, consumed in call order
    struct ScriptedClassifier {
        outcomes: RefCell<Vec<Result<Vec<Verdict>, String>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedClassifier {
        fn new(outcomes: Vec<Result<Vec<Verdict>, String>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes),
                calls: RefCell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl ChunkClassifier for ScriptedClassifier {
        async fn classify_chunk(
            &self,
            _chunk: &[LogRecord],
            _ledger: &dyn UsageLedger,
        ) -> Result<Vec<Verdict>, ClassifyError> {
            *self.calls.borrow_mut() += 1;
            let mut outcomes = self.outcomes.borrow_mut();
            if outcomes.is_empty() {
                return Ok(Vec::new());
            }
            match outcomes.remove(0) {
                Ok(verdicts) => Ok(verdicts),
                Err(body) => Err(ClassifyError::Status { status: 500, body }),
            }
        }
    }

    fn config(chunk_size: usize) -> SweepConfig {
        SweepConfig {
            batch_limit: 50,
            chunk_size,
        }
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_fail_closed() {
        let logs = MemoryLogStore {
            fail_fetch: true,
            ..Default::default()
        };
        let findings = MemoryFindings::default();
        let ledger = MemoryLedger::default();
        let classifier = ScriptedClassifier::new(vec![]);

        let sweeper = Sweeper::new(&logs, &findings, &ledger, &classifier, config(10));
        let summary = sweeper.run_sweep().await;

        assert_eq!(summary.analyzed, 0);
        assert_eq!(summary.flagged, 0);
        assert!(summary.error.is_some());
        assert!(logs.marked.borrow().is_empty());
        assert_eq!(*classifier.calls.borrow(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_completes_without_classification() {
        let logs = MemoryLogStore::default();
        let findings = MemoryFindings::default();
        let ledger = MemoryLedger::default();
        let classifier = ScriptedClassifier::new(vec![]);

        let sweeper = Sweeper::new(&logs, &findings, &ledger, &classifier, config(10));
        let summary = sweeper.run_sweep().await;

        assert_eq!(summary.analyzed, 0);
        assert_eq!(summary.flagged, 0);
        assert!(summary.error.is_none());
        assert_eq!(*classifier.calls.borrow(), 0);
        assert!(logs.marked.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_findings_persist_and_batch_marked_once() {
        let logs = MemoryLogStore {
            records: sample_records(3),
            ..Default::default()
        };
        let findings = MemoryFindings::default();
        let ledger = MemoryLedger::default();
        let classifier =
            ScriptedClassifier::new(vec![Ok(vec![verdict(2)]), Ok(Vec::new())]);

        let sweeper = Sweeper::new(&logs, &findings, &ledger, &classifier, config(2));
        let summary = sweeper.run_sweep().await;

        assert_eq!(summary.analyzed, 3);
        assert_eq!(summary.flagged, 1);
        assert_eq!(*classifier.calls.borrow(), 2);

        let saved = findings.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].log_id, 2);
        assert_eq!(saved[0].phone_number, "+15550000002");

        let marked = logs.marked.borrow();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0], vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_block_marking() {
        let logs = MemoryLogStore {
            records: sample_records(2),
            ..Default::default()
        };
        let findings = MemoryFindings {
            fail_saves: true,
            ..Default::default()
        };
        let ledger = MemoryLedger::default();
        let classifier = ScriptedClassifier::new(vec![Ok(vec![verdict(1)])]);

        let sweeper = Sweeper::new(&logs, &findings, &ledger, &classifier, config(10));
        let summary = sweeper.run_sweep().await;

        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.flagged, 0);
        assert!(summary.error.is_none());
        assert_eq!(logs.marked.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_failure_reported_in_summary() {
        struct FailMarkStore {
            records: Vec<LogRecord>,
        }

        impl LogStore for FailMarkStore {
            fn fetch_unanalyzed(&self, limit: usize) -> anyhow::Result<Vec<LogRecord>> {
                Ok(self.records.iter().take(limit).cloned().collect())
            }

            fn mark_analyzed(&self, _ids: &[i64]) -> anyhow::Result<()> {
                anyhow::bail!("update failed")
            }
        }

        let logs = FailMarkStore {
            records: sample_records(1),
        };
        let findings = MemoryFindings::default();
        let ledger = MemoryLedger::default();
        let classifier = ScriptedClassifier::new(vec![Ok(Vec::new())]);

        let sweeper = Sweeper::new(&logs, &findings, &ledger, &classifier, config(10));
        let summary = sweeper.run_sweep().await;

        assert_eq!(summary.analyzed, 0);
        assert!(summary.error.is_some());
    }
}
