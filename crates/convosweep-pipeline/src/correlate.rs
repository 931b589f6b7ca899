//! Joining oracle verdicts back to their source records

use std::collections::HashMap;

use tracing::warn;

use convosweep_core::{Finding, LogRecord, Verdict};

/// Attach phone numbers to verdicts by joining on the record id.
///
/// A verdict referencing an id outside its own chunk cannot be attributed
/// safely and is dropped with a data-quality warning.
pub fn correlate(verdicts: Vec<Verdict>, chunk: &[LogRecord]) -> Vec<Finding> {
    let by_id: HashMap<i64, &LogRecord> = chunk.iter().map(|r| (r.id, r)).collect();

    let mut findings = Vec::with_capacity(verdicts.len());
    for verdict in verdicts {
        match by_id.get(&verdict.conversation_id) {
            Some(record) => findings.push(Finding {
                log_id: verdict.conversation_id,
                phone_number: record.phone_number.clone(),
                issue_type: verdict.issue_type,
                severity: verdict.severity,
                explanation: verdict.explanation,
            }),
            None => warn!(
                conversation_id = verdict.conversation_id,
                "verdict references a record outside its chunk; dropping"
            ),
        }
    }
    findings
}
