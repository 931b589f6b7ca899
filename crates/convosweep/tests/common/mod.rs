use std::cell::RefCell;

use async_trait::async_trait;

use convosweep_classify::{ChunkClassifier, ClassifyError};
use convosweep_core::{
    Finding, FindingsStore, LogRecord, LogStore, UsageEvent, UsageLedger, Verdict,
};

pub fn sample_record(id: i64, phone: &str) -> LogRecord {
    LogRecord {
        id,
        phone_number: phone.to_string(),
        message_in: format!("remind me about thing {}", id),
        message_out: "Reminder set for tomorrow at 9am.".to_string(),
        intent: Some("set_reminder".to_string()),
        analyzed: false,
    }
}

pub fn sample_records(n: usize) -> Vec<LogRecord> {
    (1..=n as i64)
        .map(|id| sample_record(id, &format!("+1555000{:04}", id)))
        .collect()
}

#[derive(Default)]
pub struct MemoryLogStore {
    pub records: Vec<LogRecord>,
    pub marked: RefCell<Vec<Vec<i64>>>,
    pub fail_fetch: bool,
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
pub struct MemoryFindings {
    pub saved: RefCell<Vec<Finding>>,
}

impl FindingsStore for MemoryFindings {
    fn save(&self, finding: &Finding) -> anyhow::Result<()> {
        self.saved.borrow_mut().push(finding.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    pub events: RefCell<Vec<UsageEvent>>,
}

impl UsageLedger for MemoryLedger {
    fn record(&self, event: &UsageEvent) -> anyhow::Result<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// One scripted oracle answer for one chunk, consumed in call order
pub enum ChunkOutcome {
    /// Call succeeds with these verdicts and reports usage to the ledger
    Verdicts(Vec<Verdict>),
    /// Call fails wholesale (transport error, bad status, timeout)
    Fail(&'static str),
}

pub struct ScriptedClassifier {
    outcomes: RefCell<Vec<ChunkOutcome>>,
    pub calls: RefCell<usize>,
}

impl ScriptedClassifier {
    pub fn new(outcomes: Vec<ChunkOutcome>) -> Self {
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
        chunk: &[LogRecord],
        ledger: &dyn UsageLedger,
    ) -> Result<Vec<Verdict>, ClassifyError> {
        *self.calls.borrow_mut() += 1;
        let outcome = {
            let mut outcomes = self.outcomes.borrow_mut();
            if outcomes.is_empty() {
                ChunkOutcome::Verdicts(Vec::new())
            } else {
                outcomes.remove(0)
            }
        };

        match outcome {
            ChunkOutcome::Verdicts(verdicts) => {
                // A successful oracle call carries usage metadata, which the
                // real client reports before decoding verdicts.
                let prompt_tokens = 80 * chunk.len() as u32;
                ledger
                    .record(&UsageEvent {
                        actor: "system".to_string(),
                        purpose: "conversation_analysis".to_string(),
                        prompt_tokens,
                        completion_tokens: 25,
                        total_tokens: prompt_tokens + 25,
                        model: "gpt-4o-mini".to_string(),
                    })
                    .ok();
                Ok(verdicts)
            }
            ChunkOutcome::Fail(body) => Err(ClassifyError::Status {
                status: 500,
                body: body.to_string(),
            }),
        }
    }
}
