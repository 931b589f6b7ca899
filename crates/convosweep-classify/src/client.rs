//! HTTP client for the classification oracle

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use convosweep_core::{LogRecord, UsageEvent, UsageLedger, Verdict};

use crate::prompt::{render_transcript, SYSTEM_PROMPT};

/// Default chat-completions endpoint
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Ledger tags for pipeline-originated oracle calls
const USAGE_ACTOR: &str = "system";
const USAGE_PURPOSE: &str = "conversation_analysis";

/// Connection settings for the oracle
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl OracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }

    /// Read connection settings from the environment.
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_MODEL`, `OPENAI_BASE_URL`, and
    /// `OPENAI_TIMEOUT` (seconds) override the defaults when set.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let mut config = Self::new(api_key);

        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(secs) = std::env::var("OPENAI_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                config.timeout = Duration::from_secs(secs);
            }
        }
        Ok(config)
    }
}

/// Failures that lose a whole classification call.
///
/// Timeouts surface through `Request`. A response body that is not a valid
/// verdict sheet is NOT an error; it degrades to zero verdicts inside the
/// client.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("oracle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// One chunk's classification boundary.
///
/// The orchestrator talks to this trait so tests can script per-chunk
/// outcomes without a network.
#[async_trait(?Send)]
pub trait ChunkClassifier {
    /// Classify one chunk, reporting token usage to the ledger when the
    /// oracle returns usage metadata.
    async fn classify_chunk(
        &self,
        chunk: &[LogRecord],
        ledger: &dyn UsageLedger,
    ) -> Result<Vec<Verdict>, ClassifyError>;
}

/// Oracle client speaking the OpenAI-style chat-completions protocol
pub struct OracleClient {
    config: OracleConfig,
    client: reqwest::Client,
}

impl OracleClient {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl ChunkClassifier for OracleClient {
    async fn classify_chunk(
        &self,
        chunk: &[LogRecord],
        ledger: &dyn UsageLedger,
    ) -> Result<Vec<Verdict>, ClassifyError> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": render_transcript(chunk)}
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body_text = response.text().await?;
        if status != 200 {
            return Err(ClassifyError::Status {
                status,
                body: body_text.chars().take(200).collect(),
            });
        }

        let decoded: OracleResponse = match serde_json::from_str(&body_text) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(%err, "oracle response was not a chat completion; treating as no findings");
                return Ok(Vec::new());
            }
        };

        if let Some(usage) = &decoded.usage {
            let event = UsageEvent {
                actor: USAGE_ACTOR.to_string(),
                purpose: USAGE_PURPOSE.to_string(),
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
                model: self.config.model.clone(),
            };
            if let Err(err) = ledger.record(&event) {
                warn!(%err, "usage ledger write failed");
            }
        }

        let content = decoded
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("");
        Ok(decode_flagged(content))
    }
}

/// Decode the oracle's `{"flagged": [...]}` answer, degrading to an empty
/// verdict list on any shape mismatch.
pub fn decode_flagged(content: &str) -> Vec<Verdict> {
    match serde_json::from_str::<VerdictSheet>(content) {
        Ok(sheet) => sheet.flagged,
        Err(err) => {
            warn!(%err, "could not parse oracle verdicts; treating as no findings");
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerdictSheet {
    #[serde(default)]
    flagged: Vec<Verdict>,
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    #[serde(default)]
    choices: Vec<OracleChoice>,
    usage: Option<OracleUsage>,
}

#[derive(Debug, Deserialize)]
struct OracleChoice {
    message: OracleMessage,
}

#[derive(Debug, Deserialize)]
struct OracleMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OracleUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
