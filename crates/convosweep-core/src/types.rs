//! Core types for the analysis pipeline

use serde::{Deserialize, Serialize};

/// One inbound/outbound exchange captured by the messaging layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    pub phone_number: String,
    pub message_in: String,
    pub message_out: String,
    pub intent: Option<String>,
    #[serde(default)]
    pub analyzed: bool,
}

/// Issue taxonomy the classification oracle may flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// System misunderstood what the user was trying to do
    MisunderstoodIntent,
    /// Response was unhelpful, confusing, or inappropriate
    PoorResponse,
    /// User seems frustrated (repeated attempts, short messages after long ones)
    FrustratedUser,
    /// User tried to do something but it didn't work
    FailedAction,
    /// User seems confused about how to use the service
    ConfusedUser,
    /// Conversation contains concerning content
    SensitiveData,
    /// System responded with an error or fallback message
    ErrorResponse,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::MisunderstoodIntent => "misunderstood_intent",
            IssueType::PoorResponse => "poor_response",
            IssueType::FrustratedUser => "frustrated_user",
            IssueType::FailedAction => "failed_action",
            IssueType::ConfusedUser => "confused_user",
            IssueType::SensitiveData => "sensitive_data",
            IssueType::ErrorResponse => "error_response",
        }
    }
}

/// How urgently a flagged issue needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// One issue flagged by the oracle for a specific conversation.
///
/// Conversations with no issue are simply absent from the oracle's answer;
/// there is no explicit "no issue" verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub conversation_id: i64,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub explanation: String,
}

/// A verdict persisted with its resolved phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub log_id: i64,
    pub phone_number: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub explanation: String,
}

/// Result of one sweep invocation; never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSummary {
    pub analyzed: usize,
    pub flagged: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Token counts from one oracle call, as written to the usage ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub actor: String,
    pub purpose: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub model: String,
}
