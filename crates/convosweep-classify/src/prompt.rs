//! Prompt construction for the classification oracle

use convosweep_core::LogRecord;

/// Sentinel rendered when the messaging layer detected no intent
pub const UNKNOWN_INTENT: &str = "unknown";

/// Fixed policy instruction: issue taxonomy, severity scale, answer shape
pub const SYSTEM_PROMPT: &str = r#"You are a conversation quality analyzer for an SMS personal assistant.
Analyze the provided conversations and identify any issues that need attention.

ISSUE TYPES TO FLAG:
1. "misunderstood_intent" - System misunderstood what the user was trying to do
2. "poor_response" - Response was unhelpful, confusing, or inappropriate
3. "frustrated_user" - User seems frustrated (repeated attempts, short messages after long ones)
4. "failed_action" - User tried to do something but it didn't work
5. "confused_user" - User seems confused about how to use the service
6. "sensitive_data" - Conversation contains concerning content
7. "error_response" - System responded with an error or fallback message

SEVERITY LEVELS:
- "high" - Urgent: user had a bad experience, system error, or security concern
- "medium" - Notable: user may have had trouble but likely recoverable
- "low" - Minor: potential improvement opportunity

For EACH conversation, determine if there's an issue. If yes, return it in the flagged array.
If a conversation looks fine (user got what they needed), don't include it.

Return JSON in this format:
{
    "flagged": [
        {
            "conversation_id": 123,
            "issue_type": "misunderstood_intent",
            "severity": "medium",
            "explanation": "User asked to set a reminder but system stored it as a memory instead"
        }
    ]
}

If no issues found, return: {"flagged": []}

Be conservative - only flag genuine issues, not minor imperfections.
Focus on cases where the user likely didn't get what they wanted."#;

/// Render a chunk as numbered transcript entries for the oracle
pub fn render_transcript(records: &[LogRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "\n--- Conversation {} (ID: {}) ---\nUser: {}\nSystem: {}\nIntent: {}\n",
            i + 1,
            record.id,
            record.message_in,
            record.message_out,
            record.intent.as_deref().unwrap_or(UNKNOWN_INTENT),
        ));
    }
    out
}
