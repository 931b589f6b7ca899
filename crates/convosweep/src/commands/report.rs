use std::path::Path;

use convosweep_core::mask_phone;
use convosweep_store::{AssistantDb, FindingCount, FindingRow, UsageTotals};

pub fn run(db_path: &Path) -> anyhow::Result<()> {
    let db = AssistantDb::new(db_path)?;
    let findings = db.findings_summary()?;
    let recent = db.recent_findings(10)?;
    let usage = db.usage_summary()?;
    println!("{}", build_report(&findings, &recent, &usage));
    Ok(())
}

fn build_report(findings: &[FindingCount], recent: &[FindingRow], usage: &[UsageTotals]) -> String {
    if findings.is_empty() && usage.is_empty() {
        return "No findings or API usage recorded yet.".to_string();
    }

    let mut sections = Vec::new();

    // Section 1: Findings by issue type and severity
    let total_findings: i64 = findings.iter().map(|f| f.count).sum();
    let mut lines = vec![format!(
        "Conversation Findings\n=====================\nTotal flagged: {}",
        total_findings
    )];
    for f in findings {
        lines.push(format!("  {} [{}]: {}", f.issue_type, f.severity, f.count));
    }
    sections.push(lines.join("\n"));

    // Section 2: Recent flagged conversations
    if !recent.is_empty() {
        let mut lines = vec!["\nRecent (last 10)\n----------------".to_string()];
        for f in recent {
            lines.push(format!(
                "  {} [{}/{}] log #{} {} — {}",
                f.created_at.format("%Y-%m-%d"),
                f.issue_type,
                f.severity,
                f.log_id,
                mask_phone(&f.phone_number),
                f.explanation
            ));
        }
        sections.push(lines.join("\n"));
    }

    // Section 3: API usage
    if !usage.is_empty() {
        let mut lines = vec!["\nAPI Usage\n---------".to_string()];
        for u in usage {
            lines.push(format!(
                "  {} ({}): {} calls, {} prompt + {} completion = {} tokens",
                u.purpose, u.model, u.calls, u.prompt_tokens, u.completion_tokens, u.total_tokens
            ));
        }
        sections.push(lines.join("\n"));
    }

    sections.join("\n")
}
