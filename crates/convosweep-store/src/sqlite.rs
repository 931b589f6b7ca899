use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use convosweep_core::{Finding, FindingsStore, LogRecord, LogStore, UsageEvent, UsageLedger};

/// SQLite-backed assistant database: interaction logs, flagged findings,
/// and the API usage ledger.
pub struct AssistantDb {
    conn: Connection,
}

/// One row of the findings report: count per (issue type, severity)
#[derive(Debug, Clone)]
pub struct FindingCount {
    pub issue_type: String,
    pub severity: String,
    pub count: i64,
}

/// One persisted finding as read back for reporting
#[derive(Debug, Clone)]
pub struct FindingRow {
    pub log_id: i64,
    pub phone_number: String,
    pub issue_type: String,
    pub severity: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregated ledger totals per (purpose, model)
#[derive(Debug, Clone)]
pub struct UsageTotals {
    pub purpose: String,
    pub model: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub calls: i64,
}

impl AssistantDb {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone_number TEXT NOT NULL,
                message_in TEXT NOT NULL,
                message_out TEXT NOT NULL,
                intent TEXT,
                success INTEGER,
                analyzed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_logs_analyzed ON logs(analyzed);
            CREATE TABLE IF NOT EXISTS conversation_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                log_id INTEGER NOT NULL,
                phone_number TEXT NOT NULL,
                issue_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                explanation TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS api_usage (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                actor TEXT NOT NULL,
                purpose TEXT NOT NULL,
                prompt_tokens INTEGER NOT NULL,
                completion_tokens INTEGER NOT NULL,
                total_tokens INTEGER NOT NULL,
                model TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }

    /// Append one interaction record; the messaging layer calls this on
    /// every inbound/outbound exchange.
    pub fn log_interaction(
        &self,
        phone_number: &str,
        message_in: &str,
        message_out: &str,
        intent: Option<&str>,
        success: bool,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO logs (phone_number, message_in, message_out, intent, success)
             VALUES (?, ?, ?, ?, ?)",
            params![phone_number, message_in, message_out, intent, success],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Findings grouped by issue type and severity, most frequent first
    pub fn findings_summary(&self) -> Result<Vec<FindingCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_type, severity, COUNT(*) AS n
             FROM conversation_analysis
             GROUP BY issue_type, severity
             ORDER BY n DESC, issue_type",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FindingCount {
                issue_type: row.get(0)?,
                severity: row.get(1)?,
                count: row.get(2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Most recently flagged conversations, newest first
    pub fn recent_findings(&self, limit: usize) -> Result<Vec<FindingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, phone_number, issue_type, severity, explanation, created_at
             FROM conversation_analysis
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let created_at: String = row.get(5)?;
            Ok(FindingRow {
                log_id: row.get(0)?,
                phone_number: row.get(1)?,
                issue_type: row.get(2)?,
                severity: row.get(3)?,
                explanation: row.get(4)?,
                created_at: created_at.parse().map_err(|e: chrono::ParseError| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Token totals per purpose and model
    pub fn usage_summary(&self) -> Result<Vec<UsageTotals>> {
        let mut stmt = self.conn.prepare(
            "SELECT purpose, model,
                    SUM(prompt_tokens), SUM(completion_tokens), SUM(total_tokens),
                    COUNT(*)
             FROM api_usage
             GROUP BY purpose, model
             ORDER BY purpose, model",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(UsageTotals {
                purpose: row.get(0)?,
                model: row.get(1)?,
                prompt_tokens: row.get(2)?,
                completion_tokens: row.get(3)?,
                total_tokens: row.get(4)?,
                calls: row.get(5)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

impl LogStore for AssistantDb {
    fn fetch_unanalyzed(&self, limit: usize) -> Result<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phone_number, message_in, message_out, intent, analyzed
             FROM logs WHERE analyzed = 0 ORDER BY id LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(LogRecord {
                id: row.get(0)?,
                phone_number: row.get(1)?,
                message_in: row.get(2)?,
                message_out: row.get(3)?,
                intent: row.get(4)?,
                analyzed: row.get(5)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn mark_analyzed(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut stmt = self
            .conn
            .prepare("UPDATE logs SET analyzed = 1 WHERE id = ?1")?;
        for id in ids {
            stmt.execute(params![id])?;
        }
        Ok(())
    }
}

impl FindingsStore for AssistantDb {
    fn save(&self, finding: &Finding) -> Result<()> {
        self.conn.execute(
            "INSERT INTO conversation_analysis (log_id, phone_number, issue_type, severity, explanation, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                finding.log_id,
                finding.phone_number,
                finding.issue_type.as_str(),
                finding.severity.as_str(),
                finding.explanation,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl UsageLedger for AssistantDb {
    fn record(&self, event: &UsageEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO api_usage (actor, purpose, prompt_tokens, completion_tokens, total_tokens, model)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                event.actor,
                event.purpose,
                event.prompt_tokens,
                event.completion_tokens,
                event.total_tokens,
                event.model,
            ],
        )?;
        Ok(())
    }
}
