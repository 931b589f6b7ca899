//! SQLite persistence for interaction logs, findings, and API usage

mod sqlite;

pub use sqlite::{AssistantDb, FindingCount, FindingRow, UsageTotals};
