use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convosweep")]
#[command(version)]
#[command(about = "Conversation quality analysis for an SMS assistant")]
pub struct Cli {
    /// Path to the assistant database
    #[arg(long, global = true, default_value = "assistant.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema
    Init,

    /// Append one interaction record (what the messaging layer does per exchange)
    Record {
        /// End-user phone number
        #[arg(long)]
        phone: String,

        /// Inbound message text
        #[arg(long = "in")]
        message_in: String,

        /// Outbound message text
        #[arg(long = "out")]
        message_out: String,

        /// Detected intent label
        #[arg(long)]
        intent: Option<String>,
    },

    /// Run one analysis sweep over unanalyzed conversations
    Sweep {
        /// Max records to retrieve this sweep
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Summarize persisted findings and API usage
    Report,

    /// Print version information
    Version,
}
