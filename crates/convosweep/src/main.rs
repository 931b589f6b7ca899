mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(&cli.db),
        Commands::Record {
            phone,
            message_in,
            message_out,
            intent,
        } => commands::record::run(&cli.db, &phone, &message_in, &message_out, intent.as_deref()),
        Commands::Sweep { limit } => commands::sweep::run(&cli.db, limit),
        Commands::Report => commands::report::run(&cli.db),
        Commands::Version => commands::version::run(),
    }
}
