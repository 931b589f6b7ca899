use std::path::Path;

use convosweep_classify::{OracleClient, OracleConfig};
use convosweep_core::SweepConfig;
use convosweep_pipeline::Sweeper;
use convosweep_store::AssistantDb;

pub fn run(db_path: &Path, limit: Option<usize>) -> anyhow::Result<()> {
    let db = AssistantDb::new(db_path)?;
    let client = OracleClient::new(OracleConfig::from_env()?);

    let mut config = SweepConfig::new();
    if let Some(limit) = limit {
        config.batch_limit = limit;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let sweeper = Sweeper::new(&db, &db, &db, &client, config);
    let summary = runtime.block_on(sweeper.run_sweep());

    match &summary.error {
        Some(error) => println!("Sweep failed: {}", error),
        None => println!(
            "Analyzed {} conversations, flagged {}",
            summary.analyzed, summary.flagged
        ),
    }
    Ok(())
}
