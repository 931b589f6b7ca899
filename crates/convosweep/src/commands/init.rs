use std::path::Path;

use convosweep_store::AssistantDb;

pub fn run(db_path: &Path) -> anyhow::Result<()> {
    AssistantDb::new(db_path)?;
    println!("✓ Initialized assistant database at {}", db_path.display());
    Ok(())
}
