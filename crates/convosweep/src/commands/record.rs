use std::path::Path;

use convosweep_core::mask_phone;
use convosweep_store::AssistantDb;

pub fn run(
    db_path: &Path,
    phone: &str,
    message_in: &str,
    message_out: &str,
    intent: Option<&str>,
) -> anyhow::Result<()> {
    let db = AssistantDb::new(db_path)?;
    let id = db.log_interaction(phone, message_in, message_out, intent, true)?;
    println!("Logged interaction #{} for {}", id, mask_phone(phone));
    Ok(())
}
