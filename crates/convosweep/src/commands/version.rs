pub fn run() -> anyhow::Result<()> {
    println!("convosweep {}", env!("CARGO_PKG_VERSION"));
    println!("Conversation quality analysis for an SMS assistant");
    Ok(())
}
