//! Sweep configuration

/// Tuning knobs for one sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Max unanalyzed records retrieved per sweep
    pub batch_limit: usize,

    /// Max records sent to the oracle per classification call
    pub chunk_size: usize,
}

impl SweepConfig {
    pub fn new() -> Self {
        Self {
            batch_limit: 50,
            chunk_size: 10,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}
