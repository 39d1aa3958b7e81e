use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs for the optimize pass. Validated by the caller; the engine treats
/// these as final values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum number of concurrent remote calls per iteration.
    pub batch_size: usize,
    /// How often the engine re-checks whether the current iteration settled.
    pub check_interval: Duration,
    /// Elapsed time after which still-outstanding items are quarantined.
    pub iteration_deadline: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: 25,
            check_interval: Duration::from_millis(500),
            iteration_deadline: Duration::from_secs(30),
        }
    }
}

/// Knobs for the relocate pass. The reconciler has no deadline: a failed
/// move settles its item instead of holding the batch open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerSettings {
    pub batch_size: usize,
    pub poll_interval: Duration,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_millis(100),
        }
    }
}
