use serde::{Serialize, Deserialize};

use crate::report::decode::Snapshot;

/// Per-iteration training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `StepStats` value after every iteration.  Receivers (e.g.
/// the monitor's SSE handler) use this to drive live charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepStats {
    /// 1-based iteration number.
    pub step: usize,
    /// Total iterations requested for this run.
    pub total_steps: usize,
    /// Mean cross-entropy over the batch and all timesteps.
    pub loss: f64,
    /// Wall-clock duration of this iteration in milliseconds.
    pub elapsed_ms: u64,
    /// Decoded predictions; only present on reporting iterations.
    pub snapshot: Option<Snapshot>,
}
