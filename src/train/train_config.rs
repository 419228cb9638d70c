use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::error::TrainError;
use crate::optim::OptimizerKind;
use crate::train::step_stats::StepStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`              — number of training iterations; each draws a fresh batch
/// - `binary_dim`          — bit width of operands and sum (timesteps per sequence)
/// - `state_size`          — width of the recurrent hidden state
/// - `batch_size`          — addition problems per iteration
/// - `learning_rate`       — global step scale of the optimizer
/// - `initial_accumulator` — Adagrad's starting squared-gradient sum
/// - `optimizer`           — `adagrad` (default) or `sgd`
/// - `report_every`        — print a progress line (and redraw the plot) every N iterations
/// - `seed`                — fixes weight init and sampling; falls back to `SEED` or entropy
/// - `plot_path`           — where to write the PNG chart; no chart when `None`
/// - `progress_tx`         — optional channel; one `StepStats` is sent per
///                           iteration.  If the receiver is dropped the loop
///                           terminates early.
/// - `stop_flag`           — optional atomic flag; when set to `true` from another
///                           thread the loop terminates after the current iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub binary_dim: usize,
    pub state_size: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub initial_accumulator: f64,
    pub optimizer: OptimizerKind,
    pub report_every: usize,
    pub seed: Option<u64>,
    pub plot_path: Option<String>,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<StepStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

/// Widest supported encoding; keeps `2^binary_dim` well inside `u64`.
pub const MAX_BINARY_DIM: usize = 32;

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 250,
            binary_dim: 8,
            state_size: 16,
            batch_size: 32,
            learning_rate: 0.3,
            initial_accumulator: 0.1,
            optimizer: OptimizerKind::Adagrad,
            report_every: 20,
            seed: None,
            plot_path: None,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl TrainConfig {
    /// Default hyperparameters with the given seed and no channel, stop flag or plot.
    pub fn seeded(seed: u64) -> Self {
        TrainConfig { seed: Some(seed), ..TrainConfig::default() }
    }

    /// Rejects settings the model or the bit encoding cannot work with.
    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |msg: String| Err(TrainError::InvalidConfig(msg));

        if !(1..=MAX_BINARY_DIM).contains(&self.binary_dim) {
            return invalid(format!("binary_dim must be in 1..={}, got {}", MAX_BINARY_DIM, self.binary_dim));
        }
        if self.state_size == 0 {
            return invalid("state_size must be at least 1".into());
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".into());
        }
        if self.report_every == 0 {
            return invalid("report_every must be at least 1".into());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if self.optimizer == OptimizerKind::Adagrad
            && !(self.initial_accumulator.is_finite() && self.initial_accumulator > 0.0)
        {
            return invalid(format!(
                "initial_accumulator must be positive for adagrad, got {}",
                self.initial_accumulator
            ));
        }
        Ok(())
    }

    /// Reads a JSON config; missing fields take their defaults.
    pub fn load_json(path: &str) -> Result<TrainConfig, TrainError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: TrainConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the hyperparameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<(), TrainError> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
