use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::Rng;

use crate::data::generator::SampleGenerator;
use crate::error::TrainError;
use crate::network::network::AdderRnn;
use crate::optim::Optimizer;
use crate::report::decode::{ProgressLine, Snapshot, SNAPSHOT_ROWS};
use crate::report::plot::render_training_plot;
use crate::rng::{resolve_seed, seeded};
use crate::train::step_stats::StepStats;
use crate::train::train_config::TrainConfig;

/// What a finished (or interrupted) run leaves behind.
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Loss of every completed iteration, in order.
    pub loss_history: Vec<f64>,
    /// True when the stop flag or a dropped receiver ended the run.
    pub stopped_early: bool,
    /// Snapshot from the most recent reporting iteration.
    pub last_snapshot: Option<Snapshot>,
    /// Seed the run was started with, when it went through `run`.
    pub seed: Option<u64>,
}

impl TrainReport {
    pub fn steps_completed(&self) -> usize {
        self.loss_history.len()
    }

    pub fn last_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Builds the model, sampler and optimizer described by `config` and trains.
///
/// The seed drives weight initialization first and then seeds the sampler,
/// so two runs with the same seed and config are identical.
pub fn run(config: &TrainConfig) -> Result<(AdderRnn, TrainReport), TrainError> {
    config.validate()?;

    let seed = resolve_seed(config.seed);
    let mut rng = seeded(seed);
    log::info!(
        "training {} iterations: binary_dim={} state_size={} batch_size={} lr={} optimizer={:?} seed={}",
        config.epochs, config.binary_dim, config.state_size, config.batch_size,
        config.learning_rate, config.optimizer, seed
    );

    let mut network = AdderRnn::new(config.state_size, &mut rng);
    let mut generator = SampleGenerator::new(config.binary_dim, seeded(rng.gen()));
    let mut optimizer = config.optimizer.build(config.learning_rate, config.initial_accumulator);

    let mut report = train_loop(&mut network, &mut generator, optimizer.as_mut(), config)?;
    report.seed = Some(seed);
    Ok((network, report))
}

/// Trains `network` for `config.epochs` iterations.
///
/// Every iteration draws a fresh batch, starts from a zero hidden state,
/// and takes one optimizer step.  Every `config.report_every` iterations
/// (starting with the first) a progress line is printed and the plot, if
/// configured, is redrawn.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// Returns `TrainError::InvalidConfig` before any step if `config` fails
/// `TrainConfig::validate`.
/// Returns `TrainError::NonFiniteLoss` as soon as a batch loss is NaN or
/// infinite.  The parameters are left as they were after the previous step.
pub fn train_loop(
    network: &mut AdderRnn,
    generator: &mut SampleGenerator,
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
) -> Result<TrainReport, TrainError> {
    config.validate()?;

    let mut report = TrainReport {
        loss_history: Vec::with_capacity(config.epochs),
        stopped_early: false,
        last_snapshot: None,
        seed: None,
    };

    for epoch in 0..config.epochs {
        if stop_requested(config) {
            report.stopped_early = true;
            break;
        }

        let t_start = Instant::now();

        // ── One optimization step on a fresh batch ─────────────────────────
        let batch = generator.next_batch(config.batch_size);
        let inputs = batch.input_series();
        let labels = batch.label_series();

        let pass = network.forward(&inputs, &network.zero_state(batch.len()));
        let loss = network.loss(&pass, &labels);

        if !loss.is_finite() {
            log::error!("non-finite loss {} at step {}", loss, epoch + 1);
            return Err(TrainError::NonFiniteLoss { step: epoch + 1, loss });
        }

        let grads = network.backward(&pass, &labels);
        network.apply_gradients(&grads, optimizer);
        report.loss_history.push(loss);
        log::debug!("step {} loss {:.6}", epoch + 1, loss);

        // ── Progress report ───────────────────────────────────────────────
        let snapshot = if epoch % config.report_every == 0 {
            let snapshot = Snapshot::from_pass(&batch, &pass, SNAPSHOT_ROWS);
            if let Some(row) = snapshot.rows.first() {
                println!("{}", ProgressLine::new(epoch, loss, row));
            }
            if let Some(ref path) = config.plot_path {
                if let Err(e) = render_training_plot(&report.loss_history, Some(&snapshot), path) {
                    log::warn!("could not write plot to '{}': {}", path, e);
                }
            }
            report.last_snapshot = Some(snapshot.clone());
            Some(snapshot)
        } else {
            None
        };

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            let stats = StepStats {
                step: epoch + 1,
                total_steps: config.epochs,
                loss,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
                snapshot,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                log::warn!("progress receiver dropped; stopping after step {}", epoch + 1);
                report.stopped_early = true;
                break;
            }
        }
    }

    if report.stopped_early {
        log::warn!("training stopped early after {} steps", report.steps_completed());
    } else {
        log::info!(
            "training finished: {} steps, last loss {:.6}",
            report.steps_completed(),
            report.last_loss().unwrap_or(f64::NAN)
        );
    }

    // Final chart reflects the full history, not just the last reporting step.
    if let Some(ref path) = config.plot_path {
        if let Err(e) = render_training_plot(&report.loss_history, report.last_snapshot.as_ref(), path) {
            log::warn!("could not write plot to '{}': {}", path, e);
        }
    }

    Ok(report)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}
