/// bitadd-rnn monitor
///
/// Trains the binary-addition RNN in a background thread and serves a page
/// that redraws the loss curve and the true-vs-predicted bit bars live.
/// Served by a synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin monitor --release [-- path/to/config.json]
/// Then open http://127.0.0.1:7878 (override with MONITOR_ADDR).
///
/// Routes:
///   GET  /        — chart page
///   GET  /events  — Server-Sent Events stream of per-step stats
///   POST /stop    — ask the training loop to stop after its current step

mod handlers;
mod routes;
mod sse;
mod state;

use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;
use std::time::Instant;

use tiny_http::Server;

use bitadd_rnn::{StepStats, TrainConfig};
use state::{lock, MonitorState, SharedState, TrainingStatus};

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => TrainConfig::load_json(&path)?,
        None => TrainConfig::default(),
    };
    config.validate()?;

    let addr = std::env::var("MONITOR_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let server = Server::http(&addr).map_err(|e| format!("failed to bind {addr}: {e}"))?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    let summary = format!(
        "{} steps · binary_dim {} · state {} · batch {} · {:?} lr {}",
        config.epochs, config.binary_dim, config.state_size, config.batch_size,
        config.optimizer, config.learning_rate
    );
    let shared_state: SharedState = Arc::new(Mutex::new(
        MonitorState::new(stop_flag.clone(), config.epochs, summary)
    ));

    let (tx, rx) = mpsc::channel::<StepStats>();
    config.progress_tx = Some(tx);
    config.stop_flag = Some(stop_flag.clone());
    spawn_training(config, rx, stop_flag, shared_state.clone());

    log::info!("monitor listening on http://{addr}");
    println!("Open http://{addr} to watch training.");

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the whole run) does not stall page loads.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}

/// Starts the training thread plus a collector that moves every `StepStats`
/// from the channel into the shared history.
fn spawn_training(
    config: TrainConfig,
    rx: mpsc::Receiver<StepStats>,
    stop_flag: Arc<AtomicBool>,
    state: SharedState,
) {
    let collector_state = state.clone();
    let collector = thread::spawn(move || {
        for stats in rx {
            lock(&collector_state).step_history.push(stats);
        }
    });

    thread::spawn(move || {
        let t_start = Instant::now();
        let binary_dim = config.binary_dim;
        let outcome = bitadd_rnn::run(&config);
        // Dropping the config drops the sender, which ends the collector.
        drop(config);
        if collector.join().is_err() {
            log::error!("step collector panicked");
        }

        let status = match outcome {
            Ok((network, report)) => TrainingStatus::Done {
                elapsed_total_ms: t_start.elapsed().as_millis() as u64,
                stopped_early: report.stopped_early || stop_flag.load(Ordering::Relaxed),
                final_loss: report.last_loss(),
                predicted_3_plus_5: network.predict(3, 5, binary_dim),
            },
            Err(e) => {
                log::error!("training failed: {e}");
                TrainingStatus::Failed { reason: e.to_string() }
            }
        };
        lock(&state).training = status;
    });
}
