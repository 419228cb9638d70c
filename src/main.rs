// Trains the binary-addition RNN and prints progress lines.
//
//   cargo run --release [-- path/to/config.json]
//
// Without a config file the defaults from `TrainConfig::default()` are used.
// The loss and bit charts are written to `training_plot.png` unless the
// config names another `plot_path`.  Set `RUST_LOG=debug` for per-step loss.
use bitadd_rnn::TrainConfig;

const DEFAULT_PLOT_PATH: &str = "training_plot.png";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {path}");
            TrainConfig::load_json(&path)?
        }
        None => TrainConfig::default(),
    };
    if config.plot_path.is_none() {
        config.plot_path = Some(DEFAULT_PLOT_PATH.to_owned());
    }

    let (network, report) = match bitadd_rnn::run(&config) {
        Ok(done) => done,
        Err(e) => {
            log::error!("training failed: {e}");
            return Err(e.into());
        }
    };

    let losses = &report.loss_history;
    let window = losses.len().min(20);
    if window > 0 {
        let head: f64 = losses[..window].iter().sum::<f64>() / window as f64;
        let tail: f64 = losses[losses.len() - window..].iter().sum::<f64>() / window as f64;
        println!("mean loss: first {window} = {head:.6}, last {window} = {tail:.6}");
    }
    println!("3 + 5 = {}", network.predict(3, 5, config.binary_dim));
    if let Some(path) = &config.plot_path {
        println!("chart written to {path}");
    }
    Ok(())
}
