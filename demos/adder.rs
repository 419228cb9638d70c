/// Trains the adder for longer than the default run and then asks it a few
/// fixed sums.
///
/// Run with:
///   cargo run --example adder --release
use bitadd_rnn::{run, TrainConfig};

fn main() {
    env_logger::init();

    let config = TrainConfig {
        epochs: 3000,
        report_every: 250,
        ..TrainConfig::seeded(2024)
    };

    let (network, report) = match run(&config) {
        Ok(done) => done,
        Err(e) => {
            eprintln!("training failed: {e}");
            std::process::exit(1);
        }
    };

    println!("final loss: {:.6}", report.last_loss().unwrap_or(f64::NAN));
    for (a, b) in [(3, 5), (17, 25), (64, 63), (100, 27), (0, 0)] {
        let predicted = network.predict(a, b, config.binary_dim);
        let mark = if predicted == a + b { "ok" } else { "wrong" };
        println!("{a:>3} + {b:>3} = {predicted:>3}  ({mark})");
    }
}
