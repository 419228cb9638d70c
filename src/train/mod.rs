pub mod step_stats;
pub mod train_config;
pub mod loop_fn;

pub use step_stats::StepStats;
pub use train_config::TrainConfig;
pub use loop_fn::{run, train_loop, TrainReport};
