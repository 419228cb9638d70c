pub mod math;
pub mod activation;
pub mod data;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod report;
pub mod train;
pub mod error;
pub mod rng;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use data::generator::{AdditionProblem, Batch, SampleGenerator};
pub use network::network::{AdderRnn, ForwardPass};
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::{Adagrad, Optimizer, OptimizerKind, Sgd};
pub use report::decode::{ProgressLine, Snapshot};
pub use train::{run, train_loop, StepStats, TrainConfig, TrainReport};
pub use error::TrainError;
