pub mod adagrad;
pub mod sgd;

use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

pub use adagrad::Adagrad;
pub use sgd::Sgd;

/// A parameter update rule.
///
/// `slot` identifies the parameter across calls so stateful rules can keep
/// per-parameter history; callers must use the same slot for the same
/// parameter on every step.
pub trait Optimizer {
    fn update(&mut self, slot: usize, param: &mut Matrix, grad: &Matrix);
}

/// Selects the optimizer built by `OptimizerKind::build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Adagrad,
    Sgd,
}

impl OptimizerKind {
    pub fn build(self, learning_rate: f64, initial_accumulator: f64) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::Adagrad => Box::new(Adagrad::new(learning_rate, initial_accumulator)),
            OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate)),
        }
    }
}
