pub mod bits;
pub mod generator;

pub use bits::{from_bits, to_bits};
pub use generator::{AdditionProblem, Batch, SampleGenerator};
