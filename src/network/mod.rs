pub mod network;

pub use network::{AdderRnn, ForwardPass, Gradients};
