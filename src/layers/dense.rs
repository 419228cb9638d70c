use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer applied to a whole batch at once.
///
/// The readout of the adder shares one `Layer` across every timestep, so the
/// layer keeps no per-call cache; callers hold on to inputs and outputs.
#[derive(Debug, Clone)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Weights uniform in [-1, 1], biases zero.
    pub fn new<R: Rng>(size: usize, input_size: usize, activation: ActivationFunction, rng: &mut R) -> Layer {
        Layer {
            size,
            weights: Matrix::random(input_size, size, rng),
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    /// Returns `(z, a)` where `z = xW + b` and `a` is the activation of `z`.
    pub fn forward(&self, input: &Matrix) -> (Matrix, Matrix) {
        let z = (input * &self.weights).add_row(&self.biases);
        let a = self.activator.activate(&z);
        (z, a)
    }

    /// Computes `(weights_grad, biases_grad, input_delta)` for one batch.
    /// `next_layer_delta` is ∂L/∂a for this layer, `output` the activation
    /// returned by `forward` for the same `inputs`.
    pub fn compute_gradients(
        &self,
        next_layer_delta: &Matrix,
        output: &Matrix,
        inputs: &Matrix,
    ) -> (Matrix, Matrix, Matrix) {
        // δ = error ⊙ σ'(z)
        let layer_delta = next_layer_delta.hadamard(&self.activator.derivative_from_output(output));

        let weights_adjustment = &inputs.transpose() * &layer_delta;
        let biases_adjustment = layer_delta.sum_rows();
        let input_delta = &layer_delta * &self.weights.transpose();

        (weights_adjustment, biases_adjustment, input_delta)
    }
}
