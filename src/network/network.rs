use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    data::bits::{from_bits, to_bits},
    layers::{dense::Layer, recurrent::{RecurrentLayer, RecurrentTrace}},
    loss::cross_entropy::CrossEntropyLoss,
    math::matrix::Matrix,
    optim::Optimizer,
    report::decode::predicted_bits,
    train::train_config::MAX_BINARY_DIM,
};

/// Two operand bits per timestep.
pub const INPUT_SIZE: usize = 2;
/// Output classes: bit 0 and bit 1.
pub const NUM_CLASSES: usize = 2;

/// Recurrent cell followed by a shared linear + softmax readout.
#[derive(Debug, Clone)]
pub struct AdderRnn {
    pub cell: RecurrentLayer,
    pub readout: Layer,
}

/// Everything one forward unroll produced, one entry per timestep.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    pub trace: RecurrentTrace,
    pub logits: Vec<Matrix>,
    pub probabilities: Vec<Matrix>,
}

impl ForwardPass {
    pub fn timesteps(&self) -> usize {
        self.probabilities.len()
    }
}

/// Gradients for every trainable parameter of `AdderRnn`.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub cell_weights: Matrix,
    pub cell_biases: Matrix,
    pub readout_weights: Matrix,
    pub readout_biases: Matrix,
}

impl AdderRnn {
    pub fn new<R: Rng>(state_size: usize, rng: &mut R) -> AdderRnn {
        AdderRnn {
            cell: RecurrentLayer::new(INPUT_SIZE, state_size, rng),
            readout: Layer::new(NUM_CLASSES, state_size, ActivationFunction::Softmax, rng),
        }
    }

    /// All-zero hidden state for a batch.
    pub fn zero_state(&self, batch_size: usize) -> Matrix {
        Matrix::zeros(batch_size, self.cell.state_size)
    }

    /// Unrolls the cell over `inputs` (one `batch × 2` matrix per timestep)
    /// and reads out a two-class distribution for every hidden state.
    pub fn forward(&self, inputs: &[Matrix], init_state: &Matrix) -> ForwardPass {
        let trace = self.cell.forward(inputs, init_state);
        let (logits, probabilities) = trace.states.iter()
            .map(|h| self.readout.forward(h))
            .unzip();
        ForwardPass { trace, logits, probabilities }
    }

    /// Mean cross-entropy of a forward pass against per-timestep labels.
    pub fn loss(&self, pass: &ForwardPass, labels: &[Vec<usize>]) -> f64 {
        CrossEntropyLoss::sequence_loss(&pass.logits, labels)
    }

    /// Backpropagation through time for the mean cross-entropy loss.
    pub fn backward(&self, pass: &ForwardPass, labels: &[Vec<usize>]) -> Gradients {
        let logit_deltas = CrossEntropyLoss::sequence_derivative(&pass.probabilities, labels);

        let mut readout_weights = Matrix::zeros(self.readout.weights.rows, self.readout.weights.cols);
        let mut readout_biases = Matrix::zeros(1, self.readout.size);
        let mut state_deltas = Vec::with_capacity(logit_deltas.len());

        for ((delta, probs), h) in logit_deltas.iter()
            .zip(pass.probabilities.iter())
            .zip(pass.trace.states.iter())
        {
            let (w, b, dh) = self.readout.compute_gradients(delta, probs, h);
            readout_weights = readout_weights + w;
            readout_biases = readout_biases + b;
            state_deltas.push(dh);
        }

        let (cell_weights, cell_biases) = self.cell.backward(&pass.trace, &state_deltas);

        Gradients { cell_weights, cell_biases, readout_weights, readout_biases }
    }

    /// Hands every parameter to `optimizer` under a fixed slot number.
    pub fn apply_gradients(&mut self, grads: &Gradients, optimizer: &mut dyn Optimizer) {
        optimizer.update(0, &mut self.cell.weights, &grads.cell_weights);
        optimizer.update(1, &mut self.cell.biases, &grads.cell_biases);
        optimizer.update(2, &mut self.readout.weights, &grads.readout_weights);
        optimizer.update(3, &mut self.readout.biases, &grads.readout_biases);
    }

    /// Runs a single problem `a + b` at `binary_dim` bits from a zero state
    /// and decodes the predicted sum.
    ///
    /// # Panics
    /// Panics if `binary_dim` is 0 or greater than `MAX_BINARY_DIM`.
    pub fn predict(&self, a: u64, b: u64, binary_dim: usize) -> u64 {
        assert!(
            (1..=MAX_BINARY_DIM).contains(&binary_dim),
            "binary_dim must be in 1..={}, got {}", MAX_BINARY_DIM, binary_dim
        );
        let a_bits = to_bits(a, binary_dim);
        let b_bits = to_bits(b, binary_dim);
        let inputs: Vec<Matrix> = a_bits.iter().zip(b_bits.iter())
            .map(|(&x, &y)| Matrix::from_data(vec![vec![x as f64, y as f64]]))
            .collect();
        let pass = self.forward(&inputs, &self.zero_state(1));
        from_bits(&predicted_bits(&pass.probabilities, 0))
    }
}
