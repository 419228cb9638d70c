use rand::Rng;

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Vanilla (ungated) recurrent cell: `h_t = tanh([x_t | h_{t-1}] W + b)`.
#[derive(Debug, Clone)]
pub struct RecurrentLayer {
    pub input_size: usize,
    pub state_size: usize,
    /// Shape `(input_size + state_size) × state_size`.
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

/// Values kept from a forward unroll for backpropagation through time.
#[derive(Debug, Clone)]
pub struct RecurrentTrace {
    /// `[x_t | h_{t-1}]` per timestep.
    pub joined: Vec<Matrix>,
    /// `h_t` per timestep.
    pub states: Vec<Matrix>,
}

impl RecurrentLayer {
    pub fn new<R: Rng>(input_size: usize, state_size: usize, rng: &mut R) -> RecurrentLayer {
        RecurrentLayer {
            input_size,
            state_size,
            weights: Matrix::random(input_size + state_size, state_size, rng),
            biases: Matrix::zeros(1, state_size),
            activator: ActivationFunction::Tanh,
        }
    }

    /// One recurrence step for a batch.
    pub fn step(&self, input: &Matrix, state: &Matrix) -> (Matrix, Matrix) {
        let joined = input.hstack(state);
        let z = (&joined * &self.weights).add_row(&self.biases);
        let next = self.activator.activate(&z);
        (joined, next)
    }

    /// Unrolls the cell over `inputs` starting from `init_state`.
    pub fn forward(&self, inputs: &[Matrix], init_state: &Matrix) -> RecurrentTrace {
        let mut joined = Vec::with_capacity(inputs.len());
        let mut states = Vec::with_capacity(inputs.len());
        let mut state = init_state.clone();

        for input in inputs {
            let (j, next) = self.step(input, &state);
            joined.push(j);
            states.push(next.clone());
            state = next;
        }

        RecurrentTrace { joined, states }
    }

    /// Backpropagation through the whole unroll.
    ///
    /// `state_deltas[t]` is ∂L/∂h_t coming from outside the recurrence (the
    /// readout).  Returns `(weights_grad, biases_grad)`.
    pub fn backward(&self, trace: &RecurrentTrace, state_deltas: &[Matrix]) -> (Matrix, Matrix) {
        assert_eq!(trace.states.len(), state_deltas.len(), "one delta per timestep");

        let mut weights_grad = Matrix::zeros(self.weights.rows, self.weights.cols);
        let mut biases_grad = Matrix::zeros(1, self.state_size);
        let batch = trace.states.first().map_or(0, |h| h.rows);
        let mut carried = Matrix::zeros(batch, self.state_size);
        let weights_t = self.weights.transpose();

        for t in (0..trace.states.len()).rev() {
            let dh = state_deltas[t].clone() + carried;
            let dz = dh.hadamard(&self.activator.derivative_from_output(&trace.states[t]));

            weights_grad = weights_grad + &trace.joined[t].transpose() * &dz;
            biases_grad = biases_grad + dz.sum_rows();

            let (_, into_prev_state) = (&dz * &weights_t).split_cols(self.input_size);
            carried = into_prev_state;
        }

        (weights_grad, biases_grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn states_stay_inside_tanh_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = RecurrentLayer::new(2, 5, &mut rng);
        let inputs: Vec<Matrix> = (0..8).map(|_| Matrix::from_data(vec![vec![1.0, 1.0]; 4])).collect();
        let trace = layer.forward(&inputs, &Matrix::zeros(4, 5));
        assert_eq!(trace.states.len(), 8);
        for h in &trace.states {
            assert_eq!((h.rows, h.cols), (4, 5));
            assert!(h.data.iter().flatten().all(|x| x.abs() < 1.0));
        }
        assert_eq!(trace.joined[0].cols, 7);
    }

    #[test]
    fn zero_input_zero_state_stays_zero() {
        let layer = RecurrentLayer::new(2, 3, &mut StdRng::seed_from_u64(9));
        let inputs = vec![Matrix::zeros(2, 2); 4];
        let trace = layer.forward(&inputs, &Matrix::zeros(2, 3));
        for h in &trace.states {
            assert_eq!(h, &Matrix::zeros(2, 3));
        }
    }

    #[test]
    fn bptt_matches_finite_differences() {
        // L = sum over t of sum(h_t ⊙ r_t) for fixed random r_t.
        let mut rng = StdRng::seed_from_u64(11);
        let mut layer = RecurrentLayer::new(2, 3, &mut rng);
        layer.biases = Matrix::random(1, 3, &mut rng);
        let inputs: Vec<Matrix> = (0..4).map(|_| Matrix::random(2, 2, &mut rng)).collect();
        let probes: Vec<Matrix> = (0..4).map(|_| Matrix::random(2, 3, &mut rng)).collect();
        let init = Matrix::zeros(2, 3);

        let objective = |l: &RecurrentLayer| -> f64 {
            l.forward(&inputs, &init).states.iter().zip(probes.iter())
                .map(|(h, r)| h.hadamard(r).data.iter().flatten().sum::<f64>())
                .sum()
        };

        let (w_grad, b_grad) = layer.backward(&layer.forward(&inputs, &init), &probes);

        let eps = 1e-6;
        for i in 0..layer.weights.rows {
            for j in 0..layer.weights.cols {
                let mut plus = layer.clone();
                plus.weights.data[i][j] += eps;
                let mut minus = layer.clone();
                minus.weights.data[i][j] -= eps;
                let numeric = (objective(&plus) - objective(&minus)) / (2.0 * eps);
                assert!((numeric - w_grad.data[i][j]).abs() < 1e-6, "W[{i}][{j}]");
            }
        }
        for j in 0..layer.biases.cols {
            let mut plus = layer.clone();
            plus.biases.data[0][j] += eps;
            let mut minus = layer.clone();
            minus.biases.data[0][j] -= eps;
            let numeric = (objective(&plus) - objective(&minus)) / (2.0 * eps);
            assert!((numeric - b_grad.data[0][j]).abs() < 1e-6, "b[{j}]");
        }
    }
}
