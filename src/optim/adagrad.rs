use std::collections::HashMap;

use crate::{math::matrix::Matrix, optim::Optimizer};

/// Adagrad: every parameter keeps a running sum of its squared gradients
/// and its step shrinks with the square root of that sum.
///
///   acc ← acc + g²
///   θ   ← θ - lr · g / √acc
///
/// Accumulators start at `initial_accumulator` (0.1 by default), which also
/// bounds the very first step.
pub struct Adagrad {
    pub learning_rate: f64,
    pub initial_accumulator: f64,
    accumulators: HashMap<usize, Matrix>,
}

impl Adagrad {
    pub fn new(learning_rate: f64, initial_accumulator: f64) -> Adagrad {
        Adagrad {
            learning_rate,
            initial_accumulator,
            accumulators: HashMap::new(),
        }
    }

    /// Squared-gradient sums for `slot`, if it has been updated at least once.
    pub fn accumulator(&self, slot: usize) -> Option<&Matrix> {
        self.accumulators.get(&slot)
    }
}

impl Optimizer for Adagrad {
    fn update(&mut self, slot: usize, param: &mut Matrix, grad: &Matrix) {
        let init = self.initial_accumulator;
        let acc = self.accumulators
            .entry(slot)
            .or_insert_with(|| Matrix::zeros(param.rows, param.cols).map(|_| init));
        assert_eq!((acc.rows, acc.cols), (grad.rows, grad.cols), "slot {} changed shape", slot);

        let lr = self.learning_rate;
        for ((p_row, a_row), g_row) in param.data.iter_mut()
            .zip(acc.data.iter_mut())
            .zip(grad.data.iter())
        {
            for ((p, a), g) in p_row.iter_mut().zip(a_row.iter_mut()).zip(g_row.iter()) {
                *a += g * g;
                *p -= lr * g / a.sqrt();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_uses_initial_accumulator() {
        let mut opt = Adagrad::new(0.3, 0.1);
        let mut p = Matrix::from_data(vec![vec![1.0]]);
        opt.update(0, &mut p, &Matrix::from_data(vec![vec![0.3]]));
        // acc = 0.1 + 0.09 = 0.19
        let expected = 1.0 - 0.3 * 0.3 / 0.19f64.sqrt();
        assert!((p.data[0][0] - expected).abs() < 1e-12);
        assert!((opt.accumulator(0).unwrap().data[0][0] - 0.19).abs() < 1e-12);
    }

    #[test]
    fn repeated_gradients_take_shrinking_steps() {
        let mut opt = Adagrad::new(1.0, 0.1);
        let mut p = Matrix::zeros(1, 1);
        let g = Matrix::from_data(vec![vec![1.0]]);
        let mut previous = 0.0;
        let mut last_step = f64::INFINITY;
        for _ in 0..5 {
            opt.update(3, &mut p, &g);
            let step = previous - p.data[0][0];
            assert!(step > 0.0 && step < last_step);
            last_step = step;
            previous = p.data[0][0];
        }
    }

    #[test]
    fn slots_are_independent() {
        let mut opt = Adagrad::new(0.1, 0.1);
        let mut a = Matrix::zeros(2, 2);
        let mut b = Matrix::zeros(1, 3);
        opt.update(0, &mut a, &Matrix::from_data(vec![vec![1.0; 2]; 2]));
        opt.update(1, &mut b, &Matrix::from_data(vec![vec![2.0; 3]]));
        assert!((opt.accumulator(0).unwrap().data[0][0] - 1.1).abs() < 1e-12);
        assert!((opt.accumulator(1).unwrap().data[0][2] - 4.1).abs() < 1e-12);
    }
}
