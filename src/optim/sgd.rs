use crate::{math::matrix::Matrix, optim::Optimizer};

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    /// Plain gradient descent: θ ← θ - lr·g.
    fn update(&mut self, _slot: usize, param: &mut Matrix, grad: &Matrix) {
        let lr = self.learning_rate;
        for (row, grad_row) in param.data.iter_mut().zip(grad.data.iter()) {
            for (p, g) in row.iter_mut().zip(grad_row.iter()) {
                *p -= lr * g;
            }
        }
    }
}
