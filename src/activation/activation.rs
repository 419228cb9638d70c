use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFunction {
    /// Saturating non-linearity of the recurrent cell; keeps every hidden
    /// unit in (-1, 1) across the unroll.
    Tanh,
    /// Row-wise softmax over class logits.  It is paired with cross-entropy,
    /// so its derivative is folded into `CrossEntropyLoss::sequence_derivative()`.
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to a `batch × width` pre-activation matrix.
    pub fn activate(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Tanh => z.map(f64::tanh),
            ActivationFunction::Softmax => Matrix::from_data(
                z.data.iter().map(|row| softmax(row)).collect()
            ),
        }
    }

    /// Derivative expressed through the activation's output `a`.
    ///
    /// For `Softmax` this returns ones so the combined softmax+CE delta
    /// passes through unchanged.
    pub fn derivative_from_output(&self, a: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Tanh => a.map(|t| 1.0 - t * t),
            ActivationFunction::Softmax => a.map(|_| 1.0),
        }
    }
}

/// Max-shifted softmax of one row of logits.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
