use crate::math::matrix::Matrix;

/// Sparse categorical cross-entropy over an unrolled sequence of softmax
/// outputs.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Mean of `-log softmax(z)[label]` over every (element, timestep) pair.
    ///
    /// `logits` — one `batch × classes` matrix per timestep
    /// `labels` — one label per batch element per timestep
    ///
    /// Uses log-sum-exp on the logits rather than `log` of the probabilities,
    /// so saturated predictions stay finite.
    pub fn sequence_loss(logits: &[Matrix], labels: &[Vec<usize>]) -> f64 {
        assert_eq!(logits.len(), labels.len(), "one label vector per timestep");
        let mut total = 0.0;
        let mut count = 0usize;

        for (z, y) in logits.iter().zip(labels.iter()) {
            for (row, &label) in z.data.iter().zip(y.iter()) {
                total += log_sum_exp(row) - row[label];
                count += 1;
            }
        }

        if count == 0 { 0.0 } else { total / count as f64 }
    }

    /// Gradient of `sequence_loss` w.r.t. the logits of each timestep:
    ///   ∂L/∂z = (predicted - onehot(label)) / (batch · timesteps)
    pub fn sequence_derivative(probabilities: &[Matrix], labels: &[Vec<usize>]) -> Vec<Matrix> {
        let count: usize = labels.iter().map(|y| y.len()).sum();
        let inv = if count == 0 { 0.0 } else { 1.0 / count as f64 };

        probabilities.iter().zip(labels.iter())
            .map(|(p, y)| {
                let mut grad = p.clone();
                for (row, &label) in grad.data.iter_mut().zip(y.iter()) {
                    row[label] -= 1.0;
                    for g in row.iter_mut() {
                        *g *= inv;
                    }
                }
                grad
            })
            .collect()
    }
}

fn log_sum_exp(row: &[f64]) -> f64 {
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max + row.iter().map(|&z| (z - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::softmax;

    #[test]
    fn equal_logits_cost_ln_two() {
        let logits = vec![Matrix::zeros(3, 2); 4];
        let labels = vec![vec![0, 1, 1]; 4];
        let loss = CrossEntropyLoss::sequence_loss(&logits, &labels);
        assert!((loss - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn matches_manual_log_of_softmax() {
        let row = vec![1.5, -0.5];
        let p = softmax(&row);
        let logits = vec![Matrix::from_data(vec![row])];
        let loss = CrossEntropyLoss::sequence_loss(&logits, &[vec![1]]);
        assert!((loss + p[1].ln()).abs() < 1e-12);
    }

    #[test]
    fn huge_logits_stay_finite() {
        let logits = vec![Matrix::from_data(vec![vec![1000.0, -1000.0]])];
        let loss = CrossEntropyLoss::sequence_loss(&logits, &[vec![1]]);
        assert!(loss.is_finite());
        assert!((loss - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn derivative_is_scaled_residual() {
        let probs = vec![
            Matrix::from_data(vec![vec![0.25, 0.75], vec![0.5, 0.5]]),
            Matrix::from_data(vec![vec![0.9, 0.1], vec![0.2, 0.8]]),
        ];
        let labels = vec![vec![1, 0], vec![0, 1]];
        let grads = CrossEntropyLoss::sequence_derivative(&probs, &labels);
        assert_eq!(grads.len(), 2);
        assert!((grads[0].data[0][0] - 0.25 / 4.0).abs() < 1e-12);
        assert!((grads[0].data[0][1] + 0.25 / 4.0).abs() < 1e-12);
        assert!((grads[1].data[1][1] + 0.2 / 4.0).abs() < 1e-12);
    }
}
