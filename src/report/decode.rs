use std::fmt;

use serde::{Serialize, Deserialize};

use crate::data::{bits::from_bits, generator::Batch};
use crate::math::matrix::Matrix;
use crate::network::network::ForwardPass;

/// Batch elements kept in a `Snapshot`.
pub const SNAPSHOT_ROWS: usize = 5;

/// Reads one batch element's predicted bit sequence out of per-timestep
/// probabilities.  A bit is 1 when the probability of class 0 falls below
/// 0.5, which leaves an exact tie at 0.
pub fn predicted_bits(probabilities: &[Matrix], element: usize) -> Vec<u8> {
    probabilities.iter()
        .map(|p| if p.data[element][0] < 0.5 { 1 } else { 0 })
        .collect()
}

/// True vs predicted sum bits for one batch element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesComparison {
    pub a: u64,
    pub b: u64,
    pub predicted_sum: u64,
    pub true_bits: Vec<u8>,
    pub predicted_bits: Vec<u8>,
}

/// The first few elements of a batch, decoded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: Vec<SeriesComparison>,
}

impl Snapshot {
    pub fn from_pass(batch: &Batch, pass: &ForwardPass, max_rows: usize) -> Snapshot {
        let rows = batch.problems.iter()
            .take(max_rows)
            .enumerate()
            .map(|(i, problem)| {
                let bits = predicted_bits(&pass.probabilities, i);
                SeriesComparison {
                    a: problem.a,
                    b: problem.b,
                    predicted_sum: from_bits(&bits),
                    true_bits: problem.sum_bits.clone(),
                    predicted_bits: bits,
                }
            })
            .collect();
        Snapshot { rows }
    }
}

/// `<epoch> <loss> <a> + <b> = <predicted sum>`
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLine {
    pub epoch: usize,
    pub loss: f64,
    pub a: u64,
    pub b: u64,
    pub predicted: u64,
}

impl ProgressLine {
    pub fn new(epoch: usize, loss: f64, row: &SeriesComparison) -> ProgressLine {
        ProgressLine { epoch, loss, a: row.a, b: row.b, predicted: row.predicted_sum }
    }
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6} {} + {} = {}", self.epoch, self.loss, self.a, self.b, self.predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generator::AdditionProblem;
    use crate::layers::recurrent::RecurrentTrace;

    fn pass_from(probs: Vec<Vec<Vec<f64>>>) -> ForwardPass {
        let probabilities: Vec<Matrix> = probs.into_iter().map(Matrix::from_data).collect();
        ForwardPass {
            trace: RecurrentTrace { joined: vec![], states: vec![] },
            logits: probabilities.clone(),
            probabilities,
        }
    }

    #[test]
    fn thresholds_class_zero_probability() {
        let probs = vec![
            Matrix::from_data(vec![vec![0.2, 0.8]]),
            Matrix::from_data(vec![vec![0.5, 0.5]]),
            Matrix::from_data(vec![vec![0.9, 0.1]]),
            Matrix::from_data(vec![vec![0.49, 0.51]]),
        ];
        assert_eq!(predicted_bits(&probs, 0), vec![1, 0, 0, 1]);
    }

    #[test]
    fn snapshot_decodes_predicted_sum() {
        // 3 + 5 = 8 -> LSB first 0001; prediction reads 1001 = 9.
        let batch = Batch { binary_dim: 4, problems: vec![AdditionProblem::new(3, 5, 4)] };
        let pass = pass_from(vec![
            vec![vec![0.1, 0.9]],
            vec![vec![0.8, 0.2]],
            vec![vec![0.7, 0.3]],
            vec![vec![0.3, 0.7]],
        ]);
        let snapshot = Snapshot::from_pass(&batch, &pass, SNAPSHOT_ROWS);
        assert_eq!(snapshot.rows.len(), 1);
        let row = &snapshot.rows[0];
        assert_eq!(row.predicted_sum, 9);
        assert_eq!(row.true_bits, vec![0, 0, 0, 1]);
        assert_eq!(row.predicted_bits, vec![1, 0, 0, 1]);
    }

    #[test]
    fn progress_line_format() {
        let line = ProgressLine { epoch: 40, loss: 0.125, a: 3, b: 5, predicted: 8 };
        assert_eq!(line.to_string(), "40 0.125000 3 + 5 = 8");
    }
}
