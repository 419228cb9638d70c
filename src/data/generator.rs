use rand::{rngs::StdRng, Rng};

use crate::data::bits::to_bits;
use crate::math::matrix::Matrix;

/// One addition problem and its fixed-width, LSB-first encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionProblem {
    pub a: u64,
    pub b: u64,
    pub sum: u64,
    pub a_bits: Vec<u8>,
    pub b_bits: Vec<u8>,
    pub sum_bits: Vec<u8>,
}

impl AdditionProblem {
    /// Encodes `a + b` at `binary_dim` bits.  Callers keep the sum in range.
    pub fn new(a: u64, b: u64, binary_dim: usize) -> AdditionProblem {
        let sum = a + b;
        AdditionProblem {
            a,
            b,
            sum,
            a_bits: to_bits(a, binary_dim),
            b_bits: to_bits(b, binary_dim),
            sum_bits: to_bits(sum, binary_dim),
        }
    }
}

/// `batch_size` independent problems sharing one bit width.
#[derive(Debug, Clone)]
pub struct Batch {
    pub binary_dim: usize,
    pub problems: Vec<AdditionProblem>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// `batch × 2` matrix holding bit `t` of both operands.
    pub fn inputs_at(&self, t: usize) -> Matrix {
        Matrix::from_data(
            self.problems.iter()
                .map(|p| vec![p.a_bits[t] as f64, p.b_bits[t] as f64])
                .collect()
        )
    }

    /// Sum bit `t` of every problem, used as the class label.
    pub fn labels_at(&self, t: usize) -> Vec<usize> {
        self.problems.iter().map(|p| p.sum_bits[t] as usize).collect()
    }

    /// Input matrices for every timestep in temporal order.
    pub fn input_series(&self) -> Vec<Matrix> {
        (0..self.binary_dim).map(|t| self.inputs_at(t)).collect()
    }

    pub fn label_series(&self) -> Vec<Vec<usize>> {
        (0..self.binary_dim).map(|t| self.labels_at(t)).collect()
    }
}

/// Draws fresh batches of addition problems on demand.
pub struct SampleGenerator {
    binary_dim: usize,
    largest_number: u64,
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(binary_dim: usize, rng: StdRng) -> SampleGenerator {
        SampleGenerator {
            binary_dim,
            largest_number: 1u64 << binary_dim,
            rng,
        }
    }

    /// Exclusive upper bound on either operand.  Two operands below it can
    /// never carry out of `binary_dim` bits.
    pub fn operand_limit(&self) -> u64 {
        self.largest_number / 2
    }

    pub fn next_batch(&mut self, batch_size: usize) -> Batch {
        let limit = self.operand_limit();
        let problems = (0..batch_size)
            .map(|_| {
                let a = self.rng.gen_range(0..limit);
                let b = self.rng.gen_range(0..limit);
                AdditionProblem::new(a, b, self.binary_dim)
            })
            .collect();
        Batch { binary_dim: self.binary_dim, problems }
    }
}
