use bitadd_rnn::{AdderRnn, Matrix, SampleGenerator};
use bitadd_rnn::rng::seeded;

const STATE_SIZE: usize = 16;
const BINARY_DIM: usize = 8;

#[test]
fn zero_sequence_from_zero_state_is_even_split() {
    // Biases start at zero, so zero inputs keep every hidden state at zero and
    // every logit at zero, whatever the random weights are.
    for seed in [0u64, 1, 99] {
        let net = AdderRnn::new(STATE_SIZE, &mut seeded(seed));
        let inputs = vec![Matrix::zeros(4, 2); BINARY_DIM];
        let pass = net.forward(&inputs, &net.zero_state(4));
        assert_eq!(pass.timesteps(), BINARY_DIM);
        for p in &pass.probabilities {
            assert_eq!(p, &Matrix::from_data(vec![vec![0.5, 0.5]; 4]));
        }
    }
}

/// Fixed one-unit network over a two-element batch.  Each row's sequence
/// runs through `h_t = tanh(0.5·a + -0.25·b + 0.75·h + 0.1)` and the
/// readout `[h + 0.2, -h - 0.2]`.
fn fixed_network() -> AdderRnn {
    let mut net = AdderRnn::new(1, &mut seeded(0));
    net.cell.weights = Matrix::from_data(vec![vec![0.5], vec![-0.25], vec![0.75]]);
    net.cell.biases = Matrix::from_data(vec![vec![0.1]]);
    net.readout.weights = Matrix::from_data(vec![vec![1.0, -1.0]]);
    net.readout.biases = Matrix::from_data(vec![vec![0.2, -0.2]]);
    net
}

#[test]
fn fixed_parameters_give_pinned_states_and_probabilities() {
    let net = fixed_network();
    // Row 0 reads (1,0) (1,1) (0,1) (0,0); row 1 reads (0,0) (0,1) (1,1) (1,0).
    let inputs = vec![
        Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 0.0]]),
        Matrix::from_data(vec![vec![1.0, 1.0], vec![0.0, 1.0]]),
        Matrix::from_data(vec![vec![0.0, 1.0], vec![1.0, 1.0]]),
        Matrix::from_data(vec![vec![0.0, 0.0], vec![1.0, 0.0]]),
    ];
    let expected_states = [
        [0.5370495669980353, 0.09966799462495582],
        [0.6368087989087756, -0.0751072946862956],
        [0.31636856309985567, 0.2855087387791505],
        [0.3250437329465064, 0.6718631261192912],
    ];
    let expected_p0 = [
        [0.8136796348222534, 0.6455043763420075],
        [0.8420575450673183, 0.5621236824228869],
        [0.7374462006218971, 0.7253222561895141],
        [0.7407916946806526, 0.8511597505177004],
    ];

    let pass = net.forward(&inputs, &net.zero_state(2));
    assert_eq!(pass.timesteps(), 4);
    for t in 0..4 {
        for row in 0..2 {
            let h = pass.trace.states[t].data[row][0];
            let p = &pass.probabilities[t].data[row];
            assert!((h - expected_states[t][row]).abs() < 1e-12, "h[{t}][{row}] = {h}");
            assert!((p[0] - expected_p0[t][row]).abs() < 1e-12, "p0[{t}][{row}] = {}", p[0]);
            assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        }
    }
}

#[test]
fn fixed_parameters_predict_from_threshold() {
    // States for 5 + 2 stay positive, so p0 > 0.5 and every decoded bit is 0.
    assert_eq!(fixed_network().predict(5, 2, 4), 0);
}

#[test]
fn same_seed_same_outputs() {
    let a = AdderRnn::new(STATE_SIZE, &mut seeded(7));
    let b = AdderRnn::new(STATE_SIZE, &mut seeded(7));
    let batch = SampleGenerator::new(BINARY_DIM, seeded(8)).next_batch(6);
    let inputs = batch.input_series();
    let pa = a.forward(&inputs, &a.zero_state(6));
    let pb = b.forward(&inputs, &b.zero_state(6));
    assert_eq!(pa.probabilities, pb.probabilities);
}

#[test]
fn shapes_follow_batch_size_and_bit_width() {
    let net = AdderRnn::new(5, &mut seeded(3));
    for (batch_size, width) in [(1usize, 8usize), (13, 4), (32, 12)] {
        let batch = SampleGenerator::new(width, seeded(4)).next_batch(batch_size);
        let pass = net.forward(&batch.input_series(), &net.zero_state(batch_size));
        assert_eq!(pass.timesteps(), width);
        assert_eq!(pass.trace.states.len(), width);
        for (h, p) in pass.trace.states.iter().zip(pass.probabilities.iter()) {
            assert_eq!((h.rows, h.cols), (batch_size, 5));
            assert_eq!((p.rows, p.cols), (batch_size, 2));
        }
    }
}
