use rand::{rngs::StdRng, SeedableRng};

/// Picks the run seed: an explicit value wins, then the `SEED` environment
/// variable, then a fresh random seed.
pub fn resolve_seed(explicit: Option<u64>) -> u64 {
    explicit
        .or_else(|| std::env::var("SEED").ok().and_then(|s| s.parse().ok()))
        .unwrap_or_else(rand::random)
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
