use burn::tensor::backend::Backend;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed every source of randomness a run uses from one value.
///
/// The backend seed covers weight initialisation and dropout; the
/// returned RNG drives the train/validation split. The data loader
/// shuffle takes the same seed directly.
pub fn fixed_seed<B: Backend>(seed: u64) -> StdRng {
    B::seed(seed);
    tracing::debug!("Seeded backend and RNG with {}", seed);
    StdRng::seed_from_u64(seed)
}
