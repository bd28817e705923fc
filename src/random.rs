//! Seedable random source shared by every strategy of an engine.
//!
//! An [`Engine`](crate::engine::Engine) owns exactly one [`EvoRng`]; selectors,
//! mutations, and crossovers borrow it as `&mut dyn RngCore` for the duration
//! of a single call. A fixed seed therefore reproduces a whole run.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random number generator type used by engines and islands.
pub type EvoRng = StdRng;

/// Creates a deterministic generator from a 64-bit seed.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_evolve::random::create_rng;
///
/// let mut a = create_rng(7);
/// let mut b = create_rng(7);
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
pub fn create_rng(seed: u64) -> EvoRng {
    StdRng::seed_from_u64(seed)
}
