//! Recombination contract.
//!
//! Concrete crossover algorithms live with the genome representation; the
//! engine only needs something that recombines two genome copies in place.

use rand::RngCore;

/// Recombines two genomes in place.
///
/// Both inputs are copies owned by the caller. After the call each holds a
/// recombinant of the two. Whatever invariants the genome type defines (for
/// example conservation of content) are the implementor's responsibility.
pub trait Crossover<G>: Send + Sync {
    fn recombine(&self, first: &mut G, second: &mut G, rng: &mut dyn RngCore);
}

/// Leaves both genomes untouched. Offspring are then plain copies of the
/// mother.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrossover;

impl<G> Crossover<G> for NoCrossover {
    fn recombine(&self, _first: &mut G, _second: &mut G, _rng: &mut dyn RngCore) {}
}

/// Crossover backed by a closure. Built with [`from_fn`].
#[derive(Clone)]
pub struct FnCrossover<F>(F);

/// Wraps a closure as a [`Crossover`].
///
/// # Examples
///
/// ```
/// use rand::{Rng, RngCore};
/// use u_evolve::crossover::{from_fn, Crossover};
/// use u_evolve::random::create_rng;
///
/// // One-point crossover on equally sized bit strings.
/// let one_point = from_fn(|a: &mut Vec<bool>, b: &mut Vec<bool>, rng: &mut dyn RngCore| {
///     let cut = rng.random_range(0..=a.len());
///     a[cut..].swap_with_slice(&mut b[cut..]);
/// });
///
/// let (mut a, mut b) = (vec![true; 8], vec![false; 8]);
/// one_point.recombine(&mut a, &mut b, &mut create_rng(1));
/// assert_eq!(a.iter().filter(|&&x| x).count() + b.iter().filter(|&&x| x).count(), 8);
/// ```
pub fn from_fn<G, F>(f: F) -> FnCrossover<F>
where
    F: Fn(&mut G, &mut G, &mut dyn RngCore) + Send + Sync,
{
    FnCrossover(f)
}

impl<G, F> Crossover<G> for FnCrossover<F>
where
    F: Fn(&mut G, &mut G, &mut dyn RngCore) + Send + Sync,
{
    fn recombine(&self, first: &mut G, second: &mut G, rng: &mut dyn RngCore) {
        (self.0)(first, second, rng)
    }
}

impl<G> Crossover<G> for Box<dyn Crossover<G>> {
    fn recombine(&self, first: &mut G, second: &mut G, rng: &mut dyn RngCore) {
        (**self).recombine(first, second, rng)
    }
}
