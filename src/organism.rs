//! Organisms: a genome paired with its memoized fitness.
//!
//! Organisms are only ever created by an [`OrganismFactory`], which evaluates
//! the fitness function exactly once per construction. Both genome and fitness
//! are immutable afterwards; offspring are bred from genome copies.
//!
//! Organisms are shared as `Arc<Organism<G>>`. Identity (`Arc::ptr_eq`) is what
//! distinguishes two organisms, so two clones of the same genome with the same
//! fitness are still different organisms.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::genome::Genome;

/// A genome and the fitness computed for it at construction time.
///
/// Higher fitness is better.
#[derive(Debug)]
pub struct Organism<G> {
    genome: G,
    fitness: f64,
}

impl<G> Organism<G> {
    /// Returns the organism's genome.
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Returns the memoized fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Total order on fitness (`f64::total_cmp`), ties are `Equal`.
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.fitness.total_cmp(&other.fitness)
    }
}

/// Fitness function signature. Pure, higher is better.
pub type FitnessFn<G> = dyn Fn(&G) -> f64 + Send + Sync;

/// Builds organisms from genomes by evaluating a fitness function.
///
/// Cloning a factory shares the underlying fitness function, which is how
/// islands of an archipelago usually share one objective.
///
/// # Examples
///
/// ```
/// use u_evolve::organism::OrganismFactory;
///
/// let factory = OrganismFactory::new(|g: &Vec<bool>| g.iter().filter(|&&b| b).count() as f64);
/// let organism = factory.create(vec![true, false, true]);
/// assert_eq!(organism.fitness(), 2.0);
/// ```
pub struct OrganismFactory<G> {
    fitness: Arc<FitnessFn<G>>,
}

impl<G: Genome> OrganismFactory<G> {
    /// Creates a factory around a fitness function.
    pub fn new<F>(fitness: F) -> Self
    where
        F: Fn(&G) -> f64 + Send + Sync + 'static,
    {
        Self {
            fitness: Arc::new(fitness),
        }
    }

    /// Evaluates `genome` once and wraps it into a shared organism.
    pub fn create(&self, genome: G) -> Arc<Organism<G>> {
        let fitness = (self.fitness)(&genome);
        Arc::new(Organism { genome, fitness })
    }
}

impl<G> Clone for OrganismFactory<G> {
    fn clone(&self) -> Self {
        Self {
            fitness: Arc::clone(&self.fitness),
        }
    }
}

impl<G> fmt::Debug for OrganismFactory<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganismFactory").finish_non_exhaustive()
    }
}

/// Comparator used by tournaments and elitism decorators.
///
/// `compare(a, b) == Greater` means `a` is preferred over `b`; the "extreme"
/// organism of a group is its maximum under this order.
pub struct OrganismOrder<G> {
    compare: Arc<dyn Fn(&Organism<G>, &Organism<G>) -> Ordering + Send + Sync>,
}

impl<G: 'static> OrganismOrder<G> {
    /// Prefers higher fitness.
    pub fn fitter() -> Self {
        Self::by(|a: &Organism<G>, b: &Organism<G>| a.cmp_fitness(b))
    }

    /// Prefers lower fitness. Used to pick victims.
    pub fn weaker() -> Self {
        Self::by(|a: &Organism<G>, b: &Organism<G>| b.cmp_fitness(a))
    }

    /// Custom preference order.
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn(&Organism<G>, &Organism<G>) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// The same order, reversed.
    pub fn reversed(&self) -> Self {
        let inner = Arc::clone(&self.compare);
        Self::by(move |a: &Organism<G>, b: &Organism<G>| inner(b, a))
    }
}

impl<G> OrganismOrder<G> {
    pub fn compare(&self, a: &Organism<G>, b: &Organism<G>) -> Ordering {
        (self.compare)(a, b)
    }

    /// Returns the `n` most preferred organisms, most preferred first.
    ///
    /// Ties keep their order of appearance in `organisms`.
    pub fn top(&self, organisms: &[Arc<Organism<G>>], n: usize) -> Vec<Arc<Organism<G>>> {
        let mut ranked: Vec<Arc<Organism<G>>> = organisms.to_vec();
        ranked.sort_by(|a, b| self.compare(b, a));
        ranked.truncate(n);
        ranked
    }
}

impl<G> Clone for OrganismOrder<G> {
    fn clone(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<G> fmt::Debug for OrganismOrder<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganismOrder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn value(g: &Vec<bool>) -> f64 {
        g.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64) as f64
    }

    #[test]
    fn test_factory_evaluates_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = OrganismFactory::new(move |g: &Vec<bool>| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            value(g)
        });

        let organism = factory.create(vec![true, true, false]);
        assert_eq!(organism.fitness(), 6.0);
        assert_eq!(organism.fitness(), 6.0);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_identity_differs_for_equal_genomes() {
        let factory = OrganismFactory::new(value);
        let a = factory.create(vec![true]);
        let b = factory.create(vec![true]);
        assert_eq!(a.cmp_fitness(&b), Ordering::Equal);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_orders() {
        let factory = OrganismFactory::new(value);
        let low = factory.create(vec![false, true]);
        let high = factory.create(vec![true, true]);

        assert_eq!(OrganismOrder::fitter().compare(&high, &low), Ordering::Greater);
        assert_eq!(OrganismOrder::weaker().compare(&high, &low), Ordering::Less);
        assert_eq!(
            OrganismOrder::fitter().reversed().compare(&high, &low),
            Ordering::Less
        );
    }

    #[test]
    fn test_top_n() {
        let factory = OrganismFactory::new(value);
        let organisms: Vec<_> = [3u8, 1, 7, 5]
            .iter()
            .map(|&v| factory.create((0..3).rev().map(|i| (v >> i) & 1 == 1).collect()))
            .collect();

        let best: Vec<f64> = OrganismOrder::fitter()
            .top(&organisms, 2)
            .iter()
            .map(|o| o.fitness())
            .collect();
        assert_eq!(best, vec![7.0, 5.0]);

        let worst: Vec<f64> = OrganismOrder::weaker()
            .top(&organisms, 10)
            .iter()
            .map(|o| o.fitness())
            .collect();
        assert_eq!(worst, vec![1.0, 3.0, 5.0, 7.0]);
    }
}
