//! Base selection strategies.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::{Rng, RngCore};

use super::sequence::collect_distinct;
use super::types::{Draws, Selector};
use crate::organism::{Organism, OrganismOrder};
use crate::population::Snapshot;

fn uniform_draw<G>(snapshot: &Snapshot<G>, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>> {
    if snapshot.is_empty() {
        return None;
    }
    Some(Arc::clone(&snapshot[rng.random_range(0..snapshot.len())]))
}

// ============================================================================
// Uniform
// ============================================================================

/// Every organism equally likely on every draw, with replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

struct UniformDraws<G> {
    snapshot: Snapshot<G>,
}

impl<G> Draws<G> for UniformDraws<G> {
    fn draw(&mut self, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>> {
        uniform_draw(&self.snapshot, rng)
    }

    fn pool_size(&self) -> usize {
        self.snapshot.len()
    }
}

impl<G> Selector<G> for Uniform {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        Box::new(UniformDraws { snapshot })
    }
}

// ============================================================================
// Roulette
// ============================================================================

type WeightFn<G> = dyn Fn(&Organism<G>) -> f64 + Send + Sync;

/// Fitness-proportionate selection with replacement.
///
/// Weights are shifted so the lowest one becomes zero: the probability of an
/// organism is `(w - min) / Σ(w - min)`. When every shifted weight is zero
/// (equal fitness everywhere) draws fall back to uniform.
///
/// The minimum organism therefore has probability zero whenever the
/// population is not flat. `NaN` and `-inf` weights count as zero. Organisms
/// weighing `+inf` outrank every finite weight: they share all draws equally.
pub struct Roulette<G> {
    weight: Arc<WeightFn<G>>,
}

impl<G> Roulette<G> {
    /// Weights organisms by fitness.
    pub fn by_fitness() -> Self {
        Self::with_weight(|o: &Organism<G>| o.fitness())
    }

    /// Weights organisms by an arbitrary key, shifted the same way.
    pub fn with_weight<F>(weight: F) -> Self
    where
        F: Fn(&Organism<G>) -> f64 + Send + Sync + 'static,
    {
        Self {
            weight: Arc::new(weight),
        }
    }
}

impl<G> Default for Roulette<G> {
    fn default() -> Self {
        Self::by_fitness()
    }
}

impl<G> Clone for Roulette<G> {
    fn clone(&self) -> Self {
        Self {
            weight: Arc::clone(&self.weight),
        }
    }
}

impl<G> fmt::Debug for Roulette<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roulette").finish_non_exhaustive()
    }
}

/// Shifts `raw` so its minimum becomes zero. `NaN` and `-inf` weigh zero.
///
/// Any `+inf` entry takes the whole wheel: the infinite entries share it
/// equally and every finite entry weighs zero.
fn shifted_weights(raw: &[f64]) -> Vec<f64> {
    if raw.contains(&f64::INFINITY) {
        return raw
            .iter()
            .map(|&w| if w == f64::INFINITY { 1.0 } else { 0.0 })
            .collect();
    }
    let min = raw
        .iter()
        .copied()
        .filter(|w| w.is_finite())
        .fold(f64::INFINITY, f64::min);
    raw.iter()
        .map(|&w| if w.is_finite() { w - min } else { 0.0 })
        .collect()
}

struct RouletteDraws<G> {
    snapshot: Snapshot<G>,
    // None: flat wheel, draw uniformly.
    wheel: Option<WeightedIndex<f64>>,
    pool: usize,
}

impl<G> Draws<G> for RouletteDraws<G> {
    fn draw(&mut self, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>> {
        match &self.wheel {
            Some(wheel) => Some(Arc::clone(&self.snapshot[wheel.sample(rng)])),
            None => uniform_draw(&self.snapshot, rng),
        }
    }

    fn pool_size(&self) -> usize {
        self.pool
    }
}

impl<G> Selector<G> for Roulette<G> {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        let raw: Vec<f64> = snapshot.iter().map(|o| (self.weight)(&**o)).collect();
        let weights = shifted_weights(&raw);
        let positive = weights.iter().filter(|&&w| w > 0.0).count();

        let wheel = if positive > 0 {
            WeightedIndex::new(&weights).ok()
        } else {
            None
        };
        let pool = if wheel.is_some() {
            positive
        } else {
            snapshot.len()
        };
        Box::new(RouletteDraws {
            snapshot,
            wheel,
            pool,
        })
    }
}

// ============================================================================
// Tournament
// ============================================================================

/// Tournament selection over an inner selector.
///
/// Each draw collects `size` distinct entrants from the inner sequence and
/// yields the most preferred one under `order`; ties among the most preferred
/// are broken uniformly at random. A size of zero behaves like one.
///
/// With a [`Uniform`] inner selector and `size == population size`, every
/// draw yields a best organism.
pub struct Tournament<G, S> {
    inner: S,
    size: usize,
    order: OrganismOrder<G>,
}

impl<G, S> Tournament<G, S> {
    pub fn new(inner: S, size: usize, order: OrganismOrder<G>) -> Self {
        Self { inner, size, order }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<G, S: fmt::Debug> fmt::Debug for Tournament<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tournament")
            .field("inner", &self.inner)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Most preferred entrant, ties broken by reservoir sampling.
fn pick_preferred<G>(
    entrants: Vec<Arc<Organism<G>>>,
    order: &OrganismOrder<G>,
    rng: &mut dyn RngCore,
) -> Option<Arc<Organism<G>>> {
    let mut best: Option<Arc<Organism<G>>> = None;
    let mut ties = 0u32;
    for entrant in entrants {
        let replace = match &best {
            None => {
                ties = 1;
                true
            }
            Some(current) => match order.compare(&entrant, current) {
                Ordering::Greater => {
                    ties = 1;
                    true
                }
                Ordering::Equal => {
                    ties += 1;
                    rng.random_range(0..ties) == 0
                }
                Ordering::Less => false,
            },
        };
        if replace {
            best = Some(entrant);
        }
    }
    best
}

struct TournamentDraws<'s, G> {
    inner: Box<dyn Draws<G> + 's>,
    size: usize,
    order: &'s OrganismOrder<G>,
}

impl<G> Draws<G> for TournamentDraws<'_, G> {
    fn draw(&mut self, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>> {
        let entrants = collect_distinct(&mut *self.inner, self.size.max(1), &[], &mut *rng);
        pick_preferred(entrants, self.order, rng)
    }

    fn pool_size(&self) -> usize {
        self.inner.pool_size()
    }
}

impl<G, S: Selector<G>> Selector<G> for Tournament<G, S> {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        Box::new(TournamentDraws {
            inner: self.inner.draws(snapshot),
            size: self.size,
            order: &self.order,
        })
    }
}
