//! Composition of mutations: repetition and sequencing.

use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use rand_distr::{Binomial, Distribution, Poisson};

use super::types::{Mutation, MutationStats};
use crate::genome::Genome;

/// How many times a repeated mutation is applied.
///
/// The count is drawn anew on every application, against the genome as it is
/// at that moment, so per-locus rates follow the genome as it grows or
/// shrinks.
pub enum MutationCount<G> {
    /// Always `n` times.
    Fixed(usize),
    /// Poisson distributed with the given mean.
    Poisson { mean: f64 },
    /// Poisson distributed with mean `rate × genome.size()`.
    PoissonPerLocus { rate: f64 },
    /// One Bernoulli(`rate`) trial per locus.
    BinomialPerLocus { rate: f64 },
    /// Arbitrary genome-dependent count.
    Custom(Arc<dyn Fn(&G, &mut dyn RngCore) -> usize + Send + Sync>),
}

impl<G: Genome> MutationCount<G> {
    /// Draws a count for `genome`.
    ///
    /// Degenerate parameters (non-positive or non-finite means and rates)
    /// yield zero rather than an error; `BinomialPerLocus` clamps the rate
    /// into `[0, 1]`.
    pub fn sample(&self, genome: &G, rng: &mut dyn RngCore) -> usize {
        match self {
            MutationCount::Fixed(n) => *n,
            MutationCount::Poisson { mean } => poisson(*mean, rng),
            MutationCount::PoissonPerLocus { rate } => poisson(rate * genome.size() as f64, rng),
            MutationCount::BinomialPerLocus { rate } => {
                let rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
                match Binomial::new(genome.size() as u64, rate) {
                    Ok(dist) => dist.sample(rng) as usize,
                    Err(_) => 0,
                }
            }
            MutationCount::Custom(f) => f(genome, rng),
        }
    }
}

fn poisson(mean: f64, rng: &mut dyn RngCore) -> usize {
    if !(mean.is_finite() && mean > 0.0) {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(dist) => {
            let draw: f64 = dist.sample(rng);
            draw as usize
        }
        Err(_) => 0,
    }
}

impl<G> Clone for MutationCount<G> {
    fn clone(&self) -> Self {
        match self {
            MutationCount::Fixed(n) => MutationCount::Fixed(*n),
            MutationCount::Poisson { mean } => MutationCount::Poisson { mean: *mean },
            MutationCount::PoissonPerLocus { rate } => MutationCount::PoissonPerLocus { rate: *rate },
            MutationCount::BinomialPerLocus { rate } => {
                MutationCount::BinomialPerLocus { rate: *rate }
            }
            MutationCount::Custom(f) => MutationCount::Custom(Arc::clone(f)),
        }
    }
}

impl<G> fmt::Debug for MutationCount<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationCount::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            MutationCount::Poisson { mean } => f.debug_struct("Poisson").field("mean", mean).finish(),
            MutationCount::PoissonPerLocus { rate } => {
                f.debug_struct("PoissonPerLocus").field("rate", rate).finish()
            }
            MutationCount::BinomialPerLocus { rate } => {
                f.debug_struct("BinomialPerLocus").field("rate", rate).finish()
            }
            MutationCount::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Applies an inner mutation a random number of times.
///
/// Built with [`MutationExt::repeat`](super::MutationExt::repeat).
#[derive(Debug)]
pub struct Repeat<G, M> {
    inner: M,
    count: MutationCount<G>,
}

impl<G, M> Repeat<G, M> {
    pub fn new(inner: M, count: MutationCount<G>) -> Self {
        Self { inner, count }
    }
}

impl<G: Genome, M: Mutation<G>> Mutation<G> for Repeat<G, M> {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let times = self.count.sample(genome, rng);
        for _ in 0..times {
            self.inner.mutate(genome, rng, stats);
        }
    }
}

/// Applies a fixed sequence of mutations in order, sharing one generator
/// and one statistics accumulator.
///
/// # Examples
///
/// ```
/// use u_evolve::mutation::{Compose, Deletion, MutationStats, Mutation, PointMutation, SegmentLength};
/// use u_evolve::random::create_rng;
///
/// let pipeline = Compose::new()
///     .then(PointMutation::distinct_n(2))
///     .then(Deletion::new(SegmentLength::Fixed(1)));
///
/// let mut genome = vec![false; 10];
/// let mut stats = MutationStats::default();
/// pipeline.mutate(&mut genome, &mut create_rng(5), &mut stats);
/// assert_eq!(genome.len(), 9);
/// assert_eq!(stats.total_count(), 3);
/// ```
pub struct Compose<G> {
    steps: Vec<Box<dyn Mutation<G>>>,
}

impl<G> Compose<G> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step to the end of the pipeline.
    pub fn then<M>(mut self, step: M) -> Self
    where
        M: Mutation<G> + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<G> Default for Compose<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> From<Vec<Box<dyn Mutation<G>>>> for Compose<G> {
    fn from(steps: Vec<Box<dyn Mutation<G>>>) -> Self {
        Self { steps }
    }
}

impl<G> Mutation<G> for Compose<G> {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        for step in &self.steps {
            step.mutate(genome, rng, stats);
        }
    }
}
