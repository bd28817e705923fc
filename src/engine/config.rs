//! Engine configuration.
//!
//! [`EngineConfig`] enumerates every strategy and numeric parameter the
//! generational loop needs. It has no `Default`: each field is written out in
//! the struct literal, so a configuration with a missing field does not
//! compile.

use std::fmt;

use rand::RngCore;

use crate::crossover::Crossover;
use crate::error::ConfigError;
use crate::mutation::Mutation;
use crate::organism::OrganismFactory;
use crate::selection::Selector;

/// Produces the genomes of the initial population.
pub type GenomeSupplier<G> = Box<dyn Fn(&mut dyn RngCore) -> G + Send + Sync>;

/// Configuration for one [`Engine`](super::Engine).
///
/// # Examples
///
/// ```
/// use rand::{Rng, RngCore};
/// use u_evolve::crossover::NoCrossover;
/// use u_evolve::engine::EngineConfig;
/// use u_evolve::mutation::{MutationExt, PointMutation};
/// use u_evolve::organism::{OrganismFactory, OrganismOrder};
/// use u_evolve::selection::{SelectorExt, Uniform};
///
/// let config: EngineConfig<Vec<bool>> = EngineConfig {
///     select_good: Uniform.tournament(3, OrganismOrder::fitter()).boxed(),
///     select_bad: Uniform
///         .tournament(3, OrganismOrder::weaker())
///         .spare(1, OrganismOrder::fitter())
///         .boxed(),
///     mutation: PointMutation::distinct_n(1).boxed(),
///     crossover: Box::new(NoCrossover),
///     organism_factory: OrganismFactory::new(|g: &Vec<bool>| {
///         g.iter().filter(|&&b| b).count() as f64
///     }),
///     crossover_probability: 0.2,
///     initial_population_size: 30,
///     initial_population: Box::new(|rng: &mut dyn RngCore| {
///         (0..16).map(|_| rng.random_bool(0.5)).collect()
///     }),
///     lambda: 5,
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct EngineConfig<G> {
    /// Parent selector.
    pub select_good: Box<dyn Selector<G>>,

    /// Victim selector. `lambda` distinct organisms are drawn from it per
    /// generation.
    pub select_bad: Box<dyn Selector<G>>,

    /// Applied to every asexual offspring.
    pub mutation: Box<dyn Mutation<G>>,

    /// Applied to every sexual offspring.
    pub crossover: Box<dyn Crossover<G>>,

    /// Evaluates every genome that becomes an organism.
    pub organism_factory: OrganismFactory<G>,

    /// Probability that a given reproduction event is sexual (0.0–1.0).
    ///
    /// The number of sexual events per generation is
    /// Binomial(`lambda`, `crossover_probability`).
    pub crossover_probability: f64,

    /// Number of genomes drawn from `initial_population`.
    pub initial_population_size: usize,

    /// Genome supplier for the initial population.
    pub initial_population: GenomeSupplier<G>,

    /// Organisms replaced per generation.
    pub lambda: usize,
}

impl<G> EngineConfig<G> {
    /// Validates the numeric parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(ConfigError::CrossoverProbability(
                self.crossover_probability,
            ));
        }
        Ok(())
    }
}

impl<G> fmt::Debug for EngineConfig<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("crossover_probability", &self.crossover_probability)
            .field("initial_population_size", &self.initial_population_size)
            .field("lambda", &self.lambda)
            .finish_non_exhaustive()
    }
}
