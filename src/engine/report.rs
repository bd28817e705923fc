//! Per-generation statistics and engine reports.

use std::fmt;
use std::sync::Arc;

use crate::mutation::MutationStats;
use crate::organism::Organism;

/// What happened during one generation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GenerationStats {
    /// Generation number after the step (the first step yields 1).
    pub generation: usize,

    /// Organisms removed by the kill set.
    pub killed: usize,

    /// Offspring produced by crossover.
    pub sexual_offspring: usize,

    /// Offspring produced by mutation.
    pub asexual_offspring: usize,

    /// Sexual events dropped because no distinct pair could be drawn.
    pub skipped_sexual: usize,

    /// Asexual events dropped because no parent could be drawn.
    pub skipped_asexual: usize,

    /// Population size after the commit.
    pub population_size: usize,

    /// Best fitness after the commit (`None` for an empty population).
    pub best_fitness: Option<f64>,

    /// Mean fitness after the commit (`None` for an empty population).
    pub mean_fitness: Option<f64>,

    /// Effects of every mutation applied during the generation.
    pub mutations: MutationStats,
}

impl GenerationStats {
    /// Total offspring added.
    pub fn born(&self) -> usize {
        self.sexual_offspring + self.asexual_offspring
    }
}

/// Snapshot of an engine's state for external observers.
#[derive(Debug)]
pub struct EngineReport<G> {
    pub generation: usize,
    pub population_size: usize,
    /// Fittest organism, `None` when the population is empty.
    pub best: Option<Arc<Organism<G>>>,
}

impl<G> EngineReport<G> {
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().map(|o| o.fitness())
    }

    pub fn best_genome(&self) -> Option<&G> {
        self.best.as_deref().map(Organism::genome)
    }
}

impl<G> Clone for EngineReport<G> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            population_size: self.population_size,
            best: self.best.clone(),
        }
    }
}

impl<G: fmt::Debug> fmt::Display for EngineReport<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {} | population {}",
            self.generation, self.population_size
        )?;
        match &self.best {
            Some(best) => write!(
                f,
                " | best fitness {} | best genome {:?}",
                best.fitness(),
                best.genome()
            ),
            None => write!(f, " | no organisms"),
        }
    }
}
