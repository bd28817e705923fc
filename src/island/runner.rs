//! Round-robin island stepping with periodic migration.

use std::cmp::Ordering;
use std::sync::Arc;

use log::debug;

use super::config::IslandConfig;
use crate::engine::Engine;
use crate::error::{ConfigError, EvolveError};
use crate::genome::Genome;
use crate::organism::Organism;

/// One completed migration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Migration {
    /// Island whose best organism was copied.
    pub source: usize,
    /// Island whose best organism was replaced.
    pub target: usize,
    /// Fitness of the immigrant, as evaluated by the target island.
    pub fitness: f64,
}

/// A set of independently evolving engines with ring migration.
///
/// Each [`advance`](Self::advance) steps exactly one island (round-robin).
/// Every `migration_interval` steps, one pair of adjacent islands
/// `(k, k + 1 mod n)` exchanges: the best organism of the worse island is
/// replaced by a copy of the better island's best. Pairs rotate with each
/// migration. Islands whose bests are equally fit are left alone.
pub struct Archipelago<G: Genome> {
    islands: Vec<Engine<G>>,
    config: IslandConfig,
    cursor: usize,
    steps: usize,
    rounds: usize,
    migrations: usize,
}

impl<G: Genome> Archipelago<G> {
    pub fn new(islands: Vec<Engine<G>>, config: IslandConfig) -> Result<Self, EvolveError> {
        config.validate()?;
        if islands.is_empty() {
            return Err(ConfigError::NoIslands.into());
        }
        Ok(Self {
            islands,
            config,
            cursor: 0,
            steps: 0,
            rounds: 0,
            migrations: 0,
        })
    }

    /// Advances the next island by one generation, then migrates if due.
    pub fn advance(&mut self) -> Option<Migration> {
        self.islands[self.cursor].advance_one_generation();
        self.cursor = (self.cursor + 1) % self.islands.len();
        self.steps += 1;
        if self.steps % self.config.migration_interval == 0 {
            self.migrate()
        } else {
            None
        }
    }

    /// Advances every island once, starting from the current cursor.
    pub fn advance_round(&mut self) -> Vec<Migration> {
        (0..self.islands.len())
            .filter_map(|_| self.advance())
            .collect()
    }

    /// Advances every island once concurrently, then performs the migrations
    /// that fell due during the round, in order.
    ///
    /// Migrations happen after all islands finished their generation rather
    /// than between steps, so results differ from [`advance_round`](Self::advance_round).
    #[cfg(feature = "parallel")]
    pub fn advance_round_parallel(&mut self) -> Vec<Migration> {
        use rayon::prelude::*;

        self.islands
            .par_iter_mut()
            .for_each(|island| island.advance_one_generation());

        let interval = self.config.migration_interval;
        let before = self.steps;
        self.steps += self.islands.len();
        let due = self.steps / interval - before / interval;
        (0..due).filter_map(|_| self.migrate()).collect()
    }

    /// Performs `steps` single-island steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.advance();
        }
    }

    fn migrate(&mut self) -> Option<Migration> {
        let n = self.islands.len();
        let a = self.rounds % n;
        let b = (a + 1) % n;
        self.rounds += 1;
        if a == b {
            return None;
        }

        let best_a = self.islands[a].best_organism().ok()?;
        let best_b = self.islands[b].best_organism().ok()?;
        let (source, target, donor) = match best_a.cmp_fitness(&best_b) {
            Ordering::Greater => (a, b, best_a),
            Ordering::Less => (b, a, best_b),
            Ordering::Equal => {
                debug!("migration skipped: islands {a} and {b} are equally fit");
                return None;
            }
        };

        let immigrant = self.islands[target].replace_best_with(donor.genome().clone())?;
        self.migrations += 1;
        debug!(
            "migration {}: island {} -> island {} (fitness {})",
            self.migrations,
            source,
            target,
            immigrant.fitness()
        );
        Some(Migration {
            source,
            target,
            fitness: immigrant.fitness(),
        })
    }

    /// The fittest organism over all islands.
    pub fn best_organism(&self) -> Result<Arc<Organism<G>>, EvolveError> {
        self.islands
            .iter()
            .filter_map(|island| island.best_organism().ok())
            .reduce(|best, o| if o.cmp_fitness(&best).is_gt() { o } else { best })
            .ok_or(EvolveError::EmptyPopulation)
    }

    pub fn islands(&self) -> &[Engine<G>] {
        &self.islands
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    /// Total single-island steps performed.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Completed migrations (skipped ones are not counted).
    pub fn migrations(&self) -> usize {
        self.migrations
    }
}

impl<G: Genome> std::fmt::Debug for Archipelago<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archipelago")
            .field("islands", &self.islands.len())
            .field("config", &self.config)
            .field("steps", &self.steps)
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossover::NoCrossover;
    use crate::engine::EngineConfig;
    use crate::mutation::{MutationExt, NoMutation, PointMutation};
    use crate::organism::{OrganismFactory, OrganismOrder};
    use crate::selection::{SelectorExt, Uniform};
    use rand::{Rng, RngCore};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    const BITS: usize = 10;

    fn encode(value: usize) -> Vec<bool> {
        (0..BITS).rev().map(|i| (value >> i) & 1 == 1).collect()
    }

    fn decode(genome: &Vec<bool>) -> f64 {
        genome.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize) as f64
    }

    /// Island holding values `base..base + size`. With `lambda == 0` its
    /// population never changes on its own.
    fn island(base: usize, size: usize, lambda: usize, seed: u64) -> Engine<Vec<bool>> {
        let next = AtomicUsize::new(base);
        let config = EngineConfig {
            select_good: Box::new(Uniform),
            select_bad: Box::new(Uniform),
            mutation: Box::new(NoMutation),
            crossover: Box::new(NoCrossover),
            organism_factory: OrganismFactory::new(decode),
            crossover_probability: 0.0,
            initial_population_size: size,
            initial_population: Box::new(move |_rng: &mut dyn RngCore| {
                encode(next.fetch_add(1, AtomicOrdering::SeqCst))
            }),
            lambda,
        };
        Engine::with_seed(config, Some(seed)).unwrap()
    }

    fn fitnesses(engine: &Engine<Vec<bool>>) -> Vec<f64> {
        let mut values: Vec<f64> = engine.population().iter().map(|o| o.fitness()).collect();
        values.sort_by(f64::total_cmp);
        values
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let empty: Vec<Engine<Vec<bool>>> = Vec::new();
        assert_eq!(
            Archipelago::new(empty, IslandConfig::default()).unwrap_err(),
            EvolveError::Config(ConfigError::NoIslands)
        );
        assert_eq!(
            Archipelago::new(
                vec![island(0, 4, 1, 0)],
                IslandConfig::default().with_migration_interval(0)
            )
            .unwrap_err(),
            EvolveError::Config(ConfigError::MigrationInterval)
        );
    }

    #[test]
    fn test_round_robin_stepping() {
        let islands = vec![island(0, 6, 2, 1), island(0, 6, 2, 2), island(0, 6, 2, 3)];
        let config = IslandConfig::default().with_migration_interval(1000);
        let mut archipelago = Archipelago::new(islands, config).unwrap();

        archipelago.run(5);
        let generations: Vec<usize> = archipelago
            .islands()
            .iter()
            .map(|i| i.current_generation())
            .collect();
        assert_eq!(generations, vec![2, 2, 1]);
        assert_eq!(archipelago.steps(), 5);

        archipelago.advance_round();
        let generations: Vec<usize> = archipelago
            .islands()
            .iter()
            .map(|i| i.current_generation())
            .collect();
        assert_eq!(generations, vec![3, 3, 2]);
    }

    #[test]
    fn test_migration_replaces_best_of_worse_island() {
        let islands = vec![island(0, 10, 0, 1), island(100, 10, 0, 2)];
        let config = IslandConfig::default().with_migration_interval(2);
        let mut archipelago = Archipelago::new(islands, config).unwrap();

        assert_eq!(archipelago.advance(), None);
        let migration = archipelago.advance().expect("due after two steps");
        assert_eq!(
            migration,
            Migration {
                source: 1,
                target: 0,
                fitness: 109.0
            }
        );

        let receiver = fitnesses(&archipelago.islands()[0]);
        assert_eq!(receiver.len(), 10);
        assert_eq!(receiver.last(), Some(&109.0));
        assert!(!receiver.contains(&9.0));
        assert_eq!(
            fitnesses(&archipelago.islands()[1]),
            (100..110).map(|v| v as f64).collect::<Vec<_>>()
        );
        assert_eq!(archipelago.migrations(), 1);
    }

    #[test]
    fn test_equal_bests_skip_migration() {
        let islands = vec![island(0, 5, 0, 1), island(0, 5, 0, 2)];
        let config = IslandConfig::default().with_migration_interval(1);
        let mut archipelago = Archipelago::new(islands, config).unwrap();

        archipelago.run(6);
        assert_eq!(archipelago.migrations(), 0);
        assert_eq!(fitnesses(&archipelago.islands()[0]), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_migration_pairs_rotate_around_the_ring() {
        // Bests: 10, 20, 30.
        let islands = vec![island(1, 10, 0, 1), island(11, 10, 0, 2), island(21, 10, 0, 3)];
        let config = IslandConfig::default().with_migration_interval(1);
        let mut archipelago = Archipelago::new(islands, config).unwrap();

        let events: Vec<(usize, usize, f64)> = (0..3)
            .filter_map(|_| archipelago.advance())
            .map(|m| (m.source, m.target, m.fitness))
            .collect();
        // (0,1): 20 beats 10. (1,2): 30 beats 20. (2,0): 30 beats island 0's new 20.
        assert_eq!(events, vec![(1, 0, 20.0), (2, 1, 30.0), (2, 0, 30.0)]);
    }

    #[test]
    fn test_single_island_never_migrates() {
        let config = IslandConfig::default().with_migration_interval(1);
        let mut archipelago = Archipelago::new(vec![island(0, 5, 1, 4)], config).unwrap();
        archipelago.run(10);
        assert_eq!(archipelago.migrations(), 0);
        assert_eq!(archipelago.islands()[0].current_generation(), 10);
    }

    #[test]
    fn test_best_over_all_islands() {
        let islands = vec![island(0, 5, 0, 1), island(40, 5, 0, 2), island(20, 5, 0, 3)];
        let archipelago = Archipelago::new(islands, IslandConfig::default()).unwrap();
        assert_eq!(archipelago.best_organism().unwrap().fitness(), 44.0);

        let empty = Archipelago::new(vec![island(0, 0, 0, 1)], IslandConfig::default()).unwrap();
        assert_eq!(empty.best_organism().unwrap_err(), EvolveError::EmptyPopulation);
    }

    #[test]
    fn test_islands_evolve_onemax() {
        let onemax = |seed: u64| {
            let config = EngineConfig {
                select_good: Uniform.tournament(3, OrganismOrder::fitter()).boxed(),
                select_bad: Uniform
                    .tournament(3, OrganismOrder::weaker())
                    .spare(1, OrganismOrder::fitter())
                    .boxed(),
                mutation: PointMutation::distinct_n(1).boxed(),
                crossover: Box::new(NoCrossover),
                organism_factory: OrganismFactory::new(|g: &Vec<bool>| {
                    g.iter().filter(|&&b| b).count() as f64
                }),
                crossover_probability: 0.0,
                initial_population_size: 20,
                initial_population: Box::new(|rng: &mut dyn RngCore| {
                    (0..32).map(|_| rng.random_bool(0.1)).collect()
                }),
                lambda: 4,
            };
            Engine::with_seed(config, Some(seed)).unwrap()
        };
        let islands = (0..4).map(onemax).collect();
        let mut archipelago = Archipelago::new(islands, IslandConfig::default()).unwrap();
        let start = archipelago.best_organism().unwrap().fitness();
        archipelago.run(400);
        assert!(archipelago.best_organism().unwrap().fitness() > start);
        assert!(archipelago.migrations() <= 40);
        assert!(archipelago
            .islands()
            .iter()
            .all(|i| i.population().len() == 20));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_round_matches_step_and_migration_counts() {
        let islands = vec![island(0, 10, 0, 1), island(100, 10, 0, 2), island(50, 10, 0, 3)];
        let config = IslandConfig::default().with_migration_interval(2);
        let mut archipelago = Archipelago::new(islands, config).unwrap();

        // Steps 1..=3 cross one multiple of 2: pair (0, 1), 109 beats 9.
        let first = archipelago.advance_round_parallel();
        assert_eq!(first.len(), 1);
        // Steps 4..=6 cross two: (1, 2) moves 109 over 59, then (2, 0) ties.
        let second = archipelago.advance_round_parallel();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].target, 2);
        assert_eq!(archipelago.migrations(), 2);
        assert_eq!(archipelago.steps(), 6);
        assert!(archipelago
            .islands()
            .iter()
            .all(|i| i.current_generation() == 2));
    }
}
