//! Generational loop execution.
//!
//! [`Engine`] owns one population, one random source, and the strategies of
//! an [`EngineConfig`]. Each call to [`Engine::advance_one_generation`]
//! replaces `lambda` organisms:
//!
//! 1. snapshot → kill set of `lambda` distinct victims (bad selector)
//! 2. number of sexual events ~ Binomial(`lambda`, `crossover_probability`)
//! 3. parents drawn from the same snapshot (good selector)
//! 4. offspring bred and evaluated
//! 5. commit: kill the victims, add the offspring

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace, warn};
use rand::RngCore;
use rand_distr::{Binomial, Distribution};

use super::config::EngineConfig;
use super::report::{EngineReport, GenerationStats};
use crate::error::{ConfigError, EvolveError};
use crate::genome::Genome;
use crate::mutation::MutationStats;
use crate::organism::{Organism, OrganismFactory};
use crate::population::{asexual_offspring, sexual_offspring, Population};
use crate::random::{create_rng, EvoRng};

/// A single evolving population.
///
/// # Usage
///
/// ```
/// use rand::{Rng, RngCore};
/// use u_evolve::crossover::NoCrossover;
/// use u_evolve::engine::{Engine, EngineConfig};
/// use u_evolve::mutation::{MutationExt, PointMutation};
/// use u_evolve::organism::{OrganismFactory, OrganismOrder};
/// use u_evolve::selection::{SelectorExt, Uniform};
///
/// let config: EngineConfig<Vec<bool>> = EngineConfig {
///     select_good: Uniform.tournament(4, OrganismOrder::fitter()).boxed(),
///     select_bad: Uniform
///         .tournament(4, OrganismOrder::weaker())
///         .spare(1, OrganismOrder::fitter())
///         .boxed(),
///     mutation: PointMutation::distinct_n(1).boxed(),
///     crossover: Box::new(NoCrossover),
///     organism_factory: OrganismFactory::new(|g: &Vec<bool>| {
///         g.iter().filter(|&&b| b).count() as f64
///     }),
///     crossover_probability: 0.0,
///     initial_population_size: 40,
///     initial_population: Box::new(|rng: &mut dyn RngCore| {
///         (0..24).map(|_| rng.random_bool(0.2)).collect()
///     }),
///     lambda: 8,
/// };
///
/// let mut engine = Engine::with_seed(config, Some(42)).unwrap();
/// let before = engine.best_organism().unwrap().fitness();
/// engine.run(100);
/// assert_eq!(engine.current_generation(), 100);
/// assert_eq!(engine.population().len(), 40);
/// // The fittest organism is spared from every kill set.
/// assert!(engine.best_organism().unwrap().fitness() >= before);
/// ```
pub struct Engine<G: Genome> {
    config: EngineConfig<G>,
    sex_events: Binomial,
    population: Population<G>,
    rng: EvoRng,
    generation: usize,
    last: Option<GenerationStats>,
}

impl<G: Genome> Engine<G> {
    /// Validates `config`, draws the initial genomes from `rng`, and
    /// evaluates them.
    pub fn new(config: EngineConfig<G>, mut rng: EvoRng) -> Result<Self, EvolveError> {
        config.validate()?;
        let sex_events = Binomial::new(config.lambda as u64, config.crossover_probability)
            .map_err(|_| ConfigError::CrossoverProbability(config.crossover_probability))?;

        // Genomes are drawn sequentially so the seed alone fixes them.
        let genomes: Vec<G> = {
            let rng: &mut dyn RngCore = &mut rng;
            (0..config.initial_population_size)
                .map(|_| (config.initial_population)(&mut *rng))
                .collect()
        };
        let population: Population<G> = evaluate_all(&config.organism_factory, genomes)
            .into_iter()
            .collect();
        debug!(
            "engine initialised: {} organisms, lambda {}, crossover probability {}",
            population.len(),
            config.lambda,
            config.crossover_probability
        );

        Ok(Self {
            config,
            sex_events,
            population,
            rng,
            generation: 0,
            last: None,
        })
    }

    /// Like [`new`](Self::new) with a generator seeded from `seed`, or from
    /// OS entropy when `None`.
    pub fn with_seed(config: EngineConfig<G>, seed: Option<u64>) -> Result<Self, EvolveError> {
        let rng = match seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::new(config, rng)
    }

    /// Runs one selection → reproduction → replacement cycle.
    ///
    /// Reproduction events whose parents cannot be drawn are skipped; the
    /// kill set is still removed.
    pub fn advance_one_generation(&mut self) {
        let lambda = self.config.lambda;
        let snapshot = self.population.snapshot();
        let rng: &mut dyn RngCore = &mut self.rng;

        let doomed = self
            .config
            .select_bad
            .select(snapshot.clone(), &mut *rng)
            .take_distinct(lambda);
        if doomed.len() < lambda {
            warn!(
                "generation {}: kill set under-filled ({} of {} victims, population {})",
                self.generation + 1,
                doomed.len(),
                lambda,
                snapshot.len()
            );
        }

        let doing_sex = (self.sex_events.sample(&mut *rng) as usize).min(lambda);

        let mut stats = GenerationStats::default();
        let (couples, singles) = {
            let mut lucky = self.config.select_good.select(snapshot, &mut *rng);
            let mut couples = Vec::with_capacity(doing_sex);
            for _ in 0..doing_sex {
                let couple = lucky.take1().and_then(|mom| {
                    let dad = lucky.take1_excluding(std::slice::from_ref(&mom))?;
                    Some((mom, dad))
                });
                match couple {
                    Some(couple) => couples.push(couple),
                    None => stats.skipped_sexual += 1,
                }
            }
            let singles = lucky.take_n(lambda - doing_sex);
            stats.skipped_asexual = lambda - doing_sex - singles.len();
            (couples, singles)
        };
        if stats.skipped_sexual + stats.skipped_asexual > 0 {
            trace!(
                "generation {}: skipped {} sexual and {} asexual events",
                self.generation + 1,
                stats.skipped_sexual,
                stats.skipped_asexual
            );
        }

        let factory = &self.config.organism_factory;
        let mut born: Vec<Arc<Organism<G>>> = Vec::with_capacity(couples.len() + singles.len());
        for (mom, dad) in &couples {
            born.push(sexual_offspring(
                &*self.config.crossover,
                factory,
                mom,
                dad,
                &mut *rng,
            ));
        }
        let mut mutations = MutationStats::default();
        for parent in &singles {
            born.push(asexual_offspring(
                &*self.config.mutation,
                factory,
                parent,
                &mut *rng,
                &mut mutations,
            ));
        }

        stats.killed = self.population.kill_all(&doomed);
        self.population.add_all(born);
        self.generation += 1;

        stats.generation = self.generation;
        stats.sexual_offspring = couples.len();
        stats.asexual_offspring = singles.len();
        stats.population_size = self.population.len();
        stats.best_fitness = self.population.best().map(|o| o.fitness());
        stats.mean_fitness = self.population.mean_fitness();
        stats.mutations = mutations;

        debug!(
            "generation {}: killed {}, born {} ({} sexual, {} asexual), best {:?}",
            stats.generation,
            stats.killed,
            stats.born(),
            stats.sexual_offspring,
            stats.asexual_offspring,
            stats.best_fitness
        );
        self.last = Some(stats);
    }

    /// Advances `generations` times.
    pub fn run(&mut self, generations: usize) {
        for _ in 0..generations {
            self.advance_one_generation();
        }
    }

    /// Advances up to `generations` times, checking `cancel` before each
    /// generation. Returns the number of generations executed.
    pub fn run_with_cancel(&mut self, generations: usize, cancel: Option<Arc<AtomicBool>>) -> usize {
        for executed in 0..generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    debug!("run cancelled after {executed} generations");
                    return executed;
                }
            }
            self.advance_one_generation();
        }
        generations
    }

    /// The fittest organism of the current population.
    pub fn best_organism(&self) -> Result<Arc<Organism<G>>, EvolveError> {
        self.population
            .best()
            .cloned()
            .ok_or(EvolveError::EmptyPopulation)
    }

    /// Number of completed generations.
    pub fn current_generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    pub fn config(&self) -> &EngineConfig<G> {
        &self.config
    }

    /// Statistics of the most recent generation, `None` before the first.
    pub fn last_generation(&self) -> Option<&GenerationStats> {
        self.last.as_ref()
    }

    pub fn report(&self) -> EngineReport<G> {
        EngineReport {
            generation: self.generation,
            population_size: self.population.len(),
            best: self.population.best().cloned(),
        }
    }

    /// Evaluates `genome` with this engine's factory and substitutes it for
    /// the current best organism.
    ///
    /// Returns the immigrant, or `None` when the population is empty.
    pub(crate) fn replace_best_with(&mut self, genome: G) -> Option<Arc<Organism<G>>> {
        let best = Arc::clone(self.population.best()?);
        let immigrant = self.config.organism_factory.create(genome);
        self.population
            .replace(&best, Arc::clone(&immigrant))
            .then_some(immigrant)
    }
}

impl<G: Genome> fmt::Debug for Engine<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("generation", &self.generation)
            .field("population_size", &self.population.len())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "parallel")]
fn evaluate_all<G: Genome>(factory: &OrganismFactory<G>, genomes: Vec<G>) -> Vec<Arc<Organism<G>>> {
    use rayon::prelude::*;
    genomes.into_par_iter().map(|g| factory.create(g)).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all<G: Genome>(factory: &OrganismFactory<G>, genomes: Vec<G>) -> Vec<Arc<Organism<G>>> {
    genomes.into_iter().map(|g| factory.create(g)).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossover::{from_fn as crossover_fn, NoCrossover};
    use crate::mutation::{MutationExt, NoMutation, PointMutation, POINT_MUTATION};
    use crate::organism::OrganismOrder;
    use crate::selection::{Roulette, SelectorExt, Uniform};
    use rand::Rng;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    const BITS: usize = 12;

    fn encode(value: usize) -> Vec<bool> {
        (0..BITS).rev().map(|i| (value >> i) & 1 == 1).collect()
    }

    fn decode(genome: &Vec<bool>) -> f64 {
        genome.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize) as f64
    }

    fn ones(genome: &Vec<bool>) -> f64 {
        genome.iter().filter(|&&b| b).count() as f64
    }

    /// Supplier yielding 0, 1, 2, ... as binary genomes.
    fn counting_supplier() -> crate::engine::GenomeSupplier<Vec<bool>> {
        let next = AtomicUsize::new(0);
        Box::new(move |_rng: &mut dyn RngCore| encode(next.fetch_add(1, Ordering::SeqCst)))
    }

    fn uniform_config(size: usize, lambda: usize, p: f64) -> EngineConfig<Vec<bool>> {
        EngineConfig {
            select_good: Box::new(Uniform),
            select_bad: Box::new(Uniform),
            mutation: Box::new(NoMutation),
            crossover: Box::new(NoCrossover),
            organism_factory: OrganismFactory::new(decode),
            crossover_probability: p,
            initial_population_size: size,
            initial_population: counting_supplier(),
            lambda,
        }
    }

    // ---- Construction ----

    #[test]
    fn test_new_builds_initial_population() {
        let engine = Engine::with_seed(uniform_config(50, 10, 0.0), Some(0)).unwrap();
        assert_eq!(engine.population().len(), 50);
        assert_eq!(engine.current_generation(), 0);
        assert!(engine.last_generation().is_none());
        assert_eq!(engine.best_organism().unwrap().fitness(), 49.0);
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let result = Engine::with_seed(uniform_config(10, 2, 1.5), Some(0));
        assert!(matches!(
            result,
            Err(EvolveError::Config(ConfigError::CrossoverProbability(p))) if p == 1.5
        ));
    }

    #[test]
    fn test_best_of_empty_population_is_error() {
        let mut engine = Engine::with_seed(uniform_config(0, 4, 0.5), Some(1)).unwrap();
        assert_eq!(engine.best_organism().unwrap_err(), EvolveError::EmptyPopulation);

        // Advancing an empty engine is a no-op, not a crash.
        engine.advance_one_generation();
        let stats = engine.last_generation().unwrap();
        assert_eq!(stats.killed, 0);
        assert_eq!(stats.born(), 0);
        assert_eq!(stats.skipped_sexual + stats.skipped_asexual, 4);
        assert!(stats.best_fitness.is_none());
        assert_eq!(engine.current_generation(), 1);
    }

    // ---- Generation semantics ----

    #[test]
    fn test_worst_replaced_by_copies_of_best() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = EngineConfig {
            select_good: Uniform.tournament(50, OrganismOrder::fitter()).boxed(),
            select_bad: Uniform.ensure(10, OrganismOrder::weaker()).boxed(),
            ..uniform_config(50, 10, 0.0)
        };
        let mut engine = Engine::with_seed(config, Some(7)).unwrap();
        engine.advance_one_generation();

        let fitnesses: Vec<f64> = engine.population().iter().map(|o| o.fitness()).collect();
        assert_eq!(fitnesses.len(), 50);
        assert!(fitnesses.iter().all(|&f| f >= 10.0), "a weak organism survived");
        assert_eq!(fitnesses.iter().filter(|&&f| f == 49.0).count(), 11);

        let stats = engine.last_generation().unwrap();
        assert_eq!(stats.killed, 10);
        assert_eq!(stats.asexual_offspring, 10);
        assert_eq!(stats.sexual_offspring, 0);
        assert_eq!(stats.best_fitness, Some(49.0));
    }

    #[test]
    fn test_sexual_share_follows_probability() {
        let mut engine = Engine::with_seed(uniform_config(2000, 1000, 0.3), Some(11)).unwrap();
        let generations = 20;
        let mut sexual = 0;
        for _ in 0..generations {
            engine.advance_one_generation();
            let stats = engine.last_generation().unwrap();
            assert_eq!(stats.born(), 1000);
            assert_eq!(stats.killed, 1000);
            assert_eq!(stats.population_size, 2000);
            sexual += stats.sexual_offspring;
        }
        let mean = sexual as f64 / generations as f64;
        assert!((mean - 300.0).abs() < 15.0, "mean sexual offspring {mean}");
    }

    #[test]
    fn test_parents_are_never_the_same_organism() {
        // Every organism carries a unique genome: the crossover stamps fresh
        // ids on both recombinants, so equal inputs can only mean self-pairing.
        let next_id = Arc::new(AtomicUsize::new(1000));
        let self_paired = Arc::new(AtomicBool::new(false));
        let (ids, flag) = (Arc::clone(&next_id), Arc::clone(&self_paired));
        let stamp = crossover_fn(move |a: &mut Vec<bool>, b: &mut Vec<bool>, _rng: &mut dyn RngCore| {
            if a == b {
                flag.store(true, Ordering::SeqCst);
            }
            *a = encode(ids.fetch_add(1, Ordering::SeqCst));
            *b = encode(ids.fetch_add(1, Ordering::SeqCst));
        });
        let config = EngineConfig {
            crossover: Box::new(stamp),
            ..uniform_config(5, 2, 1.0)
        };
        let mut engine = Engine::with_seed(config, Some(3)).unwrap();
        for _ in 0..300 {
            engine.advance_one_generation();
            assert_eq!(engine.last_generation().unwrap().sexual_offspring, 2);
        }
        assert!(!self_paired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_sexual_offspring_uses_first_recombinant_only() {
        // Crossover turns the first recombinant into all-ones and the second
        // into all-zeros; only all-ones children may appear.
        let split = crossover_fn(|a: &mut Vec<bool>, b: &mut Vec<bool>, _rng: &mut dyn RngCore| {
            a.iter_mut().for_each(|x| *x = true);
            b.iter_mut().for_each(|x| *x = false);
        });
        let config = EngineConfig {
            crossover: Box::new(split),
            select_bad: Uniform.spare(20, OrganismOrder::weaker()).boxed(),
            ..uniform_config(40, 10, 1.0)
        };
        let mut engine = Engine::with_seed(config, Some(5)).unwrap();
        engine.advance_one_generation();

        let all_ones = decode(&vec![true; BITS]);
        let children = engine
            .population()
            .iter()
            .filter(|o| o.fitness() == all_ones)
            .count();
        assert_eq!(children, 10);
        assert!(engine.population().iter().all(|o| o.fitness() < 40.0 || o.fitness() == all_ones));
    }

    #[test]
    fn test_small_population_underfills_kill_set() {
        let mut engine = Engine::with_seed(uniform_config(3, 5, 0.5), Some(9)).unwrap();
        engine.advance_one_generation();
        let stats = engine.last_generation().unwrap();
        assert_eq!(stats.killed, 3);
        assert_eq!(stats.born(), 5);
        assert_eq!(engine.population().len(), 5);
    }

    #[test]
    fn test_mutation_stats_are_aggregated() {
        let config = EngineConfig {
            mutation: PointMutation::distinct_n(2).boxed(),
            ..uniform_config(30, 10, 0.0)
        };
        let mut engine = Engine::with_seed(config, Some(2)).unwrap();
        engine.advance_one_generation();
        let stats = engine.last_generation().unwrap();
        assert_eq!(stats.mutations.get(POINT_MUTATION).count, 20);
    }

    #[test]
    fn test_population_size_is_stable() {
        let config = EngineConfig {
            select_good: Roulette::by_fitness().boxed(),
            select_bad: Uniform
                .tournament(3, OrganismOrder::weaker())
                .spare(2, OrganismOrder::fitter())
                .boxed(),
            mutation: PointMutation::distinct_n(1).boxed(),
            crossover: Box::new(crossover_fn(
                |a: &mut Vec<bool>, b: &mut Vec<bool>, rng: &mut dyn RngCore| {
                    let cut = rng.random_range(0..=a.len().min(b.len()));
                    a[cut..].swap_with_slice(&mut b[cut..]);
                },
            )),
            organism_factory: OrganismFactory::new(ones),
            initial_population: Box::new(|rng: &mut dyn RngCore| {
                (0..BITS).map(|_| rng.random_bool(0.3)).collect()
            }),
            ..uniform_config(40, 8, 0.4)
        };
        let mut engine = Engine::with_seed(config, Some(13)).unwrap();
        let mut best = engine.best_organism().unwrap().fitness();
        for _ in 0..60 {
            engine.advance_one_generation();
            assert_eq!(engine.population().len(), 40);
            // Two fittest are spared from death, so the best never regresses.
            let now = engine.best_organism().unwrap().fitness();
            assert!(now >= best);
            best = now;
        }
    }

    // ---- Run control ----

    #[test]
    fn test_same_seed_same_run() {
        let build = || {
            let config = EngineConfig {
                select_good: Uniform.tournament(3, OrganismOrder::fitter()).boxed(),
                mutation: PointMutation::distinct_n(1)
                    .repeat(crate::mutation::MutationCount::Poisson { mean: 1.5 })
                    .boxed(),
                ..uniform_config(30, 6, 0.5)
            };
            Engine::with_seed(config, Some(99)).unwrap()
        };
        let (mut a, mut b) = (build(), build());
        a.run(25);
        b.run(25);
        let genomes = |e: &Engine<Vec<bool>>| -> Vec<Vec<bool>> {
            e.population().iter().map(|o| o.genome().clone()).collect()
        };
        assert_eq!(genomes(&a), genomes(&b));
        assert_eq!(a.last_generation(), b.last_generation());
    }

    #[test]
    fn test_run_with_cancel() {
        let mut engine = Engine::with_seed(uniform_config(10, 2, 0.0), Some(4)).unwrap();
        assert_eq!(engine.run_with_cancel(5, None), 5);

        let flag = Arc::new(AtomicBool::new(true));
        assert_eq!(engine.run_with_cancel(5, Some(Arc::clone(&flag))), 0);
        assert_eq!(engine.current_generation(), 5);

        flag.store(false, Ordering::Relaxed);
        assert_eq!(engine.run_with_cancel(3, Some(flag)), 3);
        assert_eq!(engine.current_generation(), 8);
    }

    #[test]
    fn test_report_tracks_best() {
        let mut engine = Engine::with_seed(uniform_config(20, 4, 0.0), Some(6)).unwrap();
        engine.run(3);
        let report = engine.report();
        assert_eq!(report.generation, 3);
        assert_eq!(report.population_size, 20);
        assert_eq!(report.best_fitness(), Some(engine.best_organism().unwrap().fitness()));
    }

    #[test]
    fn test_replace_best_with() {
        let mut engine = Engine::with_seed(uniform_config(10, 2, 0.0), Some(8)).unwrap();
        let immigrant = engine.replace_best_with(encode(3)).unwrap();
        assert_eq!(immigrant.fitness(), 3.0);
        assert_eq!(engine.population().len(), 10);
        assert_eq!(engine.best_organism().unwrap().fitness(), 8.0);

        let counts: HashMap<u64, usize> =
            engine
                .population()
                .iter()
                .fold(HashMap::new(), |mut acc, o| {
                    *acc.entry(o.fitness() as u64).or_insert(0) += 1;
                    acc
                });
        assert_eq!(counts[&3], 2);
    }
}
