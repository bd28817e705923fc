//! Genome-agnostic generational evolution engine.
//!
//! Advances a population of organisms (a genome plus its memoized fitness)
//! by composing pluggable strategies:
//!
//! - **Selection**: lazy draw sequences over a population snapshot, with
//!   uniform, roulette-wheel, and tournament strategies and elitism
//!   decorators (`spare`, `ensure`).
//! - **Mutation**: in-place genome edits with effect statistics, composed by
//!   repetition (`repeat`) and sequencing (`Compose`); structural operators
//!   for any [`genome::EditableGenome`].
//! - **Crossover**: in-place recombination of two genome copies.
//! - **Engine**: per generation, kills `lambda` distinct victims and breeds
//!   `lambda` offspring, a binomially distributed share of them sexually.
//! - **Islands**: several engines interleaved round-robin with periodic
//!   ring migration of the best organism.
//!
//! # Architecture
//!
//! The engine never inspects genome contents. Genomes are only cloned and
//! handed to the strategies; every organism is built by an
//! [`organism::OrganismFactory`] that evaluates fitness exactly once. All
//! randomness of an engine comes from one seedable generator
//! ([`random::create_rng`]), so a fixed seed reproduces a run.

pub mod crossover;
pub mod engine;
pub mod error;
pub mod genome;
pub mod island;
pub mod mutation;
pub mod organism;
pub mod population;
pub mod random;
pub mod selection;
