//! Island model: several engines with periodic ring migration.
//!
//! Islands evolve independently and are interleaved on one thread of
//! control: each [`Archipelago::advance`] steps exactly one island. Every
//! `migration_interval` steps the best organism of one island replaces the
//! best organism of its less fit neighbour. The migrant is re-evaluated by
//! the receiving island's factory, so islands may use different objectives.
//!
//! With the `parallel` feature, [`Archipelago::advance_round_parallel`]
//! steps all islands concurrently and migrates afterwards.
//!
//! # References
//!
//! - Whitley, Rana & Heckendorn (1999), "The Island Model Genetic Algorithm:
//!   On Separability, Population Size and Convergence"

mod config;
mod runner;

pub use config::IslandConfig;
pub use runner::{Archipelago, Migration};
