//! Generational evolution engine.
//!
//! An [`Engine`] advances one population by replacing `lambda` organisms per
//! generation. Victims and parents are drawn from the same snapshot, so every
//! selection of a generation sees the population as it was before any
//! organism died or was born.
//!
//! # Key Types
//!
//! - [`EngineConfig`]: strategies and numeric parameters, all mandatory
//! - [`Engine`]: owns population, random source, and strategies
//! - [`GenerationStats`]: what one generation did
//! - [`EngineReport`]: generation counter and best organism for observers
//!
//! # References
//!
//! - Schwefel (1981), *Numerical Optimization of Computer Models* (the
//!   (μ + λ) replacement scheme)
//! - Whitley (1989), "The GENITOR Algorithm and Selection Pressure"
//!   (steady-state replacement of the worst)

mod config;
mod report;
mod runner;

pub use config::{EngineConfig, GenomeSupplier};
pub use report::{EngineReport, GenerationStats};
pub use runner::Engine;
