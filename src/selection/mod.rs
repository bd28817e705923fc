//! Composable selection pipeline.
//!
//! A [`Selector`] is bound to a [`Snapshot`] of the population and yields a
//! lazy sequence of organisms. The engine uses two selectors: one for
//! victims ("bad") and one for parents ("good").
//!
//! # Strategies
//!
//! - [`Uniform`]: equal probability, with replacement
//! - [`Roulette`]: probability proportional to shifted fitness
//! - [`Tournament`]: best of `k` distinct entrants from an inner selector
//!
//! # Decorators
//!
//! - [`Spare`]: hide the top `n` organisms from the inner selector
//! - [`Ensure`]: yield the top `n` organisms first
//!
//! Decorators nest through [`SelectorExt`].
//!
//! # Taking
//!
//! [`Selection`] offers single draws, batches with repeats, and distinct
//! draws with an exclusion list. Distinct requests are capped at the number
//! of organisms the sequence can yield and stop early when the sequence
//! keeps repeating itself.
//!
//! [`Snapshot`]: crate::population::Snapshot

mod elitism;
mod sequence;
mod strategies;
mod types;

pub use elitism::{Ensure, Spare};
pub use sequence::Selection;
pub use strategies::{Roulette, Tournament, Uniform};
pub use types::{Draws, Selector, SelectorExt};
