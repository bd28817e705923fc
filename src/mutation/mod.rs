//! Composable mutation pipeline.
//!
//! A [`Mutation`] edits a genome copy in place and reports what it did to a
//! [`MutationStats`] accumulator. Mutations are built once per engine and draw
//! all randomness from the generator passed to each call.
//!
//! # Composition
//!
//! - [`MutationExt::repeat`]: apply an operator `n` times, with `n` drawn from
//!   a [`MutationCount`] evaluated against the genome on every application.
//! - [`Compose`]: apply a fixed sequence of operators, sharing one generator
//!   and one accumulator.
//!
//! # Operators
//!
//! The structural operators in [`operators`] work on any [`EditableGenome`]
//! (see [`crate::genome`]): point flips, insertion, deletion, duplication,
//! translocation, inversion, and translocation with inversion. [`GrayFlip`]
//! is specific to bit strings that encode Gray-coded integers.
//!
//! [`EditableGenome`]: crate::genome::EditableGenome

mod compose;
pub mod operators;
mod types;

pub use compose::{Compose, MutationCount, Repeat};
pub use operators::{
    Deletion, Duplication, GrayFlip, Insertion, Inversion, PointMutation, SegmentLength,
    Translocation, TranslocationInversion,
};
pub use types::{
    from_fn, FnMutation, Mutation, MutationExt, MutationStats, MutationTally, NoMutation,
    DELETION, DUPLICATION, GRAY_FLIP, INSERTION, INVERSION, POINT_MUTATION, RANDOM_FLIP,
    TRANSLOCATION,
};
