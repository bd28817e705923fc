//! Concrete structural mutation operators.
//!
//! Every operator is written purely against the [`EditableGenome`] edit
//! primitives plus a segment length and a uniformly drawn locus, so it works
//! for any genome representation that provides those primitives.
//!
//! | Operator | Effect | Tag |
//! |---|---|---|
//! | [`PointMutation::distinct_n`] | flip `k` distinct loci | `PointMutation` |
//! | [`PointMutation::per_locus`] | flip each locus with probability `rate` | `RandomFlip` |
//! | [`Insertion`] | insert a fresh random segment | `Insertion` |
//! | [`Deletion`] | remove a segment | `Deletion` |
//! | [`Duplication`] | insert a copy of a segment elsewhere | `Duplication` |
//! | [`Translocation`] | move a segment elsewhere | `Translocation` |
//! | [`Inversion`] | reverse a segment in place | `Inversion` |
//! | [`TranslocationInversion`] | move a segment and reverse it | `Translocation` + `Inversion` |
//! | [`GrayFlip`] | step a Gray-coded word of a `Vec<bool>` by ±1 | `GrayFlip` |

use std::ops::Range;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Geometric};

use super::types::{
    Mutation, MutationStats, DELETION, DUPLICATION, GRAY_FLIP, INSERTION, INVERSION,
    POINT_MUTATION, RANDOM_FLIP, TRANSLOCATION,
};
use crate::genome::EditableGenome;

// ============================================================================
// Segment lengths
// ============================================================================

/// Distribution of segment lengths for structural operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentLength {
    /// Always the same length.
    Fixed(usize),
    /// Uniform in `min..=max`.
    Uniform { min: usize, max: usize },
    /// Geometric on `1, 2, ...` with the given mean (≥ 1).
    Geometric { mean: f64 },
}

impl SegmentLength {
    /// Draws a length in `1..=limit`, or 0 when `limit == 0`.
    ///
    /// Draws above `limit` are clamped to it.
    pub fn sample(&self, limit: usize, rng: &mut dyn RngCore) -> usize {
        if limit == 0 {
            return 0;
        }
        let len = match *self {
            SegmentLength::Fixed(n) => n,
            SegmentLength::Uniform { min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                rng.random_range(lo..=hi)
            }
            SegmentLength::Geometric { mean } => {
                let p = if mean.is_finite() && mean > 1.0 { 1.0 / mean } else { 1.0 };
                match Geometric::new(p) {
                    Ok(dist) => {
                        let failures: u64 = dist.sample(rng);
                        usize::try_from(failures).map_or(usize::MAX, |f| f.saturating_add(1))
                    }
                    Err(_) => 1,
                }
            }
        };
        len.clamp(1, limit)
    }
}

/// Picks a segment of length `len` uniformly among the `size - len + 1`
/// possible placements.
fn random_segment(size: usize, len: usize, rng: &mut dyn RngCore) -> Range<usize> {
    let start = rng.random_range(0..=size - len);
    start..start + len
}

// ============================================================================
// Point mutations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointMode {
    Distinct(usize),
    PerLocus(f64),
}

/// Single-locus flips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMutation {
    mode: PointMode,
}

impl PointMutation {
    /// Flips exactly `min(k, size)` distinct loci, recording one
    /// `PointMutation` of size 1 per locus.
    pub fn distinct_n(k: usize) -> Self {
        Self {
            mode: PointMode::Distinct(k),
        }
    }

    /// Flips every locus independently with probability `rate` (clamped to
    /// `[0, 1]`), recording one `RandomFlip` of size 1 per flipped locus.
    pub fn per_locus(rate: f64) -> Self {
        let rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            mode: PointMode::PerLocus(rate),
        }
    }
}

impl<G: EditableGenome> Mutation<G> for PointMutation {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let size = genome.size();
        match self.mode {
            PointMode::Distinct(k) => {
                let loci = rand::seq::index::sample(rng, size, k.min(size));
                for locus in loci.iter() {
                    genome.flip(locus, rng);
                    stats.record(POINT_MUTATION, 1);
                }
            }
            PointMode::PerLocus(rate) => {
                for locus in 0..size {
                    if rng.random_bool(rate) {
                        genome.flip(locus, rng);
                        stats.record(RANDOM_FLIP, 1);
                    }
                }
            }
        }
    }
}

// ============================================================================
// Structural operators
// ============================================================================

/// Inserts a segment of fresh random material at a random locus.
///
/// The fresh segment is a copy of a random stretch of the genome with every
/// locus re-randomized, so its alleles come from the genome's own alphabet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    length: SegmentLength,
}

impl Insertion {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for Insertion {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let size = genome.size();
        let len = self.length.sample(size, rng);
        if len == 0 {
            return;
        }
        let mut segment = genome.copy_range(random_segment(size, len, rng));
        segment.randomize(rng);
        let at = rng.random_range(0..=size);
        genome.insert_at(at, segment);
        stats.record(INSERTION, len);
    }
}

/// Removes a random segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deletion {
    length: SegmentLength,
}

impl Deletion {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for Deletion {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let size = genome.size();
        let len = self.length.sample(size, rng);
        if len == 0 {
            return;
        }
        genome.delete_range(random_segment(size, len, rng));
        stats.record(DELETION, len);
    }
}

/// Inserts a copy of a random segment at a random locus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duplication {
    length: SegmentLength,
}

impl Duplication {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for Duplication {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let size = genome.size();
        let len = self.length.sample(size, rng);
        if len == 0 {
            return;
        }
        let segment = genome.copy_range(random_segment(size, len, rng));
        let at = rng.random_range(0..=size);
        genome.insert_at(at, segment);
        stats.record(DUPLICATION, len);
    }
}

/// Cuts a random segment out and re-inserts it at a random locus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translocation {
    length: SegmentLength,
}

impl Translocation {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for Translocation {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let len = self.length.sample(genome.size(), rng);
        if len == 0 {
            return;
        }
        let segment = cut(genome, len, rng);
        let at = rng.random_range(0..=genome.size());
        genome.insert_at(at, segment);
        stats.record(TRANSLOCATION, len);
    }
}

/// Reverses a random segment in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    length: SegmentLength,
}

impl Inversion {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for Inversion {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let size = genome.size();
        let len = self.length.sample(size, rng);
        if len == 0 {
            return;
        }
        genome.reverse_range(random_segment(size, len, rng));
        stats.record(INVERSION, len);
    }
}

/// Cuts a random segment, reverses it, and re-inserts it at a random locus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslocationInversion {
    length: SegmentLength,
}

impl TranslocationInversion {
    pub fn new(length: SegmentLength) -> Self {
        Self { length }
    }
}

impl<G: EditableGenome> Mutation<G> for TranslocationInversion {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let len = self.length.sample(genome.size(), rng);
        if len == 0 {
            return;
        }
        let mut segment = cut(genome, len, rng);
        segment.reverse_range(0..len);
        let at = rng.random_range(0..=genome.size());
        genome.insert_at(at, segment);
        stats.record(TRANSLOCATION, len);
        stats.record(INVERSION, len);
    }
}

/// Removes a random segment of length `len` and returns it.
fn cut<G: EditableGenome>(genome: &mut G, len: usize, rng: &mut dyn RngCore) -> G {
    let range = random_segment(genome.size(), len, rng);
    let segment = genome.copy_range(range.clone());
    genome.delete_range(range);
    segment
}

// ============================================================================
// Gray-coded words
// ============================================================================

/// Moves one Gray-coded word of a bit string to a neighbouring value.
///
/// The genome is read as consecutive words of `width` bits, most significant
/// bit first; bits after the last full word are never touched. A random word
/// is decoded, stepped by ±1 with wrap-around, and re-encoded, which changes
/// exactly one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayFlip {
    width: usize,
}

impl GrayFlip {
    /// Words of `width` bits, clamped to `1..=64`.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.clamp(1, 64),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

fn gray_encode(value: u64) -> u64 {
    value ^ (value >> 1)
}

fn gray_decode(mut code: u64) -> u64 {
    let mut shift = 1;
    while shift < u64::BITS {
        code ^= code >> shift;
        shift <<= 1;
    }
    code
}

impl Mutation<Vec<bool>> for GrayFlip {
    fn mutate(&self, genome: &mut Vec<bool>, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        let words = genome.len() / self.width;
        if words == 0 {
            return;
        }
        let start = rng.random_range(0..words) * self.width;
        let word = &mut genome[start..start + self.width];

        let code = word.iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
        let mask = u64::MAX >> (u64::BITS as usize - self.width);
        let value = gray_decode(code);
        let stepped = if rng.random_bool(0.5) {
            value.wrapping_add(1)
        } else {
            value.wrapping_sub(1)
        };

        let code = gray_encode(stepped & mask);
        for (i, bit) in word.iter_mut().enumerate() {
            *bit = (code >> (self.width - 1 - i)) & 1 == 1;
        }
        stats.record(GRAY_FLIP, 1);
    }
}

// ============================================================================
// Tests
// ============================================================================
