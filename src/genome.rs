//! Genome capability traits.
//!
//! The engine never looks inside a genome. It only needs an independent deep
//! copy (`Clone`) and, for count distributions that scale with genome length,
//! a [`Genome::size`]. Structural mutation operators additionally require the
//! edit primitives of [`EditableGenome`].
//!
//! A reference implementation for bit strings (`Vec<bool>`) is provided.

use rand::{Rng, RngCore};
use std::ops::Range;

/// An evolvable genome.
///
/// `Clone` must produce an independent deep copy: organisms own their
/// genomes exclusively and offspring are always bred from copies.
pub trait Genome: Clone + Send + Sync {
    /// Number of loci in the genome.
    fn size(&self) -> usize;
}

/// Structural edit primitives used by the concrete mutation operators.
///
/// Ranges are half-open loci ranges and are guaranteed by the callers to lie
/// within `0..self.size()`; `insert_at` accepts `locus == self.size()`
/// (append).
pub trait EditableGenome: Genome {
    /// Copies the loci in `range` into a new genome.
    fn copy_range(&self, range: Range<usize>) -> Self;

    /// Removes the loci in `range`.
    fn delete_range(&mut self, range: Range<usize>);

    /// Inserts `segment` so that its first locus lands at `locus`.
    fn insert_at(&mut self, locus: usize, segment: Self);

    /// Exchanges the values at two loci.
    fn swap_loci(&mut self, a: usize, b: usize);

    /// Changes the value at `locus` to a different allele.
    fn flip(&mut self, locus: usize, rng: &mut dyn RngCore);

    /// Reverses the loci in `range` using [`swap_loci`](Self::swap_loci).
    fn reverse_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let (mut lo, mut hi) = (range.start, range.end - 1);
        while lo < hi {
            self.swap_loci(lo, hi);
            lo += 1;
            hi -= 1;
        }
    }

    /// Flips every locus with probability 1/2, producing fresh material.
    fn randomize(&mut self, rng: &mut dyn RngCore) {
        for locus in 0..self.size() {
            if rng.random_bool(0.5) {
                self.flip(locus, rng);
            }
        }
    }
}

impl Genome for Vec<bool> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl EditableGenome for Vec<bool> {
    fn copy_range(&self, range: Range<usize>) -> Self {
        self[range].to_vec()
    }

    fn delete_range(&mut self, range: Range<usize>) {
        self.drain(range);
    }

    fn insert_at(&mut self, locus: usize, segment: Self) {
        self.splice(locus..locus, segment);
    }

    fn swap_loci(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }

    fn flip(&mut self, locus: usize, _rng: &mut dyn RngCore) {
        self[locus] = !self[locus];
    }
}
