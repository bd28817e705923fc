//! Core mutation trait and effect statistics.

use std::collections::BTreeMap;

use rand::RngCore;

use super::compose::{MutationCount, Repeat};

/// Tag for single-locus changes at distinct positions.
pub const POINT_MUTATION: &str = "PointMutation";
/// Tag for insertions of fresh material.
pub const INSERTION: &str = "Insertion";
/// Tag for removed segments.
pub const DELETION: &str = "Deletion";
/// Tag for segments moved to another locus.
pub const TRANSLOCATION: &str = "Translocation";
/// Tag for reversed segments.
pub const INVERSION: &str = "Inversion";
/// Tag for copied segments.
pub const DUPLICATION: &str = "Duplication";
/// Tag for flips on Gray-coded loci.
pub const GRAY_FLIP: &str = "GrayFlip";
/// Tag for independent per-locus flips.
pub const RANDOM_FLIP: &str = "RandomFlip";

/// Accumulated effect of one mutation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MutationTally {
    /// Sum of effect sizes (loci touched).
    pub total_size: usize,
    /// Number of occurrences.
    pub count: usize,
}

/// Accumulator of mutation effects keyed by kind tag.
///
/// Created fresh by the caller of a top-level mutation, written to by every
/// operator of a (possibly nested) pipeline, and read afterwards. Callers
/// that do not care simply drop it.
///
/// # Examples
///
/// ```
/// use u_evolve::mutation::{MutationStats, DELETION};
///
/// let mut stats = MutationStats::default();
/// stats.record(DELETION, 3);
/// stats.record(DELETION, 2);
/// assert_eq!(stats.get(DELETION).count, 2);
/// assert_eq!(stats.get(DELETION).total_size, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MutationStats {
    tallies: BTreeMap<&'static str, MutationTally>,
}

impl MutationStats {
    /// Records one occurrence of `kind` that touched `size` loci.
    pub fn record(&mut self, kind: &'static str, size: usize) {
        let tally = self.tallies.entry(kind).or_default();
        tally.total_size += size;
        tally.count += 1;
    }

    /// Tally for `kind` (zeroed when never recorded).
    pub fn get(&self, kind: &str) -> MutationTally {
        self.tallies.get(kind).copied().unwrap_or_default()
    }

    /// Iterates over recorded kinds in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, MutationTally)> + '_ {
        self.tallies.iter().map(|(&k, &t)| (k, t))
    }

    /// Adds every tally of `other` into `self`.
    pub fn merge(&mut self, other: &MutationStats) {
        for (kind, tally) in other.iter() {
            let own = self.tallies.entry(kind).or_default();
            own.total_size += tally.total_size;
            own.count += tally.count;
        }
    }

    /// Total number of recorded occurrences across kinds.
    pub fn total_count(&self) -> usize {
        self.tallies.values().map(|t| t.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

/// Mutates a genome in place.
///
/// Implementations draw randomness from `rng` only and report what they did
/// to `stats`; reporting is optional.
pub trait Mutation<G>: Send + Sync {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats);
}

/// The identity mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMutation;

impl<G> Mutation<G> for NoMutation {
    fn mutate(&self, _genome: &mut G, _rng: &mut dyn RngCore, _stats: &mut MutationStats) {}
}

/// Mutation backed by a closure. Built with [`from_fn`].
#[derive(Clone)]
pub struct FnMutation<F>(F);

/// Wraps a closure as a [`Mutation`].
pub fn from_fn<G, F>(f: F) -> FnMutation<F>
where
    F: Fn(&mut G, &mut dyn RngCore, &mut MutationStats) + Send + Sync,
{
    FnMutation(f)
}

impl<G, F> Mutation<G> for FnMutation<F>
where
    F: Fn(&mut G, &mut dyn RngCore, &mut MutationStats) + Send + Sync,
{
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        (self.0)(genome, rng, stats)
    }
}

impl<G> Mutation<G> for Box<dyn Mutation<G>> {
    fn mutate(&self, genome: &mut G, rng: &mut dyn RngCore, stats: &mut MutationStats) {
        (**self).mutate(genome, rng, stats)
    }
}

/// Adapters available on every sized mutation.
pub trait MutationExt<G>: Mutation<G> + Sized {
    /// Applies `self` a number of times drawn from `count` on every call.
    fn repeat(self, count: MutationCount<G>) -> Repeat<G, Self> {
        Repeat::new(self, count)
    }

    fn boxed(self) -> Box<dyn Mutation<G>>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<G, M: Mutation<G>> MutationExt<G> for M {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_stats_record_and_get() {
        let mut stats = MutationStats::default();
        assert!(stats.is_empty());
        stats.record(INVERSION, 4);
        stats.record(POINT_MUTATION, 1);
        stats.record(INVERSION, 2);

        assert_eq!(
            stats.get(INVERSION),
            MutationTally {
                total_size: 6,
                count: 2
            }
        );
        assert_eq!(stats.get(POINT_MUTATION).count, 1);
        assert_eq!(stats.get(DUPLICATION), MutationTally::default());
        assert_eq!(stats.total_count(), 3);
    }

    #[test]
    fn test_stats_merge() {
        let mut a = MutationStats::default();
        a.record(DELETION, 3);
        let mut b = MutationStats::default();
        b.record(DELETION, 1);
        b.record(INSERTION, 5);

        a.merge(&b);
        assert_eq!(a.get(DELETION).total_size, 4);
        assert_eq!(a.get(DELETION).count, 2);
        assert_eq!(a.get(INSERTION).count, 1);
        let kinds: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![DELETION, INSERTION]);
    }

    #[test]
    fn test_no_mutation_leaves_genome() {
        let mut genome = vec![true, false];
        let mut stats = MutationStats::default();
        NoMutation.mutate(&mut genome, &mut create_rng(0), &mut stats);
        assert_eq!(genome, vec![true, false]);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_closure_mutation_reports() {
        let clear: Box<dyn Mutation<Vec<bool>>> = from_fn(
            |g: &mut Vec<bool>, _rng: &mut dyn RngCore, stats: &mut MutationStats| {
                let size = g.len();
                g.iter_mut().for_each(|b| *b = false);
                stats.record(RANDOM_FLIP, size);
            },
        )
        .boxed();

        let mut genome = vec![true; 3];
        let mut stats = MutationStats::default();
        clear.mutate(&mut genome, &mut create_rng(0), &mut stats);
        assert_eq!(genome, vec![false; 3]);
        assert_eq!(stats.get(RANDOM_FLIP).total_size, 3);
    }
}
