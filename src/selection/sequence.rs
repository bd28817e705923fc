//! Consumption of draw sequences: single, batch, and distinct draws.

use std::collections::HashSet;
use std::sync::Arc;

use rand::RngCore;

use super::types::Draws;
use crate::organism::Organism;
use crate::population::identity;

/// Consecutive non-fresh draws tolerated per pool member before a distinct
/// request gives up.
const STALE_FACTOR: usize = 20;
/// Floor of the stale-draw bound for tiny pools.
const STALE_MIN: usize = 32;

/// Draws up to `n` distinct organisms not in `excluded`.
///
/// The target is capped at the sequence's pool size. Skewed strategies may
/// still fail to reach it (a roulette where one organism holds all the
/// weight), so the loop also stops after `STALE_FACTOR × pool + STALE_MIN`
/// consecutive draws that produced nothing new.
pub(crate) fn collect_distinct<G>(
    draws: &mut dyn Draws<G>,
    n: usize,
    excluded: &[Arc<Organism<G>>],
    rng: &mut dyn RngCore,
) -> Vec<Arc<Organism<G>>> {
    let pool = draws.pool_size();
    let target = n.min(pool);
    let mut seen: HashSet<*const Organism<G>> = excluded.iter().map(identity).collect();
    let mut picked = Vec::with_capacity(target);
    let max_stale = STALE_FACTOR * pool + STALE_MIN;
    let mut stale = 0;

    while picked.len() < target && stale < max_stale {
        let Some(organism) = draws.draw(rng) else {
            break;
        };
        if seen.insert(identity(&organism)) {
            picked.push(organism);
            stale = 0;
        } else {
            stale += 1;
        }
    }
    picked
}

/// A draw sequence paired with the generator it draws from.
///
/// Obtained from [`Selector::select`](super::Selector::select). Also an
/// [`Iterator`] over single draws.
pub struct Selection<'a, G> {
    draws: Box<dyn Draws<G> + 'a>,
    rng: &'a mut dyn RngCore,
}

impl<'a, G> Selection<'a, G> {
    pub fn new(draws: Box<dyn Draws<G> + 'a>, rng: &'a mut dyn RngCore) -> Self {
        Self { draws, rng }
    }

    /// Next organism of the sequence.
    pub fn take1(&mut self) -> Option<Arc<Organism<G>>> {
        self.draws.draw(&mut *self.rng)
    }

    /// Next `n` organisms, repeats allowed. Shorter only if the sequence ends.
    pub fn take_n(&mut self, n: usize) -> Vec<Arc<Organism<G>>> {
        let mut taken = Vec::with_capacity(n);
        while taken.len() < n {
            match self.take1() {
                Some(organism) => taken.push(organism),
                None => break,
            }
        }
        taken
    }

    /// Up to `n` pairwise distinct organisms.
    pub fn take_distinct(&mut self, n: usize) -> Vec<Arc<Organism<G>>> {
        collect_distinct(&mut *self.draws, n, &[], &mut *self.rng)
    }

    /// Next organism that is not one of `excluded`.
    pub fn take1_excluding(&mut self, excluded: &[Arc<Organism<G>>]) -> Option<Arc<Organism<G>>> {
        collect_distinct(&mut *self.draws, 1, excluded, &mut *self.rng).pop()
    }

    /// Up to `n` pairwise distinct organisms, none of them in `excluded`.
    pub fn take_distinct_excluding(
        &mut self,
        n: usize,
        excluded: &[Arc<Organism<G>>],
    ) -> Vec<Arc<Organism<G>>> {
        collect_distinct(&mut *self.draws, n, excluded, &mut *self.rng)
    }

    /// Number of distinct organisms the sequence can yield.
    pub fn pool_size(&self) -> usize {
        self.draws.pool_size()
    }
}

impl<G> Iterator for Selection<'_, G> {
    type Item = Arc<Organism<G>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.take1()
    }
}
