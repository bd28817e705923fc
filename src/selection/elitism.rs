//! Elitism decorators.
//!
//! [`Spare`] protects an elite from a selector (typically the victim
//! selector), [`Ensure`] guarantees an elite is drawn first (typically by the
//! parent selector). Both rank by an [`OrganismOrder`] at bind time, so the
//! elite is fixed for the lifetime of one draw sequence.

use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use super::types::{Draws, Selector};
use crate::organism::{Organism, OrganismOrder};
use crate::population::Snapshot;

/// Removes the top `count` organisms under `order` from the snapshot before
/// the inner selector sees it.
///
/// No draw of the decorated selector can return a spared organism. Sparing
/// everyone leaves an empty sequence.
pub struct Spare<G, S> {
    inner: S,
    count: usize,
    order: OrganismOrder<G>,
}

impl<G, S> Spare<G, S> {
    pub fn new(inner: S, count: usize, order: OrganismOrder<G>) -> Self {
        Self {
            inner,
            count,
            order,
        }
    }
}

impl<G, S: fmt::Debug> fmt::Debug for Spare<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spare")
            .field("inner", &self.inner)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl<G, S: Selector<G>> Selector<G> for Spare<G, S> {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        if self.count == 0 {
            return self.inner.draws(snapshot);
        }
        let elite = self.order.top(&snapshot, self.count);
        self.inner.draws(snapshot.without(&elite))
    }
}

/// Yields the top `count` organisms under `order` (most preferred first),
/// then continues with the inner selector over the whole snapshot.
///
/// The inner sequence may later repeat an elite.
pub struct Ensure<G, S> {
    inner: S,
    count: usize,
    order: OrganismOrder<G>,
}

impl<G, S> Ensure<G, S> {
    pub fn new(inner: S, count: usize, order: OrganismOrder<G>) -> Self {
        Self {
            inner,
            count,
            order,
        }
    }
}

impl<G, S: fmt::Debug> fmt::Debug for Ensure<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ensure")
            .field("inner", &self.inner)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

struct EnsureDraws<'s, G> {
    elite: std::vec::IntoIter<Arc<Organism<G>>>,
    elite_len: usize,
    population: usize,
    inner: Box<dyn Draws<G> + 's>,
}

impl<G> Draws<G> for EnsureDraws<'_, G> {
    fn draw(&mut self, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>> {
        match self.elite.next() {
            Some(organism) => Some(organism),
            None => self.inner.draw(rng),
        }
    }

    // Upper bound: the inner sequence may never reach the elite.
    fn pool_size(&self) -> usize {
        self.inner
            .pool_size()
            .saturating_add(self.elite_len)
            .min(self.population)
    }
}

impl<G, S: Selector<G>> Selector<G> for Ensure<G, S> {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        let elite = self.order.top(&snapshot, self.count);
        Box::new(EnsureDraws {
            elite_len: elite.len(),
            population: snapshot.len(),
            elite: elite.into_iter(),
            inner: self.inner.draws(snapshot),
        })
    }
}
