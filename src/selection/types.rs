//! Selector and draw-sequence traits.

use std::sync::Arc;

use rand::RngCore;

use super::elitism::{Ensure, Spare};
use super::sequence::Selection;
use super::strategies::Tournament;
use crate::organism::{Organism, OrganismOrder};
use crate::population::Snapshot;

/// A lazy, possibly infinite sequence of organisms drawn from one snapshot.
///
/// Draws may repeat organisms. `None` means the sequence is exhausted (for
/// every built-in strategy, that only happens on an empty snapshot).
pub trait Draws<G> {
    fn draw(&mut self, rng: &mut dyn RngCore) -> Option<Arc<Organism<G>>>;

    /// Number of distinct organisms this sequence can ever yield.
    ///
    /// Upper bound used to cap distinct-draw requests.
    fn pool_size(&self) -> usize;
}

/// A selection strategy: binds a snapshot and produces a draw sequence.
///
/// Selectors are built once per engine and shared; all per-generation state
/// (precomputed weights, elite lists) lives in the [`Draws`] they return.
pub trait Selector<G>: Send + Sync {
    /// Binds `snapshot`, precomputing whatever the strategy needs.
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's;

    /// Binds `snapshot` and pairs the draw sequence with a generator.
    fn select<'a>(&'a self, snapshot: Snapshot<G>, rng: &'a mut dyn RngCore) -> Selection<'a, G>
    where
        G: 'a,
    {
        Selection::new(self.draws(snapshot), rng)
    }
}

impl<G> Selector<G> for Box<dyn Selector<G>> {
    fn draws<'s>(&'s self, snapshot: Snapshot<G>) -> Box<dyn Draws<G> + 's>
    where
        G: 's,
    {
        (**self).draws(snapshot)
    }
}

/// Decorators available on every sized selector.
///
/// # Examples
///
/// ```
/// use u_evolve::organism::OrganismOrder;
/// use u_evolve::selection::{SelectorExt, Uniform};
///
/// // Tournament of three among everyone except the two fittest organisms.
/// let selector = Uniform
///     .tournament(3, OrganismOrder::<Vec<bool>>::fitter())
///     .spare(2, OrganismOrder::fitter())
///     .boxed();
/// # let _ = selector;
/// ```
pub trait SelectorExt<G>: Selector<G> + Sized {
    /// Draws `size` distinct entrants from `self` and yields the most
    /// preferred under `order`.
    fn tournament(self, size: usize, order: OrganismOrder<G>) -> Tournament<G, Self> {
        Tournament::new(self, size, order)
    }

    /// Hides the top `count` organisms under `order` from `self`.
    fn spare(self, count: usize, order: OrganismOrder<G>) -> Spare<G, Self> {
        Spare::new(self, count, order)
    }

    /// Yields the top `count` organisms under `order` first, then defers
    /// to `self`.
    fn ensure(self, count: usize, order: OrganismOrder<G>) -> Ensure<G, Self> {
        Ensure::new(self, count, order)
    }

    fn boxed(self) -> Box<dyn Selector<G>>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<G, S: Selector<G>> SelectorExt<G> for S {}
