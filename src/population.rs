//! Population container and reproduction primitives.
//!
//! A [`Population`] is an unordered collection of shared organisms, compared by
//! identity. Selectors never see the live population: they work on a
//! [`Snapshot`] taken before any kill or add happens.
//!
//! Offspring are always bred from genome *copies*; an organism's genome is
//! never edited after construction, so its memoized fitness stays valid.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use rand::RngCore;

use crate::crossover::Crossover;
use crate::genome::Genome;
use crate::mutation::{Mutation, MutationStats};
use crate::organism::{Organism, OrganismFactory};
use crate::selection::Selector;

/// Identity key of a shared organism.
pub(crate) fn identity<G>(organism: &Arc<Organism<G>>) -> *const Organism<G> {
    Arc::as_ptr(organism)
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable view of a population's membership at one point in time.
///
/// Cheap to clone. Later kills and adds on the population are not visible
/// through an existing snapshot.
pub struct Snapshot<G> {
    organisms: Arc<[Arc<Organism<G>>]>,
}

impl<G> Snapshot<G> {
    pub fn new(organisms: Vec<Arc<Organism<G>>>) -> Self {
        Self {
            organisms: organisms.into(),
        }
    }

    /// A snapshot with every organism of `excluded` removed (by identity).
    pub fn without(&self, excluded: &[Arc<Organism<G>>]) -> Self {
        let excluded: HashSet<_> = excluded.iter().map(identity).collect();
        Self::new(
            self.organisms
                .iter()
                .filter(|o| !excluded.contains(&identity(o)))
                .cloned()
                .collect(),
        )
    }
}

impl<G> Clone for Snapshot<G> {
    fn clone(&self) -> Self {
        Self {
            organisms: Arc::clone(&self.organisms),
        }
    }
}

impl<G> Deref for Snapshot<G> {
    type Target = [Arc<Organism<G>>];

    fn deref(&self) -> &Self::Target {
        &self.organisms
    }
}

impl<G> From<Vec<Arc<Organism<G>>>> for Snapshot<G> {
    fn from(organisms: Vec<Arc<Organism<G>>>) -> Self {
        Self::new(organisms)
    }
}

impl<G: std::fmt::Debug> std::fmt::Debug for Snapshot<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.organisms.iter()).finish()
    }
}

// ============================================================================
// Offspring construction
// ============================================================================

/// Copies `parent`'s genome, mutates the copy, and evaluates it.
pub fn asexual_offspring<G: Genome>(
    mutation: &dyn Mutation<G>,
    factory: &OrganismFactory<G>,
    parent: &Organism<G>,
    rng: &mut dyn RngCore,
    stats: &mut MutationStats,
) -> Arc<Organism<G>> {
    let mut genome = parent.genome().clone();
    mutation.mutate(&mut genome, rng, stats);
    factory.create(genome)
}

/// Copies both parents' genomes, recombines the copies, and evaluates the
/// first recombinant.
///
/// The second recombinant is dropped: one sexual event yields exactly one
/// offspring.
pub fn sexual_offspring<G: Genome>(
    crossover: &dyn Crossover<G>,
    factory: &OrganismFactory<G>,
    mom: &Organism<G>,
    dad: &Organism<G>,
    rng: &mut dyn RngCore,
) -> Arc<Organism<G>> {
    let (first, _second) = recombinants(crossover, mom, dad, rng);
    factory.create(first)
}

fn recombinants<G: Genome>(
    crossover: &dyn Crossover<G>,
    mom: &Organism<G>,
    dad: &Organism<G>,
    rng: &mut dyn RngCore,
) -> (G, G) {
    let mut first = mom.genome().clone();
    let mut second = dad.genome().clone();
    crossover.recombine(&mut first, &mut second, rng);
    (first, second)
}

// ============================================================================
// Population
// ============================================================================

/// Mutable, set-like collection of organisms.
///
/// Membership is by identity: adding an organism that is already present is
/// rejected, two distinct organisms with equal genomes may coexist.
pub struct Population<G> {
    organisms: Vec<Arc<Organism<G>>>,
}

impl<G: Genome> Population<G> {
    pub fn new() -> Self {
        Self {
            organisms: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Organism<G>>> {
        self.organisms.iter()
    }

    /// Freezes the current membership for selectors.
    pub fn snapshot(&self) -> Snapshot<G> {
        Snapshot::new(self.organisms.clone())
    }

    pub fn contains(&self, organism: &Arc<Organism<G>>) -> bool {
        self.organisms.iter().any(|o| Arc::ptr_eq(o, organism))
    }

    /// Adds `organism`. Returns `false` if it is already a member.
    pub fn add(&mut self, organism: Arc<Organism<G>>) -> bool {
        if self.contains(&organism) {
            return false;
        }
        self.organisms.push(organism);
        true
    }

    /// Adds every organism, returning how many were accepted.
    pub fn add_all<I>(&mut self, organisms: I) -> usize
    where
        I: IntoIterator<Item = Arc<Organism<G>>>,
    {
        let mut members: HashSet<_> = self.organisms.iter().map(identity).collect();
        let before = self.organisms.len();
        for organism in organisms {
            if members.insert(identity(&organism)) {
                self.organisms.push(organism);
            }
        }
        self.organisms.len() - before
    }

    /// Removes `organism`. Returns `false` if it was not a member.
    pub fn kill(&mut self, organism: &Arc<Organism<G>>) -> bool {
        match self.organisms.iter().position(|o| Arc::ptr_eq(o, organism)) {
            Some(index) => {
                self.organisms.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every listed organism, returning how many were members.
    pub fn kill_all(&mut self, doomed: &[Arc<Organism<G>>]) -> usize {
        let doomed: HashSet<_> = doomed.iter().map(identity).collect();
        let before = self.organisms.len();
        self.organisms.retain(|o| !doomed.contains(&identity(o)));
        before - self.organisms.len()
    }

    /// Substitutes `replacement` for `original`.
    ///
    /// The replacement is added before the original is removed, so a rejected
    /// add leaves the population untouched. Returns `false` if `original` is
    /// not a member or `replacement` already is.
    pub fn replace(&mut self, original: &Arc<Organism<G>>, replacement: Arc<Organism<G>>) -> bool {
        if !self.contains(original) || !self.add(replacement) {
            return false;
        }
        self.kill(original)
    }

    /// The organism with maximal fitness, if any. Ties resolve to the first
    /// maximal member found.
    pub fn best(&self) -> Option<&Arc<Organism<G>>> {
        self.organisms
            .iter()
            .reduce(|best, o| if o.cmp_fitness(best).is_gt() { o } else { best })
    }

    /// The organism with minimal fitness, if any.
    pub fn worst(&self) -> Option<&Arc<Organism<G>>> {
        self.organisms
            .iter()
            .reduce(|worst, o| if o.cmp_fitness(worst).is_lt() { o } else { worst })
    }

    /// Arithmetic mean of all fitnesses, `None` when empty.
    pub fn mean_fitness(&self) -> Option<f64> {
        if self.organisms.is_empty() {
            return None;
        }
        let sum: f64 = self.organisms.iter().map(|o| o.fitness()).sum();
        Some(sum / self.organisms.len() as f64)
    }

    // ---- Reproduction primitives ----

    /// Asexual reproduction: copy, mutate, evaluate, add.
    ///
    /// Returns the newborn if it was added.
    pub fn vegetate(
        &mut self,
        mutation: &dyn Mutation<G>,
        factory: &OrganismFactory<G>,
        parent: &Organism<G>,
        rng: &mut dyn RngCore,
        stats: &mut MutationStats,
    ) -> Option<Arc<Organism<G>>> {
        let child = asexual_offspring(mutation, factory, parent, rng, stats);
        self.add(Arc::clone(&child)).then_some(child)
    }

    /// Sexual reproduction: copy both, recombine, evaluate the first
    /// recombinant, add.
    ///
    /// Returns the newborn if it was added.
    pub fn copulate(
        &mut self,
        crossover: &dyn Crossover<G>,
        factory: &OrganismFactory<G>,
        mom: &Organism<G>,
        dad: &Organism<G>,
        rng: &mut dyn RngCore,
    ) -> Option<Arc<Organism<G>>> {
        let child = sexual_offspring(crossover, factory, mom, dad, rng);
        self.add(Arc::clone(&child)).then_some(child)
    }

    /// Sexual reproduction followed by a mutation of the recombinant before
    /// evaluation.
    #[allow(clippy::too_many_arguments)]
    pub fn copulate_and_mutate(
        &mut self,
        crossover: &dyn Crossover<G>,
        mutation: &dyn Mutation<G>,
        factory: &OrganismFactory<G>,
        mom: &Organism<G>,
        dad: &Organism<G>,
        rng: &mut dyn RngCore,
        stats: &mut MutationStats,
    ) -> Option<Arc<Organism<G>>> {
        let (mut first, _second) = recombinants(crossover, mom, dad, rng);
        mutation.mutate(&mut first, rng, stats);
        let child = factory.create(first);
        self.add(Arc::clone(&child)).then_some(child)
    }

    /// [`vegetate`](Self::vegetate) with the parent drawn from `selector`
    /// over the current membership.
    pub fn vegetate_selected(
        &mut self,
        selector: &dyn Selector<G>,
        mutation: &dyn Mutation<G>,
        factory: &OrganismFactory<G>,
        rng: &mut dyn RngCore,
        stats: &mut MutationStats,
    ) -> Option<Arc<Organism<G>>> {
        let parent = selector.select(self.snapshot(), &mut *rng).take1()?;
        self.vegetate(mutation, factory, &parent, rng, stats)
    }

    /// [`copulate`](Self::copulate) with both parents drawn from `selector`
    /// over the current membership. The father is never the mother.
    ///
    /// Returns `None` when no distinct pair can be drawn.
    pub fn copulate_selected(
        &mut self,
        selector: &dyn Selector<G>,
        crossover: &dyn Crossover<G>,
        factory: &OrganismFactory<G>,
        rng: &mut dyn RngCore,
    ) -> Option<Arc<Organism<G>>> {
        let (mom, dad) = {
            let mut parents = selector.select(self.snapshot(), &mut *rng);
            let mom = parents.take1()?;
            let dad = parents.take1_excluding(std::slice::from_ref(&mom))?;
            (mom, dad)
        };
        self.copulate(crossover, factory, &mom, &dad, rng)
    }
}

impl<G: Genome> Default for Population<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> FromIterator<Arc<Organism<G>>> for Population<G> {
    fn from_iter<I: IntoIterator<Item = Arc<Organism<G>>>>(iter: I) -> Self {
        let mut population = Population::new();
        population.add_all(iter);
        population
    }
}

// ============================================================================
// Tests
// ============================================================================
