//! The clause arena: indexed storage for both input and learnt clauses,
//! with an abstraction bitmask per clause used to speed up subsumption
//! checks during conflict-clause minimization (§3.6).

use smallvec::SmallVec;

use crate::sat::lit::{Lit, Var};

/// A clause's identity within a [`ClauseDb`]. Stable across additions;
/// invalidated only by [`ClauseDb::gc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClauseId(u32);

impl ClauseId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inline-up-to-4 literal storage, matching short clauses (binary, ternary)
/// without a heap allocation; wide clauses spill.
pub type LitList = SmallVec<[Lit; 4]>;

/// One clause: its literals, whether it was learnt (vs. an original input
/// clause), an activity score for reduction, and a cheap abstraction
/// bitmask of the variables it touches.
#[derive(Debug, Clone)]
pub struct Clause {
    lits: LitList,
    learnt: bool,
    activity: f32,
    abstraction: u64,
    deleted: bool,
}

impl Clause {
    fn new(lits: LitList, learnt: bool) -> Self {
        let abstraction = abstraction_of(&lits);
        Clause { lits, learnt, activity: 0.0, abstraction, deleted: false }
    }

    /// The clause's literals. Empty only for a clause already marked deleted.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Mutable access, for in-place shrinking during minimization/simplification.
    pub fn lits_mut(&mut self) -> &mut LitList {
        &mut self.lits
    }

    /// Whether this clause was learnt during search (vs. an input clause).
    pub fn is_learnt(&self) -> bool {
        self.learnt
    }

    /// The clause's current activity (for reduction ordering).
    pub fn activity(&self) -> f32 {
        self.activity
    }

    /// Bumps this clause's activity.
    pub fn bump_activity(&mut self, by: f32) {
        self.activity += by;
    }

    /// Rescales this clause's activity (used when the global bump overflows).
    pub fn rescale_activity(&mut self, factor: f32) {
        self.activity *= factor;
    }

    /// The cheap variable-abstraction bitmask, recomputed after any edit to
    /// `lits` via [`Clause::recompute_abstraction`].
    pub fn abstraction(&self) -> u64 {
        self.abstraction
    }

    /// Recomputes the abstraction bitmask after `lits` was mutated.
    pub fn recompute_abstraction(&mut self) {
        self.abstraction = abstraction_of(&self.lits);
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
        self.lits.clear();
    }

    /// Whether this clause has been logically deleted (its slot may still
    /// be physically occupied until the next [`ClauseDb::gc`]).
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// The abstraction bitmask a clause's literals would produce, usable to
/// compare a loose `&[Lit]` (e.g. a learnt clause under construction)
/// against a stored [`Clause::abstraction`] without materializing one.
pub fn abstraction_of(lits: &[Lit]) -> u64 {
    lits.iter().fold(0u64, |acc, l| acc | (1u64 << (l.var().index() & 63)))
}

/// Indexed clause storage, supporting logical deletion with deferred
/// compaction ([`ClauseDb::gc`]).
#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
}

impl ClauseDb {
    /// Inserts a clause (of at least 2 literals; use unit propagation
    /// directly at the trail level for unit clauses), returning its id.
    pub fn add(&mut self, lits: LitList, learnt: bool) -> ClauseId {
        let id = ClauseId(self.clauses.len() as u32);
        self.clauses.push(Clause::new(lits, learnt));
        id
    }

    /// Looks up a clause by id.
    pub fn get(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.index()]
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: ClauseId) -> &mut Clause {
        &mut self.clauses[id.index()]
    }

    /// Logically deletes a clause; its id remains valid (pointing at an
    /// empty, deleted clause) until the next [`ClauseDb::gc`].
    pub fn remove(&mut self, id: ClauseId) {
        self.clauses[id.index()].mark_deleted();
    }

    /// Number of clause slots, including deleted ones.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the database holds no clauses at all.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterates over every live (non-deleted) clause id.
    pub fn iter_live(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_deleted())
            .map(|(i, _)| ClauseId(i as u32))
    }

    /// Physically compacts the arena, dropping deleted clauses and
    /// returning an old-id -> new-id map (`None` for ids that were deleted).
    /// Callers (the solver's watch lists) must translate every stored
    /// `ClauseId` through the result.
    pub fn gc(&mut self) -> Vec<Option<ClauseId>> {
        let mut remap = vec![None; self.clauses.len()];
        let mut kept = Vec::with_capacity(self.clauses.len());
        for (old_idx, clause) in self.clauses.drain(..).enumerate() {
            if !clause.is_deleted() {
                remap[old_idx] = Some(ClauseId(kept.len() as u32));
                kept.push(clause);
            }
        }
        self.clauses = kept;
        remap
    }
}

impl std::ops::Index<ClauseId> for ClauseDb {
    type Output = Clause;
    fn index(&self, id: ClauseId) -> &Clause {
        self.get(id)
    }
}

impl std::ops::IndexMut<ClauseId> for ClauseDb {
    fn index_mut(&mut self, id: ClauseId) -> &mut Clause {
        self.get_mut(id)
    }
}

/// Whether a clause's abstraction mask is a subset of `superset`'s: a
/// necessary (not sufficient) condition for one clause's literals to be a
/// superset of another's, used to cheaply reject non-subsuming candidates
/// during minimization before doing the full literal-by-literal check.
pub fn abstraction_subset(subset: u64, superset: u64) -> bool {
    subset & !superset == 0
}

/// A ternary-simulation-free variable cover check used by conflict-clause
/// minimization: whether `var` appears (in either polarity) in `lits`.
pub fn contains_var(lits: &[Lit], var: Var) -> bool {
    lits.iter().any(|l| l.var() == var)
}
