//! Resolution-proof logging (§4.7).
//!
//! Every root (input) clause and every learnt clause can be registered here
//! along with the chain of unit resolutions that derived it. The log is
//! refcounted: a clause's chain is only actually freed once nothing
//! references it any more, so an UNSAT proof can be reconstructed after the
//! fact by walking backward from the empty clause.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::sat::lit::{Lit, Var};

/// A reference to a clause recorded in the proof log (root or derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProofRef(u32);

/// One step of a resolution chain: resolve the clause built so far against
/// `on`, pivoting on `pivot` (the variable that cancels between the two).
#[derive(Debug, Clone, Copy)]
struct ResolutionStep {
    pivot: Var,
    on: ProofRef,
}

enum Origin {
    /// An input clause, not derived from anything.
    Root(SmallVec<[Lit; 4]>),
    /// A clause derived by a chain of resolutions starting from `base`.
    Chain { base: ProofRef, steps: Vec<ResolutionStep> },
}

struct Entry {
    origin: Origin,
    refcount: u32,
}

/// The proof log: a refcounted DAG of resolution derivations.
#[derive(Default)]
pub struct ProofLog {
    entries: Vec<Option<Entry>>,
    free: Vec<u32>,
    in_progress: Option<ChainBuilder>,
}

struct ChainBuilder {
    base: ProofRef,
    steps: Vec<ResolutionStep>,
}

impl ProofLog {
    /// Registers an input clause as a proof root, returning its reference.
    pub fn add_root(&mut self, lits: &[Lit]) -> ProofRef {
        self.insert(Origin::Root(lits.iter().copied().collect()))
    }

    fn insert(&mut self, origin: Origin) -> ProofRef {
        let entry = Entry { origin, refcount: 1 };
        if let Some(idx) = self.free.pop() {
            self.entries[idx as usize] = Some(entry);
            ProofRef(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            ProofRef(idx)
        }
    }

    /// Begins a new resolution chain starting from `base`. Must be paired
    /// with [`ProofLog::end_chain`]; chains do not nest.
    pub fn begin_chain(&mut self, base: ProofRef) {
        debug_assert!(self.in_progress.is_none(), "resolution chains do not nest");
        self.bump(base);
        self.in_progress = Some(ChainBuilder { base, steps: Vec::new() });
    }

    /// Resolves the chain-in-progress against `on`, pivoting on `pivot`.
    pub fn resolve(&mut self, pivot: Var, on: ProofRef) {
        self.bump(on);
        let builder = self.in_progress.as_mut().expect("resolve called outside begin_chain/end_chain");
        builder.steps.push(ResolutionStep { pivot, on });
    }

    /// Ends the chain-in-progress, registering the derived clause and
    /// returning its reference. The chain's `base` and every `on` clause
    /// keep their bumped refcount (the new entry holds a reference to
    /// them); callers that no longer need the derived clause must still
    /// call [`ProofLog::deleted`] on it eventually.
    pub fn end_chain(&mut self) -> ProofRef {
        let builder = self.in_progress.take().expect("end_chain called without begin_chain");
        self.insert(Origin::Chain { base: builder.base, steps: builder.steps })
    }

    fn bump(&mut self, r: ProofRef) {
        if let Some(Some(e)) = self.entries.get_mut(r.0 as usize) {
            e.refcount += 1;
        }
    }

    /// Drops a reference to a proof clause. Once its refcount reaches zero,
    /// the entry and its transitive references are freed.
    pub fn deleted(&mut self, r: ProofRef) {
        let Some(Some(entry)) = self.entries.get_mut(r.0 as usize) else { return };
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return;
        }
        let entry = self.entries[r.0 as usize].take().unwrap();
        self.free.push(r.0);
        match entry.origin {
            Origin::Root(_) => {}
            Origin::Chain { base, steps } => {
                self.deleted(base);
                for step in steps {
                    self.deleted(step.on);
                }
            }
        }
    }

    /// Reconstructs the literals of a recorded clause by replaying its
    /// resolution chain from the root. For a `Root` entry this is just its
    /// stored literals; for a `Chain`, literals are unioned and the pivot
    /// variable's two polarities cancel at each step.
    pub fn reconstruct(&self, r: ProofRef) -> Vec<Lit> {
        match &self.entries[r.0 as usize].as_ref().expect("dangling proof reference").origin {
            Origin::Root(lits) => lits.to_vec(),
            Origin::Chain { base, steps } => {
                let mut acc = self.reconstruct(*base);
                for step in steps {
                    let other = self.reconstruct(step.on);
                    acc.retain(|l| l.var() != step.pivot);
                    for l in other {
                        if l.var() != step.pivot && !acc.contains(&l) {
                            acc.push(l);
                        }
                    }
                }
                acc
            }
        }
    }

    /// Number of live (non-freed) proof entries.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// This clause's current reference count, or 0 if `r` has already been
    /// freed. Used by [`crate::sat::solver::Solver::remove_vars`] to tell
    /// whether a clause can be fully dereferenced (count would drop to
    /// zero) or is still needed elsewhere in the proof ("stuck").
    pub fn refcount(&self, r: ProofRef) -> u32 {
        self.entries.get(r.0 as usize).and_then(|e| e.as_ref()).map_or(0, |e| e.refcount)
    }

    /// Topologically replays the proof from its roots up to `goal`, calling
    /// `visitor.root`/`visitor.chain` once for each clause on the path from
    /// a root to `goal` (every antecedent before the chain that consumes
    /// it). `visited` is owned by the caller and carried across calls: an id
    /// already in it is skipped, so a second `iterate` call against a later
    /// goal only walks the new suffix of the proof. A `ProofRef` whose slot
    /// was freed and reused for an unrelated clause between two calls is
    /// visited again under the same id, indistinguishable from (and in
    /// effect equivalent to) visiting a brand new clause.
    pub fn iterate(&self, goal: ProofRef, visited: &mut HashSet<ProofRef>, visitor: &mut dyn ProofVisitor) {
        if visited.contains(&goal) {
            return;
        }
        let Some(entry) = self.entries.get(goal.0 as usize).and_then(|e| e.as_ref()) else { return };
        match &entry.origin {
            Origin::Root(lits) => {
                visited.insert(goal);
                visitor.root(goal, lits);
            }
            Origin::Chain { base, steps } => {
                self.iterate(*base, visited, visitor);
                for step in steps {
                    self.iterate(step.on, visited, visitor);
                }
                visited.insert(goal);
                let antecedents: Vec<(Var, ProofRef)> = steps.iter().map(|s| (s.pivot, s.on)).collect();
                visitor.chain(goal, *base, &antecedents);
            }
        }
    }
}

/// Receives a topological replay of a proof log from [`ProofLog::iterate`]:
/// every original clause once, and every resolution chain once, each only
/// after its antecedents have already been delivered.
pub trait ProofVisitor {
    /// An original (root) clause reachable from the goal.
    fn root(&mut self, id: ProofRef, clause: &[Lit]);

    /// A derived clause: resolve `base` against each `(pivot, on)` in
    /// `steps`, pivoting on `pivot`, in order.
    fn chain(&mut self, id: ProofRef, base: ProofRef, steps: &[(Var, ProofRef)]);
}
