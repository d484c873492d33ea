//! The CDCL search engine (§4.6): two-watched-literal propagation, 1-UIP
//! conflict analysis with self-subsuming minimization, a VSIDS activity
//! heap, Luby-scheduled restarts, clause-database reduction, incremental
//! assumptions, and optional resolution-proof logging.

use ahash::AHashMap;
use fixedbitset::FixedBitSet;
use log::{debug, trace};

use crate::error::{CktError, Result};
use crate::sat::clause::{abstraction_of, abstraction_subset, contains_var, ClauseDb, ClauseId, LitList};
use crate::sat::lit::{Lit, Var};
use crate::sat::proof::{ProofLog, ProofRef};

/// Tunable search parameters (§4.6), mirroring the kind of plain
/// `Default`-backed options struct the rest of this crate uses instead of a
/// builder.
#[derive(Debug, Clone, Copy)]
pub struct SolverOpts {
    /// VSIDS activity decay factor, applied once per conflict.
    pub var_decay: f64,
    /// Clause activity decay factor, applied once per conflict.
    pub clause_decay: f32,
    /// Base conflict count of the Luby restart sequence's unit interval.
    pub restart_base: u64,
    /// Fraction of learnt clauses kept by [`Solver::reduce_db`] (0.0-1.0).
    pub reduce_keep_fraction: f32,
    /// Number of conflicts between clause-database reductions.
    pub reduce_interval: u64,
    /// Whether to record a resolution proof as the search progresses.
    pub proof_logging: bool,
}

impl Default for SolverOpts {
    fn default() -> Self {
        SolverOpts {
            var_decay: 0.95,
            clause_decay: 0.999,
            restart_base: 100,
            reduce_keep_fraction: 0.5,
            reduce_interval: 2000,
            proof_logging: false,
        }
    }
}

/// Running counts of search activity, read-only from outside the solver.
///
/// Mirrors the handful of counters a caller actually wants to log or report
/// (decisions, propagations, conflicts, restarts) rather than a full
/// instrumentation dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
}

/// The outcome of a [`Solver::solve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// A satisfying assignment was found; see [`Solver::model`].
    Sat,
    /// The clause set (under the active assumptions) is unsatisfiable; see
    /// [`Solver::conflict_assumptions`].
    Unsat,
    /// Search was cut short by a resource budget before a verdict was
    /// reached.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    assignment: Option<bool>,
    level: i32,
    reason: Option<ClauseId>,
    polarity: bool,
}

impl Default for VarData {
    fn default() -> Self {
        VarData { assignment: None, level: -1, reason: None, polarity: false }
    }
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    clause: ClauseId,
    blocker: Lit,
}

/// A simple MiniSat-style indexed binary max-heap over variables, ordered
/// by an externally owned activity table.
struct VarHeap {
    heap: Vec<Var>,
    pos: Vec<Option<u32>>,
}

impl VarHeap {
    fn new() -> Self {
        VarHeap { heap: Vec::new(), pos: Vec::new() }
    }

    fn ensure(&mut self, var: Var) {
        let idx = var.index() as usize;
        if idx >= self.pos.len() {
            self.pos.resize(idx + 1, None);
        }
    }

    fn contains(&self, var: Var) -> bool {
        self.pos.get(var.index() as usize).copied().flatten().is_some()
    }

    fn push(&mut self, var: Var, activity: &[f64]) {
        self.ensure(var);
        if self.contains(var) {
            return;
        }
        let i = self.heap.len() as u32;
        self.heap.push(var);
        self.pos[var.index() as usize] = Some(i);
        self.sift_up(i, activity);
    }

    fn sift_up(&mut self, mut i: u32, activity: &[f64]) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if activity[self.heap[parent as usize].index() as usize] >= activity[self.heap[i as usize].index() as usize] {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: u32, activity: &[f64]) {
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut largest = i;
            if (l as usize) < self.heap.len()
                && activity[self.heap[l as usize].index() as usize] > activity[self.heap[largest as usize].index() as usize]
            {
                largest = l;
            }
            if (r as usize) < self.heap.len()
                && activity[self.heap[r as usize].index() as usize] > activity[self.heap[largest as usize].index() as usize]
            {
                largest = r;
            }
            if largest == i {
                break;
            }
            self.swap(i, largest);
            i = largest;
        }
    }

    fn swap(&mut self, i: u32, j: u32) {
        self.heap.swap(i as usize, j as usize);
        self.pos[self.heap[i as usize].index() as usize] = Some(i);
        self.pos[self.heap[j as usize].index() as usize] = Some(j);
    }

    fn pop(&mut self, activity: &[f64]) -> Option<Var> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap[0];
        let last = self.heap.pop().unwrap();
        self.pos[top.index() as usize] = None;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.pos[last.index() as usize] = Some(0);
            self.sift_down(0, activity);
        }
        Some(top)
    }

    fn update(&mut self, var: Var, activity: &[f64]) {
        if let Some(i) = self.pos.get(var.index() as usize).copied().flatten() {
            self.sift_up(i, activity);
            self.sift_down(i, activity);
        }
    }
}

/// The CDCL SAT solver (§4.6).
pub struct Solver {
    opts: SolverOpts,
    vars: Vec<VarData>,
    deleted_vars: FixedBitSet,
    activity: Vec<f64>,
    var_inc: f64,
    order: VarHeap,

    clauses: ClauseDb,
    watches: Vec<Vec<Watcher>>,
    clause_inc: f32,

    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,

    assumptions: Vec<Lit>,
    conflict_assumptions: Vec<Lit>,

    ok: bool,
    conflicts: u64,
    luby_index: u64,
    conflicts_since_restart: u64,
    conflicts_since_reduce: u64,
    stats: SolverStats,

    proof: Option<ProofLog>,
    clause_proof: AHashMap<ClauseId, ProofRef>,
    empty_clause_proof: Option<ProofRef>,

    seen: FixedBitSet,
}

impl Solver {
    /// Builds an empty solver.
    pub fn new(opts: SolverOpts) -> Self {
        Solver {
            opts,
            vars: Vec::new(),
            deleted_vars: FixedBitSet::new(),
            activity: Vec::new(),
            var_inc: 1.0,
            order: VarHeap::new(),
            clauses: ClauseDb::default(),
            watches: Vec::new(),
            clause_inc: 1.0,
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            assumptions: Vec::new(),
            conflict_assumptions: Vec::new(),
            ok: true,
            conflicts: 0,
            luby_index: 1,
            conflicts_since_restart: 0,
            conflicts_since_reduce: 0,
            stats: SolverStats::default(),
            proof: opts.proof_logging.then(ProofLog::default),
            clause_proof: AHashMap::default(),
            empty_clause_proof: None,
            seen: FixedBitSet::new(),
        }
    }

    /// Number of variables known to the solver (including deleted ones,
    /// whose slots are never reused).
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Whether the solver has already determined the clause set is
    /// unconditionally unsatisfiable (independent of any assumptions).
    pub fn is_unusable(&self) -> bool {
        !self.ok
    }

    /// Allocates a fresh variable.
    pub fn new_var(&mut self) -> Result<Var> {
        const MAX_VAR: usize = 0x7fff_ffff;
        if self.vars.len() >= MAX_VAR {
            return Err(CktError::VariableSpaceExhausted);
        }
        let var = Var::new(self.vars.len() as u32);
        self.vars.push(VarData::default());
        self.activity.push(0.0);
        self.deleted_vars.grow(self.vars.len());
        self.watches.push(Vec::new());
        self.watches.push(Vec::new());
        self.order.push(var, &self.activity);
        Ok(var)
    }

    fn value(&self, lit: Lit) -> Option<bool> {
        self.vars[lit.var().index() as usize].assignment.map(|v| v ^ lit.sign())
    }

    fn level(&self, var: Var) -> i32 {
        self.vars[var.index() as usize].level
    }

    fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    /// Registers a clause. Performs static simplification (duplicate and
    /// tautology removal, dropping literals already falsified at level 0)
    /// and, for a resulting unit clause, enqueues it immediately. Returns
    /// `Ok(())` even if the clause set becomes unsatisfiable as a result;
    /// check [`Solver::is_unusable`] afterward.
    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<()> {
        if !self.ok {
            return Ok(());
        }
        let mut lits: LitList = lits.iter().copied().collect();
        lits.sort_unstable();
        lits.dedup();
        for w in lits.windows(2) {
            if w[0].var() == w[1].var() {
                // a literal and its negation both present: tautology
                return Ok(());
            }
        }
        lits.retain(|&l| self.level(l.var()) != 0 || self.value(l) != Some(false));
        if lits.iter().any(|&l| self.level(l.var()) == 0 && self.value(l) == Some(true)) {
            return Ok(());
        }

        let proof_ref = self.proof.as_mut().map(|p| p.add_root(&lits));

        match lits.len() {
            0 => {
                self.ok = false;
                self.empty_clause_proof = proof_ref;
            }
            1 => {
                if !self.enqueue(lits[0], None) {
                    self.ok = false;
                    self.empty_clause_proof = proof_ref;
                } else if self.propagate().is_some() {
                    self.ok = false;
                    self.empty_clause_proof = proof_ref;
                }
            }
            _ => {
                let id = self.clauses.add(lits.clone(), false);
                self.watch_clause(id, &lits);
                if let Some(r) = proof_ref {
                    self.clause_proof.insert(id, r);
                }
            }
        }
        Ok(())
    }

    fn watch_clause(&mut self, id: ClauseId, lits: &[Lit]) {
        self.watches[lits[0].negate().code()].push(Watcher { clause: id, blocker: lits[1] });
        self.watches[lits[1].negate().code()].push(Watcher { clause: id, blocker: lits[0] });
    }

    fn enqueue(&mut self, lit: Lit, reason: Option<ClauseId>) -> bool {
        match self.value(lit) {
            Some(true) => true,
            Some(false) => false,
            None => {
                let var = lit.var();
                let level = self.decision_level() as i32;
                let data = &mut self.vars[var.index() as usize];
                data.assignment = Some(!lit.sign());
                data.level = level;
                data.reason = reason;
                self.trail.push(lit);
                true
            }
        }
    }

    /// Unit-propagates, returning the conflicting clause id if one arises.
    fn propagate(&mut self) -> Option<ClauseId> {
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;
            let code = p.code();
            let mut i = 0;
            let mut conflict = None;
            'watchers: while i < self.watches[code].len() {
                let Watcher { clause: cid, blocker } = self.watches[code][i];
                if self.value(blocker) == Some(true) {
                    i += 1;
                    continue;
                }
                let c_lits_len = self.clauses.get(cid).lits().len();
                // Ensure the falsified literal is lits[1], the other watch
                // lits[0].
                let false_lit = p.negate();
                {
                    let clause = self.clauses.get_mut(cid);
                    if clause.lits()[0] == false_lit {
                        clause.lits_mut().swap(0, 1);
                    }
                }
                let first = self.clauses.get(cid).lits()[0];
                if self.value(first) == Some(true) {
                    self.watches[code][i].blocker = first;
                    i += 1;
                    continue;
                }
                let mut found_new_watch = false;
                for k in 2..c_lits_len {
                    let lk = self.clauses.get(cid).lits()[k];
                    if self.value(lk) != Some(false) {
                        self.clauses.get_mut(cid).lits_mut().swap(1, k);
                        self.watches[lk.negate().code()].push(Watcher { clause: cid, blocker: first });
                        self.watches[code].swap_remove(i);
                        found_new_watch = true;
                        break;
                    }
                }
                if found_new_watch {
                    continue 'watchers;
                }
                if self.value(first) == Some(false) {
                    conflict = Some(cid);
                    i += 1;
                    break 'watchers;
                }
                self.watches[code][i].blocker = first;
                if !self.enqueue(first, Some(cid)) {
                    conflict = Some(cid);
                    i += 1;
                    break 'watchers;
                }
                i += 1;
            }
            if let Some(cid) = conflict {
                return Some(cid);
            }
        }
        None
    }

    fn new_decision_level(&mut self) {
        self.stats.decisions += 1;
        self.trail_lim.push(self.trail.len());
    }

    fn cancel_until(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let bound = self.trail_lim[level];
        for i in (bound..self.trail.len()).rev() {
            let var = self.trail[i].var();
            let data = &mut self.vars[var.index() as usize];
            data.polarity = data.assignment.unwrap_or(data.polarity);
            data.assignment = None;
            data.level = -1;
            data.reason = None;
            if !self.deleted_vars.contains(var.index() as usize) {
                self.order.push(var, &self.activity);
            }
        }
        self.trail.truncate(bound);
        self.trail_lim.truncate(level);
        self.qhead = self.trail.len();
    }

    fn bump_var(&mut self, var: Var) {
        self.activity[var.index() as usize] += self.var_inc;
        if self.activity[var.index() as usize] > 1e100 {
            for a in &mut self.activity {
                *a *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }
        self.order.update(var, &self.activity);
    }

    fn decay_var_activity(&mut self) {
        self.var_inc /= self.opts.var_decay;
    }

    fn bump_clause(&mut self, id: ClauseId) {
        let clause = self.clauses.get_mut(id);
        clause.bump_activity(self.clause_inc);
        if clause.activity() > 1e20 {
            for id2 in self.clauses.iter_live().collect::<Vec<_>>() {
                self.clauses.get_mut(id2).rescale_activity(1e-20);
            }
            self.clause_inc *= 1e-20;
        }
    }

    fn decay_clause_activity(&mut self) {
        self.clause_inc /= self.opts.clause_decay;
    }

    /// 1-UIP conflict analysis with self-subsuming minimization, returning
    /// the learnt clause (asserting literal first) and the backjump level.
    fn analyze(&mut self, mut confl: ClauseId) -> (LitList, usize) {
        self.seen.grow(self.vars.len());
        self.seen.clear();

        let mut learnt: LitList = LitList::new();
        learnt.push(Lit::from_code(0)); // placeholder for the asserting literal
        let mut path_count = 0usize;
        let mut trail_idx = self.trail.len();
        let mut pivot: Option<Lit> = None;

        if self.proof.is_some() {
            let r = self.clause_proof_ref(confl);
            self.proof.as_mut().unwrap().begin_chain(r);
        }

        loop {
            for &lit in self.clauses.get(confl).lits().iter() {
                let var = lit.var();
                if !self.seen.contains(var.index() as usize) && self.level(var) > 0 {
                    self.seen.insert(var.index() as usize);
                    self.bump_var(var);
                    if self.level(var) >= self.decision_level() as i32 {
                        path_count += 1;
                    } else {
                        learnt.push(lit);
                    }
                }
            }
            self.bump_clause(confl);

            // Step back to the next seen literal on the trail.
            while !self.seen.contains(self.trail[trail_idx - 1].var().index() as usize) {
                trail_idx -= 1;
            }
            trail_idx -= 1;
            let cur_lit = self.trail[trail_idx];
            let cur_var = cur_lit.var();
            self.seen.set(cur_var.index() as usize, false);
            path_count -= 1;
            if path_count == 0 {
                pivot = Some(cur_lit);
                break;
            }
            let reason = self.vars[cur_var.index() as usize].reason.expect("non-decision literal must have a reason");
            if self.proof.is_some() {
                let r = self.clause_proof_ref(reason);
                self.proof.as_mut().unwrap().resolve(cur_var, r);
            }
            confl = reason;
        }

        let asserting = pivot.unwrap().negate();
        learnt[0] = asserting;

        self.minimize(&mut learnt);

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let mut max_idx = 1;
            for i in 2..learnt.len() {
                if self.level(learnt[i].var()) > self.level(learnt[max_idx].var()) {
                    max_idx = i;
                }
            }
            learnt.swap(1, max_idx);
            self.level(learnt[1].var()).max(0) as usize
        };

        (learnt, backtrack_level)
    }

    /// Resolves a level-0 conflicting clause down to the empty clause by
    /// repeatedly resolving away each of its literals against its reason,
    /// and records the chain in the proof log.
    fn derive_empty_clause(&mut self, confl: ClauseId) -> ProofRef {
        let base = self.clause_proof_ref(confl);
        self.proof.as_mut().unwrap().begin_chain(base);
        let mut pending: Vec<Lit> = self.clauses.get(confl).lits().to_vec();
        let mut resolved = std::collections::HashSet::new();
        while let Some(lit) = pending.pop() {
            if !resolved.insert(lit.var()) {
                continue;
            }
            let Some(reason) = self.vars[lit.var().index() as usize].reason else { continue };
            let r = self.clause_proof_ref(reason);
            self.proof.as_mut().unwrap().resolve(lit.var(), r);
            for &l in self.clauses.get(reason).lits() {
                if l.var() != lit.var() && !resolved.contains(&l.var()) {
                    pending.push(l);
                }
            }
        }
        self.proof.as_mut().unwrap().end_chain()
    }

    fn clause_proof_ref(&mut self, id: ClauseId) -> ProofRef {
        *self.clause_proof.entry(id).or_insert_with(|| {
            // A clause with no recorded root (a unit enqueued without going
            // through `add_clause`'s proof path) is re-registered verbatim;
            // this keeps the proof log total even over such clauses.
            let lits = self.clauses.get(id).lits().to_vec();
            self.proof.as_mut().unwrap().add_root(&lits)
        })
    }

    /// Drops any learnt literal implied by the reason clauses of other
    /// literals already in `learnt` (self-subsuming resolution), using each
    /// clause's abstraction bitmask to skip clauses that cannot possibly
    /// subsume before doing the full check.
    fn minimize(&mut self, learnt: &mut LitList) {
        let learnt_abstraction = abstraction_of(learnt);
        let mut keep = vec![true; learnt.len()];
        for i in 1..learnt.len() {
            let lit = learnt[i];
            let Some(reason) = self.vars[lit.var().index() as usize].reason else { continue };
            let reason_clause = self.clauses.get(reason);
            // A reason clause that touches a variable absent from `learnt`
            // cannot have every one of its literals already present there;
            // reject it without walking its literals.
            if !abstraction_subset(reason_clause.abstraction(), learnt_abstraction) {
                continue;
            }
            // This literal is redundant iff every other literal in its
            // reason clause already appears (negated, as stored) in the
            // learnt clause: resolving it away adds nothing new.
            let redundant = reason_clause
                .lits()
                .iter()
                .all(|&rl| rl.var() == lit.var() || (contains_var(learnt, rl.var()) && learnt.contains(&rl)));
            keep[i] = !redundant;
        }
        let mut out = LitList::new();
        for (i, &lit) in learnt.iter().enumerate() {
            if keep[i] {
                out.push(lit);
            }
        }
        *learnt = out;
    }

    /// Clause-database reduction (§4.6): keeps all non-learnt clauses,
    /// clauses of width <= 2, and clauses currently serving as an
    /// assignment's reason; among the rest keeps the most active half.
    pub fn reduce_db(&mut self) {
        let mut learnt_ids: Vec<ClauseId> = self
            .clauses
            .iter_live()
            .filter(|&id| self.clauses.get(id).is_learnt() && self.clauses.get(id).lits().len() > 2)
            .collect();
        learnt_ids.sort_by(|&a, &b| {
            self.clauses.get(b).activity().partial_cmp(&self.clauses.get(a).activity()).unwrap()
        });
        let keep_count = (learnt_ids.len() as f32 * self.opts.reduce_keep_fraction) as usize;
        let locked: std::collections::HashSet<ClauseId> =
            self.vars.iter().filter_map(|v| v.reason).collect();
        for &id in learnt_ids.iter().skip(keep_count) {
            if locked.contains(&id) {
                continue;
            }
            self.remove_clause(id);
        }
        self.garbage_collect();
    }

    fn remove_clause(&mut self, id: ClauseId) {
        if let Some(r) = self.clause_proof.remove(&id) {
            if let Some(proof) = &mut self.proof {
                proof.deleted(r);
            }
        }
        self.clauses.remove(id);
    }

    fn garbage_collect(&mut self) {
        let remap = self.clauses.gc();
        for list in &mut self.watches {
            list.retain_mut(|w| match remap[w.clause.index()] {
                Some(new_id) => {
                    w.clause = new_id;
                    true
                }
                None => false,
            });
        }
        for v in &mut self.vars {
            if let Some(r) = v.reason {
                v.reason = remap[r.index()];
            }
        }
        self.clause_proof = self.clause_proof.drain().filter_map(|(id, r)| remap[id.index()].map(|new_id| (new_id, r))).collect();
    }

    fn luby(&self) -> u64 {
        luby_sequence(self.luby_index)
    }

    fn pick_branch_lit(&mut self) -> Option<Lit> {
        loop {
            let var = self.order.pop(&self.activity)?;
            if self.deleted_vars.contains(var.index() as usize) {
                continue;
            }
            if self.vars[var.index() as usize].assignment.is_some() {
                continue;
            }
            let polarity = self.vars[var.index() as usize].polarity;
            return Some(if polarity { var.pos() } else { var.neg() });
        }
    }

    /// Sets the assumption literals for the next [`Solver::solve`] call.
    pub fn assume(&mut self, lits: &[Lit]) {
        self.assumptions = lits.to_vec();
    }

    /// After an [`SolveResult::Unsat`] under assumptions, the subset of the
    /// assumption literals that were actually responsible for the
    /// conflict.
    pub fn conflict_assumptions(&self) -> &[Lit] {
        &self.conflict_assumptions
    }

    /// The satisfying assignment after [`SolveResult::Sat`].
    pub fn model(&self) -> Vec<Option<bool>> {
        self.vars.iter().map(|v| v.assignment).collect()
    }

    /// Search counters accumulated so far (decisions, propagations,
    /// conflicts, restarts), for a caller that wants to log or report them.
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// The value `lit` is forced to at decision level 0, or `None` if it
    /// isn't determined independently of the current assumptions. Unlike
    /// [`Solver::model`] this stays meaningful mid-search and across
    /// `solve()` calls under different assumptions.
    pub fn top_value(&self, lit: Lit) -> Option<bool> {
        if self.level(lit.var()) == 0 {
            self.value(lit)
        } else {
            None
        }
    }

    /// Runs search to completion, or until `conflict_budget` conflicts have
    /// elapsed (`None` for unbounded).
    pub fn solve(&mut self, conflict_budget: Option<u64>) -> SolveResult {
        if !self.ok {
            return SolveResult::Unsat;
        }
        let budget_target = conflict_budget.map(|b| self.conflicts + b);
        let assumptions = self.assumptions.clone();
        let mut assumption_idx = 0usize;

        loop {
            let confl = self.propagate();
            match confl {
                Some(cid) => {
                    self.conflicts += 1;
                    self.stats.conflicts += 1;
                    self.conflicts_since_restart += 1;
                    self.conflicts_since_reduce += 1;
                    if self.decision_level() == 0 {
                        trace!("conflict at level 0, formula unsat");
                        if self.proof.is_some() {
                            self.empty_clause_proof = Some(self.derive_empty_clause(cid));
                        }
                        self.ok = false;
                        return SolveResult::Unsat;
                    }
                    let (learnt, backtrack_level) = self.analyze(cid);
                    if self.proof.is_some() {
                        let r = self.proof.as_mut().unwrap().end_chain();
                        if learnt.is_empty() {
                            self.empty_clause_proof = Some(r);
                        }
                    }
                    self.cancel_until(backtrack_level);
                    self.decay_var_activity();
                    self.decay_clause_activity();
                    if learnt.len() == 1 {
                        self.enqueue(learnt[0], None);
                    } else {
                        let id = self.clauses.add(learnt.clone(), true);
                        self.watch_clause(id, &learnt);
                        self.bump_clause(id);
                        self.enqueue(learnt[0], Some(id));
                    }
                    if self.conflicts_since_reduce >= self.opts.reduce_interval {
                        self.conflicts_since_reduce = 0;
                        debug!("reducing clause database, {} learnt clauses live", self.clauses.len());
                        self.reduce_db();
                    }
                }
                None => {
                    if let Some(target) = budget_target {
                        if self.conflicts >= target {
                            return SolveResult::Unknown;
                        }
                    }
                    if self.conflicts_since_restart >= self.opts.restart_base * self.luby() {
                        self.conflicts_since_restart = 0;
                        self.luby_index += 1;
                        self.stats.restarts += 1;
                        trace!("restarting after {} conflicts", self.conflicts);
                        self.cancel_until(0);
                        continue;
                    }
                    while assumption_idx < assumptions.len() {
                        let a = assumptions[assumption_idx];
                        match self.value(a) {
                            Some(true) => {
                                assumption_idx += 1;
                                continue;
                            }
                            Some(false) => {
                                self.conflict_assumptions = vec![a];
                                return SolveResult::Unsat;
                            }
                            None => {
                                self.new_decision_level();
                                self.enqueue(a, None);
                                assumption_idx += 1;
                                break;
                            }
                        }
                    }
                    if assumption_idx < assumptions.len() {
                        continue;
                    }
                    let Some(lit) = self.pick_branch_lit() else {
                        return SolveResult::Sat;
                    };
                    self.new_decision_level();
                    self.enqueue(lit, None);
                }
            }
        }
    }

    /// Deletes as many of `vars` as can be safely forgotten, returning the
    /// ones that could not be (`kept_vars`, §4.6 Scenario 6). A variable is
    /// kept if it is still assigned, or if proof logging is on and some
    /// clause mentioning it is still needed by the proof of some other,
    /// still-live derivation ("stuck") — dereferencing it would strand a
    /// reconstruction the log still needs. In non-proof mode every clause
    /// mentioning an otherwise-removable variable is simply dropped.
    /// Watch lists and the clause arena are purged consistently; the
    /// variable ids freed here are never reused for new variables.
    pub fn remove_vars(&mut self, vars: &[Var]) -> Result<Vec<Var>> {
        self.deleted_vars.grow(self.vars.len());
        let mut kept = Vec::new();
        let mut to_remove: Vec<ClauseId> = Vec::new();

        for &var in vars {
            if self.vars[var.index() as usize].assignment.is_some() {
                kept.push(var);
                continue;
            }

            let mut referencing: Vec<ClauseId> = Vec::new();
            for &lit in [var.pos(), var.neg()].iter() {
                for w in &self.watches[lit.code()] {
                    if self.clauses.get(w.clause).lits().iter().any(|l| l.var() == var) {
                        referencing.push(w.clause);
                    }
                }
            }
            referencing.sort_unstable_by_key(|id| id.index());
            referencing.dedup();

            if self.proof.is_some() {
                let stuck = referencing.iter().any(|&cid| {
                    self.clause_proof.get(&cid).is_some_and(|&r| self.proof.as_ref().unwrap().refcount(r) > 1)
                });
                if stuck {
                    kept.push(var);
                    continue;
                }
            }

            to_remove.extend(referencing);
            self.deleted_vars.insert(var.index() as usize);
            self.activity[var.index() as usize] = 0.0;
        }

        to_remove.sort_unstable_by_key(|id| id.index());
        to_remove.dedup();
        for cid in to_remove {
            self.remove_clause(cid);
        }
        self.garbage_collect();

        debug!("removed {} of {} requested variables from solver", vars.len() - kept.len(), vars.len());
        Ok(kept)
    }

    /// The resolution proof log, if proof logging was enabled (§4.7).
    pub fn proof(&self) -> Option<&ProofLog> {
        self.proof.as_ref()
    }

    /// The proof reference for the derivation of the empty clause, once
    /// the solver has established unconditional unsatisfiability.
    pub fn empty_clause_proof(&self) -> Option<ProofRef> {
        self.empty_clause_proof
    }
}

/// The Luby restart sequence: 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...
fn luby_sequence(mut i: u64) -> u64 {
    let mut size = 1u64;
    let mut seq = 0u64;
    while size < i + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size != i + 1 {
        size = (size - 1) / 2;
        seq -= 1;
        i %= size;
    }
    1u64 << seq
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("num_vars", &self.vars.len())
            .field("num_clauses", &self.clauses.len())
            .field("conflicts", &self.conflicts)
            .field("ok", &self.ok)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_matches_known_prefix() {
        let expected = [1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8];
        for (i, &e) in expected.iter().enumerate() {
            assert_eq!(luby_sequence(i as u64), e, "luby({i})");
        }
    }

    #[test]
    fn trivial_unit_clauses_are_solved_without_search() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Sat);
        assert_eq!(s.model()[x.index() as usize], Some(true));
    }

    #[test]
    fn contradictory_units_are_unsat() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        s.add_clause(&[x.neg()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Unsat);
    }

    #[test]
    fn a_small_satisfiable_formula_finds_a_model() {
        // (x v y) & (~x v y) & (x v ~y)  =>  x=y=true is the only model
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        let y = s.new_var().unwrap();
        s.add_clause(&[x.pos(), y.pos()]).unwrap();
        s.add_clause(&[x.neg(), y.pos()]).unwrap();
        s.add_clause(&[x.pos(), y.neg()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Sat);
        let model = s.model();
        assert_eq!(model[x.index() as usize], Some(true));
        assert_eq!(model[y.index() as usize], Some(true));
    }

    #[test]
    fn all_four_binary_clauses_over_two_vars_is_unsat() {
        // Every one of (x|y),(~x|y),(x|~y),(~x|~y) forces a different
        // corner of the truth table; together they're unsatisfiable.
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        let y = s.new_var().unwrap();
        s.add_clause(&[x.pos(), y.pos()]).unwrap();
        s.add_clause(&[x.neg(), y.pos()]).unwrap();
        s.add_clause(&[x.pos(), y.neg()]).unwrap();
        s.add_clause(&[x.neg(), y.neg()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Unsat);
    }

    #[test]
    fn assumptions_drive_conflict_assumptions() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        s.assume(&[x.neg()]);
        assert_eq!(s.solve(None), SolveResult::Unsat);
        assert_eq!(s.conflict_assumptions(), &[x.neg()]);
    }

    #[test]
    fn remove_vars_in_non_proof_mode_simply_deletes_referencing_clauses() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        let y = s.new_var().unwrap();
        s.add_clause(&[x.pos(), y.pos()]).unwrap();
        assert!(s.remove_vars(&[x]).unwrap().is_empty(), "no proof log to get stuck on");
        assert_eq!(s.solve(None), SolveResult::Sat, "the clause referencing x is gone");
    }

    #[test]
    fn remove_vars_keeps_a_currently_assigned_variable() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Sat);
        assert_eq!(s.remove_vars(&[x]).unwrap(), vec![x]);
    }

    #[test]
    fn remove_vars_under_proof_keeps_a_variable_still_needed_by_a_derivation() {
        // Scenario 6: (x1 v x2), (x1 v ~x2) resolve on x2 into the unit {x1}.
        // Both roots are bumped above refcount 1 by that chain, so x2 (whose
        // only clauses are those roots) must come back in kept_vars even
        // though it is currently unassigned.
        let mut s = Solver::new(SolverOpts { proof_logging: true, ..SolverOpts::default() });
        let x1 = s.new_var().unwrap();
        let x2 = s.new_var().unwrap();
        s.add_clause(&[x1.pos(), x2.pos()]).unwrap();
        s.add_clause(&[x1.pos(), x2.neg()]).unwrap();

        let roots: Vec<ProofRef> = {
            let mut rs: Vec<(ClauseId, ProofRef)> = s.clause_proof.iter().map(|(&id, &r)| (id, r)).collect();
            rs.sort_by_key(|&(id, _)| id.index());
            rs.into_iter().map(|(_, r)| r).collect()
        };
        assert_eq!(roots.len(), 2, "both clauses were registered as proof roots");

        s.proof.as_mut().unwrap().begin_chain(roots[0]);
        s.proof.as_mut().unwrap().resolve(x2, roots[1]);
        let derived = s.proof.as_mut().unwrap().end_chain();
        assert_eq!(s.proof().unwrap().reconstruct(derived), vec![x1.pos()]);

        let kept = s.remove_vars(&[x2]).unwrap();
        assert_eq!(kept, vec![x2], "x2's roots are still referenced by the derived unit's chain");

        assert_eq!(s.solve(None), SolveResult::Sat);
        assert_eq!(s.model()[x1.index() as usize], Some(true));
    }

    #[test]
    fn top_value_reports_only_level_zero_forcing() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        let y = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Sat);
        // x is forced at level 0 by its unit clause; y was only ever a free
        // choice made during search, so it carries no top-level value.
        assert_eq!(s.top_value(x.pos()), Some(true));
        assert_eq!(s.top_value(x.neg()), Some(false));
        assert_eq!(s.top_value(y.pos()), None);
    }

    #[test]
    fn stats_count_decisions_and_propagations() {
        let mut s = Solver::new(SolverOpts::default());
        let x = s.new_var().unwrap();
        let y = s.new_var().unwrap();
        s.add_clause(&[x.pos()]).unwrap();
        s.add_clause(&[x.neg(), y.pos()]).unwrap();
        assert_eq!(s.solve(None), SolveResult::Sat);
        let stats = s.stats();
        assert!(stats.propagations >= 2, "both x's unit clause and y's implication must register as propagations");
        assert_eq!(stats.conflicts, 0, "no branch here can conflict, both clauses are satisfied by unit propagation alone");
    }
}
