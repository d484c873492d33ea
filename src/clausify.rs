//! The clausifier (§4.5): translates a netlist's combinational cones into
//! CNF over a [`SatBackend`]'s own variable space, memoizing wire -> literal
//! so a shared fanin is clausified once regardless of how many sinks need it.
//!
//! And-gate encoding special-cases two shapes before falling back to plain
//! Tseitin: a chain of two-input Ands is flattened into one k-ary
//! conjunction (fewer intermediate variables than cascaded pairwise
//! encoding), and the canonical AIG decomposition of a multiplexer (two
//! Ands sharing a complementary select) is recognized and encoded directly
//! as an if-then-else, collapsing further to an Xor/Xnor when its branches
//! are complementary.

use ahash::AHashMap;

use crate::error::{CktError, Result};
use crate::gate::GateType;
use crate::lit::Wire;
use crate::netlist::Netlist;
use crate::sat::{Lit, SatBackend, SolveResult};

/// Translates netlist wires into solver literals on demand.
///
/// Generic over any [`SatBackend`] rather than pinned to the concrete
/// [`crate::sat::Solver`], so a caller depending only on this encoding can
/// be handed a different backend without this module changing.
pub struct Clausifier<'a> {
    netlist: &'a Netlist,
    memo: AHashMap<u32, Lit>,
}

impl<'a> Clausifier<'a> {
    /// Builds a clausifier over a netlist. Nothing is clausified until a
    /// wire is actually requested.
    pub fn new(netlist: &'a Netlist) -> Self {
        Clausifier { netlist, memo: AHashMap::default() }
    }

    /// The solver literal for a (possibly negated) wire, clausifying its
    /// transitive fanin on demand.
    pub fn literal<S: SatBackend>(&mut self, solver: &mut S, wire: Wire) -> Result<Lit> {
        let base = self.gate_literal(solver, wire.id())?;
        Ok(if wire.sign() { !base } else { base })
    }

    /// Number of gates clausified so far.
    pub fn memoized_count(&self) -> usize {
        self.memo.len()
    }

    fn gate_literal<S: SatBackend>(&mut self, solver: &mut S, id: u32) -> Result<Lit> {
        if let Some(&lit) = self.memo.get(&id) {
            return Ok(lit);
        }
        let wire = Wire::new(id, false);
        let gate = self.netlist.gate(wire).ok_or(CktError::DanglingReference { wire })?;
        let ty = gate.ty();
        let fanins: Vec<Wire> = gate.fanins().to_vec();

        let lit = match ty {
            GateType::Const => {
                let v = solver.new_var()?;
                solver.add_clause(&[v.neg()])?;
                v.pos()
            }
            GateType::Pi | GateType::Flop | GateType::So | GateType::Seq | GateType::Npn4 | GateType::Lut6 | GateType::Uif => {
                solver.new_var()?.pos()
            }
            GateType::Po => self.literal(solver, fanins[0])?,
            GateType::Buf => self.literal(solver, fanins[0])?,
            GateType::Not => !self.literal(solver, fanins[0])?,
            GateType::And => self.encode_and(solver, fanins[0], fanins[1])?,
            GateType::Xor => {
                let a = self.literal(solver, fanins[0])?;
                let b = self.literal(solver, fanins[1])?;
                encode_xor(solver, a, b, false)?
            }
            GateType::Equiv => {
                let a = self.literal(solver, fanins[0])?;
                let b = self.literal(solver, fanins[1])?;
                encode_xor(solver, a, b, true)?
            }
            GateType::Mux => {
                let s = self.literal(solver, fanins[0])?;
                let t = self.literal(solver, fanins[1])?;
                let e = self.literal(solver, fanins[2])?;
                encode_mux(solver, s, t, e)?
            }
            GateType::Maj => {
                let lits: Vec<Lit> =
                    fanins.iter().map(|&w| self.literal(solver, w)).collect::<Result<_>>()?;
                encode_truth_table(solver, &lits, MAJ3_TABLE)?
            }
            GateType::Or | GateType::Disj => {
                let lits: Vec<Lit> =
                    fanins.iter().map(|&w| self.literal(solver, w)).collect::<Result<_>>()?;
                encode_or(solver, &lits)?
            }
            GateType::Conj => {
                let lits: Vec<Lit> =
                    fanins.iter().map(|&w| self.literal(solver, w)).collect::<Result<_>>()?;
                encode_and_kary(solver, &lits)?
            }
            GateType::Lut4 => {
                let lits: Vec<Lit> =
                    fanins.iter().map(|&w| self.literal(solver, w)).collect::<Result<_>>()?;
                let table = match gate.attr() {
                    crate::gate::Attr::Ftb4(t) => t as u64,
                    _ => 0,
                };
                encode_truth_table(solver, &lits, table)?
            }
        };
        self.memo.insert(id, lit);
        Ok(lit)
    }

    fn encode_and<S: SatBackend>(&mut self, solver: &mut S, x: Wire, y: Wire) -> Result<Lit> {
        if let Some((s, t, e)) = self.detect_mux_pattern(x, y) {
            let sl = self.literal(solver, s)?;
            if t == !e {
                let el = self.literal(solver, e)?;
                return encode_xor(solver, sl, el, false);
            }
            let tl = self.literal(solver, t)?;
            let el = self.literal(solver, e)?;
            return encode_mux(solver, sl, tl, el);
        }
        let mut leaves = Vec::new();
        self.collect_and_leaves(x, &mut leaves);
        self.collect_and_leaves(y, &mut leaves);
        let lits: Vec<Lit> = leaves.iter().map(|&w| self.literal(solver, w)).collect::<Result<_>>()?;
        encode_and_kary(solver, &lits)
    }

    /// Flattens a tree of (unsigned, i.e. non-negated) two-input And gates
    /// into its leaves. A negated reference to an And gate is a leaf in
    /// its own right (De Morgan turns a negated conjunction into a
    /// disjunction, which this collector does not flatten), and so is an
    /// And gate already clausified or fed by more than one sink: flattening
    /// through it would re-encode a shared subexpression once per parent
    /// instead of clausifying it once and referencing its literal.
    fn collect_and_leaves(&self, wire: Wire, out: &mut Vec<Wire>) {
        if wire.sign() {
            out.push(wire);
            return;
        }
        match self.netlist.gate(wire) {
            Some(gate) if gate.ty() == GateType::And && !self.is_shared(wire.id()) => {
                let fanins = gate.fanins();
                self.collect_and_leaves(fanins[0], out);
                self.collect_and_leaves(fanins[1], out);
            }
            _ => out.push(wire),
        }
    }

    /// Whether `id` has more than one fanout, or has already been
    /// clausified — either way it must be encoded once and referenced by
    /// literal rather than flattened into a parent's k-ary conjunction.
    fn is_shared(&self, id: u32) -> bool {
        self.netlist.fanout_count(id) > 1 || self.memo.contains_key(&id)
    }

    /// If `wire` is a negated reference to an And gate, returns that gate's
    /// two fanins (i.e. `wire == !And(a, b)`).
    fn as_negated_and(&self, wire: Wire) -> Option<(Wire, Wire)> {
        if !wire.sign() {
            return None;
        }
        let gate = self.netlist.gate(wire)?;
        if gate.ty() == GateType::And {
            Some((gate.fanins()[0], gate.fanins()[1]))
        } else {
            None
        }
    }

    /// Recognizes `x & y` as the canonical AIG multiplexer decomposition
    /// `~(s & ~t) & ~(~s & ~e)`, for any fanin ordering within each And
    /// gate, returning `(s, t, e)` such that `x & y == s ? t : e`.
    fn detect_mux_pattern(&self, x: Wire, y: Wire) -> Option<(Wire, Wire, Wire)> {
        let (a0, a1) = self.as_negated_and(x)?;
        let (b0, b1) = self.as_negated_and(y)?;
        for &(s_cand, t_neg) in &[(a0, a1), (a1, a0)] {
            for &(s_cand2, e_neg) in &[(b0, b1), (b1, b0)] {
                if s_cand2 == !s_cand {
                    return Some((s_cand, !t_neg, !e_neg));
                }
            }
        }
        None
    }
}

/// `z <-> AND(lits)`, k-ary (k >= 1): `k+1` clauses.
fn encode_and_kary<S: SatBackend>(solver: &mut S, lits: &[Lit]) -> Result<Lit> {
    if lits.len() == 1 {
        return Ok(lits[0]);
    }
    let z = solver.new_var()?.pos();
    for &l in lits {
        solver.add_clause(&[!z, l])?;
    }
    let mut wide: Vec<Lit> = lits.iter().map(|&l| !l).collect();
    wide.push(z);
    solver.add_clause(&wide)?;
    Ok(z)
}

/// `z <-> OR(lits)`, k-ary (k >= 1): `k+1` clauses.
fn encode_or<S: SatBackend>(solver: &mut S, lits: &[Lit]) -> Result<Lit> {
    if lits.len() == 1 {
        return Ok(lits[0]);
    }
    let z = solver.new_var()?.pos();
    for &l in lits {
        solver.add_clause(&[z, !l])?;
    }
    let mut wide: Vec<Lit> = lits.to_vec();
    wide.push(!z);
    solver.add_clause(&wide)?;
    Ok(z)
}

/// `z <-> a xor b` (or its negation, `xnor`, when `negate_output`): the
/// standard 4-clause Tseitin encoding.
fn encode_xor<S: SatBackend>(solver: &mut S, a: Lit, b: Lit, negate_output: bool) -> Result<Lit> {
    let z = solver.new_var()?.pos();
    let out = if negate_output { !z } else { z };
    solver.add_clause(&[!out, a, b])?;
    solver.add_clause(&[!out, !a, !b])?;
    solver.add_clause(&[out, a, !b])?;
    solver.add_clause(&[out, !a, b])?;
    Ok(z)
}

/// `z <-> s ? t : e`: the standard 6-clause if-then-else encoding (4
/// required clauses plus 2 redundant ones that improve propagation).
fn encode_mux<S: SatBackend>(solver: &mut S, s: Lit, t: Lit, e: Lit) -> Result<Lit> {
    let z = solver.new_var()?.pos();
    solver.add_clause(&[!s, !t, z])?;
    solver.add_clause(&[!s, t, !z])?;
    solver.add_clause(&[s, !e, z])?;
    solver.add_clause(&[s, e, !z])?;
    solver.add_clause(&[!t, !e, z])?;
    solver.add_clause(&[t, e, !z])?;
    Ok(z)
}

/// Majority-of-3 truth table, bit `r` set iff the function is true for the
/// input assignment whose bits (lsb first) are `r`'s bits.
const MAJ3_TABLE: u64 = 0b1110_1000;

/// Full Tseitin encoding of an arbitrary `k`-input (`k <= 6`) function given
/// as a `2^k`-row truth table: `2^k` clauses, one forcing `z` at each exact
/// input row.
fn encode_truth_table<S: SatBackend>(solver: &mut S, inputs: &[Lit], table: u64) -> Result<Lit> {
    let k = inputs.len();
    debug_assert!(k <= 6, "truth-table encoding only covers up to 6 inputs");
    let z = solver.new_var()?.pos();
    for row in 0..(1u32 << k) {
        let bit = (table >> row) & 1 == 1;
        let mut clause: Vec<Lit> = (0..k)
            .map(|j| if (row >> j) & 1 == 1 { !inputs[j] } else { inputs[j] })
            .collect();
        clause.push(if bit { z } else { !z });
        solver.add_clause(&clause)?;
    }
    Ok(z)
}

/// Clausifies a wire and asks the solver whether it can be made true (a
/// convenience wrapping the common "is this cone satisfiable" query; the
/// caller owns `solver` and may add further constraints before solving).
pub fn is_satisfiable<S: SatBackend>(clausifier: &mut Clausifier<'_>, solver: &mut S, wire: Wire) -> Result<SolveResult> {
    let lit = clausifier.literal(solver, wire)?;
    solver.assume(&[lit]);
    Ok(solver.solve(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Attr;
    use crate::netlist::Mode;
    use crate::sat::{Solver, SolverOpts};

    #[test]
    fn and_gate_is_satisfiable_only_with_both_inputs_true() {
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
        let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
        let z = nl.strash_and(a, b).unwrap();

        let mut solver = Solver::new(SolverOpts::default());
        let mut clausifier = Clausifier::new(&nl);
        let lit = clausifier.literal(&mut solver, z).unwrap();
        solver.assume(&[lit]);
        assert_eq!(solver.solve(None), SolveResult::Sat);

        let al = clausifier.literal(&mut solver, a).unwrap();
        let model = solver.model();
        assert_eq!(model[al.var().index() as usize], Some(true));
    }

    #[test]
    fn and_of_complement_is_unsatisfiable() {
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
        let z = nl.strash_and(a, !a).unwrap();

        let mut solver = Solver::new(SolverOpts::default());
        let mut clausifier = Clausifier::new(&nl);
        // strash already folds this to constant false, so clausifying it
        // should force the solver unsatisfiable once assumed true.
        let lit = clausifier.literal(&mut solver, z).unwrap();
        solver.assume(&[lit]);
        assert_eq!(solver.solve(None), SolveResult::Unsat);
    }

    #[test]
    fn shared_and_subexpression_with_fanout_is_clausified_once() {
        // shared = a & b, feeding two distinct parents (z1 = shared & c,
        // z2 = shared & d). Flattening through `shared` regardless of its
        // fanout would encode it twice; it must be clausified once and
        // referenced by literal both times.
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
        let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
        let c = nl.add(GateType::Pi, vec![], Attr::Number(2)).unwrap();
        let d = nl.add(GateType::Pi, vec![], Attr::Number(3)).unwrap();
        let shared = nl.strash_and(a, b).unwrap();
        let z1 = nl.strash_and(shared, c).unwrap();
        let z2 = nl.strash_and(shared, d).unwrap();
        assert!(nl.fanout_count(shared.id()) > 1, "shared feeds both z1 and z2");

        let mut solver = Solver::new(SolverOpts::default());
        let mut clausifier = Clausifier::new(&nl);
        let shared_lit = clausifier.literal(&mut solver, shared).unwrap();
        let before = clausifier.memoized_count();
        let z1l = clausifier.literal(&mut solver, z1).unwrap();
        let z2l = clausifier.literal(&mut solver, z2).unwrap();
        // c, z1, d, z2 each add one memo entry; `shared` contributes none of
        // them a second time since it was already memoized above.
        assert_eq!(clausifier.memoized_count(), before + 4, "shared was already memoized; only c, z1, d, z2 are new");

        solver.assume(&[z1l, z2l]);
        assert_eq!(solver.solve(None), SolveResult::Sat);
        let model = solver.model();
        assert_eq!(model[shared_lit.var().index() as usize], Some(true), "both parents being true forces the shared and true");
    }

    #[test]
    fn mux_pattern_is_recognized_from_raw_ands() {
        let mut nl = Netlist::new(Mode::Aig);
        let s = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
        let t = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
        let e = nl.add(GateType::Pi, vec![], Attr::Number(2)).unwrap();
        // z = ~(s & ~t) & ~(~s & ~e)  ==  s ? t : e
        let left = nl.strash_and(s, !t).unwrap();
        let right = nl.strash_and(!s, !e).unwrap();
        let z = nl.strash_and(!left, !right).unwrap();

        let mut solver = Solver::new(SolverOpts::default());
        let mut clausifier = Clausifier::new(&nl);
        let zl = clausifier.literal(&mut solver, z).unwrap();
        let sl = clausifier.literal(&mut solver, s).unwrap();
        let tl = clausifier.literal(&mut solver, t).unwrap();

        solver.assume(&[sl, zl]);
        assert_eq!(solver.solve(None), SolveResult::Sat);
        let model = solver.model();
        assert_eq!(model[tl.var().index() as usize], Some(true), "s=1 selects t");
    }
}
