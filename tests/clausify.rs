use ckt::clausify::Clausifier;
use ckt::gate::{Attr, GateType};
use ckt::netlist::Mode;
use ckt::sat::{SolveResult, Solver, SolverOpts};
use ckt::Netlist;

#[test]
fn test_and_gate_is_unsat_under_complementary_forcing() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let za = clausifier.literal(&mut solver, z).unwrap();
    let la = clausifier.literal(&mut solver, a).unwrap();
    // z (= a & b) forced true while a is forced false: unsatisfiable.
    solver.add_clause(&[za]).unwrap();
    solver.add_clause(&[!la]).unwrap();
    assert_eq!(solver.solve(None), SolveResult::Unsat);
}

#[test]
fn test_and_gate_model_agrees_with_boolean_semantics() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let lz = clausifier.literal(&mut solver, z).unwrap();
    let la = clausifier.literal(&mut solver, a).unwrap();
    let lb = clausifier.literal(&mut solver, b).unwrap();
    solver.add_clause(&[la]).unwrap();
    solver.add_clause(&[lb]).unwrap();

    assert_eq!(solver.solve(None), SolveResult::Sat);
    let model = solver.model();
    assert_eq!(model[lz.var().index() as usize], Some(true));
}

#[test]
fn test_mux_selects_then_branch_when_select_true() {
    let mut nl = Netlist::new(Mode::Xig);
    let s = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let d0 = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let d1 = nl.add(GateType::Pi, vec![], Attr::Number(2)).unwrap();
    let z = nl.strash_mux(s, d1, d0).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let lz = clausifier.literal(&mut solver, z).unwrap();
    let ls = clausifier.literal(&mut solver, s).unwrap();
    let ld1 = clausifier.literal(&mut solver, d1).unwrap();
    // select true, then-branch (d1) forced true, else-branch (d0) forced false;
    // z must follow d1, not d0.
    let ld0 = clausifier.literal(&mut solver, d0).unwrap();
    solver.add_clause(&[ls]).unwrap();
    solver.add_clause(&[ld1]).unwrap();
    solver.add_clause(&[!ld0]).unwrap();
    solver.add_clause(&[!lz]).unwrap();
    assert_eq!(solver.solve(None), SolveResult::Unsat);
}

#[test]
fn test_wire_sign_is_applied_after_memoized_gate_lookup() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let pos = clausifier.literal(&mut solver, a).unwrap();
    let neg = clausifier.literal(&mut solver, !a).unwrap();
    assert_eq!(pos, !neg);
    // Only one gate (`a` itself) should have been clausified for both calls.
    assert_eq!(clausifier.memoized_count(), 1);
}
