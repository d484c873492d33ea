//! Scenarios that exercise the netlist, clausifier, and solver together,
//! end to end.

use ckt::clausify::Clausifier;
use ckt::gate::{Attr, GateType};
use ckt::netlist::Mode;
use ckt::sat::{SolveResult, Solver, SolverOpts};
use ckt::Netlist;

#[test]
fn test_strashed_mux_with_identical_branches_clausifies_to_the_branch() {
    // Scenario 3: strashing collapses `mux(s, d, d)` to `d` before a single
    // gate is clausified, so solving on the mux's wire is indistinguishable
    // from solving directly on `d`.
    let mut nl = Netlist::new(Mode::Xig);
    let s = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let d = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_mux(s, d, d).unwrap();
    assert_eq!(z, d);

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let lz = clausifier.literal(&mut solver, z).unwrap();
    let ld = clausifier.literal(&mut solver, d).unwrap();
    assert_eq!(lz, ld);
}

#[test]
fn test_unsat_cone_with_proof_logging_reconstructs_to_empty() {
    // Scenario 1, driven through the netlist/clausifier instead of raw
    // DIMACS clauses: an AND gate forced true while one of its fanins is
    // forced false is unsatisfiable, and the proof replays to the empty
    // clause.
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();

    let mut solver = Solver::new(SolverOpts { proof_logging: true, ..SolverOpts::default() });
    let mut clausifier = Clausifier::new(&nl);
    let lz = clausifier.literal(&mut solver, z).unwrap();
    let la = clausifier.literal(&mut solver, a).unwrap();
    solver.add_clause(&[lz]).unwrap();
    solver.add_clause(&[!la]).unwrap();

    assert_eq!(solver.solve(None), SolveResult::Unsat);
    let empty = solver.empty_clause_proof().expect("proof logging must record the empty-clause derivation");
    assert!(solver.proof().unwrap().reconstruct(empty).is_empty());
}

#[test]
fn test_removing_a_variable_requires_its_clauses_gone_first() {
    // Scenario 6: a clausified wire's solver variable can only be torn down
    // once every live clause mentioning it is gone.
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let la = clausifier.literal(&mut solver, a).unwrap();
    let _lz = clausifier.literal(&mut solver, z).unwrap();
    assert!(solver.remove_vars(&[la.var()]).is_err(), "a's variable is still referenced by z's Tseitin clauses");

    let mut bare_solver = Solver::new(SolverOpts::default());
    let v = bare_solver.new_var().unwrap();
    assert!(bare_solver.remove_vars(&[v]).is_ok(), "a fresh, unreferenced, unassigned variable must be removable");
}

#[test]
fn test_assumption_driven_unsat_then_retraction_recovers_sat() {
    // Scenario 5, through the clausifier: assuming a PI's wire false on a
    // cone that requires it true is unsatisfiable; dropping the assumption
    // recovers satisfiability.
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();

    let mut solver = Solver::new(SolverOpts::default());
    let mut clausifier = Clausifier::new(&nl);
    let la = clausifier.literal(&mut solver, a).unwrap();
    solver.add_clause(&[la]).unwrap();

    solver.assume(&[!la]);
    assert_eq!(solver.solve(None), SolveResult::Unsat);

    solver.assume(&[]);
    assert_eq!(solver.solve(None), SolveResult::Sat);
}
