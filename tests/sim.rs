use ckt::gate::{Attr, GateType};
use ckt::netlist::Mode;
use ckt::{Netlist, Simulator, Tristate};

#[test]
fn test_replacing_a_defined_input_with_x_never_flips_the_output() {
    // Property 6 (monotonicity): moving from a fully-defined assignment to
    // one where an input is widened to X can only widen outputs to X too,
    // never flip a 0 to a 1 or vice versa.
    let mut nl = Netlist::new(Mode::Xig);
    let s = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let d0 = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let d1 = nl.add(GateType::Pi, vec![], Attr::Number(2)).unwrap();
    let z = nl.strash_mux(s, d1, d0).unwrap();

    let mut defined = Simulator::new(&nl);
    defined.set_pi(s, Tristate::True);
    defined.set_pi(d0, Tristate::False);
    defined.set_pi(d1, Tristate::True);
    defined.propagate();
    let defined_value = defined.value(z);
    assert_eq!(defined_value, Tristate::True);

    let mut widened = Simulator::new(&nl);
    widened.set_pi(s, Tristate::True);
    widened.set_pi(d0, Tristate::False);
    // d1 left at X instead of True.
    widened.propagate();
    assert_eq!(widened.value(z), Tristate::X, "the selected branch is unknown, so the mux output must be too");
}

#[test]
fn test_and_gate_is_false_if_any_input_is_false_even_under_mixed_x() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();

    let mut sim = Simulator::new(&nl);
    sim.set_pi(a, Tristate::False);
    sim.propagate();
    assert_eq!(sim.value(z), Tristate::False);
    assert_eq!(sim.value(!z), Tristate::True);
}

#[test]
fn test_flop_resets_to_recorded_initial_value() {
    let mut nl = Netlist::new(Mode::Aig);
    let pi = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let flop = nl.add(GateType::Flop, vec![pi], Attr::Number(0)).unwrap();

    let mut sim = Simulator::new(&nl);
    sim.reset_flops();
    // With no initial value recorded, an untracked flop resets to X.
    assert_eq!(sim.value(flop), Tristate::X);
}

#[test]
fn test_commit_then_undo_is_a_no_op() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();

    let mut sim = Simulator::new(&nl);
    sim.set_pi(a, Tristate::True);
    sim.commit();
    sim.undo();
    assert_eq!(sim.value(a), Tristate::True, "undo after commit must not roll back the committed baseline");
}
