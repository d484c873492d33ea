use ckt::gate::{Attr, GateType};
use ckt::netlist::Mode;
use ckt::Netlist;

#[test]
fn test_strash_and_is_commutative() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    assert_eq!(nl.strash_and(a, b).unwrap(), nl.strash_and(b, a).unwrap());
}

#[test]
fn test_strash_and_idempotent_and_complement() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    assert_eq!(nl.strash_and(a, a).unwrap(), a);
    assert_eq!(nl.strash_and(a, !a).unwrap(), ckt::Wire::FALSE);
    assert_eq!(nl.strash_and(a, ckt::Wire::TRUE).unwrap(), a);
}

#[test]
fn test_strash_mux_same_branches_collapses() {
    let mut nl = Netlist::new(Mode::Xig);
    let s = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let d = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    assert_eq!(nl.strash_mux(s, d, d).unwrap(), d);
}

#[test]
fn test_repeated_strash_and_returns_same_gate_id() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z1 = nl.strash_and(a, b).unwrap();
    let z2 = nl.strash_and(a, b).unwrap();
    assert_eq!(z1, z2);
}
