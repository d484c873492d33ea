use ckt::gate::{Attr, GateType};
use ckt::netlist::{FlopBoundary, Mode};
use ckt::Netlist;

#[test]
fn test_compact_is_idempotent() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();
    nl.add(GateType::Po, vec![z], Attr::Number(0)).unwrap();

    let first = nl.compact(None);
    let second = nl.compact(None);

    for id in 0..first.len() as u32 {
        assert_eq!(first.get(id), second.get(id), "remap must be stable across repeated compaction");
    }
}

#[test]
fn test_reserved_prefix_never_moves_under_compact() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    nl.add(GateType::Po, vec![a], Attr::Number(0)).unwrap();

    nl.compact(None);
    assert_eq!(nl.const_false().id(), ckt::lit::CONST0_ID);
    assert_eq!(nl.const_true(), !nl.const_false());
}

#[test]
fn test_remove_with_live_fanout_is_rejected() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let z = nl.strash_and(a, b).unwrap();
    // a still fans out into z
    assert!(nl.remove(a).is_err());
    assert!(nl.remove(z).is_ok());
    assert!(nl.remove(a).is_ok());
}

#[test]
fn test_topo_order_respects_flop_boundary() {
    let mut nl = Netlist::new(Mode::Aig);
    let pi = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let flop = nl.add(GateType::Flop, vec![pi], Attr::Number(0)).unwrap();
    let po = nl.add(GateType::Po, vec![flop], Attr::Number(0)).unwrap();

    let stopped = nl.topo_order_from([po.id()], FlopBoundary::StopAtFlop);
    assert!(stopped.contains(&flop.id()));
    assert!(!stopped.contains(&pi.id()), "flop's input must not be walked by default");

    let walked = nl.topo_order_from([po.id()], FlopBoundary::WalkThroughFlop);
    assert!(walked.contains(&pi.id()));
}

#[test]
fn test_dynamic_fanout_count_tracks_add_and_remove() {
    let mut nl = Netlist::new(Mode::Aig);
    nl.enable_dynamic_fanouts();
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    assert_eq!(nl.fanout_count(a.id()), 0);
    let z = nl.strash_and(a, b).unwrap();
    assert_eq!(nl.fanout_count(a.id()), 1);
    nl.remove(z).unwrap();
    assert_eq!(nl.fanout_count(a.id()), 0);
}

#[test]
fn test_change_moves_gate_between_type_blocks() {
    let mut nl = Netlist::new(Mode::FreeForm);
    let src = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let g = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();

    nl.change(g, GateType::Buf, vec![src], Attr::None).unwrap();

    assert!(!nl.iter_type(GateType::Pi).any(|id| id == g.id()), "g must leave the Pi block it was retyped out of");
    assert!(nl.iter_type(GateType::Buf).any(|id| id == g.id()), "g must appear in the Buf block it was retyped into");
}

#[test]
fn test_removed_id_reused_by_a_new_type_does_not_linger_in_its_old_block() {
    let mut nl = Netlist::new(Mode::FreeForm);
    let src = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let throwaway = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();
    let throwaway_id = throwaway.id();
    nl.remove(throwaway).unwrap();

    // The freelist hands throwaway_id straight back out under a new type.
    let reused = nl.add(GateType::Buf, vec![src], Attr::None).unwrap();
    assert_eq!(reused.id(), throwaway_id, "this test assumes LIFO freelist reuse");

    assert!(
        !nl.iter_type(GateType::Pi).any(|id| id == throwaway_id),
        "the reused id must not still be yielded by the type it was removed from"
    );
    assert!(nl.iter_type(GateType::Buf).any(|id| id == throwaway_id));
}

#[test]
fn test_try_and_does_not_create_a_gate_on_a_miss() {
    let mut nl = Netlist::new(Mode::Aig);
    let a = nl.add(GateType::Pi, vec![], Attr::Number(0)).unwrap();
    let b = nl.add(GateType::Pi, vec![], Attr::Number(1)).unwrap();

    assert_eq!(nl.try_and(a, b), None, "a & b has not been created yet");
    let before = nl.iter_type(GateType::And).count();

    let z = nl.strash_and(a, b).unwrap();
    assert_eq!(nl.try_and(a, b), Some(z), "a second lookup must hit the unique table without creating a duplicate");
    assert_eq!(nl.iter_type(GateType::And).count(), before + 1, "try_and must not have created a gate on the earlier miss");
}

#[test]
fn test_mode_rejects_disallowed_gate_types() {
    let mut nl = Netlist::new(Mode::Aig);
    let err = nl.add(GateType::Lut4, vec![], Attr::None).unwrap_err();
    assert!(matches!(err, ckt::CktError::ModeViolation { ty: GateType::Lut4 }));
}
