//! Structural hashing (§4.2, Property 2).
//!
//! Canonicalizes AND/XOR/MUX/MAJ (and, conceptually, LUT4) gates on
//! creation: literal ordering on commutative operations, negation propagated
//! out of XOR's inputs, constant and idempotence/complement simplification.
//! If an equivalent gate already exists it is returned, possibly negated;
//! otherwise a new gate is created and inserted into the unique table.

use ahash::AHashMap;

use crate::gate::GateType;
use crate::lit::{GateId, Wire};
use crate::netlist::gob::{Gob, Remap};

/// Result of canonicalizing a 2-input commutative gate (AND/XOR).
enum Canon2 {
    /// The gate reduces to an existing wire; no new gate is needed.
    Const(Wire),
    /// A canonical `(lo, hi)` fanin pair, plus the sign to apply to the
    /// looked-up/created gate's raw output.
    Pair(Wire, Wire, bool),
}

/// Result of canonicalizing a 3-input gate (MUX/MAJ).
enum Canon3 {
    /// The gate reduces to an existing wire.
    Const(Wire),
    /// A canonical fanin triple; output sign is always positive for these
    /// (reordering absorbs any select-line negation).
    Triple(Wire, Wire, Wire),
}

/// `x & y`, canonicalized: `x&1=x`, `x&0=0`, `x&x=x`, `x&~x=0`, commutative
/// ordering otherwise.
fn canon_and(x: Wire, y: Wire) -> Canon2 {
    if x == Wire::FALSE || y == Wire::FALSE {
        return Canon2::Const(Wire::FALSE);
    }
    if x == Wire::TRUE {
        return Canon2::Const(y);
    }
    if y == Wire::TRUE {
        return Canon2::Const(x);
    }
    if x == y {
        return Canon2::Const(x);
    }
    if x == !y {
        return Canon2::Const(Wire::FALSE);
    }
    let (lo, hi) = if x < y { (x, y) } else { (y, x) };
    Canon2::Pair(lo, hi, false)
}

/// `x ^ y`, canonicalized with no negated inputs in the stored gate; any
/// input sign is folded into the returned output sign.
fn canon_xor(x: Wire, y: Wire) -> Canon2 {
    if x == Wire::FALSE {
        return Canon2::Const(y);
    }
    if y == Wire::FALSE {
        return Canon2::Const(x);
    }
    if x == Wire::TRUE {
        return Canon2::Const(!y);
    }
    if y == Wire::TRUE {
        return Canon2::Const(!x);
    }
    if x == y {
        return Canon2::Const(Wire::FALSE);
    }
    if x == !y {
        return Canon2::Const(Wire::TRUE);
    }
    let out_sign = x.sign() ^ y.sign();
    let x0 = Wire::new(x.id(), false);
    let y0 = Wire::new(y.id(), false);
    let (lo, hi) = if x0 < y0 { (x0, y0) } else { (y0, x0) };
    Canon2::Pair(lo, hi, out_sign)
}

/// `s ? t : e`, canonicalized: `Mux(s,d,d)=d`, constant select/branches
/// fold, and a negated select is absorbed by swapping the branches.
fn canon_mux(s: Wire, t: Wire, e: Wire) -> Canon3 {
    if t == e {
        return Canon3::Const(t);
    }
    if s == Wire::TRUE {
        return Canon3::Const(t);
    }
    if s == Wire::FALSE {
        return Canon3::Const(e);
    }
    if t == Wire::TRUE && e == Wire::FALSE {
        return Canon3::Const(s);
    }
    if t == Wire::FALSE && e == Wire::TRUE {
        return Canon3::Const(!s);
    }
    let (s, t, e) = if s.sign() { (!s, e, t) } else { (s, t, e) };
    Canon3::Triple(s, t, e)
}

/// 3-input majority, canonicalized: any duplicated or complementary pair
/// collapses the gate to the remaining signal; otherwise the inputs sort.
fn canon_maj(a: Wire, b: Wire, c: Wire) -> Canon3 {
    let pairs = [(a, b, c), (a, c, b), (b, c, a)];
    for (x, y, other) in pairs {
        if x == y {
            return Canon3::Const(x);
        }
        if x == !y {
            return Canon3::Const(other);
        }
    }
    let mut v = [a, b, c];
    v.sort_unstable();
    Canon3::Triple(v[0], v[1], v[2])
}

/// The structural-hash gob: canonical unique-table over AND/XOR/MUX/MAJ
/// fanin tuples.
#[derive(Default)]
pub struct Strash {
    table: AHashMap<(GateType, Wire, Wire, Wire), GateId>,
}

impl Strash {
    /// Looks up a gate id by its already-canonicalized key.
    fn lookup(&self, ty: GateType, a: Wire, b: Wire, c: Wire) -> Option<GateId> {
        self.table.get(&(ty, a, b, c)).copied()
    }

    fn insert(&mut self, ty: GateType, a: Wire, b: Wire, c: Wire, id: GateId) {
        self.table.insert((ty, a, b, c), id);
    }

    /// Removes the entry for a gate being deleted, if it is strash-owned.
    pub fn on_remove(&mut self, ty: GateType, fanins: &[Wire]) {
        let key = strash_key(ty, fanins);
        if let Some((a, b, c)) = key {
            self.table.remove(&(ty, a, b, c));
        }
    }

    /// Outcome of canonicalizing a candidate AND/XOR/MUX/MAJ gate: either it
    /// reduces to (or already exists as) a wire, or a new gate with these
    /// canonical fanins must be created by the caller.
    pub fn canon_and(&self, x: Wire, y: Wire) -> StrashLookup {
        match canon_and(x, y) {
            Canon2::Const(w) => StrashLookup::Found(w),
            Canon2::Pair(a, b, sign) => self.resolve(GateType::And, a, b, Wire::NULL, sign),
        }
    }

    /// See [`Strash::canon_and`].
    pub fn canon_xor(&self, x: Wire, y: Wire) -> StrashLookup {
        match canon_xor(x, y) {
            Canon2::Const(w) => StrashLookup::Found(w),
            Canon2::Pair(a, b, sign) => self.resolve(GateType::Xor, a, b, Wire::NULL, sign),
        }
    }

    /// See [`Strash::canon_and`].
    pub fn canon_mux(&self, s: Wire, t: Wire, e: Wire) -> StrashLookup {
        match canon_mux(s, t, e) {
            Canon3::Const(w) => StrashLookup::Found(w),
            Canon3::Triple(a, b, c) => self.resolve(GateType::Mux, a, b, c, false),
        }
    }

    /// See [`Strash::canon_and`].
    pub fn canon_maj(&self, a: Wire, b: Wire, c: Wire) -> StrashLookup {
        match canon_maj(a, b, c) {
            Canon3::Const(w) => StrashLookup::Found(w),
            Canon3::Triple(a, b, c) => self.resolve(GateType::Maj, a, b, c, false),
        }
    }

    fn resolve(&self, ty: GateType, a: Wire, b: Wire, c: Wire, sign: bool) -> StrashLookup {
        match self.lookup(ty, a, b, c) {
            Some(id) => StrashLookup::Found(Wire::new(id, sign)),
            None => StrashLookup::NeedsCreate { ty, fanins: canon_fanins(ty, a, b, c), out_sign: sign },
        }
    }

    /// Registers a freshly created gate's canonical key.
    pub fn register(&mut self, ty: GateType, fanins: &[Wire], id: GateId) {
        if let Some((a, b, c)) = strash_key(ty, fanins) {
            self.insert(ty, a, b, c, id);
        }
    }
}

impl Gob for Strash {
    fn remap(&mut self, remap: &Remap) {
        let mut new_table = AHashMap::with_capacity(self.table.len());
        for (key, id) in self.table.drain() {
            if let Some(new_id) = remap.get(id) {
                new_table.insert(key, new_id);
            }
        }
        self.table = new_table;
    }
}

fn canon_fanins(ty: GateType, a: Wire, b: Wire, c: Wire) -> Vec<Wire> {
    match ty {
        GateType::And | GateType::Xor => vec![a, b],
        GateType::Mux | GateType::Maj => vec![a, b, c],
        _ => vec![a, b, c],
    }
}

fn strash_key(ty: GateType, fanins: &[Wire]) -> Option<(Wire, Wire, Wire)> {
    match (ty, fanins) {
        (GateType::And | GateType::Xor, [a, b]) => Some((*a, *b, Wire::NULL)),
        (GateType::Mux | GateType::Maj, [a, b, c]) => Some((*a, *b, *c)),
        _ => None,
    }
}

/// Outcome of a strash lookup.
pub enum StrashLookup {
    /// The gate is already represented (possibly trivially) by this wire.
    Found(Wire),
    /// No equivalent gate exists; create one with these canonical fanins,
    /// then return the new gate's id with `out_sign` applied.
    NeedsCreate {
        /// Gate type to create.
        ty: GateType,
        /// Canonical fanin list.
        fanins: Vec<Wire>,
        /// Sign to apply to the new gate's id once created.
        out_sign: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(id: u32) -> Wire {
        Wire::new(id, false)
    }

    #[test]
    fn and_is_commutative_idempotent_and_absorbing() {
        let x = w(10);
        let y = w(20);
        match (canon_and(x, y), canon_and(y, x)) {
            (Canon2::Pair(a1, b1, s1), Canon2::Pair(a2, b2, s2)) => {
                assert_eq!((a1, b1, s1), (a2, b2, s2));
            }
            _ => panic!("expected pairs"),
        }
        assert!(matches!(canon_and(x, x), Canon2::Const(r) if r == x));
        assert!(matches!(canon_and(x, !x), Canon2::Const(r) if r == Wire::FALSE));
        assert!(matches!(canon_and(x, Wire::TRUE), Canon2::Const(r) if r == x));
        assert!(matches!(canon_and(x, Wire::FALSE), Canon2::Const(r) if r == Wire::FALSE));
    }

    #[test]
    fn mux_same_branches_collapses() {
        let s = w(1);
        let d = w(2);
        assert!(matches!(canon_mux(s, d, d), Canon3::Const(r) if r == d));
    }

    #[test]
    fn maj_with_duplicate_pair_collapses() {
        let x = w(5);
        let y = w(6);
        assert!(matches!(canon_maj(x, x, y), Canon3::Const(r) if r == x));
        assert!(matches!(canon_maj(x, !x, y), Canon3::Const(r) if r == y));
    }
}
