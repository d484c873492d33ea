//! The gate-type registry and the gate itself (§3.2, §3.3).

use smallvec::SmallVec;

use crate::lit::Wire;

/// Number of fanins stored inline before a gate spills to the external arena.
pub const INLINE_FANINS: usize = 3;

/// Fanin storage: small gates keep their inputs inline, larger or
/// dynamic-arity gates spill to a heap-backed block (conceptually the
/// arena-allocated "external fanin block" of §3.2; `SmallVec` gives us the
/// inline/external split without a second, hand-rolled allocator).
pub type FaninList = SmallVec<[Wire; INLINE_FANINS]>;

/// The closed enumeration of gate types (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    /// A constant gate. There is exactly one in a netlist (id [`crate::lit::CONST0_ID`]);
    /// its negation is the constant-true wire.
    Const,
    /// Primary input.
    Pi,
    /// Primary output.
    Po,
    /// State-holding flip-flop: one combinational-input fanin, optional
    /// initial value tracked by the `FlopInit` gob.
    Flop,
    /// 2-input AND.
    And,
    /// 2-input XOR.
    Xor,
    /// 3-input multiplexer: select, then-branch, else-branch.
    Mux,
    /// 3-input majority.
    Maj,
    /// k-ary OR (dynamic arity).
    Or,
    /// 1-input buffer.
    Buf,
    /// 1-input inverter.
    Not,
    /// 2-input equivalence (XNOR).
    Equiv,
    /// k-ary AND, explicitly collected (dynamic arity).
    Conj,
    /// k-ary OR, explicitly collected (dynamic arity).
    Disj,
    /// 4-input lookup table, truth table stored as the gate's attribute.
    Lut4,
    /// 4-input gate, NPN-canonicalized; attribute is the NPN class index.
    Npn4,
    /// 6-input lookup table; truth table stored out-of-band (attribute is the index).
    Lut6,
    /// State-output marker.
    So,
    /// Explicit cycle-breaker on the input side of a flop.
    Seq,
    /// Uninterpreted function of a given symbol and arbitrary arity (dynamic).
    Uif,
}

/// What kind of attribute, if any, a gate type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// No attribute.
    None,
    /// Externally stable numeric identity (PI/PO/Flop index).
    Number,
    /// 16-bit 4-input truth table, stored inline in the attribute.
    Ftb4,
    /// 64-bit 6-input truth table, stored in an auxiliary table, attribute is the index.
    Ftb6,
    /// NPN equivalence-class index.
    Npn4,
    /// Memory descriptor id.
    Memory,
    /// Uninterpreted-function symbol id.
    UifSymbol,
}

/// Whether a gate type reads/drives combinational logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkSource {
    /// Consumes values only (e.g. PO).
    Sink,
    /// Produces values only (e.g. PI, Const).
    Source,
    /// Both (e.g. And, Flop).
    Both,
}

/// Per-type metadata: arity, attribute kind, sink/source classification.
#[derive(Debug, Clone, Copy)]
pub struct GateTypeInfo {
    /// Fixed arity, or `None` if the type has dynamic arity.
    pub arity: Option<usize>,
    /// Kind of attribute this type's gates carry.
    pub attr: AttrKind,
    /// Sink/source/both classification.
    pub kind: SinkSource,
    /// Whether this type is owned by the structural hash (§4.2): instances
    /// must be created via the strash factory, not `Netlist::add` directly.
    pub strash_owned: bool,
}

impl GateType {
    /// Looks up this type's metadata.
    pub const fn info(self) -> GateTypeInfo {
        use AttrKind::*;
        use GateType::*;
        use SinkSource::*;
        match self {
            Const => GateTypeInfo { arity: Some(0), attr: None, kind: Source, strash_owned: false },
            Pi => GateTypeInfo { arity: Some(0), attr: Number, kind: Source, strash_owned: false },
            Po => GateTypeInfo { arity: Some(1), attr: Number, kind: Sink, strash_owned: false },
            Flop => GateTypeInfo { arity: Some(1), attr: Number, kind: Both, strash_owned: false },
            And => GateTypeInfo { arity: Some(2), attr: AttrKind::None, kind: Both, strash_owned: true },
            Xor => GateTypeInfo { arity: Some(2), attr: AttrKind::None, kind: Both, strash_owned: true },
            Mux => GateTypeInfo { arity: Some(3), attr: AttrKind::None, kind: Both, strash_owned: true },
            Maj => GateTypeInfo { arity: Some(3), attr: AttrKind::None, kind: Both, strash_owned: true },
            Or => GateTypeInfo { arity: None, attr: AttrKind::None, kind: Both, strash_owned: false },
            Buf => GateTypeInfo { arity: Some(1), attr: AttrKind::None, kind: Both, strash_owned: false },
            Not => GateTypeInfo { arity: Some(1), attr: AttrKind::None, kind: Both, strash_owned: false },
            Equiv => GateTypeInfo { arity: Some(2), attr: AttrKind::None, kind: Both, strash_owned: false },
            Conj => GateTypeInfo { arity: None, attr: AttrKind::None, kind: Both, strash_owned: false },
            Disj => GateTypeInfo { arity: None, attr: AttrKind::None, kind: Both, strash_owned: false },
            Lut4 => GateTypeInfo { arity: Some(4), attr: Ftb4, kind: Both, strash_owned: true },
            Npn4 => GateTypeInfo { arity: Some(4), attr: AttrKind::Npn4, kind: Both, strash_owned: false },
            Lut6 => GateTypeInfo { arity: Some(6), attr: Ftb6, kind: Both, strash_owned: true },
            So => GateTypeInfo { arity: Some(1), attr: AttrKind::None, kind: Sink, strash_owned: false },
            Seq => GateTypeInfo { arity: Some(1), attr: AttrKind::None, kind: Both, strash_owned: false },
            Uif => GateTypeInfo { arity: None, attr: UifSymbol, kind: Both, strash_owned: false },
        }
    }

    /// Whether this type has dynamic (gate-supplied) arity.
    pub const fn is_dynamic_arity(self) -> bool {
        self.info().arity.is_none()
    }
}

/// A gate's attribute, dependent on its type (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    /// No attribute.
    None,
    /// Externally stable numeric identity.
    Number(u32),
    /// 16-bit 4-input truth table.
    Ftb4(u16),
    /// Index into the auxiliary 6-LUT truth-table table.
    Ftb6Index(u32),
    /// NPN equivalence-class index.
    Npn4(u32),
    /// Memory descriptor id.
    Memory(u32),
    /// Uninterpreted-function symbol id.
    UifSymbol(u32),
}

/// A node in the gate-inverter-graph.
///
/// Gates of arity <= [`INLINE_FANINS`] with no attribute beyond their fanin
/// use inlined storage; larger or dynamic gates spill to the heap through
/// [`FaninList`]'s `SmallVec` backing, an arena-for-big, inline-for-small
/// split without a bespoke pooled allocator.
#[derive(Debug, Clone)]
pub struct Gate {
    ty: GateType,
    fanins: FaninList,
    attr: Attr,
}

impl Gate {
    /// Builds a gate, checking arity against the type's declared arity
    /// unless the type is dynamic.
    pub fn new(ty: GateType, fanins: FaninList, attr: Attr) -> Result<Self, (usize, usize)> {
        if let Some(expected) = ty.info().arity {
            if fanins.len() != expected {
                return Err((expected, fanins.len()));
            }
        }
        Ok(Gate { ty, fanins, attr })
    }

    /// The gate's type.
    pub fn ty(&self) -> GateType {
        self.ty
    }

    /// The gate's fanin list.
    pub fn fanins(&self) -> &[Wire] {
        &self.fanins
    }

    /// Mutable access to the fanin list, for in-place edits that don't
    /// change arity.
    pub fn fanins_mut(&mut self) -> &mut FaninList {
        &mut self.fanins
    }

    /// The gate's attribute.
    pub fn attr(&self) -> Attr {
        self.attr
    }

    /// Number of fanins (the gate's actual arity).
    pub fn arity(&self) -> usize {
        self.fanins.len()
    }

    /// A copy of this gate with its attribute replaced, fanins untouched.
    pub(crate) fn with_attr(&self, attr: Attr) -> Gate {
        Gate { ty: self.ty, fanins: self.fanins.clone(), attr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_arity_is_enforced() {
        let fanins: FaninList = smallvec::smallvec![Wire::TRUE];
        let err = Gate::new(GateType::And, fanins, Attr::None).unwrap_err();
        assert_eq!(err, (2, 1));
    }

    #[test]
    fn dynamic_arity_accepts_any_length() {
        let fanins: FaninList = smallvec::smallvec![Wire::TRUE, Wire::FALSE, Wire::TRUE, Wire::TRUE];
        let gate = Gate::new(GateType::Conj, fanins, Attr::None).unwrap();
        assert_eq!(gate.arity(), 4);
    }
}
