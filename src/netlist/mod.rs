//! The gate-inverter-graph netlist (§4.1): gate store, listener bus,
//! structural hashing, fanout indexes, topological order, and the attached
//! gate-objects of §3.5.

pub mod fanout;
pub mod gob;
pub mod listener;
pub mod objects;
pub mod strash;
pub mod topo;

use ahash::AHashMap;

use crate::error::{CktError, Result};
use crate::gate::{Attr, Gate, GateType};
use crate::lit::{GateId, Wire, CONST0_ID, FIRST_USER_ID};

pub use fanout::{DynamicFanouts, FanoutEdge, StaticFanouts};
pub use gob::{Gob, Remap};
pub use listener::{Event, EventMask, Listener};
pub use objects::{FlopInit, GateSet, InitValue, MemoryDescriptor, MemoryInfo};
pub use strash::Strash;
pub use topo::FlopBoundary;

/// The active netlist mode (§3.4): which gate types may be created at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every gate type is permitted.
    FreeForm,
    /// And-Inverter Graph: constants, PI/PO/Flop, and 2-input And (strashed).
    Aig,
    /// AIG plus Xor/Mux/Maj (all strashed).
    Xig,
    /// Constants, PI/PO/Flop, and NPN4-canonicalized 4-input gates.
    Npn4,
    /// Constants, PI/PO/Flop, and 4-LUTs (strashed).
    Lut4,
    /// Constants, PI/PO/Flop, and 6-LUTs (strashed).
    Lut6,
}

impl Mode {
    fn permitted_types(self) -> &'static [GateType] {
        use GateType::*;
        match self {
            Mode::FreeForm => &[
                Const, Pi, Po, Flop, And, Xor, Mux, Maj, Or, Buf, Not, Equiv, Conj, Disj, Lut4,
                Npn4, Lut6, So, Seq, Uif,
            ],
            Mode::Aig => &[Const, Pi, Po, Flop, And],
            Mode::Xig => &[Const, Pi, Po, Flop, And, Xor, Mux, Maj],
            Mode::Npn4 => &[Const, Pi, Po, Flop, GateType::Npn4],
            Mode::Lut4 => &[Const, Pi, Po, Flop, GateType::Lut4],
            Mode::Lut6 => &[Const, Pi, Po, Flop, GateType::Lut6],
        }
    }

    /// Whether `ty` may exist at all under this mode (via any creation path).
    pub fn allows(self, ty: GateType) -> bool {
        self.permitted_types().contains(&ty)
    }
}

/// The gate-inverter-graph netlist.
pub struct Netlist {
    mode: Mode,
    gates: Vec<Option<Gate>>,
    freelist: Vec<GateId>,
    type_blocks: AHashMap<GateType, Vec<GateId>>,
    names: AHashMap<String, GateId>,
    frozen: bool,
    fanout_count: Vec<u32>,
    topo_cache: Option<Vec<GateId>>,

    strash: Option<Strash>,
    static_fanouts: Option<StaticFanouts>,
    dynamic_fanouts: Option<DynamicFanouts>,
    flop_init: Option<FlopInit>,
    properties: Option<GateSet>,
    constraints: Option<GateSet>,
    fair_properties: Option<GateSet>,
    fair_constraints: Option<GateSet>,
    init_bad: Option<GateSet>,
    memory_info: Option<MemoryInfo>,

    listeners: Vec<(Box<dyn Listener>, EventMask)>,
}

impl Netlist {
    /// Builds an empty netlist in the given mode, with the reserved
    /// null/error/const0/reset identifiers populated (§3.2).
    pub fn new(mode: Mode) -> Self {
        let mut gates: Vec<Option<Gate>> = vec![None; FIRST_USER_ID as usize];
        gates[CONST0_ID as usize] = Some(Gate::new(GateType::Const, Default::default(), Attr::None).unwrap());
        let mut type_blocks: AHashMap<GateType, Vec<GateId>> = AHashMap::new();
        type_blocks.insert(GateType::Const, vec![CONST0_ID]);

        Netlist {
            mode,
            gates,
            freelist: Vec::new(),
            type_blocks,
            names: AHashMap::new(),
            frozen: false,
            fanout_count: vec![0; FIRST_USER_ID as usize],
            topo_cache: None,
            strash: None,
            static_fanouts: None,
            dynamic_fanouts: None,
            flop_init: None,
            properties: None,
            constraints: None,
            fair_properties: None,
            fair_constraints: None,
            init_bad: None,
            memory_info: None,
            listeners: Vec::new(),
        }
    }

    /// The netlist's active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the netlist is frozen (no structural edits permitted).
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezes the netlist: required before [`Netlist::build_static_fanouts`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Unfreezes the netlist. Invalidates any static fanout index, which is
    /// only valid over a frozen netlist.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
        self.static_fanouts = None;
    }

    /// The wire for the constant-false gate.
    pub fn const_false(&self) -> Wire {
        Wire::FALSE
    }

    /// The wire for the constant-true gate.
    pub fn const_true(&self) -> Wire {
        Wire::TRUE
    }

    /// Looks up a gate by wire, ignoring its sign.
    pub fn gate(&self, wire: Wire) -> Option<&Gate> {
        self.gates.get(wire.id() as usize)?.as_ref()
    }

    /// The exact fanout count of a gate (always accurate, independent of
    /// whether a [`DynamicFanouts`] index is attached).
    pub fn fanout_count(&self, id: GateId) -> usize {
        self.fanout_count.get(id as usize).copied().unwrap_or(0) as usize
    }

    /// Iterates over every live gate of one type (a linear scan over that
    /// type's block, not the whole netlist).
    pub fn iter_type(&self, ty: GateType) -> impl Iterator<Item = GateId> + '_ {
        self.type_blocks
            .get(&ty)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&id| self.gates[id as usize].is_some())
    }

    /// Iterates over every live gate in the netlist, in id order.
    pub fn iter_all(&self) -> impl Iterator<Item = (GateId, &Gate)> + '_ {
        self.gates
            .iter()
            .enumerate()
            .filter_map(|(id, g)| g.as_ref().map(|g| (id as GateId, g)))
    }

    fn iter_live_cloned(&self) -> impl Iterator<Item = (GateId, Gate)> + '_ {
        self.iter_all().map(|(id, g)| (id, g.clone()))
    }

    /// Removes `id` from `ty`'s type block, if present, by swapping in the
    /// block's last element (order within a block is not meaningful).
    fn purge_type_block(&mut self, ty: GateType, id: GateId) {
        if let Some(block) = self.type_blocks.get_mut(&ty) {
            if let Some(pos) = block.iter().position(|&x| x == id) {
                block.swap_remove(pos);
            }
        }
    }

    fn alloc_id(&mut self) -> Result<GateId> {
        if let Some(id) = self.freelist.pop() {
            return Ok(id);
        }
        const MAX_GATE_ID: usize = 0x7fff_ffff;
        let id = self.gates.len();
        if id > MAX_GATE_ID {
            return Err(CktError::VariableSpaceExhausted);
        }
        self.gates.push(None);
        self.fanout_count.push(0);
        Ok(id as GateId)
    }

    /// Creates a gate of a non-strash-owned type (§4.1 `add`).
    ///
    /// Strash-owned types ([`GateType::And`], [`GateType::Xor`],
    /// [`GateType::Mux`], [`GateType::Maj`], [`GateType::Lut4`],
    /// [`GateType::Lut6`]) must go through [`Netlist::strash_and`] and
    /// siblings instead.
    pub fn add(&mut self, ty: GateType, fanins: Vec<Wire>, attr: Attr) -> Result<Wire> {
        if self.frozen {
            return Err(CktError::FreezeViolation { frozen: true });
        }
        if !self.mode.allows(ty) || ty.info().strash_owned {
            return Err(CktError::ModeViolation { ty });
        }
        let gate = Gate::new(ty, fanins.into(), attr)
            .map_err(|(expected, actual)| CktError::ArityMismatch { ty, expected, actual })?;
        let id = self.alloc_id()?;
        let fanins_vec: Vec<Wire> = gate.fanins().to_vec();
        self.gates[id as usize] = Some(gate);
        self.type_blocks.entry(ty).or_default().push(id);
        self.dispatch(Event::Add { id, ty, fanins: &fanins_vec });
        Ok(Wire::new(id, false))
    }

    fn create_strashed(&mut self, ty: GateType, fanins: Vec<Wire>) -> Result<GateId> {
        if self.frozen {
            return Err(CktError::FreezeViolation { frozen: true });
        }
        if !self.mode.allows(ty) {
            return Err(CktError::ModeViolation { ty });
        }
        let gate = Gate::new(ty, fanins.into(), Attr::None)
            .map_err(|(expected, actual)| CktError::ArityMismatch { ty, expected, actual })?;
        let id = self.alloc_id()?;
        let fanins_vec: Vec<Wire> = gate.fanins().to_vec();
        self.gates[id as usize] = Some(gate);
        self.type_blocks.entry(ty).or_default().push(id);
        self.dispatch(Event::Add { id, ty, fanins: &fanins_vec });
        Ok(id)
    }

    /// `strash_and(x, y)`: see §4.2.
    pub fn strash_and(&mut self, x: Wire, y: Wire) -> Result<Wire> {
        self.enable_strash();
        match self.strash.as_ref().unwrap().canon_and(x, y) {
            strash::StrashLookup::Found(w) => Ok(w),
            strash::StrashLookup::NeedsCreate { ty, fanins, out_sign } => {
                let id = self.create_strashed(ty, fanins)?;
                Ok(Wire::new(id, out_sign))
            }
        }
    }

    /// `strash_xor(x, y)`: see §4.2.
    pub fn strash_xor(&mut self, x: Wire, y: Wire) -> Result<Wire> {
        self.enable_strash();
        match self.strash.as_ref().unwrap().canon_xor(x, y) {
            strash::StrashLookup::Found(w) => Ok(w),
            strash::StrashLookup::NeedsCreate { ty, fanins, out_sign } => {
                let id = self.create_strashed(ty, fanins)?;
                Ok(Wire::new(id, out_sign))
            }
        }
    }

    /// `strash_mux(s, t, e)`: see §4.2.
    pub fn strash_mux(&mut self, s: Wire, t: Wire, e: Wire) -> Result<Wire> {
        self.enable_strash();
        match self.strash.as_ref().unwrap().canon_mux(s, t, e) {
            strash::StrashLookup::Found(w) => Ok(w),
            strash::StrashLookup::NeedsCreate { ty, fanins, out_sign } => {
                let id = self.create_strashed(ty, fanins)?;
                Ok(Wire::new(id, out_sign))
            }
        }
    }

    /// `strash_maj(a, b, c)`: see §4.2.
    pub fn strash_maj(&mut self, a: Wire, b: Wire, c: Wire) -> Result<Wire> {
        self.enable_strash();
        match self.strash.as_ref().unwrap().canon_maj(a, b, c) {
            strash::StrashLookup::Found(w) => Ok(w),
            strash::StrashLookup::NeedsCreate { ty, fanins, out_sign } => {
                let id = self.create_strashed(ty, fanins)?;
                Ok(Wire::new(id, out_sign))
            }
        }
    }

    /// Non-creating counterpart to [`Netlist::strash_and`]: returns the
    /// wire only if it is already represented (trivially or in the unique
    /// table), without allocating a new gate when it isn't.
    pub fn try_and(&self, x: Wire, y: Wire) -> Option<Wire> {
        self.strash.as_ref().and_then(|s| match s.canon_and(x, y) {
            strash::StrashLookup::Found(w) => Some(w),
            strash::StrashLookup::NeedsCreate { .. } => None,
        })
    }

    /// Non-creating counterpart to [`Netlist::strash_xor`].
    pub fn try_xor(&self, x: Wire, y: Wire) -> Option<Wire> {
        self.strash.as_ref().and_then(|s| match s.canon_xor(x, y) {
            strash::StrashLookup::Found(w) => Some(w),
            strash::StrashLookup::NeedsCreate { .. } => None,
        })
    }

    /// Non-creating counterpart to [`Netlist::strash_mux`].
    pub fn try_mux(&self, s_: Wire, t: Wire, e: Wire) -> Option<Wire> {
        self.strash.as_ref().and_then(|s| match s.canon_mux(s_, t, e) {
            strash::StrashLookup::Found(w) => Some(w),
            strash::StrashLookup::NeedsCreate { .. } => None,
        })
    }

    /// Non-creating counterpart to [`Netlist::strash_maj`].
    pub fn try_maj(&self, a: Wire, b: Wire, c: Wire) -> Option<Wire> {
        self.strash.as_ref().and_then(|s| match s.canon_maj(a, b, c) {
            strash::StrashLookup::Found(w) => Some(w),
            strash::StrashLookup::NeedsCreate { .. } => None,
        })
    }

    fn enable_strash(&mut self) {
        self.strash.get_or_insert_with(Strash::default);
    }

    /// Enables the live fanout index, seeding it from the netlist's current
    /// contents. Subsequent edits keep it consistent through the listener
    /// bus.
    pub fn enable_dynamic_fanouts(&mut self) {
        let mut df = DynamicFanouts::default();
        df.trim(self.iter_live_cloned());
        self.dynamic_fanouts = Some(df);
    }

    /// The live fanout index, if enabled.
    pub fn dynamic_fanouts(&self) -> Option<&DynamicFanouts> {
        self.dynamic_fanouts.as_ref()
    }

    /// Rewrites the live fanout index to drop stale entries and shrink
    /// capacity (§4.3 `trim`).
    pub fn trim_dynamic_fanouts(&mut self) {
        if let Some(mut df) = self.dynamic_fanouts.take() {
            df.trim(self.iter_live_cloned());
            self.dynamic_fanouts = Some(df);
        }
    }

    /// Builds the static fanout index. Requires the netlist to be frozen.
    pub fn build_static_fanouts(&mut self) -> Result<()> {
        if !self.frozen {
            return Err(CktError::FreezeViolation { frozen: false });
        }
        let max_id = self.gates.len().saturating_sub(1) as GateId;
        self.static_fanouts = Some(StaticFanouts::build(max_id, self.iter_live_cloned()));
        Ok(())
    }

    /// The static fanout index, if built.
    pub fn static_fanouts(&self) -> Option<&StaticFanouts> {
        self.static_fanouts.as_ref()
    }

    /// `change(wire, new_type, new_arity)`: remove-and-recreate at the same
    /// identifier (§4.1). Listeners observe a remove followed by an add.
    pub fn change(&mut self, wire: Wire, new_ty: GateType, new_fanins: Vec<Wire>, new_attr: Attr) -> Result<()> {
        if self.frozen {
            return Err(CktError::FreezeViolation { frozen: true });
        }
        let id = wire.id();
        let old = self.gates[id as usize].take().ok_or(CktError::DanglingReference { wire })?;
        self.dispatch(Event::Remove { id, gate: &old });

        if !self.mode.allows(new_ty) || new_ty.info().strash_owned {
            self.gates[id as usize] = Some(old);
            return Err(CktError::ModeViolation { ty: new_ty });
        }
        let gate = match Gate::new(new_ty, new_fanins.into(), new_attr) {
            Ok(g) => g,
            Err((expected, actual)) => {
                self.gates[id as usize] = Some(old);
                return Err(CktError::ArityMismatch { ty: new_ty, expected, actual });
            }
        };
        let old_ty = old.ty();
        let fanins_vec: Vec<Wire> = gate.fanins().to_vec();
        self.gates[id as usize] = Some(gate);
        self.purge_type_block(old_ty, id);
        self.type_blocks.entry(new_ty).or_default().push(id);
        self.dispatch(Event::Add { id, ty: new_ty, fanins: &fanins_vec });
        Ok(())
    }

    /// Mutates a gate's attribute in place, without touching its fanins or
    /// identity. Emits an [`Event::Update`], unlike [`Netlist::change`]
    /// which emits remove+add.
    pub fn set_attr(&mut self, wire: Wire, attr: Attr) -> Result<()> {
        let id = wire.id();
        let old = self.gates[id as usize].clone().ok_or(CktError::DanglingReference { wire })?;
        self.gates[id as usize] = Some(old.with_attr(attr));
        self.dispatch(Event::Update { id, old: &old });
        Ok(())
    }

    /// `remove(wire)`: fails with [`CktError::LiveFanin`] if the gate still
    /// has fanout.
    pub fn remove(&mut self, wire: Wire) -> Result<()> {
        if self.frozen {
            return Err(CktError::FreezeViolation { frozen: true });
        }
        let id = wire.id();
        if self.fanout_count(id) > 0 {
            return Err(CktError::LiveFanin { wire });
        }
        let gate = self.gates[id as usize].take().ok_or(CktError::DanglingReference { wire })?;
        self.dispatch(Event::Remove { id, gate: &gate });
        self.purge_type_block(gate.ty(), id);
        self.freelist.push(id);
        Ok(())
    }

    /// Globally substitutes one wire for another for listener bookkeeping.
    /// Callers remain responsible for actually rewiring any fanins.
    pub fn substitute(&mut self, from: Wire, to: Wire) {
        self.dispatch(Event::Substitute { from, to });
    }

    /// Associates a name with a wire's gate. Fails if the name is already
    /// taken by a different gate.
    pub fn add_name(&mut self, name: impl Into<String>, wire: Wire) -> Result<()> {
        let name = name.into();
        match self.names.get(&name) {
            Some(&id) if id != wire.id() => Err(CktError::DuplicateName(name)),
            _ => {
                self.names.insert(name, wire.id());
                Ok(())
            }
        }
    }

    /// Looks up a gate id by name.
    pub fn lookup_name(&self, name: &str) -> Option<GateId> {
        self.names.get(name).copied()
    }

    /// `compact(order)`: rewrites user gate identifiers (the reserved
    /// null/error/const0/reset prefix never moves) to a dense range,
    /// optionally ordered by `order`, and updates every attached gob.
    /// Invalidates all outstanding wires to ids >= [`FIRST_USER_ID`]; they
    /// must be translated through the returned [`Remap`].
    pub fn compact(&mut self, order: Option<&[GateId]>) -> Remap {
        let live: Vec<GateId> = match order {
            Some(order) => order
                .iter()
                .copied()
                .filter(|&id| id >= FIRST_USER_ID && self.gates.get(id as usize).is_some_and(Option::is_some))
                .collect(),
            None => (FIRST_USER_ID..self.gates.len() as GateId)
                .filter(|&id| self.gates[id as usize].is_some())
                .collect(),
        };

        let mut table: Vec<Option<GateId>> = vec![None; self.gates.len()];
        for id in 0..FIRST_USER_ID {
            table[id as usize] = Some(id);
        }
        let mut next = FIRST_USER_ID;
        for &id in &live {
            table[id as usize] = Some(next);
            next += 1;
        }
        let remap = Remap::new(table);

        let mut new_gates: Vec<Option<Gate>> = vec![None; next as usize];
        for id in 0..FIRST_USER_ID {
            new_gates[id as usize] = self.gates[id as usize].clone();
        }
        let mut new_type_blocks: AHashMap<GateType, Vec<GateId>> = AHashMap::new();
        new_type_blocks.insert(GateType::Const, vec![CONST0_ID]);
        for &old_id in &live {
            let new_id = remap.get(old_id).unwrap();
            let old_gate = self.gates[old_id as usize].take().unwrap();
            let new_fanins: Vec<Wire> = old_gate
                .fanins()
                .iter()
                .map(|w| Wire::new(remap.get(w.id()).unwrap_or(w.id()), w.sign()))
                .collect();
            let ty = old_gate.ty();
            let new_gate = Gate::new(ty, new_fanins.into(), old_gate.attr()).expect("arity preserved by compaction");
            new_type_blocks.entry(ty).or_default().push(new_id);
            new_gates[new_id as usize] = Some(new_gate);
        }

        self.gates = new_gates;
        self.type_blocks = new_type_blocks;
        self.freelist.clear();
        self.names = self.names.drain().filter_map(|(n, id)| remap.get(id).map(|new_id| (n, new_id))).collect();

        self.fanout_count = vec![0; self.gates.len()];
        for (_, gate) in self.iter_all() {
            for w in gate.fanins() {
                if let Some(c) = self.fanout_count.get_mut(w.id() as usize) {
                    *c += 1;
                }
            }
        }

        self.dispatch(Event::Compact { remap: &remap });
        remap
    }

    /// Computes a topological order over the combinational cone reachable
    /// from `sinks` (§4.4). Constant gates are omitted.
    pub fn topo_order_from(&self, sinks: impl IntoIterator<Item = GateId>, boundary: FlopBoundary) -> Vec<GateId> {
        topo::topo_order(sinks, boundary, |id| self.gates.get(id as usize).and_then(|g| g.clone()), |_| false)
    }

    /// Computes a topological order from every primary output and every
    /// flop, caching the result until the next structural edit.
    pub fn topo_order(&mut self, boundary: FlopBoundary) -> &[GateId] {
        if self.topo_cache.is_none() {
            let sinks: Vec<GateId> =
                self.iter_type(GateType::Po).chain(self.iter_type(GateType::Flop)).collect();
            self.topo_cache = Some(self.topo_order_from(sinks, boundary));
        }
        self.topo_cache.as_deref().unwrap()
    }

    /// The flop-initial-value gob, creating it on first use.
    pub fn flop_init_mut(&mut self) -> &mut FlopInit {
        self.flop_init.get_or_insert_with(FlopInit::default)
    }

    /// The flop-initial-value gob, if created.
    pub fn flop_init(&self) -> Option<&FlopInit> {
        self.flop_init.as_ref()
    }

    /// The designated-properties set, creating it on first use.
    pub fn properties_mut(&mut self) -> &mut GateSet {
        self.properties.get_or_insert_with(GateSet::default)
    }
    /// The designated-constraints set, creating it on first use.
    pub fn constraints_mut(&mut self) -> &mut GateSet {
        self.constraints.get_or_insert_with(GateSet::default)
    }
    /// The designated fair-properties set, creating it on first use.
    pub fn fair_properties_mut(&mut self) -> &mut GateSet {
        self.fair_properties.get_or_insert_with(GateSet::default)
    }
    /// The designated fair-constraints set, creating it on first use.
    pub fn fair_constraints_mut(&mut self) -> &mut GateSet {
        self.fair_constraints.get_or_insert_with(GateSet::default)
    }
    /// The designated init-bad set, creating it on first use.
    pub fn init_bad_mut(&mut self) -> &mut GateSet {
        self.init_bad.get_or_insert_with(GateSet::default)
    }
    /// The memory-descriptor gob, creating it on first use.
    pub fn memory_info_mut(&mut self) -> &mut MemoryInfo {
        self.memory_info.get_or_insert_with(MemoryInfo::default)
    }
    /// The memory-descriptor gob, if created.
    pub fn memory_info(&self) -> Option<&MemoryInfo> {
        self.memory_info.as_ref()
    }

    /// Registers a listener for the given event mask.
    pub fn add_listener(&mut self, listener: Box<dyn Listener>, mask: EventMask) {
        self.listeners.push((listener, mask));
    }

    fn dispatch(&mut self, event: Event<'_>) {
        match &event {
            Event::Add { fanins, ty, id } => {
                for w in fanins.iter() {
                    if let Some(c) = self.fanout_count.get_mut(w.id() as usize) {
                        *c += 1;
                    }
                }
                if ty.info().strash_owned {
                    if let Some(s) = &mut self.strash {
                        s.register(*ty, fanins, *id);
                    }
                }
                if let Some(df) = &mut self.dynamic_fanouts {
                    df.on_add(*id, fanins);
                }
                self.topo_cache = None;
            }
            Event::Remove { id, gate } => {
                for w in gate.fanins() {
                    if let Some(c) = self.fanout_count.get_mut(w.id() as usize) {
                        *c = c.saturating_sub(1);
                    }
                }
                if gate.ty().info().strash_owned {
                    if let Some(s) = &mut self.strash {
                        s.on_remove(gate.ty(), gate.fanins());
                    }
                }
                if let Some(df) = &mut self.dynamic_fanouts {
                    df.on_retract(*id, gate.fanins());
                }
                self.topo_cache = None;
            }
            Event::Compact { remap } => {
                if let Some(s) = &mut self.strash {
                    s.remap(remap);
                }
                if let Some(sf) = &mut self.static_fanouts {
                    sf.remap(remap);
                }
                if let Some(df) = &mut self.dynamic_fanouts {
                    df.remap(remap);
                }
                if let Some(fi) = &mut self.flop_init {
                    fi.remap(remap);
                }
                for set in [
                    &mut self.properties,
                    &mut self.constraints,
                    &mut self.fair_properties,
                    &mut self.fair_constraints,
                    &mut self.init_bad,
                ] {
                    if let Some(set) = set {
                        set.remap(remap);
                    }
                }
                if let Some(mi) = &mut self.memory_info {
                    mi.remap(remap);
                }
                self.topo_cache = None;
            }
            Event::Update { .. } | Event::Substitute { .. } => {}
        }

        for (listener, mask) in &mut self.listeners {
            if listener::should_deliver(*mask, &event) {
                listener.on_event(&event);
            }
        }
    }
}

impl std::fmt::Debug for Netlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Netlist")
            .field("mode", &self.mode)
            .field("frozen", &self.frozen)
            .field("num_gates", &self.gates.iter().filter(|g| g.is_some()).count())
            .finish()
    }
}
