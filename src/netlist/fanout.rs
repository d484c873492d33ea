//! Fanout indexes (§4.3): immutable static fanouts over a frozen netlist,
//! and a dynamic fanout index kept live through the listener bus.

use smallvec::SmallVec;

use crate::gate::Gate;
use crate::lit::{GateId, Wire};
use crate::netlist::gob::{Gob, Remap};

/// One reverse edge: gate `parent` consumes this wire's output on fanin
/// pin `pin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutEdge {
    /// The consuming gate.
    pub parent: GateId,
    /// Which fanin pin of `parent` this edge occupies.
    pub pin: u16,
}

/// Inline-up-to-4, spill-to-heap fanout list for one gate.
type EdgeList = SmallVec<[FanoutEdge; 4]>;

/// Fanouts computed once over a frozen netlist. Any structural edit
/// invalidates this index; rebuild after `unfreeze`/edit/`freeze` again.
#[derive(Default)]
pub struct StaticFanouts {
    by_gate: Vec<EdgeList>,
}

impl StaticFanouts {
    /// Builds the index by scanning every live gate's fanins once.
    pub fn build(max_id: GateId, gates: impl Iterator<Item = (GateId, Gate)>) -> Self {
        let mut by_gate: Vec<EdgeList> = vec![EdgeList::new(); max_id as usize + 1];
        for (id, gate) in gates {
            for (pin, fanin) in gate.fanins().iter().enumerate() {
                let target = fanin.id() as usize;
                if target < by_gate.len() {
                    by_gate[target].push(FanoutEdge { parent: id, pin: pin as u16 });
                }
            }
        }
        StaticFanouts { by_gate }
    }

    /// The fanout edges of a gate, or an empty slice if it has none / is out
    /// of range.
    pub fn of(&self, id: GateId) -> &[FanoutEdge] {
        self.by_gate.get(id as usize).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of fanout edges of a gate.
    pub fn count(&self, id: GateId) -> usize {
        self.of(id).len()
    }
}

/// Live reverse-edge index, updated through the listener bus on every
/// `add`/`update`/`remove`/`compact`.
///
/// Lazy deletion: `remove`/`update` mark stale edges rather than
/// compacting the backing list immediately; [`DynamicFanouts::trim`]
/// rewrites the index to drop them and shrink capacity. The exact edge
/// **count** is tracked separately from the possibly-stale **list** so that
/// `fanout_count` is always correct even between `trim` calls.
#[derive(Default)]
pub struct DynamicFanouts {
    by_gate: Vec<EdgeList>,
    count: Vec<u32>,
}

impl DynamicFanouts {
    fn ensure(&mut self, id: GateId) {
        let idx = id as usize;
        if idx >= self.by_gate.len() {
            self.by_gate.resize_with(idx + 1, EdgeList::new);
            self.count.resize(idx + 1, 0);
        }
    }

    /// Registers edges from `parent`'s fanin pins to their targets.
    pub fn on_add(&mut self, parent: GateId, fanins: &[Wire]) {
        self.ensure(parent);
        for (pin, fanin) in fanins.iter().enumerate() {
            let target = fanin.id();
            self.ensure(target);
            self.by_gate[target as usize].push(FanoutEdge { parent, pin: pin as u16 });
            self.count[target as usize] += 1;
        }
    }

    /// Retracts edges from `parent`'s old fanins (used for both `update` and
    /// `remove`). The backing list is left with a stale entry for this edge
    /// (lazy deletion); only [`DynamicFanouts::trim`] physically removes it.
    /// The count, which every `fanout_count` query relies on, is decremented
    /// immediately so it is always exact.
    pub fn on_retract(&mut self, parent: GateId, old_fanins: &[Wire]) {
        let _ = parent;
        for fanin in old_fanins {
            let target = fanin.id() as usize;
            if let Some(c) = self.count.get_mut(target) {
                *c = c.saturating_sub(1);
            }
        }
    }

    /// Exact fanout count for a gate (always accurate, even with untrimmed
    /// stale entries in the list).
    pub fn count(&self, id: GateId) -> usize {
        self.count.get(id as usize).copied().unwrap_or(0) as usize
    }

    /// The fanout edge list, which may contain stale entries until the next
    /// [`DynamicFanouts::trim`].
    pub fn of_raw(&self, id: GateId) -> &[FanoutEdge] {
        self.by_gate.get(id as usize).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Rebuilds every edge list from the current, authoritative gate table,
    /// dropping stale edges and shrinking capacity.
    pub fn trim(&mut self, gates: impl Iterator<Item = (GateId, Gate)>) {
        for edges in &mut self.by_gate {
            edges.clear();
            edges.shrink_to_fit();
        }
        self.count.iter_mut().for_each(|c| *c = 0);
        for (id, gate) in gates {
            for (pin, fanin) in gate.fanins().iter().enumerate() {
                let target = fanin.id() as usize;
                self.ensure_len(target);
                self.by_gate[target].push(FanoutEdge { parent: id, pin: pin as u16 });
                self.count[target] += 1;
            }
        }
    }

    fn ensure_len(&mut self, idx: usize) {
        if idx >= self.by_gate.len() {
            self.by_gate.resize_with(idx + 1, EdgeList::new);
            self.count.resize(idx + 1, 0);
        }
    }
}

impl Gob for DynamicFanouts {
    fn remap(&mut self, remap: &Remap) {
        let mut new_by_gate: Vec<EdgeList> = vec![EdgeList::new(); remap.len()];
        let mut new_count: Vec<u32> = vec![0; remap.len()];
        for old_id in 0..self.by_gate.len() as GateId {
            let Some(new_id) = remap.get(old_id) else { continue };
            let mut edges = EdgeList::new();
            for e in self.by_gate[old_id as usize].iter() {
                if let Some(new_parent) = remap.get(e.parent) {
                    edges.push(FanoutEdge { parent: new_parent, pin: e.pin });
                }
            }
            new_count[new_id as usize] = self.count.get(old_id as usize).copied().unwrap_or(0);
            new_by_gate[new_id as usize] = edges;
        }
        self.by_gate = new_by_gate;
        self.count = new_count;
    }
}

impl Gob for StaticFanouts {
    fn remap(&mut self, _remap: &Remap) {
        // Static fanouts require a frozen netlist and are invalidated by any
        // edit, including compaction; callers must rebuild with `build`.
        self.by_gate.clear();
    }
}
