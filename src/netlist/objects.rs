//! The simpler attached objects of §3.5: flop initial values, designated
//! wire sets used by verification, and memory descriptors.

use nohash_hasher::IntMap;

use crate::lit::GateId;
use crate::netlist::gob::{Gob, Remap};

/// A flop's initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitValue {
    /// Initializes to 0.
    Zero,
    /// Initializes to 1.
    One,
    /// No constraint; treated as X by the ternary simulator.
    Unknown,
    /// Conflicting initializations were asserted for this flop.
    Conflict,
}

/// Map from flop id to its initial value.
#[derive(Default)]
pub struct FlopInit {
    values: IntMap<GateId, InitValue>,
}

impl FlopInit {
    /// Looks up a flop's initial value (defaults to `Unknown`).
    pub fn get(&self, flop: GateId) -> InitValue {
        self.values.get(&flop).copied().unwrap_or(InitValue::Unknown)
    }

    /// Sets a flop's initial value. Setting two different concrete values
    /// for the same flop records a `Conflict` rather than silently
    /// overwriting.
    pub fn set(&mut self, flop: GateId, value: InitValue) {
        match self.values.get(&flop) {
            Some(existing) if *existing != value && *existing != InitValue::Unknown => {
                self.values.insert(flop, InitValue::Conflict);
            }
            _ => {
                self.values.insert(flop, value);
            }
        }
    }
}

impl Gob for FlopInit {
    fn remap(&mut self, remap: &Remap) {
        self.values = self
            .values
            .drain()
            .filter_map(|(id, v)| remap.get(id).map(|new_id| (new_id, v)))
            .collect();
    }
}

/// A designated, named set of wires (properties / constraints / fair
/// properties / fair constraints / init-bad all share this shape).
#[derive(Default, Clone)]
pub struct GateSet {
    members: Vec<GateId>,
}

impl GateSet {
    /// Adds a gate to the set (idempotent).
    pub fn insert(&mut self, id: GateId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// The set's members, in insertion order.
    pub fn members(&self) -> &[GateId] {
        &self.members
    }
}

impl Gob for GateSet {
    fn remap(&mut self, remap: &Remap) {
        self.members = self.members.iter().filter_map(|&id| remap.get(id)).collect();
    }
}

/// A memory gate's descriptor: address and data width, used to interpret
/// the gate's `Memory` attribute.
#[derive(Debug, Clone, Copy)]
pub struct MemoryDescriptor {
    /// Address bus width in bits.
    pub addr_bits: u32,
    /// Data bus width in bits.
    pub data_bits: u32,
}

/// Map from memory-gate id to its descriptor.
#[derive(Default)]
pub struct MemoryInfo {
    descriptors: IntMap<GateId, MemoryDescriptor>,
}

impl MemoryInfo {
    /// Registers a memory gate's descriptor.
    pub fn set(&mut self, id: GateId, desc: MemoryDescriptor) {
        self.descriptors.insert(id, desc);
    }

    /// Looks up a memory gate's descriptor.
    pub fn get(&self, id: GateId) -> Option<MemoryDescriptor> {
        self.descriptors.get(&id).copied()
    }
}

impl Gob for MemoryInfo {
    fn remap(&mut self, remap: &Remap) {
        self.descriptors = self
            .descriptors
            .drain()
            .filter_map(|(id, v)| remap.get(id).map(|new_id| (new_id, v)))
            .collect();
    }
}
