//! Gate-object ("gob"/"pob") lifecycle (§3.5).
//!
//! Attached objects are created on demand, persist until explicitly removed,
//! and must survive compaction. Rather than a type-erased registry keyed by
//! a runtime tag (the C++ original's `pob`/`gob` machinery), each well-known
//! object is a plain `Option<T>` field on [`crate::netlist::Netlist`]: the
//! "sparse array keyed by a fixed registry of tags" of §3.5 is just which of
//! those options are `Some`. This is the idiomatic-Rust rendition of the
//! same contract — on-demand construction, explicit removal, remap-on-compact
//! — without reaching for `dyn Any` where the set of object kinds is closed
//! and known at compile time.

use crate::lit::GateId;

/// Old id -> new id (or dropped) produced by [`crate::netlist::Netlist::compact`].
///
/// Every gob's `remap` implementation consults this to translate the ids it
/// stores internally.
#[derive(Debug, Clone)]
pub struct Remap {
    /// `table[old_id as usize] == Some(new_id)`, or `None` if the gate at
    /// `old_id` did not survive compaction.
    table: Vec<Option<GateId>>,
}

impl Remap {
    pub(crate) fn new(table: Vec<Option<GateId>>) -> Self {
        Remap { table }
    }

    /// Translates an old id to its new id, if it survived.
    pub fn get(&self, old: GateId) -> Option<GateId> {
        self.table.get(old as usize).copied().flatten()
    }

    /// Number of old ids covered by this remap (i.e. the old netlist size).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether this remap covers zero ids.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// A gate-level attached object.
///
/// All gobs implement at least [`Gob::remap`] so they survive
/// [`crate::netlist::Netlist::compact`]; most also respond to the listener
/// bus directly (see `strash.rs`, `fanout.rs`) since remap alone cannot keep
/// a derived index consistent across ordinary edits.
pub trait Gob {
    /// Rewrites every internally stored id through `remap`, dropping entries
    /// for ids that did not survive compaction.
    fn remap(&mut self, remap: &Remap);
}
