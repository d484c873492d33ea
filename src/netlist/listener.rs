//! The netlist's event bus (design notes: "typed event channel").
//!
//! There are exactly five event kinds. Delivery to registered listeners is
//! synchronous and in registration order, during the mutating call that
//! produced the event. A listener must not mutate the netlist it is
//! registered on from within a callback.

use crate::gate::{Gate, GateType};
use crate::lit::{GateId, Wire};
use crate::netlist::Remap;

/// A structural change to a netlist.
#[derive(Debug, Clone)]
pub enum Event<'a> {
    /// A gate was just created.
    Add {
        /// The new gate's id.
        id: GateId,
        /// Its type.
        ty: GateType,
        /// Its fanin list at creation time.
        fanins: &'a [Wire],
    },
    /// A gate's fanin list or attribute changed in place (same id).
    Update {
        /// The gate's id.
        id: GateId,
        /// Its type and fanins before the update.
        old: &'a Gate,
    },
    /// A gate was removed; its slot is now a tombstone.
    Remove {
        /// The removed gate's id.
        id: GateId,
        /// Its type and fanins just before removal.
        gate: &'a Gate,
    },
    /// The whole netlist was compacted to a dense id range.
    Compact {
        /// Old id -> new id (or `None` if the gate was dropped).
        remap: &'a Remap,
    },
    /// One wire was globally substituted for another (e.g. constant
    /// propagation folding a gate into an existing equivalent one).
    Substitute {
        /// The wire being replaced.
        from: Wire,
        /// Its replacement.
        to: Wire,
    },
}

/// Which event kinds a listener wants delivered, as an OR of bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMask(u8);

impl EventMask {
    /// Deliver [`Event::Add`].
    pub const ADD: EventMask = EventMask(1 << 0);
    /// Deliver [`Event::Update`].
    pub const UPDATE: EventMask = EventMask(1 << 1);
    /// Deliver [`Event::Remove`].
    pub const REMOVE: EventMask = EventMask(1 << 2);
    /// Deliver [`Event::Compact`].
    pub const COMPACT: EventMask = EventMask(1 << 3);
    /// Deliver [`Event::Substitute`].
    pub const SUBSTITUTE: EventMask = EventMask(1 << 4);
    /// Deliver every event kind.
    pub const ALL: EventMask = EventMask(0b1_1111);

    /// Whether this mask includes `other`'s bits.
    pub const fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for EventMask {
    type Output = EventMask;
    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

impl Event<'_> {
    fn mask_bit(&self) -> EventMask {
        match self {
            Event::Add { .. } => EventMask::ADD,
            Event::Update { .. } => EventMask::UPDATE,
            Event::Remove { .. } => EventMask::REMOVE,
            Event::Compact { .. } => EventMask::COMPACT,
            Event::Substitute { .. } => EventMask::SUBSTITUTE,
        }
    }
}

/// A value that wants to observe netlist structural changes.
pub trait Listener {
    /// Called synchronously for every event whose kind is in this
    /// listener's registered mask.
    fn on_event(&mut self, event: &Event<'_>);
}

pub(crate) fn should_deliver(mask: EventMask, event: &Event<'_>) -> bool {
    mask.contains(event.mask_bit())
}
