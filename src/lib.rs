//! Gate-inverter-graph netlists, a proof-logging CDCL SAT solver, and a
//! Tseitin clausifier, for formally verifying sequential digital circuits.
//!
//! The three pieces compose top-down:
//!
//! - [`netlist`] holds a circuit as a DAG of signed gate references
//!   ([`lit::Wire`]) over a closed [`gate::GateType`] enumeration, with
//!   structural hashing, fanout indexes, topological order, and a handful of
//!   attached gate-objects (flop initial values, designated property/
//!   constraint sets, memory descriptors) all kept consistent through a
//!   synchronous listener bus.
//! - [`clausify`] translates a netlist cone into CNF over [`sat::Lit`]s,
//!   memoizing one literal per wire and collapsing AND/OR/XOR/MUX patterns
//!   the way a hand-written Tseitin encoder would.
//! - [`sat`] is a self-contained two-watched-literal CDCL solver with VSIDS
//!   variable selection, Luby-scheduled restarts, clause-database reduction,
//!   incremental assumptions, and an optional resolution-proof log.
//! - [`sim`] ternary-simulates a netlist's combinational cones, for
//!   confirming or refining a solver-produced assignment against don't-care
//!   inputs.
//!
//! None of these modules touch a particular on-disk format; callers bring
//! their own netlist construction and counter-example rendering.

pub mod clausify;
pub mod error;
pub mod gate;
pub mod lit;
pub mod netlist;
pub mod sat;
pub mod sim;

pub use clausify::Clausifier;
pub use error::{CktError, Result};
pub use gate::{Attr, Gate, GateType};
pub use lit::Wire;
pub use netlist::{Mode, Netlist};
pub use sat::SatBackend;
pub use sim::{Simulator, Tristate};
