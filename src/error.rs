//! Structured errors for the netlist, clausifier, and solver (§7).

use thiserror::Error;

use crate::gate::GateType;
use crate::lit::Wire;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CktError>;

/// Everything that can go wrong building or querying a [`crate::netlist::Netlist`],
/// running the [`crate::clausify::Clausifier`], or driving the SAT solver.
///
/// Solver *outcomes* (SAT / UNSAT / UNDEF) are not errors — see
/// [`crate::sat::SolveResult`] — only genuine failures are represented here.
#[derive(Debug, Error)]
pub enum CktError {
    /// Malformed input text from an external reader (line-numbered, 1-based).
    ///
    /// The core itself never produces this; it exists so that format readers
    /// built on top of this crate (AIGER, `.gig`, DIMACS, MST — out of scope
    /// here) have a place to report parse failures in the crate's own error
    /// type.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based source line.
        line: u32,
        /// Human-readable description.
        message: String,
    },

    /// A gate type is not permitted to be created directly under the
    /// netlist's active mode (§3.4), or must be created through the strash
    /// factory instead.
    #[error("gate type {ty:?} is not permitted by the current netlist mode")]
    ModeViolation {
        /// The offending gate type.
        ty: GateType,
    },

    /// `add`/`change` was called with a fanin count that does not match the
    /// type's declared arity.
    #[error("gate type {ty:?} expects {expected} fanins, got {actual}")]
    ArityMismatch {
        /// The gate type in question.
        ty: GateType,
        /// The type's declared arity.
        expected: usize,
        /// The arity actually supplied.
        actual: usize,
    },

    /// `remove` was called on a gate that still has live fanout (debug-mode
    /// assertion per §4.1; release builds have no such check and the caller
    /// must consult `fanout_count` first).
    #[error("cannot remove {wire:?}: it still has live fanout")]
    LiveFanin {
        /// The wire that could not be removed.
        wire: Wire,
    },

    /// Lookup of a wire, gate-object tag, or name failed.
    #[error("dangling reference to {wire:?}")]
    DanglingReference {
        /// The wire that does not resolve to a live gate.
        wire: Wire,
    },

    /// A name was registered twice in a context that requires uniqueness.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// An operation was attempted on a netlist in the wrong freeze state
    /// (e.g. a structural edit while frozen, or building static fanouts
    /// while unfrozen).
    #[error("netlist freeze-state violation (frozen={frozen}), which forbids this operation")]
    FreezeViolation {
        /// Whether the netlist was frozen at the time of the call.
        frozen: bool,
    },

    /// The solver ran out of addressable variable ids (`id_MAX = 2^31 - 1`).
    #[error("variable id space exhausted (limit is 2^31 - 1)")]
    VariableSpaceExhausted,

    /// The solver is in a state where it can no longer be used (resource
    /// exhaustion during solving); it must be discarded.
    #[error("solver is no longer usable and must be cleared")]
    SolverUnusable,
}
