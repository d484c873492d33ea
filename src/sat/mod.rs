//! The CDCL SAT engine (§4.6-4.7): a self-contained solver over its own
//! variable space, with optional resolution-proof logging.

pub mod clause;
pub mod lit;
pub mod proof;
pub mod solver;

pub use clause::{Clause, ClauseDb, ClauseId};
pub use lit::{Lit, Var};
pub use proof::{ProofLog, ProofRef};
pub use solver::{SolveResult, Solver, SolverOpts, SolverStats};

use crate::error::Result;

/// The common surface any SAT backend exposes: clause/variable ingestion,
/// solving under assumptions, and model/conflict inspection. [`Solver`] is
/// presently the only implementor, but callers that only need this surface
/// (the clausifier included) should depend on the trait rather than the
/// concrete type, so a future backend can be swapped in without touching
/// them.
pub trait SatBackend {
    /// Allocates a fresh variable.
    fn new_var(&mut self) -> Result<Var>;

    /// Adds a clause over this backend's variable space.
    fn add_clause(&mut self, lits: &[Lit]) -> Result<()>;

    /// Sets the assumption literals for the next [`SatBackend::solve`] call.
    fn assume(&mut self, lits: &[Lit]);

    /// Runs search to completion, or until `conflict_budget` conflicts have
    /// elapsed.
    fn solve(&mut self, conflict_budget: Option<u64>) -> SolveResult;

    /// The satisfying assignment after [`SolveResult::Sat`].
    fn model(&self) -> Vec<Option<bool>>;

    /// After [`SolveResult::Unsat`] under assumptions, the assumption
    /// literals responsible for the conflict.
    fn conflict_assumptions(&self) -> &[Lit];

    /// Deletes as many of `vars` as can be safely forgotten, returning the
    /// subset that had to be kept instead (still assigned, or — under proof
    /// logging — still needed to reconstruct some other derivation).
    fn remove_vars(&mut self, vars: &[Var]) -> Result<Vec<Var>>;
}

impl SatBackend for Solver {
    fn new_var(&mut self) -> Result<Var> {
        Solver::new_var(self)
    }

    fn add_clause(&mut self, lits: &[Lit]) -> Result<()> {
        Solver::add_clause(self, lits)
    }

    fn assume(&mut self, lits: &[Lit]) {
        Solver::assume(self, lits)
    }

    fn solve(&mut self, conflict_budget: Option<u64>) -> SolveResult {
        Solver::solve(self, conflict_budget)
    }

    fn model(&self) -> Vec<Option<bool>> {
        Solver::model(self)
    }

    fn conflict_assumptions(&self) -> &[Lit] {
        Solver::conflict_assumptions(self)
    }

    fn remove_vars(&mut self, vars: &[Var]) -> Result<Vec<Var>> {
        Solver::remove_vars(self, vars)
    }
}
