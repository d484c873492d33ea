//! Ternary (3-valued) simulation (§4.4 adjacent: counter-example
//! verification over a netlist's combinational cones).
//!
//! A gate's value is `X` whenever it cannot be pinned down to a single
//! Boolean value given the current (possibly partial) input assignment.
//! Rather than hand-rolling a ternary truth table per gate type, each
//! combinational gate's output is computed by brute-force enumerating every
//! concrete resolution of its `X` inputs against the gate's Boolean
//! function: if every resolution agrees, that is the gate's ternary value;
//! otherwise it is `X`. This is the strongest (least conservative) ternary
//! simulation possible for a gate evaluated in isolation.

use crate::gate::{Attr, GateType};
use crate::lit::{GateId, Wire, CONST0_ID};
use crate::netlist::{FlopBoundary, InitValue, Netlist};

/// A 3-valued logic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    /// Definitely false.
    False,
    /// Definitely true.
    True,
    /// Unknown (either value is possible).
    X,
}

impl Tristate {
    fn from_bool(b: bool) -> Self {
        if b {
            Tristate::True
        } else {
            Tristate::False
        }
    }

    fn as_bool(self) -> Option<bool> {
        match self {
            Tristate::True => Some(true),
            Tristate::False => Some(false),
            Tristate::X => None,
        }
    }
}

impl std::ops::Not for Tristate {
    type Output = Tristate;
    fn not(self) -> Tristate {
        match self {
            Tristate::False => Tristate::True,
            Tristate::True => Tristate::False,
            Tristate::X => Tristate::X,
        }
    }
}

/// Evaluates a Boolean function of `inputs.len()` variables over ternary
/// inputs by enumerating every concrete resolution of the `X` positions.
fn eval_ternary(inputs: &[Tristate], f: impl Fn(&[bool]) -> bool) -> Tristate {
    let x_positions: Vec<usize> = (0..inputs.len()).filter(|&i| inputs[i] == Tristate::X).collect();
    let mut bits: Vec<bool> = inputs.iter().map(|v| v.as_bool().unwrap_or(false)).collect();
    if x_positions.is_empty() {
        return Tristate::from_bool(f(&bits));
    }
    let mut result: Option<bool> = None;
    for mask in 0..(1usize << x_positions.len()) {
        for (k, &pos) in x_positions.iter().enumerate() {
            bits[pos] = (mask >> k) & 1 == 1;
        }
        let r = f(&bits);
        match result {
            None => result = Some(r),
            Some(prev) if prev != r => return Tristate::X,
            _ => {}
        }
    }
    Tristate::from_bool(result.unwrap())
}

/// An entry in the simulator's undo log: the gate whose value changed, and
/// its value immediately before the change.
struct LogEntry {
    id: GateId,
    old: Tristate,
}

/// Incremental ternary simulator over one netlist.
///
/// Primary inputs and flop outputs are set externally ([`Simulator::set_pi`],
/// [`Simulator::reset_flops`]); [`Simulator::propagate`] then computes every
/// other gate's value by a single topological pass. [`Simulator::commit`]
/// clears the undo log (accepting the current values as the new baseline);
/// [`Simulator::undo`] rolls back every change since the last commit.
pub struct Simulator<'a> {
    netlist: &'a Netlist,
    values: Vec<Tristate>,
    log: Vec<LogEntry>,
}

impl<'a> Simulator<'a> {
    /// Builds a simulator with every gate at `X`, except the constant gate.
    pub fn new(netlist: &'a Netlist) -> Self {
        let mut values = vec![Tristate::X; netlist_capacity(netlist)];
        values[CONST0_ID as usize] = Tristate::False;
        Simulator { netlist, values, log: Vec::new() }
    }

    /// The current value of a (possibly negated) wire.
    pub fn value(&self, wire: Wire) -> Tristate {
        let v = self.values.get(wire.id() as usize).copied().unwrap_or(Tristate::X);
        if wire.sign() {
            !v
        } else {
            v
        }
    }

    fn assign(&mut self, id: GateId, value: Tristate) {
        let idx = id as usize;
        if idx >= self.values.len() {
            self.values.resize(idx + 1, Tristate::X);
        }
        if self.values[idx] == value {
            return;
        }
        self.log.push(LogEntry { id, old: self.values[idx] });
        self.values[idx] = value;
    }

    /// Assigns a primary input's value (accounting for the wire's sign).
    pub fn set_pi(&mut self, wire: Wire, value: Tristate) {
        self.assign(wire.id(), if wire.sign() { !value } else { value });
    }

    /// Resets every flop's output to its recorded initial value (`X` if
    /// untracked or conflicting), per §3.5's flop-initial-value gob.
    pub fn reset_flops(&mut self) {
        for id in self.netlist.iter_type(GateType::Flop) {
            let init = self.netlist.flop_init().map(|fi| fi.get(id)).unwrap_or(InitValue::Unknown);
            let value = match init {
                InitValue::Zero => Tristate::False,
                InitValue::One => Tristate::True,
                InitValue::Unknown | InitValue::Conflict => Tristate::X,
            };
            self.assign(id, value);
        }
    }

    /// Explicitly sets one flop's output value (e.g. to replay a prior
    /// cycle's committed state).
    pub fn set_flop(&mut self, flop: GateId, value: Tristate) {
        self.assign(flop, value);
    }

    /// Propagates values through the combinational cone feeding every
    /// primary output and flop input, in topological order. Flop and PI
    /// values are left untouched (they are sources, set externally).
    pub fn propagate(&mut self) {
        let sinks: Vec<GateId> = self
            .netlist
            .iter_type(GateType::Po)
            .chain(self.netlist.iter_type(GateType::Flop))
            .collect();
        let order = self.netlist.topo_order_from(sinks, FlopBoundary::WalkThroughFlop);
        for id in order {
            let Some(gate) = self.netlist.gate(Wire::new(id, false)) else { continue };
            match gate.ty() {
                GateType::Const | GateType::Pi | GateType::Flop => continue,
                _ => {}
            }
            let inputs: Vec<Tristate> = gate.fanins().iter().map(|&w| self.value(w)).collect();
            let value = match gate.ty() {
                GateType::Po | GateType::Buf | GateType::Seq => inputs[0],
                GateType::Not => !inputs[0],
                GateType::And => eval_ternary(&inputs, |b| b.iter().all(|&x| x)),
                GateType::Or | GateType::Disj => eval_ternary(&inputs, |b| b.iter().any(|&x| x)),
                GateType::Conj => eval_ternary(&inputs, |b| b.iter().all(|&x| x)),
                GateType::Xor => eval_ternary(&inputs, |b| b.iter().fold(false, |acc, &x| acc ^ x)),
                GateType::Equiv => eval_ternary(&inputs, |b| b[0] == b[1]),
                GateType::Mux => eval_ternary(&inputs, |b| if b[0] { b[1] } else { b[2] }),
                GateType::Maj => eval_ternary(&inputs, |b| (b[0] && b[1]) || (b[1] && b[2]) || (b[0] && b[2])),
                GateType::Lut4 => {
                    let table = match gate.attr() {
                        Attr::Ftb4(t) => t as u64,
                        _ => 0,
                    };
                    eval_ternary(&inputs, |b| {
                        let row = b.iter().enumerate().fold(0u32, |acc, (i, &bit)| acc | ((bit as u32) << i));
                        (table >> row) & 1 == 1
                    })
                }
                // Uninterpreted or out-of-band-encoded gates: no function to
                // evaluate here, so their value is unknown.
                GateType::So | GateType::Npn4 | GateType::Lut6 | GateType::Uif => Tristate::X,
                GateType::Const | GateType::Pi | GateType::Flop => unreachable!(),
            };
            self.assign(id, value);
        }
    }

    /// Accepts every change since the last commit/undo as the new baseline,
    /// discarding the undo log.
    pub fn commit(&mut self) {
        self.log.clear();
    }

    /// Reverts every change since the last commit/undo.
    pub fn undo(&mut self) {
        while let Some(entry) = self.log.pop() {
            self.values[entry.id as usize] = entry.old;
        }
    }
}

fn netlist_capacity(netlist: &Netlist) -> usize {
    netlist.iter_all().map(|(id, _)| id as usize + 1).max().unwrap_or(0).max(crate::lit::FIRST_USER_ID as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Attr as GAttr;
    use crate::netlist::Mode;

    #[test]
    fn and_with_one_false_input_is_false_regardless_of_x() {
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], GAttr::Number(0)).unwrap();
        let b = nl.add(GateType::Pi, vec![], GAttr::Number(1)).unwrap();
        let z = nl.strash_and(a, b).unwrap();

        let mut sim = Simulator::new(&nl);
        sim.set_pi(a, Tristate::False);
        // b left at X
        sim.propagate();
        assert_eq!(sim.value(z), Tristate::False);
    }

    #[test]
    fn and_with_both_unknown_is_unknown() {
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], GAttr::Number(0)).unwrap();
        let b = nl.add(GateType::Pi, vec![], GAttr::Number(1)).unwrap();
        let z = nl.strash_and(a, b).unwrap();

        let sim = Simulator::new(&nl);
        let mut sim = sim;
        sim.propagate();
        assert_eq!(sim.value(z), Tristate::X);
        assert_eq!(sim.value(!z), Tristate::X);
    }

    #[test]
    fn undo_restores_prior_values_without_affecting_commit_baseline() {
        let mut nl = Netlist::new(Mode::Aig);
        let a = nl.add(GateType::Pi, vec![], GAttr::Number(0)).unwrap();

        let mut sim = Simulator::new(&nl);
        sim.set_pi(a, Tristate::True);
        sim.commit();
        sim.set_pi(a, Tristate::False);
        assert_eq!(sim.value(a), Tristate::False);
        sim.undo();
        assert_eq!(sim.value(a), Tristate::True);
    }
}
