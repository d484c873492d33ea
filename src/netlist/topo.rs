//! Topological order (§4.4): an up-order traversal from sinks to sources
//! using an explicit work-stack, stopping at sequential elements.

use smallvec::SmallVec;
use std::collections::HashSet;

use crate::gate::{Gate, GateType};
use crate::lit::GateId;

/// Whether the traversal should descend through a flop's combinational
/// input, or treat flops purely as sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlopBoundary {
    /// Stop at flops: they appear in the order, but their fanin is not
    /// walked (the traversal treats them as global sources).
    StopAtFlop,
    /// Flops appear at their output position, but their combinational input
    /// is also walked (useful for e.g. building a single-frame unroll).
    WalkThroughFlop,
}

/// Computes an input-first topological order over the combinational cone
/// reachable from `sinks`, stopping at sequential elements per `boundary`.
/// Constant gates are omitted from the result. `stop_at` lets the caller cut
/// the traversal short at additional gates (besides flops).
pub fn topo_order(
    sinks: impl IntoIterator<Item = GateId>,
    boundary: FlopBoundary,
    mut get_gate: impl FnMut(GateId) -> Option<Gate>,
    mut stop_at: impl FnMut(GateId) -> bool,
) -> Vec<GateId> {
    enum Frame {
        Enter(GateId),
        Leave(GateId),
    }

    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut stack: Vec<Frame> = sinks.into_iter().map(Frame::Enter).collect();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                if visited.contains(&id) {
                    continue;
                }
                let Some(gate) = get_gate(id) else { continue };
                if matches!(gate.ty(), GateType::Const) {
                    visited.insert(id);
                    continue;
                }
                if on_stack.contains(&id) {
                    continue;
                }
                on_stack.insert(id);
                stack.push(Frame::Leave(id));

                let descend_fanins = match gate.ty() {
                    GateType::Flop => boundary == FlopBoundary::WalkThroughFlop,
                    _ => true,
                };
                if descend_fanins && !stop_at(id) {
                    let fanins: SmallVec<[GateId; 4]> =
                        gate.fanins().iter().map(|w| w.id()).collect();
                    for fanin in fanins {
                        if !visited.contains(&fanin) {
                            stack.push(Frame::Enter(fanin));
                        }
                    }
                }
            }
            Frame::Leave(id) => {
                on_stack.remove(&id);
                if visited.insert(id) {
                    order.push(id);
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Attr;
    use std::collections::HashMap;

    fn leaf(ty: GateType) -> Gate {
        Gate::new(ty, smallvec::smallvec![], Attr::None).unwrap()
    }

    #[test]
    fn simple_chain_is_input_first() {
        // g0 = PI, g1 = PI, g2 = And(g0, g1), g3 = PO(g2)
        let mut gates: HashMap<GateId, Gate> = HashMap::new();
        gates.insert(0, leaf(GateType::Pi));
        gates.insert(1, leaf(GateType::Pi));
        gates.insert(
            2,
            Gate::new(
                GateType::And,
                smallvec::smallvec![crate::lit::Wire::new(0, false), crate::lit::Wire::new(1, false)],
                Attr::None,
            )
            .unwrap(),
        );
        gates.insert(
            3,
            Gate::new(GateType::Po, smallvec::smallvec![crate::lit::Wire::new(2, false)], Attr::None).unwrap(),
        );

        let order = topo_order([3], FlopBoundary::StopAtFlop, |id| gates.get(&id).cloned(), |_| false);
        let pos = |id: GateId| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(0) < pos(2));
        assert!(pos(1) < pos(2));
        assert!(pos(2) < pos(3));
    }

    #[test]
    fn stops_at_flop_by_default() {
        let mut gates: HashMap<GateId, Gate> = HashMap::new();
        gates.insert(0, leaf(GateType::Pi));
        gates.insert(
            1,
            Gate::new(GateType::Flop, smallvec::smallvec![crate::lit::Wire::new(0, false)], Attr::None).unwrap(),
        );
        gates.insert(
            2,
            Gate::new(GateType::Po, smallvec::smallvec![crate::lit::Wire::new(1, false)], Attr::None).unwrap(),
        );

        let order = topo_order([2], FlopBoundary::StopAtFlop, |id| gates.get(&id).cloned(), |_| false);
        assert!(order.contains(&1));
        assert!(!order.contains(&0), "flop's combinational input must not be walked");
    }
}
