use std::collections::BTreeMap;

use log::*;

use crate::circuit::{Circuit, GateId, SignalId};
use crate::depends::{CycleDetected, Depends};
use crate::error::CircuitError;

/// Computes the evaluation order of the combinational gates.
///
/// `D` elements are left out of the dependency graph entirely: their outputs
/// hold the previous step's latched values and so count as already resolved.
/// That is what makes feedback loops legal as long as they pass through at
/// least one `D`. A cycle among the remaining gates has no valid order and
/// fails with [`CircuitError::CombCycle`] naming the signals involved.
pub fn schedule(circuit: &Circuit) -> Result<Vec<GateId>, CircuitError> {
    let mut comb_producer: BTreeMap<SignalId, GateId> = BTreeMap::new();
    for (gate_id, gate) in circuit.gates().iter().enumerate() {
        if !gate.kind.is_sequential() {
            comb_producer.insert(gate.output, gate_id);
        }
    }

    let mut depends = Depends::<GateId>::new();
    for (gate_id, gate) in circuit.gates().iter().enumerate() {
        if gate.kind.is_sequential() {
            continue;
        }
        depends.add(gate_id);
        for input in &gate.inputs {
            if let Some(producer_id) = comb_producer.get(input) {
                depends.add_dependency(gate_id, *producer_id);
            }
        }
    }

    match depends.sort() {
        Ok(order) => {
            debug!("Scheduled {} combinational gates", order.len());
            Ok(order)
        },
        Err(CycleDetected(gate_ids)) => {
            let mut signals: Vec<String> = gate_ids
                .iter()
                .map(|gate_id| circuit.signal_name(circuit.gates()[*gate_id].output))
                .collect();
            signals.sort();
            signals.dedup();
            Err(CircuitError::CombCycle(signals))
        },
    }
}
