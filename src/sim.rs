use std::collections::BTreeMap;

use log::*;

use crate::ast::Name;
use crate::circuit::{Circuit, Gate, GateId, GateKind};
use crate::error::CircuitError;
use crate::sched::schedule;


/// Drives a [`Circuit`] across discrete steps against bit-serial inputs.
///
/// Construction partitions the gates and computes the combinational
/// schedule once; [`Simulator::run`] takes `&self` and threads all per-run
/// state through explicit values, so one `Simulator` can serve any number
/// of runs (including concurrent ones) without interference.
#[derive(Debug)]
pub struct Simulator {
    circuit: Circuit,
    schedule: Vec<GateId>,
    delays: Vec<GateId>,
}

/// The result of a run: one accumulated bit-string per declared output, and
/// one named-signal snapshot per step for step-by-step inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimResult {
    pub outputs: BTreeMap<Name, String>,
    pub history: Vec<BTreeMap<Name, bool>>,
}

impl Simulator {
    pub fn new(circuit: &Circuit) -> Result<Simulator, CircuitError> {
        let order = schedule(circuit)?;
        let delays: Vec<GateId> = circuit
            .gates()
            .iter()
            .enumerate()
            .filter(|(_gate_id, gate)| gate.kind.is_sequential())
            .map(|(gate_id, _gate)| gate_id)
            .collect();

        debug!(
            "Simulator ready: {} combinational gates, {} D elements",
            order.len(),
            delays.len(),
        );

        Ok(Simulator {
            circuit: circuit.clone(),
            schedule: order,
            delays,
        })
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Runs the circuit for `steps` steps.
    ///
    /// At step `i` each declared input takes bit `i` of its bit-string;
    /// bit-strings shorter than `steps` are padded with `0`. Every `D`
    /// element starts latched at `0`, so `D(x)` is `0` at step 0 and the
    /// previous step's `x` after that.
    pub fn run(&self, inputs: &BTreeMap<Name, String>, steps: usize) -> Result<SimResult, CircuitError> {
        self.check_inputs(inputs)?;

        let mut latched = vec![false; self.delays.len()];
        let mut outputs: BTreeMap<Name, String> = self
            .circuit
            .outputs()
            .iter()
            .map(|(name, _id)| (name.clone(), String::with_capacity(steps)))
            .collect();
        let mut history = vec![];

        for step in 0..steps {
            let mut values: Vec<Option<bool>> = vec![None; self.circuit.num_signals()];

            for (name, bits) in inputs {
                let id = self
                    .circuit
                    .signal_id(name)
                    .ok_or_else(|| CircuitError::Runtime(format!("validated input {name} has no signal")))?;
                let bit = bits.as_bytes().get(step).map(|b| *b == b'1').unwrap_or(false);
                values[id] = Some(bit);
            }

            // D outputs hold the values latched at the end of the previous
            // step; they are boundary values for this step's evaluation.
            for (i, gate_id) in self.delays.iter().enumerate() {
                let gate = &self.circuit.gates()[*gate_id];
                values[gate.output] = Some(latched[i]);
            }

            for gate_id in &self.schedule {
                let gate = &self.circuit.gates()[*gate_id];
                let value = match gate.kind {
                    GateKind::Nand => {
                        !(self.input_value(&values, gate, 0)? && self.input_value(&values, gate, 1)?)
                    },
                    GateKind::Buf => self.input_value(&values, gate, 0)?,
                    GateKind::Const(bit) => bit,
                    GateKind::Delay => {
                        return Err(CircuitError::Runtime(
                            "D element found in the combinational schedule".to_string(),
                        ));
                    },
                };
                values[gate.output] = Some(value);
            }

            // Latch after the whole step has settled: output(t) = input(t-1).
            for (i, gate_id) in self.delays.iter().enumerate() {
                let gate = &self.circuit.gates()[*gate_id];
                latched[i] = self.input_value(&values, gate, 0)?;
            }

            let mut snapshot = BTreeMap::new();
            for (name, id) in self.circuit.named_signals() {
                let value = values[id].ok_or_else(|| {
                    CircuitError::Runtime(format!("signal {name} has no value at step {step}"))
                })?;
                snapshot.insert(name.clone(), value);
            }
            for (name, id) in self.circuit.outputs() {
                let value = values[*id].ok_or_else(|| {
                    CircuitError::Runtime(format!("output {name} has no value at step {step}"))
                })?;
                if let Some(bits) = outputs.get_mut(name) {
                    bits.push(if value { '1' } else { '0' });
                }
            }
            history.push(snapshot);
        }

        Ok(SimResult { outputs, history })
    }

    fn input_value(&self, values: &[Option<bool>], gate: &Gate, index: usize) -> Result<bool, CircuitError> {
        let id = gate.inputs.get(index).ok_or_else(|| {
            CircuitError::Runtime(format!("{} gate is missing input {index}", gate.kind))
        })?;
        values
            .get(*id)
            .copied()
            .flatten()
            .ok_or_else(|| {
                CircuitError::Runtime(format!(
                    "{} gate read signal {} before it was computed",
                    gate.kind,
                    self.circuit.signal_name(*id),
                ))
            })
    }

    fn check_inputs(&self, inputs: &BTreeMap<Name, String>) -> Result<(), CircuitError> {
        for (name, bits) in inputs {
            if !self.circuit.inputs().contains(name) {
                return Err(CircuitError::UnknownInput(name.clone()));
            }
            if let Some(bad) = bits.chars().find(|c| *c != '0' && *c != '1') {
                return Err(CircuitError::InvalidInput(
                    name.clone(),
                    format!("unexpected character `{bad}`"),
                ));
            }
        }
        for name in self.circuit.inputs() {
            if !inputs.contains_key(name) {
                return Err(CircuitError::MissingInput(name.clone()));
            }
        }
        Ok(())
    }
}
