use std::collections::BTreeMap;

use log::*;

use crate::ast::{Name, Program};
use crate::error::CircuitError;
use crate::expand::{Expander, MacroTable};

pub type SignalId = usize;
pub type GateId = usize;

/// The closed set of realized gate kinds. `Nand` and `Delay` are the
/// user-visible primitives; `Buf` and `Const` are produced by expansion for
/// identity wiring and literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Two-input NAND.
    Nand,
    /// The unit-delay register, written `D` in the source language.
    Delay,
    /// One-input identity. Realized for `A = B` and for macro bodies that
    /// reduce to a bare parameter.
    Buf,
    /// Zero-input constant. Realized for the literals `0` and `1`.
    Const(bool),
}

impl GateKind {
    pub fn is_sequential(&self) -> bool {
        matches!(self, GateKind::Delay)
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::Nand => write!(f, "NAND"),
            GateKind::Delay => write!(f, "D"),
            GateKind::Buf => write!(f, "BUF"),
            GateKind::Const(bit) => write!(f, "CONST{}", *bit as u8),
        }
    }
}

/// A realized gate: a kind, its ordered input signals, and the single
/// signal it drives.
#[derive(Debug, Clone)]
pub struct Gate {
    pub kind: GateKind,
    pub inputs: Vec<SignalId>,
    pub output: SignalId,
}

/// A flat netlist: the result of parsing, macro expansion, and reference
/// resolution. Immutable once built, and reusable across simulation runs.
#[derive(Debug, Clone)]
pub struct Circuit {
    signals: Vec<Option<Name>>,
    gates: Vec<Gate>,
    inputs: Vec<Name>,
    outputs: Vec<(Name, SignalId)>,
    signal_ids: BTreeMap<Name, SignalId>,
}

impl Circuit {
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// The declared input names, in order of first reference.
    pub fn inputs(&self) -> &[Name] {
        &self.inputs
    }

    /// The declared outputs (every top-level assignment target), in
    /// declaration order.
    pub fn outputs(&self) -> &[(Name, SignalId)] {
        &self.outputs
    }

    pub fn signal_id(&self, name: &str) -> Option<SignalId> {
        self.signal_ids.get(name).copied()
    }

    /// The display name of a signal: its declared name, or `w<id>` for the
    /// anonymous wires introduced by expansion.
    pub fn signal_name(&self, id: SignalId) -> Name {
        match self.signals.get(id) {
            Some(Some(name)) => name.clone(),
            _ => format!("w{id}"),
        }
    }

    /// Every named signal with its id, in name order.
    pub fn named_signals(&self) -> impl Iterator<Item = (&Name, SignalId)> {
        self.signal_ids.iter().map(|(name, id)| (name, *id))
    }
}

/// Accumulates signals and gates during expansion.
#[derive(Debug)]
pub(crate) struct NetBuilder {
    signals: Vec<Option<Name>>,
    gates: Vec<Gate>,
    signal_ids: BTreeMap<Name, SignalId>,
}

impl NetBuilder {
    fn new() -> NetBuilder {
        NetBuilder {
            signals: vec![],
            gates: vec![],
            signal_ids: BTreeMap::new(),
        }
    }

    /// Allocates a fresh anonymous signal.
    pub(crate) fn fresh(&mut self) -> SignalId {
        let id = self.signals.len();
        self.signals.push(None);
        id
    }

    /// Registers an assignment target. Each name may be assigned once.
    fn declare(&mut self, name: &str) -> Result<SignalId, CircuitError> {
        if self.signal_ids.contains_key(name) {
            return Err(CircuitError::DuplicateSignal(name.to_string()));
        }
        let id = self.signals.len();
        self.signals.push(Some(name.to_string()));
        self.signal_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolves a signal reference, creating the signal on first use.
    /// Names that are never declared as targets end up as circuit inputs.
    pub(crate) fn named(&mut self, name: &str) -> SignalId {
        if let Some(id) = self.signal_ids.get(name) {
            *id
        } else {
            let id = self.signals.len();
            self.signals.push(Some(name.to_string()));
            self.signal_ids.insert(name.to_string(), id);
            id
        }
    }

    pub(crate) fn emit(&mut self, kind: GateKind, inputs: Vec<SignalId>, output: SignalId) {
        self.gates.push(Gate { kind, inputs, output });
    }
}

/// Builds a [`Circuit`] from a parsed [`Program`]: checks the macro table,
/// registers every assignment target, expands each assignment to primitive
/// gates, and classifies the remaining referenced names as inputs.
pub fn build(program: &Program) -> Result<Circuit, CircuitError> {
    let macros = MacroTable::from_program(program)?;
    macros.check_cycles()?;

    let mut netlist = NetBuilder::new();

    // Targets are registered up front so that assignments may reference
    // signals defined later in the file. Loops this permits are either
    // broken by a D element or rejected by the scheduler.
    let mut targets: Vec<(Name, SignalId)> = vec![];
    for assign in program.assigns() {
        let id = netlist.declare(&assign.target.name)?;
        targets.push((assign.target.name.clone(), id));
    }

    let mut expander = Expander::new(&macros, &mut netlist);
    for (assign, (_name, target_id)) in program.assigns().zip(&targets) {
        expander.expand_assign(assign, *target_id)?;
    }

    let mut produced = vec![false; netlist.signals.len()];
    for gate in &netlist.gates {
        produced[gate.output] = true;
    }

    let mut inputs = vec![];
    for (id, name) in netlist.signals.iter().enumerate() {
        if let Some(name) = name {
            if !produced[id] {
                inputs.push(name.clone());
            }
        }
    }

    info!(
        "Built circuit: {} gates, {} signals, {} inputs, {} outputs",
        netlist.gates.len(),
        netlist.signals.len(),
        inputs.len(),
        targets.len(),
    );

    Ok(Circuit {
        signals: netlist.signals,
        gates: netlist.gates,
        inputs,
        outputs: targets,
        signal_ids: netlist.signal_ids,
    })
}
