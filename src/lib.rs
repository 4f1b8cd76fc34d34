//! Ripple is a small digital logic language and simulator.
//!
//! Circuits are written as newline-separated statements over two primitive
//! gates: the two-input `NAND` and the unit-delay register `D`. Userland
//! abstraction comes from parameterized macros, expanded at build time:
//!
//! ```text
//! # A falling-edge detector.
//! Not(x)    := NAND(x, x)
//! And(a, b) := NAND(NAND(a, b), NAND(a, b))
//! Fell = And(Not(I), D(I))
//! ```
//!
//! [`parse`] turns source text into a flat gate [`Circuit`];
//! [`Simulator::run`] steps it against named bit-strings, producing one
//! output bit per step plus a per-step history of every named signal.

pub mod ast;
pub mod circuit;
pub mod depends;
pub mod expand;
pub mod lex;
pub mod loc;
pub mod parse;
pub mod sched;
pub mod sim;

mod error;

pub use circuit::{Circuit, Gate, GateId, GateKind, SignalId};
pub use error::{CircuitError, ErrorKind};
pub use sim::{SimResult, Simulator};

#[cfg(test)]
mod tests;

/// Parses source text into a [`Circuit`]: lexing, parsing, macro expansion,
/// and reference resolution. Fails with a structured [`CircuitError`]; there
/// is never a partial circuit.
pub fn parse(source: &str) -> Result<Circuit, CircuitError> {
    let program = parse::parse_program(source)?;
    circuit::build(&program)
}
