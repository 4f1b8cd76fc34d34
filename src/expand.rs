use std::collections::{BTreeMap, BTreeSet};

use log::*;
use once_cell::sync::Lazy;

use crate::ast::{Assign, Expr, Ident, MacroDef, Name, Program};
use crate::circuit::{GateKind, NetBuilder, SignalId};
use crate::error::CircuitError;

/// Bound on the in-progress expansion stack. The macro cycle pre-check
/// makes runaway expansion unreachable; this guard backstops it.
pub const MAX_EXPANSION_DEPTH: usize = 256;

/// Arities of the primitive gates. `Nand` is accepted as an alternate
/// spelling of `NAND`.
static PRIMITIVES: Lazy<BTreeMap<&'static str, usize>> =
    Lazy::new(|| BTreeMap::from([("NAND", 2), ("Nand", 2), ("D", 1)]));

pub fn primitive_arity(name: &str) -> Option<usize> {
    PRIMITIVES.get(name).copied()
}

/// The macro definitions of a program, keyed by name and unique per program.
pub struct MacroTable<'a> {
    defs: BTreeMap<&'a str, &'a MacroDef>,
}

impl<'a> MacroTable<'a> {
    pub fn from_program(program: &'a Program) -> Result<MacroTable<'a>, CircuitError> {
        let mut defs: BTreeMap<&str, &MacroDef> = BTreeMap::new();
        for macro_def in program.macro_defs() {
            let name = macro_def.name.name.as_str();
            if primitive_arity(name).is_some() {
                return Err(CircuitError::ShadowsPrimitive(name.to_string()));
            }
            if defs.insert(name, macro_def).is_some() {
                return Err(CircuitError::DuplicateMacro(name.to_string()));
            }
        }
        debug!("Macro table holds {} definitions", defs.len());
        Ok(MacroTable { defs })
    }

    pub fn get(&self, name: &str) -> Option<&'a MacroDef> {
        self.defs.get(name).copied()
    }

    /// Rejects self-referential macro chains before any gate is realized,
    /// so `BAD(x) := BAD(x)` fails even when `BAD` is never invoked.
    ///
    /// Depth-first search over the macro call graph with an explicit path
    /// stack; the error carries the chain, eg `A -> B -> A`.
    pub fn check_cycles(&self) -> Result<(), CircuitError> {
        let mut done: BTreeSet<&str> = BTreeSet::new();

        for root in self.defs.keys() {
            if done.contains(root) {
                continue;
            }

            // `None` frames mark the end of a macro's callees and pop the path.
            let mut path: Vec<&str> = vec![];
            let mut work: Vec<Option<&str>> = vec![Some(root)];

            while let Some(frame) = work.pop() {
                let name = match frame {
                    Some(name) => name,
                    None => {
                        let finished = path.pop().unwrap_or_default();
                        done.insert(finished);
                        continue;
                    },
                };

                if let Some(i) = path.iter().position(|n| *n == name) {
                    let mut chain: Vec<Name> = path[i..].iter().map(|n| n.to_string()).collect();
                    chain.push(name.to_string());
                    return Err(CircuitError::MacroCycle(chain));
                }
                if done.contains(name) {
                    continue;
                }

                let macro_def = match self.defs.get(name) {
                    Some(macro_def) => macro_def,
                    None => continue,
                };
                path.push(name);
                work.push(None);
                let mut callees = vec![];
                collect_callees(&macro_def.body, &mut callees);
                for callee in callees.into_iter().rev() {
                    if self.defs.contains_key(callee) {
                        work.push(Some(callee));
                    }
                }
            }
        }
        Ok(())
    }
}

fn collect_callees<'e>(expr: &'e Expr, out: &mut Vec<&'e str>) {
    match expr {
        Expr::Lit(_linecol, _bit) => (),
        Expr::Var(_ident) => (),
        Expr::Call(ident, args) => {
            out.push(ident.name.as_str());
            for arg in args {
                collect_callees(arg, out);
            }
        },
    }
}

/// Bindings of macro formals to the signals their arguments expanded to.
type Env = BTreeMap<Name, SignalId>;

/// Rewrites assignment expressions into primitive gates, instantiating
/// macros at every call site. Each instantiation allocates fresh signals for
/// its internal wires, so two call sites of the same macro never alias.
pub struct Expander<'a> {
    macros: &'a MacroTable<'a>,
    netlist: &'a mut NetBuilder,
    stack: Vec<Name>,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(macros: &'a MacroTable<'a>, netlist: &'a mut NetBuilder) -> Expander<'a> {
        Expander {
            macros,
            netlist,
            stack: vec![],
        }
    }

    pub(crate) fn expand_assign(&mut self, assign: &Assign, target: SignalId) -> Result<(), CircuitError> {
        trace!("Expanding assignment of {}", assign.target.name);
        self.expand_to(&assign.expr, &Env::new(), target)
    }

    /// Expands `expr` so that its value drives `target`.
    fn expand_to(&mut self, expr: &Expr, env: &Env, target: SignalId) -> Result<(), CircuitError> {
        match expr {
            Expr::Lit(_linecol, bit) => {
                self.netlist.emit(GateKind::Const(*bit), vec![], target);
                Ok(())
            },
            Expr::Var(ident) => {
                let source = self.resolve(ident, env);
                self.netlist.emit(GateKind::Buf, vec![source], target);
                Ok(())
            },
            Expr::Call(name, args) => {
                self.expand_call(name, args, env, Some(target))?;
                Ok(())
            },
        }
    }

    /// Expands `expr` into a signal carrying its value.
    fn expand(&mut self, expr: &Expr, env: &Env) -> Result<SignalId, CircuitError> {
        match expr {
            Expr::Lit(_linecol, bit) => {
                let id = self.netlist.fresh();
                self.netlist.emit(GateKind::Const(*bit), vec![], id);
                Ok(id)
            },
            Expr::Var(ident) => Ok(self.resolve(ident, env)),
            Expr::Call(name, args) => self.expand_call(name, args, env, None),
        }
    }

    fn expand_call(
        &mut self,
        name: &Ident,
        args: &[Expr],
        env: &Env,
        target: Option<SignalId>,
    ) -> Result<SignalId, CircuitError> {
        if let Some(arity) = primitive_arity(&name.name) {
            if args.len() != arity {
                return Err(CircuitError::ArityMismatch {
                    name: name.name.clone(),
                    expected: arity,
                    actual: args.len(),
                });
            }
            let mut input_ids = vec![];
            for arg in args {
                input_ids.push(self.expand(arg, env)?);
            }
            let kind = match name.name.as_str() {
                "NAND" | "Nand" => GateKind::Nand,
                "D" => GateKind::Delay,
                other => return Err(CircuitError::Runtime(format!("primitive table lists unknown gate {other}"))),
            };
            let output = target.unwrap_or_else(|| self.netlist.fresh());
            self.netlist.emit(kind, input_ids, output);
            return Ok(output);
        }

        let macro_def = match self.macros.get(&name.name) {
            Some(macro_def) => macro_def,
            None => return Err(CircuitError::UnknownCall(name.name.clone())),
        };

        if args.len() != macro_def.params.len() {
            return Err(CircuitError::ArityMismatch {
                name: name.name.clone(),
                expected: macro_def.params.len(),
                actual: args.len(),
            });
        }
        if self.stack.len() >= MAX_EXPANSION_DEPTH {
            return Err(CircuitError::ExpansionTooDeep(name.name.clone(), MAX_EXPANSION_DEPTH));
        }
        if let Some(i) = self.stack.iter().position(|n| n == &name.name) {
            // check_cycles() already rejected cyclic tables; keep the
            // explicit stack check so expansion can never diverge.
            let mut chain = self.stack[i..].to_vec();
            chain.push(name.name.clone());
            return Err(CircuitError::MacroCycle(chain));
        }

        // Arguments expand in the caller's environment, then the body
        // expands with the formals bound to the resulting signals.
        let mut bindings = Env::new();
        for (param, arg) in macro_def.params.iter().zip(args) {
            let arg_id = self.expand(arg, env)?;
            bindings.insert(param.name.clone(), arg_id);
        }

        self.stack.push(name.name.clone());
        let output = match target {
            Some(target) => {
                self.expand_to(&macro_def.body, &bindings, target)?;
                target
            },
            None => self.expand(&macro_def.body, &bindings)?,
        };
        self.stack.pop();
        Ok(output)
    }

    fn resolve(&mut self, ident: &Ident, env: &Env) -> SignalId {
        if let Some(id) = env.get(&ident.name) {
            *id
        } else {
            self.netlist.named(&ident.name)
        }
    }
}
