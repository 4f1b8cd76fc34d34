use crate::ast::Name;

/// Everything that can go wrong while parsing, building, scheduling, or
/// simulating a circuit. None of these are recovered internally; each one
/// aborts the call that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// Lexical or grammatical error at a 1-based line and column.
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// A signal name is assigned more than once.
    DuplicateSignal(Name),
    /// A macro name is defined more than once.
    DuplicateMacro(Name),
    /// A macro definition reuses the name of a primitive gate.
    ShadowsPrimitive(Name),
    /// A call to a name that is neither a primitive gate nor a macro.
    UnknownCall(Name),
    /// A gate or macro applied to the wrong number of arguments.
    ArityMismatch {
        name: Name,
        expected: usize,
        actual: usize,
    },
    /// An input bit-string was supplied for a name that is not an input.
    UnknownInput(Name),
    /// A declared input was given no bit-string.
    MissingInput(Name),
    /// An input bit-string contains characters other than '0' and '1'.
    InvalidInput(Name, String),
    /// The bounded expansion-depth guard tripped.
    ExpansionTooDeep(Name, usize),
    /// A macro transitively calls itself. Carries the cycle chain.
    MacroCycle(Vec<Name>),
    /// A combinational loop with no `D` element breaking it. Carries the
    /// signals involved in the loop.
    CombCycle(Vec<Name>),
    /// An internal invariant violation that should be unreachable given
    /// correct upstream validation.
    Runtime(String),
}

/// The coarse taxonomy surfaced to callers (editor diagnostics dispatch on
/// this, so it stays stable across versions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Value,
    MacroCycle,
    CombCycle,
    Runtime,
}

impl CircuitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CircuitError::Syntax { .. } => ErrorKind::Syntax,
            CircuitError::DuplicateSignal(_) => ErrorKind::Value,
            CircuitError::DuplicateMacro(_) => ErrorKind::Value,
            CircuitError::ShadowsPrimitive(_) => ErrorKind::Value,
            CircuitError::UnknownCall(_) => ErrorKind::Value,
            CircuitError::ArityMismatch { .. } => ErrorKind::Value,
            CircuitError::UnknownInput(_) => ErrorKind::Value,
            CircuitError::MissingInput(_) => ErrorKind::Value,
            CircuitError::InvalidInput(_, _) => ErrorKind::Value,
            CircuitError::ExpansionTooDeep(_, _) => ErrorKind::Value,
            CircuitError::MacroCycle(_) => ErrorKind::MacroCycle,
            CircuitError::CombCycle(_) => ErrorKind::CombCycle,
            CircuitError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// The source position for syntax errors.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            CircuitError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

impl std::fmt::Display for CircuitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CircuitError::Syntax { line, column, message } => {
                write!(f, "Syntax error at {line}:{column}: {message}")
            },
            CircuitError::DuplicateSignal(name) => write!(f, "Signal is assigned more than once: {name}"),
            CircuitError::DuplicateMacro(name) => write!(f, "Macro is defined more than once: {name}"),
            CircuitError::ShadowsPrimitive(name) => write!(f, "Macro shadows a primitive gate: {name}"),
            CircuitError::UnknownCall(name) => write!(f, "Unknown gate or macro: {name}"),
            CircuitError::ArityMismatch { name, expected, actual } => {
                write!(f, "{name} called with {actual} arguments, but expected {expected}")
            },
            CircuitError::UnknownInput(name) => write!(f, "Not an input of this circuit: {name}"),
            CircuitError::MissingInput(name) => write!(f, "No bit-string supplied for input: {name}"),
            CircuitError::InvalidInput(name, message) => write!(f, "Bad bit-string for input {name}: {message}"),
            CircuitError::ExpansionTooDeep(name, depth) => {
                write!(f, "Macro expansion exceeded depth {depth} while expanding {name}")
            },
            CircuitError::MacroCycle(chain) => {
                write!(f, "Cyclic macro definition: {}", chain.join(" -> "))
            },
            CircuitError::CombCycle(signals) => {
                write!(f, "Combinational loop with no D element through: {}", signals.join(", "))
            },
            CircuitError::Runtime(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for CircuitError {}
