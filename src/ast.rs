use crate::loc::LineCol;

pub type Name = String;

/// An identifier in the grammar.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: Name,
    pub linecol: LineCol,
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal bit: `0` or `1`.
    Lit(LineCol, bool),
    /// A reference to a signal or a macro parameter.
    Var(Ident),
    /// A gate or macro application. Eg, `NAND(a, b)`.
    Call(Ident, Vec<Expr>),
}

impl Expr {
    pub fn linecol(&self) -> LineCol {
        match self {
            Expr::Lit(linecol, _bit) => *linecol,
            Expr::Var(ident) => ident.linecol,
            Expr::Call(ident, _args) => ident.linecol,
        }
    }
}

/// A macro definition. Eg, `And(a, b) := NAND(NAND(a, b), NAND(a, b))`.
#[derive(Debug, Clone)]
pub struct MacroDef {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Expr,
}

/// A signal assignment. Eg, `O = NAND(I, I)`.
#[derive(Debug, Clone)]
pub struct Assign {
    pub target: Ident,
    pub expr: Expr,
}

/// A top-level statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    MacroDef(MacroDef),
    Assign(Assign),
}

/// A parsed source file: the statements in declaration order.
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn assigns(&self) -> impl Iterator<Item = &Assign> {
        self.stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Assign(assign) => Some(assign),
            Stmt::MacroDef(_) => None,
        })
    }

    pub fn macro_defs(&self) -> impl Iterator<Item = &MacroDef> {
        self.stmts.iter().filter_map(|stmt| match stmt {
            Stmt::MacroDef(macro_def) => Some(macro_def),
            Stmt::Assign(_) => None,
        })
    }
}
