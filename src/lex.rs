use logos::Logos;

use crate::loc::{LineCol, LineLens};

/// The token kinds of the gate language.
///
/// Statements are newline-separated, so newlines are tokens rather than
/// trivia. Spaces, tabs, and `#` line comments are skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("0")]
    Zero,

    #[token("1")]
    One,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(":=")]
    DefineEq,

    #[token("=")]
    AssignEq,

    #[token("\n")]
    Newline,

    // Produced for input the lexer does not recognize.
    Error,

    // Appended at the end of the token stream.
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Zero => write!(f, "`0`"),
            TokenKind::One => write!(f, "`1`"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::DefineEq => write!(f, "`:=`"),
            TokenKind::AssignEq => write!(f, "`=`"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Error => write!(f, "unrecognized character"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with its lexeme and source position.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub linecol: LineCol,
}

impl Token {
    pub fn line(&self) -> usize {
        self.linecol.line()
    }

    pub fn col(&self) -> usize {
        self.linecol.col()
    }
}

/// Tokenizes the whole source, attaching a [`LineCol`] to every token.
///
/// Lexically invalid input becomes a [`TokenKind::Error`] token rather than
/// failing here, so the parser reports it at the offending position like any
/// other unexpected token. The stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Vec<Token> {
    let linelens = LineLens::from(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = vec![];

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Error);
        tokens.push(Token {
            kind,
            lexeme: lexer.slice().to_string(),
            linecol: linelens.linecol(lexer.span().start),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        linecol: linelens.linecol(source.len()),
    });
    tokens
}
