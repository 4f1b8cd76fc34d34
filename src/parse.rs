use log::*;

use crate::ast::{Assign, Expr, Ident, MacroDef, Program, Stmt};
use crate::error::CircuitError;
use crate::lex::{tokenize, Token, TokenKind};

/// Parses source text into a [`Program`].
///
/// Statements are newline-separated. Any malformed input fails immediately
/// at the offending token with a [`CircuitError::Syntax`]; the parser never
/// recovers or skips.
pub fn parse_program(source: &str) -> Result<Program, CircuitError> {
    let tokens = tokenize(source);
    debug!("Lexed {} tokens", tokens.len());
    Parser { tokens, pos: 0 }.program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize() always ends the stream with an Eof token.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: String) -> CircuitError {
        CircuitError::Syntax {
            line: token.line(),
            column: token.col(),
            message,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CircuitError> {
        let token = self.peek().clone();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_at(&token, format!("Expected {kind} but found {}", describe(&token))))
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn program(&mut self) -> Result<Program, CircuitError> {
        let mut stmts = vec![];
        loop {
            self.skip_newlines();
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            stmts.push(self.stmt()?);

            // Each statement runs to the end of its line.
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Newline => {
                    self.advance();
                },
                TokenKind::Eof => break,
                _ => {
                    return Err(self.error_at(
                        &token,
                        format!("Expected end of statement but found {}", describe(&token)),
                    ));
                },
            }
        }
        Ok(Program { stmts })
    }

    fn stmt(&mut self) -> Result<Stmt, CircuitError> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Ident {
            return Err(self.error_at(
                &token,
                format!("Expected a statement but found {}", describe(&token)),
            ));
        }
        let name = self.ident()?;

        match self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                let params = self.params()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::DefineEq)?;
                let body = self.expr()?;
                Ok(Stmt::MacroDef(MacroDef { name, params, body }))
            },
            TokenKind::AssignEq => {
                self.advance();
                let expr = self.expr()?;
                Ok(Stmt::Assign(Assign { target: name, expr }))
            },
            _ => {
                let token = self.peek().clone();
                Err(self.error_at(
                    &token,
                    format!("Expected `=` or `(` after {} but found {}", name.name, describe(&token)),
                ))
            },
        }
    }

    fn params(&mut self) -> Result<Vec<Ident>, CircuitError> {
        let mut params = vec![];
        if self.peek().kind == TokenKind::RParen {
            return Ok(params);
        }
        params.push(self.ident()?);
        while self.peek().kind == TokenKind::Comma {
            self.advance();
            params.push(self.ident()?);
        }
        Ok(params)
    }

    fn expr(&mut self) -> Result<Expr, CircuitError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Zero => {
                self.advance();
                Ok(Expr::Lit(token.linecol, false))
            },
            TokenKind::One => {
                self.advance();
                Ok(Expr::Lit(token.linecol, true))
            },
            TokenKind::Ident => {
                let name = self.ident()?;
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    let args = self.args()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            },
            _ => Err(self.error_at(
                &token,
                format!("Expected an expression but found {}", describe(&token)),
            )),
        }
    }

    fn args(&mut self) -> Result<Vec<Expr>, CircuitError> {
        let mut args = vec![];
        if self.peek().kind == TokenKind::RParen {
            return Ok(args);
        }
        args.push(self.expr()?);
        while self.peek().kind == TokenKind::Comma {
            self.advance();
            args.push(self.expr()?);
        }
        Ok(args)
    }

    fn ident(&mut self) -> Result<Ident, CircuitError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: token.lexeme,
            linecol: token.linecol,
        })
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident => format!("identifier `{}`", token.lexeme),
        TokenKind::Error => format!("unrecognized character `{}`", token.lexeme),
        kind => kind.to_string(),
    }
}
