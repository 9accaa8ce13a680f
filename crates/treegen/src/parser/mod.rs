//! Spec-file parsing: lexer, CST, grammar, and typed AST accessors.

pub mod ast;
mod core;
pub mod cst;
mod grammar;
pub mod lexer;


pub use self::core::{Parse, Parser};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use lexer::{Token, lex, token_text};

/// Lex and parse a spec source into a typed CST root plus diagnostics.
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);
    Parser::new(source, tokens).parse()
}
