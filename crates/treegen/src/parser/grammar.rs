//! Grammar productions for the spec language.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//!
//! ```text
//! spec_file  = { target | visitor | root | node } ;
//! target     = "target" IDENT "{" { option | extern } "}" ;
//! extern     = "extern" IDENT "{" { option } "}" ;
//! visitor    = "visitor" IDENT "{" { option } "}" ;
//! option     = IDENT ":" expr ";" ;
//! root       = "root" IDENT ";" ;
//! expr       = literal | IDENT "(" ")" | "[" [ expr { "," expr } ] "]" ;
//! node       = [ "abstract" ] "node" IDENT [ ":" IDENT ] "{" { fields | ctor } "}" ;
//! fields     = { "weak" | "list" } data_type field_decl { "," field_decl } ";" ;
//! field_decl = IDENT [ "=" expr ] ;
//! ctor       = IDENT "(" [ IDENT { "," IDENT } ] ")" ";" ;
//! data_type  = "bool" | "int" | "float" | "string" | IDENT ;
//! ```

use super::core::Parser;
use super::cst::SyntaxKind;
use super::cst::token_sets::{FIELD_FIRST, LITERAL, TYPE_NAME};

impl Parser<'_> {
    pub(super) fn parse_spec_file(&mut self) {
        self.start_node(SyntaxKind::Root);

        while !self.failed {
            match self.peek() {
                SyntaxKind::KwTarget => self.parse_target(),
                SyntaxKind::KwVisitor => self.parse_visitor(),
                SyntaxKind::KwRoot => self.parse_root_spec(),
                SyntaxKind::KwNode | SyntaxKind::KwAbstract => self.parse_node(),
                SyntaxKind::Error => break, // EOF sentinel
                _ => self.syntax_error(),
            }
        }

        self.consume_rest();
        self.eat_trivia();
        self.finish_node();
    }

    fn parse_target(&mut self) {
        self.start_node(SyntaxKind::Target);
        self.bump(); // `target`
        self.expect(SyntaxKind::Ident);
        self.expect(SyntaxKind::BraceOpen);

        while !self.failed {
            match self.peek() {
                SyntaxKind::Ident => self.parse_option(),
                SyntaxKind::KwExtern => self.parse_extern(),
                SyntaxKind::BraceClose => {
                    self.bump();
                    break;
                }
                _ => self.syntax_error(),
            }
        }

        self.finish_node();
    }

    fn parse_extern(&mut self) {
        self.start_node(SyntaxKind::Extern);
        self.bump(); // `extern`
        self.expect(SyntaxKind::Ident);
        self.expect(SyntaxKind::BraceOpen);

        while !self.failed {
            match self.peek() {
                SyntaxKind::Ident => self.parse_option(),
                SyntaxKind::BraceClose => {
                    self.bump();
                    break;
                }
                _ => self.syntax_error(),
            }
        }

        self.finish_node();
    }

    fn parse_visitor(&mut self) {
        self.start_node(SyntaxKind::Visitor);
        self.bump(); // `visitor`
        self.expect(SyntaxKind::Ident);
        self.expect(SyntaxKind::BraceOpen);

        while !self.failed {
            match self.peek() {
                SyntaxKind::Ident => self.parse_option(),
                SyntaxKind::BraceClose => {
                    self.bump();
                    break;
                }
                _ => self.syntax_error(),
            }
        }

        self.finish_node();
    }

    fn parse_root_spec(&mut self) {
        self.start_node(SyntaxKind::RootSpec);
        self.bump(); // `root`
        self.expect(SyntaxKind::Ident);
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn parse_option(&mut self) {
        self.start_node(SyntaxKind::OptionDecl);
        self.bump(); // option name
        self.expect(SyntaxKind::Colon);
        self.parse_expr();
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn parse_expr(&mut self) {
        let kind = self.peek();
        if LITERAL.contains(kind) {
            self.start_node(SyntaxKind::LitExpr);
            self.bump();
            self.finish_node();
        } else if kind == SyntaxKind::BracketOpen {
            self.parse_list_expr();
        } else if kind == SyntaxKind::Ident {
            self.start_node(SyntaxKind::CallExpr);
            self.bump();
            self.expect(SyntaxKind::ParenOpen);
            self.expect(SyntaxKind::ParenClose);
            self.finish_node();
        } else {
            self.syntax_error();
        }
    }

    fn parse_list_expr(&mut self) {
        self.start_node(SyntaxKind::ListExpr);
        self.bump(); // `[`

        if !self.at(SyntaxKind::BracketClose) {
            loop {
                self.parse_expr();
                if self.failed || !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
        }

        self.expect(SyntaxKind::BracketClose);
        self.finish_node();
    }

    fn parse_node(&mut self) {
        self.start_node(SyntaxKind::NodeDef);
        self.eat(SyntaxKind::KwAbstract);
        self.expect(SyntaxKind::KwNode);
        self.expect(SyntaxKind::Ident);

        if self.at(SyntaxKind::Colon) {
            self.start_node(SyntaxKind::BaseClause);
            self.bump();
            self.expect(SyntaxKind::Ident);
            self.finish_node();
        }

        self.expect(SyntaxKind::BraceOpen);

        while !self.failed {
            match self.peek() {
                SyntaxKind::BraceClose => {
                    self.bump();
                    break;
                }
                // `Name(` is a constructor, anything else that can start a
                // data type begins a field group.
                SyntaxKind::Ident => {
                    if self.peek_nth(1) == SyntaxKind::ParenOpen {
                        self.parse_ctor();
                    } else {
                        self.parse_field_group();
                    }
                }
                kind if FIELD_FIRST.contains(kind) => self.parse_field_group(),
                _ => self.syntax_error(),
            }
        }

        self.finish_node();
    }

    fn parse_field_group(&mut self) {
        self.start_node(SyntaxKind::FieldGroup);

        while matches!(self.peek(), SyntaxKind::KwWeak | SyntaxKind::KwList) {
            self.bump();
        }

        if TYPE_NAME.contains(self.peek()) {
            self.start_node(SyntaxKind::TypeName);
            self.bump();
            self.finish_node();
        } else {
            self.syntax_error();
        }

        while !self.failed {
            self.parse_field_decl();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }

        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn parse_field_decl(&mut self) {
        self.start_node(SyntaxKind::FieldDecl);
        self.expect(SyntaxKind::Ident);
        if self.eat(SyntaxKind::Equals) {
            self.parse_expr();
        }
        self.finish_node();
    }

    fn parse_ctor(&mut self) {
        self.start_node(SyntaxKind::Ctor);
        self.bump(); // constructor name
        self.expect(SyntaxKind::ParenOpen);

        if self.at(SyntaxKind::Ident) {
            loop {
                self.start_node(SyntaxKind::CtorArg);
                self.bump();
                self.finish_node();
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
                if !self.at(SyntaxKind::Ident) {
                    self.syntax_error();
                    break;
                }
            }
        }

        self.expect(SyntaxKind::ParenClose);
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }
}
