//! Parser state machine and low-level operations.

use rowan::{GreenNodeBuilder, TextRange, TextSize};

use super::ast::SpecFile;
use super::cst::{SyntaxKind, SyntaxNode};
use super::lexer::{Token, token_text};
use crate::diagnostics::Diagnostics;

/// Result of a parse: the typed root plus everything reported on the way.
#[derive(Debug)]
pub struct Parse {
    pub root: SpecFile,
    pub diagnostics: Diagnostics,
}

/// Trivia tokens (whitespace, comments) are buffered and flushed as leading
/// trivia when starting a new node. This gives predictable trivia attachment
/// without backtracking.
///
/// The grammar is abort-on-error: the first syntax error is reported as
/// `invalid syntax` at the faulting token and the remaining input is wrapped
/// in an `Error` node.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    pub(super) failed: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            failed: false,
        }
    }

    pub fn parse(mut self) -> Parse {
        self.report_garbage();
        self.parse_spec_file();
        let green = self.builder.finish();
        let root = SpecFile::cast(SyntaxNode::new_root(green))
            .expect("parser always produces a spec file root");
        Parse {
            root,
            diagnostics: self.diagnostics,
        }
    }

    /// Report every coalesced garbage run up front, so all illegal characters
    /// surface in one pass before the grammar gives up.
    fn report_garbage(&mut self) {
        let mut runs: Vec<(char, TextRange)> = Vec::new();
        for token in &self.tokens {
            if token.kind == SyntaxKind::Garbage {
                let text = token_text(self.source, token);
                if let Some(c) = text.chars().next() {
                    runs.push((c, token.span));
                }
            }
        }
        for (c, span) in runs {
            self.diagnostics
                .error(format!("illegal character '{c}'"), span)
                .emit();
            self.failed = true;
        }
    }

    /// Returns `Error` at EOF (acts as sentinel).
    pub(super) fn current(&self) -> SyntaxKind {
        self.tokens
            .get(self.pos)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current non-trivia kind; buffers any trivia seen on the way.
    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.current()
    }

    /// LL(k) lookahead past trivia.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if !kind.is_trivia() {
                if count == n {
                    return kind;
                }
                count += 1;
            }
            pos += 1;
        }
        SyntaxKind::Error
    }

    pub(super) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek() == kind
    }

    fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn bump(&mut self) {
        assert!(!self.eof(), "bump called at EOF");

        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: report `invalid syntax` at the faulting token and mark
    /// the parse failed. Only the first syntax error is reported.
    pub(super) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        self.syntax_error();
        false
    }

    pub(super) fn syntax_error(&mut self) {
        if self.failed {
            return;
        }
        self.failed = true;
        let range = self.current_span();
        self.diagnostics.error("invalid syntax", range).emit();
    }

    /// Wrap whatever input is left in an `Error` node so the tree stays
    /// well-formed after an abort.
    pub(super) fn consume_rest(&mut self) {
        self.drain_trivia();
        if self.eof() {
            return;
        }
        self.builder.start_node(SyntaxKind::Error.into());
        while !self.eof() {
            let token = self.tokens[self.pos];
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
            self.pos += 1;
        }
        self.builder.finish_node();
    }
}
