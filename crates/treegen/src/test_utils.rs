//! Shared helpers for unit tests.

use crate::diagnostics::Diagnostics;
use crate::parser::ast::SpecFile;
use crate::parser::cst::{SyntaxElement, SyntaxNode};
use crate::spec::{self, Spec};

pub fn parse_valid(source: &str) -> SpecFile {
    let parse = crate::parser::parse(source);
    assert!(
        !parse.diagnostics.has_errors(),
        "unexpected parse diagnostics:\n{}",
        parse.diagnostics.printer().source(source).render()
    );
    parse.root
}

/// Parse and render the CST for snapshot tests, trivia filtered out.
pub fn expect_valid_cst(source: &str) -> String {
    let root = parse_valid(source);
    format_cst(root.as_cst())
}

pub fn format_cst(node: &SyntaxNode) -> String {
    let mut out = String::new();
    fmt_node(node, 0, &mut out);
    out
}

fn fmt_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{:?}\n", node.kind()));
    for child in node.children_with_tokens() {
        match child {
            SyntaxElement::Node(n) => fmt_node(&n, depth + 1, out),
            SyntaxElement::Token(t) => {
                if !t.kind().is_trivia() {
                    out.push_str(&"  ".repeat(depth + 1));
                    out.push_str(&format!("{:?} {:?}\n", t.kind(), t.text()));
                }
            }
        }
    }
}

pub fn resolve_valid(source: &str) -> Spec {
    let root = parse_valid(source);
    let mut diag = Diagnostics::new();
    match spec::resolve(&root, "test.tree", &mut diag) {
        Some(model) => model,
        None => panic!(
            "resolution failed:\n{}",
            diag.printer().source(source).render()
        ),
    }
}

/// Resolve a spec that is expected to fail; returns the diagnostics.
pub fn resolve_errors(source: &str) -> Diagnostics {
    let root = parse_valid(source);
    let mut diag = Diagnostics::new();
    let result = spec::resolve(&root, "test.tree", &mut diag);
    assert!(result.is_none(), "expected resolution to fail");
    assert!(diag.has_errors());
    diag
}

pub fn messages(diag: &Diagnostics) -> Vec<String> {
    diag.iter().map(|d| d.message().to_string()).collect()
}
