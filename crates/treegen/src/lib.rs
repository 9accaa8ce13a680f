//! treegen: a tree-node code generator.
//!
//! Turns a declarative spec describing a family of tree-node types into a
//! single C++ header: forward declarations, visitor classes, the class
//! hierarchy with base chain-up constructors, ownership-aware destructors,
//! optional accessors, and `#line` directives back into the spec source.
//!
//! - `parser` - lexer, CST, and typed AST accessors
//! - `spec` - the resolved model and name resolution
//! - `target` - option schemas and binding
//! - `codegen` - the code-object tree, writer, and C++ emitter
//! - `diagnostics` - error reporting
//!
//! # Example
//!
//! ```
//! use treegen::{EmitConfig, generate};
//!
//! let source = r#"
//!     target CPlusPlus { namespace: "ast"; }
//!     node Expr { int value; Expr(value); }
//! "#;
//!
//! let header = generate(source, "expr.tree", "CPlusPlus", &EmitConfig::default())
//!     .expect("valid spec");
//! assert!(header.contains("struct Expr"));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod codegen;
pub mod diagnostics;
pub mod parser;
pub mod spec;
pub mod target;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use codegen::EmitConfig;
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use spec::Spec;

/// Errors that can occur while generating code from a spec.
///
/// Each stage failure carries the diagnostics it collected; render them with
/// [`Diagnostics::printer`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("spec parsing failed with {} errors", .0.error_count())]
    ParseFailed(Diagnostics),

    #[error("spec resolution failed with {} errors", .0.error_count())]
    ResolveFailed(Diagnostics),

    #[error("code generation failed with {} errors", .0.error_count())]
    CodegenFailed(Diagnostics),
}

impl Error {
    /// The diagnostics collected by the failing stage.
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::ParseFailed(d) | Error::ResolveFailed(d) | Error::CodegenFailed(d) => d,
        }
    }
}

/// Result type for treegen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A successfully parsed spec, ready for resolution.
#[derive(Debug)]
pub struct Parsed<'s> {
    source: &'s str,
    filename: &'s str,
    root: parser::ast::SpecFile,
    diagnostics: Diagnostics,
}

impl<'s> Parsed<'s> {
    pub fn root(&self) -> &parser::ast::SpecFile {
        &self.root
    }

    /// Warnings collected during parsing (errors would have failed the stage).
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Bind names and build the resolved model.
    pub fn resolve(&self) -> Result<Resolved<'s>> {
        let mut diag = Diagnostics::new();
        match spec::resolve(&self.root, self.filename, &mut diag) {
            Some(model) => Ok(Resolved {
                source: self.source,
                spec: model,
                diagnostics: diag,
            }),
            None => Err(Error::ResolveFailed(diag)),
        }
    }
}

/// A resolved spec, ready for code generation.
#[derive(Debug)]
pub struct Resolved<'s> {
    source: &'s str,
    spec: Spec,
    diagnostics: Diagnostics,
}

impl Resolved<'_> {
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Generate output for the named target. Warning-only diagnostics from
    /// this stage are dropped; use [`codegen::generate`] directly to keep
    /// them.
    pub fn generate(&self, target_name: &str, config: &EmitConfig) -> Result<String> {
        let mut diag = Diagnostics::new();
        match codegen::generate(&self.spec, self.source, target_name, config, &mut diag) {
            Some(code) => Ok(code),
            None => Err(Error::CodegenFailed(diag)),
        }
    }
}

/// Lex and parse a spec source.
pub fn parse<'s>(source: &'s str, filename: &'s str) -> Result<Parsed<'s>> {
    let parse = parser::parse(source);
    if parse.diagnostics.has_errors() {
        return Err(Error::ParseFailed(parse.diagnostics));
    }
    Ok(Parsed {
        source,
        filename,
        root: parse.root,
        diagnostics: parse.diagnostics,
    })
}

/// One-shot pipeline: parse, resolve, and generate for the named target.
pub fn generate(
    source: &str,
    filename: &str,
    target_name: &str,
    config: &EmitConfig,
) -> Result<String> {
    parse(source, filename)?.resolve()?.generate(target_name, config)
}
