//! Code generation: the emission driver and its targets.

pub mod cpp;
pub mod writer;


use crate::diagnostics::Diagnostics;
use crate::spec::Spec;

/// Driver-level emission options.
///
/// `indent` and `cpp_indent` override the bound target's `indent` /
/// `cpp_indent` options when set; `out_filename` names the generated file in
/// include guards and `#line` resets. The driver performs no file I/O.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    pub out_filename: String,
    pub indent: Option<String>,
    pub cpp_indent: Option<String>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            out_filename: "tree.h".to_string(),
            indent: None,
            cpp_indent: None,
        }
    }
}

impl EmitConfig {
    pub fn new(out_filename: impl Into<String>) -> Self {
        Self {
            out_filename: out_filename.into(),
            ..Self::default()
        }
    }
}

/// Generate output for `spec` with the named target.
///
/// Returns `None` when any error was recorded; warnings (e.g. a spec without
/// a block for the requested target) accumulate in `diag` without failing.
/// An unknown target name is an error, located at the spec's same-named
/// target block when one exists.
pub fn generate(
    spec: &Spec,
    source: &str,
    target_name: &str,
    config: &EmitConfig,
    diag: &mut Diagnostics,
) -> Option<String> {
    match target_name {
        cpp::TARGET_NAME => cpp::generate(spec, source, config, diag),
        _ => {
            let span = spec
                .targets
                .iter()
                .find(|t| t.name == target_name)
                .map(|t| t.span);
            diag.error(format!("unknown target `{target_name}`"), span).emit();
            None
        }
    }
}
