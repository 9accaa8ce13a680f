//! Codegen-target option schemas and binding.
//!
//! A target declares its schema statically: the options its `target X { }`
//! block accepts and the options each `extern Y { }` block under it accepts,
//! with expected literal kinds, defaults, and required flags. Binding checks
//! a parsed [`TargetDef`] against the schema and materializes defaults, so
//! emitters downstream read options without further validation.

use indexmap::IndexMap;
use rowan::TextRange;

use crate::diagnostics::Diagnostics;
use crate::spec::{ExternBlock, LitKind, LitValue, Literal, OptionDef, Spec};

/// Schema entry for one option.
#[derive(Debug, Clone, Copy)]
pub struct OptionInfo {
    pub kind: LitKind,
    pub default: OptDefault,
    pub required: bool,
}

impl OptionInfo {
    pub const fn str(default: &'static str) -> Self {
        Self {
            kind: LitKind::Str,
            default: OptDefault::Str(default),
            required: false,
        }
    }

    pub const fn required_str() -> Self {
        Self {
            kind: LitKind::Str,
            default: OptDefault::Str(""),
            required: true,
        }
    }

    pub const fn bool(default: bool) -> Self {
        Self {
            kind: LitKind::Bool,
            default: OptDefault::Bool(default),
            required: false,
        }
    }

    pub const fn empty_list() -> Self {
        Self {
            kind: LitKind::List,
            default: OptDefault::EmptyList,
            required: false,
        }
    }
}

/// Default value carried by the schema. Materialized fresh per binding so
/// list defaults are never shared.
#[derive(Debug, Clone, Copy)]
pub enum OptDefault {
    Bool(bool),
    Str(&'static str),
    EmptyList,
}

impl OptDefault {
    fn materialize(self) -> Literal {
        let value = match self {
            OptDefault::Bool(b) => LitValue::Bool(b),
            OptDefault::Str(s) => LitValue::Str(s.to_string()),
            OptDefault::EmptyList => LitValue::List(Vec::new()),
        };
        Literal { value, span: None }
    }
}

/// A codegen target's static schema.
#[derive(Debug)]
pub struct TargetSchema {
    pub name: &'static str,
    pub options: &'static [(&'static str, OptionInfo)],
    pub extern_options: &'static [(&'static str, OptionInfo)],
}

impl TargetSchema {
    fn option(&self, name: &str) -> Option<&OptionInfo> {
        self.options.iter().find(|(n, _)| *n == name).map(|(_, i)| i)
    }

    fn extern_option(&self, name: &str) -> Option<&OptionInfo> {
        self.extern_options
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, i)| i)
    }
}

/// A target schema bound to one spec: validated option values with defaults
/// filled in, per target and per extern type.
#[derive(Debug)]
pub struct TargetBinding {
    pub name: &'static str,
    pub span: Option<TextRange>,
    opts: IndexMap<String, Literal>,
    externs: IndexMap<String, IndexMap<String, Literal>>,
}

impl TargetBinding {
    /// Bind `schema` against the spec's matching target block, reporting
    /// every schema violation. The returned binding is total (defaults are
    /// always materialized); the caller decides whether recorded errors
    /// abort the run.
    pub fn bind(schema: &'static TargetSchema, spec: &Spec, diag: &mut Diagnostics) -> Self {
        let mut blocks = spec.targets.iter().filter(|t| t.name == schema.name);
        let block = blocks.next();

        for extra in blocks {
            let mut builder = diag.error(
                format!(
                    "spec file `{}` contains multiple `{}` targets, only one is allowed",
                    spec.filename, schema.name
                ),
                extra.span,
            );
            if let Some(first) = block {
                builder = builder.related_to("first target was here", first.span);
            }
            builder.emit();
        }

        if block.is_none() {
            diag.warning(
                format!(
                    "spec file `{}` contains no `{}` target, attempting to use \
                     default options (some options may be required)",
                    spec.filename, schema.name
                ),
                None,
            )
            .emit();
        }

        let mut binding = Self {
            name: schema.name,
            span: block.map(|b| b.span),
            opts: IndexMap::new(),
            externs: IndexMap::new(),
        };

        if let Some(block) = block {
            binding.bind_options(schema, &block.options, diag);
            for ext in &block.externs {
                binding.bind_extern(schema, ext, diag);
            }
        }

        // Fill in the default values for those not specified.
        for (name, info) in schema.options {
            if !binding.opts.contains_key(*name) {
                if info.required {
                    diag.error(
                        format!(
                            "required option `{name}` was missing for codegen target `{}`",
                            schema.name
                        ),
                        binding.span,
                    )
                    .emit();
                }
                binding.opts.insert(name.to_string(), info.default.materialize());
            }
        }

        binding
    }

    fn bind_options(
        &mut self,
        schema: &TargetSchema,
        options: &[OptionDef],
        diag: &mut Diagnostics,
    ) {
        let mut seen: IndexMap<&str, TextRange> = IndexMap::new();
        for opt in options {
            if let Some(first) = seen.get(opt.name.as_str()) {
                diag.error(
                    format!(
                        "duplicate option `{}` in codegen target `{}`",
                        opt.name, schema.name
                    ),
                    opt.span,
                )
                .related_to("previous value was here", *first)
                .emit();
                continue;
            }
            seen.insert(&opt.name, opt.span);

            let Some(info) = schema.option(&opt.name) else {
                diag.error(
                    format!("unexpected option `{}` in target `{}`", opt.name, schema.name),
                    opt.span,
                )
                .emit();
                continue;
            };

            if opt.value.kind() != info.kind {
                diag.error(
                    format!(
                        "wrong literal kind for option `{}` of codegen target `{}`: \
                         expected a {} but a {} was used",
                        opt.name,
                        schema.name,
                        info.kind.name(),
                        opt.value.kind().name()
                    ),
                    opt.value.span.unwrap_or(opt.span),
                )
                .emit();
                continue;
            }

            self.opts.insert(opt.name.clone(), opt.value.clone());
        }
    }

    fn bind_extern(
        &mut self,
        schema: &TargetSchema,
        block: &ExternBlock,
        diag: &mut Diagnostics,
    ) {
        let mut bound: IndexMap<String, Literal> = IndexMap::new();
        let mut seen: IndexMap<&str, TextRange> = IndexMap::new();

        for opt in &block.options {
            if let Some(first) = seen.get(opt.name.as_str()) {
                diag.error(
                    format!(
                        "duplicate option `{}` in codegen target `{}` extern type `{}`",
                        opt.name, schema.name, block.name
                    ),
                    opt.span,
                )
                .related_to("previous value was here", *first)
                .emit();
                continue;
            }
            seen.insert(&opt.name, opt.span);

            let Some(info) = schema.extern_option(&opt.name) else {
                diag.error(
                    format!(
                        "unexpected option `{}` in codegen target `{}` extern type `{}`",
                        opt.name, schema.name, block.name
                    ),
                    opt.span,
                )
                .emit();
                continue;
            };

            if opt.value.kind() != info.kind {
                diag.error(
                    format!(
                        "wrong literal kind for option `{}` of codegen target `{}` \
                         extern type `{}`: expected a {} but a {} was used",
                        opt.name,
                        schema.name,
                        block.name,
                        info.kind.name(),
                        opt.value.kind().name()
                    ),
                    opt.value.span.unwrap_or(opt.span),
                )
                .emit();
                continue;
            }

            bound.insert(opt.name.clone(), opt.value.clone());
        }

        for (name, info) in schema.extern_options {
            if !bound.contains_key(*name) {
                if info.required {
                    diag.error(
                        format!(
                            "required option `{name}` was missing for codegen target `{}` \
                             extern type `{}`",
                            schema.name, block.name
                        ),
                        block.span,
                    )
                    .emit();
                }
                bound.insert(name.to_string(), info.default.materialize());
            }
        }

        // A repeated extern block within one target rebinds the name.
        self.externs.insert(block.name.clone(), bound);
    }

    pub fn get_opt(&self, name: &str) -> Option<&Literal> {
        self.opts.get(name)
    }

    /// A string option declared in the schema. The binding is total, so a
    /// schema-declared option is always present with the right kind.
    pub fn get_str(&self, name: &str) -> &str {
        self.opts
            .get(name)
            .and_then(|l| l.as_str())
            .expect("schema-declared string option")
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.opts
            .get(name)
            .and_then(|l| l.as_bool())
            .expect("schema-declared bool option")
    }

    pub fn get_list(&self, name: &str) -> &[Literal] {
        self.opts
            .get(name)
            .and_then(|l| l.as_list())
            .expect("schema-declared list option")
    }

    /// The raw list literal for a list option, for span access.
    pub fn get_list_literal(&self, name: &str) -> &Literal {
        self.opts.get(name).expect("schema-declared list option")
    }

    pub fn get_ext_opt(&self, ty: &str, name: &str) -> Option<&Literal> {
        self.externs.get(ty)?.get(name)
    }

    pub fn ext_str(&self, ty: &str, name: &str) -> Option<&str> {
        self.get_ext_opt(ty, name)?.as_str()
    }
}
