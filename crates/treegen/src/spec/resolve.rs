//! AST to model lowering and name resolution.
//!
//! Pass order matters: extern types are gathered before node types so that a
//! field typed with an extern is never bound to a node of the same name, and
//! base cycles are rejected before anything walks an ancestor chain.

use crate::diagnostics::Diagnostics;
use crate::parser::SyntaxKind;
use crate::parser::ast;

use super::{
    CtorArg, CtorDef, ExternBlock, ExternDef, ExternId, FieldDef, FieldType, FieldTypeKind,
    ListElem, LitValue, Literal, NodeDef, NodeId, OptionDef, Primitive, RootRef, Spec, TargetDef,
    TypeRef, VisitorDef,
};

/// Resolve a parsed spec file into the typed model.
///
/// Returns `None` when any error was recorded; the caller fails the run with
/// the collected diagnostics.
pub fn resolve(file: &ast::SpecFile, filename: &str, diag: &mut Diagnostics) -> Option<Spec> {
    let mut spec = Spec {
        filename: filename.to_string(),
        targets: lower_targets(file, diag),
        visitors: lower_visitors(file, diag),
        root: None,
        nodes: Vec::new(),
        externs: Vec::new(),
        types: Default::default(),
    };

    gather_externs(&mut spec);
    let accepted = gather_nodes(file, &mut spec, diag);
    resolve_nodes(file, &accepted, &mut spec, diag);

    if detect_base_cycles(&spec, diag) {
        return None;
    }

    check_ctor_args(&spec, diag);
    resolve_root(file, &mut spec, diag);

    if diag.has_errors() { None } else { Some(spec) }
}

fn lower_targets(file: &ast::SpecFile, diag: &mut Diagnostics) -> Vec<TargetDef> {
    let mut targets = Vec::new();
    for target in file.targets() {
        let Some(name) = target.name() else { continue };
        targets.push(TargetDef {
            name: name.text().to_string(),
            span: name.text_range(),
            options: lower_options(target.options(), diag),
            externs: target
                .externs()
                .filter_map(|ext| {
                    let name = ext.name()?;
                    Some(ExternBlock {
                        name: name.text().to_string(),
                        span: name.text_range(),
                        options: lower_options(ext.options(), diag),
                    })
                })
                .collect(),
        });
    }
    targets
}

fn lower_visitors(file: &ast::SpecFile, diag: &mut Diagnostics) -> Vec<VisitorDef> {
    let mut visitors = Vec::new();
    for visitor in file.visitors() {
        let Some(name) = visitor.name() else { continue };
        visitors.push(VisitorDef {
            name: name.text().to_string(),
            span: name.text_range(),
            options: lower_options(visitor.options(), diag),
        });
    }
    visitors
}

fn lower_options(
    options: impl Iterator<Item = ast::OptionDecl>,
    diag: &mut Diagnostics,
) -> Vec<OptionDef> {
    options
        .filter_map(|opt| {
            let name = opt.name()?;
            let value = lower_expr(&opt.value()?, diag)?;
            Some(OptionDef {
                name: name.text().to_string(),
                span: name.text_range(),
                value,
            })
        })
        .collect()
}

fn lower_expr(expr: &ast::Expr, diag: &mut Diagnostics) -> Option<Literal> {
    let span = expr.range();
    let value = match expr {
        ast::Expr::Lit(lit) => {
            let token = lit.token()?;
            let text = token.text();
            match token.kind() {
                SyntaxKind::KwTrue => LitValue::Bool(true),
                SyntaxKind::KwFalse => LitValue::Bool(false),
                SyntaxKind::KwNull => LitValue::Null,
                SyntaxKind::DecInt => LitValue::Int(parse_int(expr, text, 10, diag)?),
                SyntaxKind::HexInt => LitValue::Int(parse_int(expr, &text[2..], 16, diag)?),
                SyntaxKind::BinInt => LitValue::Int(parse_int(expr, &text[2..], 2, diag)?),
                SyntaxKind::OctInt => {
                    let digits = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O"));
                    LitValue::Int(parse_int(expr, digits.unwrap_or(text), 8, diag)?)
                }
                SyntaxKind::FloatLit => LitValue::Float(text.parse().ok()?),
                SyntaxKind::CharLit => LitValue::Char(unquote(text, '\'')),
                SyntaxKind::StrLit => LitValue::Str(unquote(text, '"')),
                _ => return None,
            }
        }
        ast::Expr::Call(call) => LitValue::Call(call.name()?.text().to_string()),
        ast::Expr::List(list) => LitValue::List(
            list.items()
                .filter_map(|item| lower_expr(&item, diag))
                .collect(),
        ),
    };
    Some(Literal {
        value,
        span: Some(span),
    })
}

fn parse_int(expr: &ast::Expr, digits: &str, radix: u32, diag: &mut Diagnostics) -> Option<i64> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    match i64::from_str_radix(&cleaned, radix) {
        Ok(value) => Some(value),
        Err(_) => {
            diag.error("integer literal out of range", expr.range()).emit();
            None
        }
    }
}

/// Strip the enclosing quotes and decode the doubled-quote escape.
fn unquote(text: &str, quote: char) -> String {
    let inner = &text[1..text.len() - 1];
    if quote == '\'' {
        inner.replace("''", "'")
    } else {
        inner.replace("\"\"", "\"")
    }
}

/// An extern appearing in multiple targets is one logical type; the first
/// block claims the table entry.
fn gather_externs(spec: &mut Spec) {
    let Spec {
        targets,
        externs,
        types,
        ..
    } = spec;
    for target in targets.iter() {
        for block in &target.externs {
            if !types.contains_key(&block.name) {
                let id = ExternId(externs.len() as u32);
                externs.push(ExternDef {
                    name: block.name.clone(),
                    span: block.span,
                });
                types.insert(block.name.clone(), TypeRef::Extern(id));
            }
        }
    }
}

/// Register node names in declaration order. Returns one slot per AST node;
/// duplicates get `None` and an error pointing back at the first definition.
fn gather_nodes(
    file: &ast::SpecFile,
    spec: &mut Spec,
    diag: &mut Diagnostics,
) -> Vec<Option<NodeId>> {
    let mut accepted = Vec::new();
    for node in file.nodes() {
        let Some(name_tok) = node.name() else {
            accepted.push(None);
            continue;
        };
        let name = name_tok.text().to_string();
        let span = name_tok.text_range();

        if let Some(existing) = spec.types.get(&name) {
            let prior_span = match *existing {
                TypeRef::Node(id) => spec.node(id).span,
                TypeRef::Extern(id) => spec.extern_def(id).span,
                TypeRef::Primitive(_) => span,
            };
            diag.error(format!("duplicate node type `{name}`"), span)
                .related_to("previous definition was here", prior_span)
                .emit();
            accepted.push(None);
        } else {
            let id = NodeId(spec.nodes.len() as u32);
            spec.nodes.push(NodeDef {
                name: name.clone(),
                span,
                is_abstract: node.is_abstract(),
                base: None,
                fields: Vec::new(),
                ctors: Vec::new(),
            });
            spec.types.insert(name, TypeRef::Node(id));
            accepted.push(Some(id));
        }
    }
    accepted
}

/// Fill in bases, fields, and constructors now that the full name table is
/// known.
fn resolve_nodes(
    file: &ast::SpecFile,
    accepted: &[Option<NodeId>],
    spec: &mut Spec,
    diag: &mut Diagnostics,
) {
    for (ast_node, slot) in file.nodes().zip(accepted) {
        let Some(id) = *slot else { continue };

        let base = ast_node
            .base()
            .and_then(|clause| clause.name())
            .and_then(|tok| {
                let name = tok.text();
                match spec.types.get(name) {
                    Some(TypeRef::Node(base_id)) => Some(*base_id),
                    Some(_) => {
                        diag.error(format!("base type `{name}` is not a node"), tok.text_range())
                            .emit();
                        None
                    }
                    None => {
                        diag.error(
                            format!("unresolved base node type `{name}`"),
                            tok.text_range(),
                        )
                        .emit();
                        None
                    }
                }
            });

        let fields = lower_fields(&ast_node, spec, diag);
        let ctors = lower_ctors(&ast_node);

        let node = &mut spec.nodes[id.0 as usize];
        node.base = base;
        node.fields = fields;
        node.ctors = ctors;
    }
}

fn lower_fields(node: &ast::NodeDef, spec: &Spec, diag: &mut Diagnostics) -> Vec<FieldDef> {
    let mut fields = Vec::new();
    for group in node.field_groups() {
        let weak = group.is_weak();
        let is_list = group.is_list();
        let Some(tok) = group.type_name().and_then(|t| t.token()) else {
            continue;
        };

        let ty = match tok.kind() {
            SyntaxKind::KwBool => Some(TypeRef::Primitive(Primitive::Bool)),
            SyntaxKind::KwInt => Some(TypeRef::Primitive(Primitive::Int)),
            SyntaxKind::KwFloat => Some(TypeRef::Primitive(Primitive::Float)),
            SyntaxKind::KwString => Some(TypeRef::Primitive(Primitive::Str)),
            SyntaxKind::Ident => {
                let name = tok.text();
                match spec.types.get(name) {
                    Some(ty) => Some(*ty),
                    None => {
                        let what = if is_list { "list element" } else { "field" };
                        diag.error(
                            format!("unresolved {what} type `{name}`"),
                            tok.text_range(),
                        )
                        .emit();
                        None
                    }
                }
            }
            _ => None,
        };
        let Some(ty) = ty else { continue };

        let kind = if is_list {
            FieldTypeKind::List(ListElem { weak, ty })
        } else {
            FieldTypeKind::Scalar(ty)
        };

        for decl in group.decls() {
            let Some(name_tok) = decl.name() else { continue };
            fields.push(FieldDef {
                name: name_tok.text().to_string(),
                span: name_tok.text_range(),
                ty: FieldType {
                    weak,
                    kind: kind.clone(),
                },
                default: decl.default().and_then(|expr| lower_expr(&expr, diag)),
            });
        }
    }
    fields
}

fn lower_ctors(node: &ast::NodeDef) -> Vec<CtorDef> {
    node.ctors()
        .filter_map(|ctor| {
            let name = ctor.name()?;
            Some(CtorDef {
                name: name.text().to_string(),
                span: name.text_range(),
                args: ctor
                    .args()
                    .filter_map(|arg| {
                        let name = arg.name()?;
                        Some(CtorArg {
                            name: name.text().to_string(),
                            span: name.text_range(),
                        })
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Single inheritance must form a chain; reject cycles before anything walks
/// an ancestor list. Every node inside a cycle revisits itself, so each cycle
/// produces at least one diagnostic.
fn detect_base_cycles(spec: &Spec, diag: &mut Diagnostics) -> bool {
    let mut found = false;
    for (i, node) in spec.nodes.iter().enumerate() {
        let mut steps = 0;
        let mut current = node.base;
        while let Some(base) = current {
            if base.0 as usize == i {
                diag.error(
                    format!("cyclic base chain involving node `{}`", node.name),
                    node.span,
                )
                .emit();
                found = true;
                break;
            }
            steps += 1;
            if steps > spec.nodes.len() {
                found = true;
                break;
            }
            current = spec.node(base).base;
        }
    }
    found
}

/// Every constructor argument must name a field of the node itself or of an
/// ancestor.
fn check_ctor_args(spec: &Spec, diag: &mut Diagnostics) {
    for (i, node) in spec.nodes.iter().enumerate() {
        let id = NodeId(i as u32);
        for ctor in &node.ctors {
            for arg in &ctor.args {
                let in_self = node.field(&arg.name).is_some();
                let in_ancestor = || {
                    spec.ancestry(id)
                        .iter()
                        .any(|anc| spec.node(*anc).field(&arg.name).is_some())
                };
                if !in_self && !in_ancestor() {
                    diag.error(
                        format!(
                            "constructor argument `{}` does not name a field of `{}` or its base types",
                            arg.name, node.name
                        ),
                        arg.span,
                    )
                    .emit();
                }
            }
        }
    }
}

/// The last `root X;` declaration wins, as in the original grammar.
fn resolve_root(file: &ast::SpecFile, spec: &mut Spec, diag: &mut Diagnostics) {
    let Some(root_spec) = file.roots().last() else {
        return;
    };
    let Some(tok) = root_spec.name() else { return };
    let name = tok.text();
    match spec.types.get(name) {
        Some(TypeRef::Node(id)) => {
            spec.root = Some(RootRef {
                node: *id,
                span: tok.text_range(),
            });
        }
        Some(_) => {
            diag.error(format!("root type `{name}` is not a node"), tok.text_range())
                .emit();
        }
        None => {
            diag.error(
                format!("unresolved root node type `{name}`"),
                tok.text_range(),
            )
            .emit();
        }
    }
}
