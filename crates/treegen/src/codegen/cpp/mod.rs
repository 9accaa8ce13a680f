//! The C++ codegen target.
//!
//! Builds the code-object tree from a resolved [`Spec`] in source order:
//! banner and include guard, includes, optional namespace, forward
//! declarations, visitor classes, node classes, then out-of-line destructor
//! and accessor definitions. Emission points tied to spec declarations are
//! bracketed with `#line` directive pairs when `use_line_directives` is on.

pub mod code;

#[cfg(test)]
mod cpp_tests;

use rowan::TextRange;

use crate::codegen::EmitConfig;
use crate::codegen::writer::CodeWriter;
use crate::diagnostics::Diagnostics;
use crate::spec::{
    CtorDef, ExternId, FieldDef, FieldTypeKind, LitValue, NodeDef, NodeId, Primitive, Spec,
    TypeRef,
};
use crate::target::{OptionInfo, TargetBinding, TargetSchema};
use crate::utils::LineIndex;

use code::{
    Class, Ctor, DtorDecl, DtorDef, Init, InitArg, Item, Member, Method, MethodDecl, Namespace,
    Param, Pp, Stmt, TranslationUnit, TypeName,
};

pub(crate) const TARGET_NAME: &str = "CPlusPlus";

/// Options allowed in `target CPlusPlus { ... }` and its `extern X { ... }`
/// blocks.
pub(crate) static SCHEMA: TargetSchema = TargetSchema {
    name: TARGET_NAME,
    options: &[
        ("allocator", OptionInfo::str("new $@")),
        ("class_extra", OptionInfo::empty_list()),
        ("cpp_indent", OptionInfo::str(" ")),
        ("deleter", OptionInfo::str("delete $$")),
        ("epilog", OptionInfo::str("")),
        ("header_only", OptionInfo::bool(true)),
        ("includes", OptionInfo::empty_list()),
        ("indent", OptionInfo::str("    ")),
        ("list_type", OptionInfo::str("std::vector<$@>")),
        ("namespace", OptionInfo::str("")),
        ("prolog", OptionInfo::str("")),
        ("strong_ptr", OptionInfo::str("$@*")),
        ("use_accessors", OptionInfo::bool(false)),
        ("use_line_directives", OptionInfo::bool(true)),
        ("weak_ptr", OptionInfo::str("$@*")),
    ],
    extern_options: &[
        ("construct", OptionInfo::str("")),
        ("destruct", OptionInfo::str("")),
        ("type", OptionInfo::required_str()),
    ],
};

/// Bind the target and emit the header for `spec`.
pub(crate) fn generate(
    spec: &Spec,
    source: &str,
    config: &EmitConfig,
    diag: &mut Diagnostics,
) -> Option<String> {
    let binding = TargetBinding::bind(&SCHEMA, spec, diag);
    if diag.has_errors() {
        return None;
    }

    let target = CppTarget {
        line_directives: binding.get_bool("use_line_directives"),
        use_accessors: binding.get_bool("use_accessors"),
        lines: LineIndex::new(source),
        spec,
        binding,
    };

    let tu = target.build(&config.out_filename, diag);
    if diag.has_errors() {
        return None;
    }

    let indent = config
        .indent
        .clone()
        .unwrap_or_else(|| target.binding.get_str("indent").to_string());
    let cpp_indent = config
        .cpp_indent
        .clone()
        .unwrap_or_else(|| target.binding.get_str("cpp_indent").to_string());

    let mut out = CodeWriter::new(&config.out_filename, &indent, &cpp_indent);
    tu.codegen(&mut out);
    Some(out.into_string())
}

struct CppTarget<'a> {
    spec: &'a Spec,
    binding: TargetBinding,
    lines: LineIndex,
    line_directives: bool,
    use_accessors: bool,
}

impl CppTarget<'_> {
    fn build(&self, out_filename: &str, diag: &mut Diagnostics) -> TranslationUnit {
        // <string> backs the primitive string type.
        let mut includes = vec![Item::Pp(Pp::Include("<string>".to_string()))];

        let includes_lit = self.binding.get_list_literal("includes");
        let list_span = includes_lit.span;
        for entry in self.binding.get_list("includes") {
            match &entry.value {
                LitValue::Str(name) => {
                    self.push_dir(&mut includes, list_span);
                    includes.push(Item::Pp(Pp::Include(normalize_include(name))));
                    self.push_reset(&mut includes);
                }
                _ => {
                    diag.error(
                        format!(
                            "invalid {} literal in `includes` option for codegen target `{TARGET_NAME}`",
                            entry.kind().name()
                        ),
                        entry.span.or(list_span),
                    )
                    .emit();
                }
            }
        }

        let body = self.build_body(diag);

        let ns_name = self.binding.get_str("namespace").to_string();
        let items = if ns_name.is_empty() {
            body
        } else {
            let mut inner = Vec::new();
            self.push_reset(&mut inner);
            inner.push(Item::Blank);
            inner.extend(body);

            let mut items = Vec::new();
            let ns_span = self.binding.get_opt("namespace").and_then(|l| l.span);
            self.push_dir(&mut items, ns_span);
            items.push(Item::Namespace(Namespace {
                name: ns_name,
                items: inner,
            }));
            items
        };

        TranslationUnit {
            filename: out_filename.to_string(),
            is_header: true,
            includes,
            items,
        }
    }

    fn build_body(&self, diag: &mut Diagnostics) -> Vec<Item> {
        let mut items = Vec::new();

        for node in &self.spec.nodes {
            items.push(Item::ForwardDecl {
                name: node.name.clone(),
                is_struct: true,
            });
        }
        items.push(Item::Blank);

        for visitor in &self.spec.visitors {
            self.push_dir(&mut items, visitor.span);
            let mut members: Vec<Member> = Vec::new();
            self.push_reset(&mut members);
            for node in &self.spec.nodes {
                members.push(Member::InlineMethod(Method {
                    ret: TypeName::plain("void"),
                    class_name: None,
                    name: "visit".to_string(),
                    params: vec![Param::new(
                        TypeName::plain(format!("{}&", node.name)),
                        "node",
                    )],
                    body: Vec::new(),
                    is_const: false,
                }));
            }
            items.push(Item::Class(Class {
                name: visitor.name.clone(),
                bases: Vec::new(),
                members,
                is_struct: true,
            }));
        }
        items.push(Item::Blank);

        for (i, node) in self.spec.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            self.push_dir(&mut items, node.span);
            items.push(Item::Class(self.build_class(id, node, diag)));
            items.push(Item::Blank);
        }

        for node in &self.spec.nodes {
            items.push(Item::DtorDef(self.build_dtor(node)));
            items.push(Item::Blank);
        }

        if self.use_accessors {
            for node in &self.spec.nodes {
                for field in &node.fields {
                    items.push(Item::Method(self.getter_def(node, field, diag)));
                    items.push(Item::Method(self.setter_def(node, field, diag)));
                }
            }
        }

        items
    }

    fn build_class(&self, id: NodeId, node: &NodeDef, diag: &mut Diagnostics) -> Class {
        let mut members: Vec<Member> = Vec::new();
        self.push_reset(&mut members);

        for field in &node.fields {
            self.push_dir(&mut members, field.span);
            members.push(Member::Field {
                ty: self.field_type(field, diag),
                name: field.name.clone(),
            });
            self.push_reset(&mut members);
        }

        for ctor in &node.ctors {
            self.push_dir(&mut members, ctor.span);
            members.push(Member::Ctor(self.build_ctor(id, node, ctor, diag)));
            self.push_reset(&mut members);
        }

        members.push(Member::DtorDecl(DtorDecl {
            name: node.name.clone(),
            is_virtual: true,
        }));

        for visitor in &self.spec.visitors {
            members.push(Member::InlineMethod(Method {
                ret: TypeName::plain("void"),
                class_name: None,
                name: "accept".to_string(),
                params: vec![Param::new(
                    TypeName::plain(format!("{}&", visitor.name)),
                    "visitor",
                )],
                body: vec![Stmt::Raw("visitor.visit(*this);".to_string())],
                is_const: false,
            }));
        }

        if self.use_accessors {
            for field in &node.fields {
                members.push(Member::MethodDecl(MethodDecl {
                    ret: self.field_type(field, diag),
                    name: format!("get_{}", field.name),
                    params: Vec::new(),
                    is_const: true,
                }));
                members.push(Member::MethodDecl(MethodDecl {
                    ret: TypeName::plain("void"),
                    name: format!("set_{}", field.name),
                    params: vec![Param::new(self.field_type(field, diag), "value")],
                    is_const: false,
                }));
            }
        }

        let extra_lit = self.binding.get_list_literal("class_extra");
        let extra = self.binding.get_list("class_extra");
        if !extra.is_empty() {
            self.push_dir(&mut members, extra_lit.span);
            for entry in extra {
                match &entry.value {
                    LitValue::Str(stmt) => members.push(Member::Stmt(Stmt::Raw(stmt.clone()))),
                    _ => {
                        diag.error(
                            format!(
                                "invalid {} literal in `class_extra` option for codegen target `{TARGET_NAME}`",
                                entry.kind().name()
                            ),
                            entry.span.or(extra_lit.span),
                        )
                        .emit();
                    }
                }
            }
            self.push_reset(&mut members);
        }

        Class {
            name: node.name.clone(),
            bases: node
                .base
                .map(|base| self.spec.node(base).name.clone())
                .into_iter()
                .collect(),
            members,
            is_struct: true,
        }
    }

    /// Constructor parameters walk the inheritance chain root-down, taking
    /// each ancestor's first declared constructor's own-field arguments,
    /// then this signature's own arguments. The initializer list chains up
    /// with the ancestor arguments and then initializes each own argument
    /// into its same-named field.
    fn build_ctor(
        &self,
        id: NodeId,
        node: &NodeDef,
        ctor: &CtorDef,
        diag: &mut Diagnostics,
    ) -> Ctor {
        let ancestor_fields = self.ancestor_ctor_fields(id);

        let mut params = Vec::new();
        for field in &ancestor_fields {
            params.push(Param::new(self.field_type(field, diag), field.name.clone()));
        }
        for arg in &ctor.args {
            if let Some(field) = node.field(&arg.name) {
                params.push(Param::new(self.field_type(field, diag), field.name.clone()));
            }
        }

        let mut inits = Vec::new();
        if let Some(base_id) = node.base {
            let base = self.spec.node(base_id);
            let args = if base.ctors.is_empty() {
                Vec::new()
            } else {
                ancestor_fields
                    .iter()
                    .map(|field| InitArg::new(field.name.clone()))
                    .collect()
            };
            inits.push(Init::ChainUp {
                target: base.name.clone(),
                args,
            });
        }
        for arg in &ctor.args {
            if node.field(&arg.name).is_some() {
                inits.push(Init::Field {
                    target: arg.name.clone(),
                    arg: Some(InitArg::new(arg.name.clone())),
                });
            }
        }

        Ctor {
            name: node.name.clone(),
            params,
            inits,
            body: Vec::new(),
        }
    }

    /// Own-field arguments of each ancestor's first constructor, root-most
    /// ancestor first.
    fn ancestor_ctor_fields(&self, id: NodeId) -> Vec<&FieldDef> {
        let mut fields = Vec::new();
        for anc_id in self.spec.ancestry(id) {
            let anc = self.spec.node(anc_id);
            if let Some(first) = anc.ctors.first() {
                for arg in &first.args {
                    if let Some(field) = anc.field(&arg.name) {
                        fields.push(field);
                    }
                }
            }
        }
        fields
    }

    /// Destructor body releases every non-weak owned field: node references
    /// are deleted, externs run their `destruct` template, lists of nodes
    /// delete each element.
    fn build_dtor(&self, node: &NodeDef) -> DtorDef {
        let mut body = Vec::new();
        for field in &node.fields {
            if field.ty.weak {
                continue;
            }
            match &field.ty.kind {
                FieldTypeKind::Scalar(TypeRef::Node(_)) => {
                    body.push(Stmt::Delete {
                        target: field.name.clone(),
                        is_array: false,
                    });
                }
                FieldTypeKind::Scalar(TypeRef::Extern(ext)) => {
                    let name = &self.spec.extern_def(*ext).name;
                    if let Some(destruct) = self.binding.ext_str(name, "destruct")
                        && !destruct.is_empty()
                    {
                        body.push(Stmt::Raw(destruct.replace("$$", &field.name)));
                    }
                }
                FieldTypeKind::Scalar(TypeRef::Primitive(_)) => {}
                FieldTypeKind::List(elem) => {
                    if !elem.weak && matches!(elem.ty, TypeRef::Node(_)) {
                        body.push(Stmt::Raw(format!(
                            "for (auto i : {}) {{ delete i; }}",
                            field.name
                        )));
                    }
                }
            }
        }
        DtorDef {
            name: node.name.clone(),
            body,
            is_virtual: false,
            is_inline: true,
        }
    }

    fn getter_def(&self, node: &NodeDef, field: &FieldDef, diag: &mut Diagnostics) -> Method {
        Method {
            ret: self.field_type(field, diag),
            class_name: Some(node.name.clone()),
            name: format!("get_{}", field.name),
            params: Vec::new(),
            body: vec![Stmt::Raw(format!("return {};", field.name))],
            is_const: true,
        }
    }

    /// The setter releases the previous value of owned node/extern fields,
    /// then assigns. A field itself named `value` collides with the
    /// parameter and is qualified with `this->`.
    fn setter_def(&self, node: &NodeDef, field: &FieldDef, diag: &mut Diagnostics) -> Method {
        let field_name = if field.name == "value" {
            format!("this->{}", field.name)
        } else {
            field.name.clone()
        };

        let mut body = Vec::new();
        let owned_ref = matches!(
            field.ty.kind,
            FieldTypeKind::Scalar(TypeRef::Node(_)) | FieldTypeKind::Scalar(TypeRef::Extern(_))
        );
        if !field.ty.weak && owned_ref {
            body.push(Stmt::Delete {
                target: field_name.clone(),
                is_array: false,
            });
        }
        body.push(Stmt::Raw(format!("{field_name} = value;")));

        Method {
            ret: TypeName::plain("void"),
            class_name: Some(node.name.clone()),
            name: format!("set_{}", field.name),
            params: vec![Param::new(self.field_type(field, diag), "value")],
            body,
            is_const: false,
        }
    }

    /// Translate a resolved field type into its C++ spelling.
    fn field_type(&self, field: &FieldDef, diag: &mut Diagnostics) -> TypeName {
        match &field.ty.kind {
            FieldTypeKind::Scalar(ty) => match ty {
                TypeRef::Primitive(p) => TypeName::plain(primitive_spelling(*p)),
                TypeRef::Node(id) => {
                    let template = if field.ty.weak {
                        self.binding.get_str("weak_ptr")
                    } else {
                        self.binding.get_str("strong_ptr")
                    };
                    TypeName::plain(template.replace("$@", &self.spec.node(*id).name))
                }
                TypeRef::Extern(id) => self.extern_spelling(*id, field.span, diag),
            },
            FieldTypeKind::List(elem) => {
                let spelled = match elem.ty {
                    TypeRef::Primitive(p) => primitive_spelling(p).to_string(),
                    TypeRef::Node(id) => format!("{}*", self.spec.node(id).name),
                    TypeRef::Extern(id) => self.extern_spelling(id, field.span, diag).name,
                };
                TypeName::plain(self.binding.get_str("list_type").replace("$@", &spelled))
            }
        }
    }

    fn extern_spelling(&self, id: ExternId, span: TextRange, diag: &mut Diagnostics) -> TypeName {
        let name = &self.spec.extern_def(id).name;
        match self.binding.ext_str(name, "type") {
            Some(ty) if !ty.is_empty() => TypeName::plain(ty),
            _ => {
                diag.error(
                    format!(
                        "extern type `{name}` does not specify a `type` option for \
                         codegen target `{TARGET_NAME}`"
                    ),
                    span,
                )
                .emit();
                TypeName::plain(name.clone())
            }
        }
    }

    fn push_dir<T: From<Pp>>(&self, items: &mut Vec<T>, span: impl Into<Option<TextRange>>) {
        if !self.line_directives {
            return;
        }
        let Some(span) = span.into() else { return };
        items.push(
            Pp::Line {
                line: self.lines.line(u32::from(span.start()) as usize),
                file: self.spec.filename.clone(),
            }
            .into(),
        );
    }

    fn push_reset<T: From<Pp>>(&self, items: &mut Vec<T>) {
        if self.line_directives {
            items.push(Pp::LineReset.into());
        }
    }
}

fn primitive_spelling(p: Primitive) -> &'static str {
    match p {
        Primitive::Bool => "bool",
        Primitive::Int => "int",
        Primitive::Float => "float",
        Primitive::Str => "std::string",
    }
}

/// Bare include names get double quotes; `<...>` and already-quoted entries
/// pass through.
fn normalize_include(name: &str) -> String {
    let angled = name.starts_with('<') || name.ends_with('>');
    let quoted = name.starts_with('"') || name.ends_with('"');
    if angled || quoted {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}
