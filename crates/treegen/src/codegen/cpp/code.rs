//! The code-object tree: a language-agnostic model of the output constructs.
//!
//! Each shape knows how to render itself through a [`CodeWriter`]; the target
//! emitter decides which shapes to instantiate and in what order. The tree
//! carries no semantics beyond textual form.

use crate::codegen::writer::CodeWriter;
use crate::utils::include_guard;

/// A preprocessor directive. Variants that open a conditional bump the
/// preprocessor indent before subsequent directives; `Endif` unindents.
#[derive(Debug, Clone)]
pub enum Pp {
    Define { name: String, value: Option<String> },
    Include(String),
    Ifdef(String),
    Ifndef(String),
    If(String),
    Elif(String),
    Else,
    Endif,
    /// `#line <line> "<file>"`, pointing the compiler into the spec source.
    Line { line: u32, file: String },
    /// `#line` pointing back at the generated file, anchored one past the
    /// directive's own output line.
    LineReset,
}

impl Pp {
    pub fn codegen(&self, out: &mut CodeWriter) {
        match self {
            Pp::Define { name, value } => emit(out, "define", Some(name), value.as_deref()),
            Pp::Include(path) => emit(out, "include", Some(path), None),
            Pp::Ifdef(name) => {
                emit(out, "ifdef", Some(name), None);
                out.pp_indent();
            }
            Pp::Ifndef(name) => {
                emit(out, "ifndef", Some(name), None);
                out.pp_indent();
            }
            Pp::If(cond) => {
                emit(out, "if", Some(cond), None);
                out.pp_indent();
            }
            Pp::Elif(cond) => {
                emit(out, "elif", Some(cond), None);
                out.pp_indent();
            }
            Pp::Else => {
                emit(out, "else", None, None);
                out.pp_indent();
            }
            Pp::Endif => {
                out.pp_unindent();
                emit(out, "endif", None, None);
            }
            Pp::Line { line, file } => {
                let line = line.to_string();
                let file = format!("\"{file}\"");
                emit(out, "line", Some(&line), Some(&file));
            }
            Pp::LineReset => {
                let reset = out.reset_location();
                let line = (reset.line + 1).to_string();
                let file = format!("\"{}\"", reset.file);
                emit(out, "line", Some(&line), Some(&file));
            }
        }
    }
}

fn emit(out: &mut CodeWriter, name: &str, first: Option<&str>, second: Option<&str>) {
    out.pp_write_indented(name);
    if let Some(first) = first {
        out.write(" ");
        out.write(first);
    }
    if let Some(second) = second {
        out.write(" ");
        out.write(second);
    }
    out.write("\n");
}

/// A type spelling, with optional namespace prefix and template arguments.
#[derive(Debug, Clone)]
pub struct TypeName {
    pub namespace: Option<String>,
    pub name: String,
    pub template_args: Vec<TypeName>,
}

impl TypeName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            template_args: Vec::new(),
        }
    }

    pub fn codegen(&self, out: &mut CodeWriter) {
        if let Some(ns) = &self.namespace {
            if ns == "::" || ns.ends_with("::") {
                out.write(ns);
            } else {
                out.write(ns);
                out.write("::");
            }
        }
        out.write(&self.name);
        if !self.template_args.is_empty() {
            out.write("<");
            for (i, arg) in self.template_args.iter().enumerate() {
                if i > 0 {
                    out.write(", ");
                }
                arg.codegen(out);
            }
            out.write(">");
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
}

impl Param {
    pub fn new(ty: TypeName, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }

    pub fn codegen(&self, out: &mut CodeWriter) {
        self.ty.codegen(out);
        out.write(" ");
        out.write(&self.name);
    }
}

fn codegen_params(params: &[Param], out: &mut CodeWriter) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.write(", ");
        }
        param.codegen(out);
    }
}

/// A constructor-initializer argument, optionally wrapped in `std::move`.
#[derive(Debug, Clone)]
pub struct InitArg {
    pub name: String,
    pub use_move: bool,
}

impl InitArg {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_move: false,
        }
    }

    pub fn codegen(&self, out: &mut CodeWriter) {
        if self.use_move {
            out.write("std::move(");
            out.write(&self.name);
            out.write(")");
        } else {
            out.write(&self.name);
        }
    }
}

/// One entry of a constructor's initializer list.
#[derive(Debug, Clone)]
pub enum Init {
    /// `field(arg)`
    Field { target: String, arg: Option<InitArg> },
    /// `Base(a, b)` chain-up to the base constructor.
    ChainUp { target: String, args: Vec<InitArg> },
}

impl Init {
    pub fn codegen(&self, out: &mut CodeWriter) {
        match self {
            Init::Field { target, arg } => {
                out.write(target);
                out.write("(");
                if let Some(arg) = arg {
                    arg.codegen(out);
                }
                out.write(")");
            }
            Init::ChainUp { target, args } => {
                out.write(target);
                out.write("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.write(", ");
                    }
                    arg.codegen(out);
                }
                out.write(")");
            }
        }
    }
}

/// A body statement: raw text (auto-terminated) or a delete.
#[derive(Debug, Clone)]
pub enum Stmt {
    Raw(String),
    Delete { target: String, is_array: bool },
}

impl Stmt {
    pub fn codegen(&self, out: &mut CodeWriter) {
        match self {
            Stmt::Raw(code) => {
                if code.is_empty() {
                    return;
                }
                out.write_indented(code);
                if !code.ends_with(';') {
                    out.write(";");
                }
                out.write("\n");
            }
            Stmt::Delete { target, is_array } => {
                if *is_array {
                    out.write_line(&format!("delete[] {target};"));
                } else {
                    out.write_line(&format!("delete {target};"));
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ctor {
    pub name: String,
    pub params: Vec<Param>,
    pub inits: Vec<Init>,
    pub body: Vec<Stmt>,
}

impl Ctor {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_indented(&self.name);
        out.write("(");
        codegen_params(&self.params, out);
        out.write(")");
        out.indent();
        out.indent();
        if !self.inits.is_empty() {
            out.write("\n");
            out.write_indented(": ");
            for (i, init) in self.inits.iter().enumerate() {
                if i > 0 {
                    out.write_indented("  ");
                }
                init.codegen(out);
                if i + 1 < self.inits.len() {
                    out.write(", \n");
                }
            }
        }
        out.unindent();
        out.write(" {");
        if self.body.is_empty() {
            out.write("}\n");
        } else {
            out.write("\n");
            for stmt in &self.body {
                stmt.codegen(out);
            }
            out.write_line("}");
        }
        out.unindent();
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub ret: TypeName,
    pub name: String,
    pub params: Vec<Param>,
    pub is_const: bool,
}

impl MethodDecl {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_indented("");
        self.ret.codegen(out);
        out.write(" ");
        out.write(&self.name);
        out.write("(");
        codegen_params(&self.params, out);
        if self.is_const {
            out.write(") const;\n");
        } else {
            out.write(");\n");
        }
    }
}

/// A method with a body: inline when `class_name` is `None`, out-of-line
/// (qualified with the enclosing class) otherwise.
#[derive(Debug, Clone)]
pub struct Method {
    pub ret: TypeName,
    pub class_name: Option<String>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_const: bool,
}

impl Method {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_indented("");
        self.ret.codegen(out);
        out.write(" ");
        if let Some(class_name) = &self.class_name {
            out.write(class_name);
            out.write("::");
        }
        out.write(&self.name);
        out.write("(");
        codegen_params(&self.params, out);
        if self.is_const {
            out.write(") const {");
        } else {
            out.write(") {");
        }
        if self.body.is_empty() {
            out.write("}\n");
        } else {
            out.write("\n");
            out.indent();
            for stmt in &self.body {
                stmt.codegen(out);
            }
            out.unindent();
            out.write_line("}");
        }
    }
}

#[derive(Debug, Clone)]
pub struct DtorDecl {
    pub name: String,
    pub is_virtual: bool,
}

impl DtorDecl {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_indented("");
        if self.is_virtual {
            out.write("virtual ");
        }
        out.write(&format!("~{}();\n", self.name));
    }
}

/// An out-of-line destructor definition: `inline X::~X() { ... }`.
#[derive(Debug, Clone)]
pub struct DtorDef {
    pub name: String,
    pub body: Vec<Stmt>,
    pub is_virtual: bool,
    pub is_inline: bool,
}

impl DtorDef {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_indented("");
        if self.is_virtual {
            out.write("virtual ");
        }
        if self.is_inline {
            out.write("inline ");
        }
        out.write(&format!("{0}::~{0}() {{", self.name));
        if self.body.is_empty() {
            out.write("}\n");
        } else {
            out.write("\n");
            out.indent();
            for stmt in &self.body {
                stmt.codegen(out);
            }
            out.unindent();
            out.write_line("}");
        }
    }
}

/// A class body member, emitted in the order given.
#[derive(Debug, Clone)]
pub enum Member {
    Pp(Pp),
    Field { ty: TypeName, name: String },
    Ctor(Ctor),
    DtorDecl(DtorDecl),
    MethodDecl(MethodDecl),
    InlineMethod(Method),
    Stmt(Stmt),
}

impl Member {
    pub fn codegen(&self, out: &mut CodeWriter) {
        match self {
            Member::Pp(pp) => pp.codegen(out),
            Member::Field { ty, name } => {
                out.write_indented("");
                ty.codegen(out);
                out.write(" ");
                out.write(name);
                out.write(";\n");
            }
            Member::Ctor(ctor) => ctor.codegen(out),
            Member::DtorDecl(dtor) => dtor.codegen(out),
            Member::MethodDecl(decl) => decl.codegen(out),
            Member::InlineMethod(method) => method.codegen(out),
            Member::Stmt(stmt) => stmt.codegen(out),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub bases: Vec<String>,
    pub members: Vec<Member>,
    pub is_struct: bool,
}

impl Class {
    pub fn codegen(&self, out: &mut CodeWriter) {
        let kind = if self.is_struct { "struct" } else { "class" };
        out.write_indented(&format!("{kind} {}", self.name));
        if !self.bases.is_empty() {
            out.write(" : ");
            for (i, base) in self.bases.iter().enumerate() {
                if i > 0 {
                    out.write(", ");
                }
                out.write("public ");
                out.write(base);
            }
        }
        out.write(" {\n");
        out.indent();
        for member in &self.members {
            member.codegen(out);
        }
        out.unindent();
        out.write_line("};");
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub items: Vec<Item>,
}

impl Namespace {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_line(&format!("namespace {} {{", self.name));
        out.indent();
        for item in &self.items {
            item.codegen(out);
        }
        out.unindent();
        out.write_line("}");
    }
}

/// A top-level construct of the translation unit.
#[derive(Debug, Clone)]
pub enum Item {
    Blank,
    Pp(Pp),
    Namespace(Namespace),
    ForwardDecl { name: String, is_struct: bool },
    Class(Class),
    Method(Method),
    DtorDef(DtorDef),
}

impl Item {
    pub fn codegen(&self, out: &mut CodeWriter) {
        match self {
            Item::Blank => out.write_line(""),
            Item::Pp(pp) => pp.codegen(out),
            Item::Namespace(ns) => ns.codegen(out),
            Item::ForwardDecl { name, is_struct } => {
                let kind = if *is_struct { "struct" } else { "class" };
                out.write_line(&format!("{kind} {name};"));
            }
            Item::Class(class) => class.codegen(out),
            Item::Method(method) => method.codegen(out),
            Item::DtorDef(dtor) => dtor.codegen(out),
        }
    }
}

impl From<Pp> for Item {
    fn from(pp: Pp) -> Self {
        Item::Pp(pp)
    }
}

impl From<Pp> for Member {
    fn from(pp: Pp) -> Self {
        Member::Pp(pp)
    }
}

/// The whole output file. When `is_header` is set the contents are wrapped in
/// an include guard derived from the output filename.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub filename: String,
    pub is_header: bool,
    pub includes: Vec<Item>,
    pub items: Vec<Item>,
}

impl TranslationUnit {
    pub fn codegen(&self, out: &mut CodeWriter) {
        out.write_line("// This file is auto-generated, do not edit.");
        if self.is_header {
            // The guard pair stays at preprocessor level zero; only the
            // guarded contents nest.
            let guard = include_guard(&self.filename);
            emit(out, "ifndef", Some(&guard), None);
            emit(out, "define", Some(&guard), Some("1"));
            out.pp_indent();
        }
        out.write("\n");
        if !self.includes.is_empty() {
            for include in &self.includes {
                include.codegen(out);
            }
            out.write("\n");
        }
        for item in &self.items {
            item.codegen(out);
        }
        if self.is_header {
            out.write("\n");
            Pp::Endif.codegen(out);
        }
    }
}
