//! The resolved specification model.
//!
//! [`Spec`] owns every definition; cross-references between definitions are
//! typed indices ([`NodeId`], [`ExternId`]) into `Spec`-owned vectors, so no
//! unresolved placeholder can survive into the model - the resolver binds
//! names while it builds these types.

mod resolve;

#[cfg(test)]
mod resolve_tests;

use indexmap::IndexMap;
use rowan::TextRange;

pub use resolve::resolve;

/// Index of a node definition within [`Spec::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Index of an extern type within [`Spec::externs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternId(pub u32);

/// The resolved spec document: targets, visitors, the optional root, and the
/// node hierarchy, plus the name table they were resolved against.
#[derive(Debug)]
pub struct Spec {
    pub filename: String,
    pub targets: Vec<TargetDef>,
    pub visitors: Vec<VisitorDef>,
    pub root: Option<RootRef>,
    pub nodes: Vec<NodeDef>,
    pub externs: Vec<ExternDef>,
    /// Name table. Externs are inserted before nodes, so an extern name wins
    /// over a node of the same name (which is separately reported).
    pub types: IndexMap<String, TypeRef>,
}

impl Spec {
    pub fn node(&self, id: NodeId) -> &NodeDef {
        &self.nodes[id.0 as usize]
    }

    pub fn extern_def(&self, id: ExternId) -> &ExternDef {
        &self.externs[id.0 as usize]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).copied()
    }

    /// Ancestors of a node, root-most first, excluding the node itself.
    /// Resolution rejects base cycles, so the chain always terminates.
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).base;
        while let Some(base) = current {
            chain.push(base);
            current = self.node(base).base;
        }
        chain.reverse();
        chain
    }
}

/// A codegen-target block from the spec, with its raw option values.
#[derive(Debug)]
pub struct TargetDef {
    pub name: String,
    pub span: TextRange,
    pub options: Vec<OptionDef>,
    pub externs: Vec<ExternBlock>,
}

/// One `extern X { ... }` block inside a target.
#[derive(Debug)]
pub struct ExternBlock {
    pub name: String,
    pub span: TextRange,
    pub options: Vec<OptionDef>,
}

#[derive(Debug)]
pub struct VisitorDef {
    pub name: String,
    pub span: TextRange,
    pub options: Vec<OptionDef>,
}

#[derive(Debug)]
pub struct OptionDef {
    pub name: String,
    pub span: TextRange,
    pub value: Literal,
}

/// The designated root node.
#[derive(Debug)]
pub struct RootRef {
    pub node: NodeId,
    pub span: TextRange,
}

/// A tree-node type definition.
#[derive(Debug)]
pub struct NodeDef {
    pub name: String,
    pub span: TextRange,
    pub is_abstract: bool,
    pub base: Option<NodeId>,
    pub fields: Vec<FieldDef>,
    pub ctors: Vec<CtorDef>,
}

impl NodeDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: String,
    pub span: TextRange,
    pub ty: FieldType,
    pub default: Option<Literal>,
}

/// A field's type, with the `weak` ownership flag.
#[derive(Debug, Clone)]
pub struct FieldType {
    pub weak: bool,
    pub kind: FieldTypeKind,
}

#[derive(Debug, Clone)]
pub enum FieldTypeKind {
    Scalar(TypeRef),
    List(ListElem),
}

/// Element type of a `list` field. `weak list T` marks both the outer field
/// and the element as weak.
#[derive(Debug, Clone)]
pub struct ListElem {
    pub weak: bool,
    pub ty: TypeRef,
}

/// A resolved type reference: primitive, node, or extern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    Node(NodeId),
    Extern(ExternId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    Str,
}

/// An extern type name. Its per-target spellings and destructor templates
/// live on the [`TargetDef`]s that bind it.
#[derive(Debug)]
pub struct ExternDef {
    pub name: String,
    pub span: TextRange,
}

/// A constructor signature: the field names it accepts, in order.
#[derive(Debug)]
pub struct CtorDef {
    pub name: String,
    pub span: TextRange,
    pub args: Vec<CtorArg>,
}

#[derive(Debug)]
pub struct CtorArg {
    pub name: String,
    pub span: TextRange,
}

/// A literal value from the spec, or a materialized option default
/// (which carries no span).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LitValue,
    pub span: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(String),
    Str(String),
    Null,
    List(Vec<Literal>),
    Call(String),
}

/// Literal kinds, used by option schemas to state what they expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Bool,
    Int,
    Float,
    Char,
    Str,
    Null,
    List,
    Call,
}

impl LitKind {
    pub fn name(self) -> &'static str {
        match self {
            LitKind::Bool => "bool",
            LitKind::Int => "int",
            LitKind::Float => "float",
            LitKind::Char => "char",
            LitKind::Str => "string",
            LitKind::Null => "null",
            LitKind::List => "list",
            LitKind::Call => "constructor call",
        }
    }
}

impl Literal {
    pub fn kind(&self) -> LitKind {
        match self.value {
            LitValue::Bool(_) => LitKind::Bool,
            LitValue::Int(_) => LitKind::Int,
            LitValue::Float(_) => LitKind::Float,
            LitValue::Char(_) => LitKind::Char,
            LitValue::Str(_) => LitKind::Str,
            LitValue::Null => LitKind::Null,
            LitValue::List(_) => LitKind::List,
            LitValue::Call(_) => LitKind::Call,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LitValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            LitValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match &self.value {
            LitValue::List(items) => Some(items),
            _ => None,
        }
    }
}
