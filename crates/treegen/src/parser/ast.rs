//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(SpecFile, Root);
ast_node!(Target, Target);
ast_node!(Extern, Extern);
ast_node!(Visitor, Visitor);
ast_node!(RootSpec, RootSpec);
ast_node!(NodeDef, NodeDef);
ast_node!(BaseClause, BaseClause);
ast_node!(OptionDecl, OptionDecl);
ast_node!(FieldGroup, FieldGroup);
ast_node!(TypeName, TypeName);
ast_node!(FieldDecl, FieldDecl);
ast_node!(Ctor, Ctor);
ast_node!(CtorArg, CtorArg);
ast_node!(LitExpr, LitExpr);
ast_node!(CallExpr, CallExpr);
ast_node!(ListExpr, ListExpr);

fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    find_token(node, kind).is_some()
}

/// Expression: a literal, a `Name()` constructor call, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Lit(LitExpr),
    Call(CallExpr),
    List(ListExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LitExpr => LitExpr::cast(node).map(Expr::Lit),
            SyntaxKind::CallExpr => CallExpr::cast(node).map(Expr::Call),
            SyntaxKind::ListExpr => ListExpr::cast(node).map(Expr::List),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Lit(n) => n.as_cst(),
            Expr::Call(n) => n.as_cst(),
            Expr::List(n) => n.as_cst(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

impl SpecFile {
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.0.children().filter_map(Target::cast)
    }

    pub fn visitors(&self) -> impl Iterator<Item = Visitor> + '_ {
        self.0.children().filter_map(Visitor::cast)
    }

    pub fn roots(&self) -> impl Iterator<Item = RootSpec> + '_ {
        self.0.children().filter_map(RootSpec::cast)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeDef> + '_ {
        self.0.children().filter_map(NodeDef::cast)
    }
}

impl Target {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn options(&self) -> impl Iterator<Item = OptionDecl> + '_ {
        self.0.children().filter_map(OptionDecl::cast)
    }

    pub fn externs(&self) -> impl Iterator<Item = Extern> + '_ {
        self.0.children().filter_map(Extern::cast)
    }
}

impl Extern {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn options(&self) -> impl Iterator<Item = OptionDecl> + '_ {
        self.0.children().filter_map(OptionDecl::cast)
    }
}

impl Visitor {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn options(&self) -> impl Iterator<Item = OptionDecl> + '_ {
        self.0.children().filter_map(OptionDecl::cast)
    }
}

impl RootSpec {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }
}

impl NodeDef {
    /// The node's own name. The base name is nested inside [`BaseClause`],
    /// so the first direct `Ident` token is always the declared name.
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn is_abstract(&self) -> bool {
        has_token(&self.0, SyntaxKind::KwAbstract)
    }

    pub fn base(&self) -> Option<BaseClause> {
        self.0.children().find_map(BaseClause::cast)
    }

    pub fn field_groups(&self) -> impl Iterator<Item = FieldGroup> + '_ {
        self.0.children().filter_map(FieldGroup::cast)
    }

    pub fn ctors(&self) -> impl Iterator<Item = Ctor> + '_ {
        self.0.children().filter_map(Ctor::cast)
    }
}

impl BaseClause {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }
}

impl OptionDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl FieldGroup {
    pub fn is_weak(&self) -> bool {
        has_token(&self.0, SyntaxKind::KwWeak)
    }

    pub fn is_list(&self) -> bool {
        has_token(&self.0, SyntaxKind::KwList)
    }

    pub fn type_name(&self) -> Option<TypeName> {
        self.0.children().find_map(TypeName::cast)
    }

    pub fn decls(&self) -> impl Iterator<Item = FieldDecl> + '_ {
        self.0.children().filter_map(FieldDecl::cast)
    }
}

impl TypeName {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl FieldDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn default(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl Ctor {
    /// The declared constructor name. Argument names are nested inside
    /// [`CtorArg`] nodes, so the first direct `Ident` token is the name.
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }

    pub fn args(&self) -> impl Iterator<Item = CtorArg> + '_ {
        self.0.children().filter_map(CtorArg::cast)
    }
}

impl CtorArg {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }
}

impl LitExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl CallExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::Ident)
    }
}

impl ListExpr {
    pub fn items(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}
