//! Syntax kinds for the spec language.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds
//! (from parser). Logos derives token recognition; node kinds lack
//! token/regex attributes. `TreeLang` implements Rowan's `Language` trait
//! for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("{")]
    BraceOpen = 0,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Equals,

    #[token("abstract")]
    KwAbstract,

    #[token("extern")]
    KwExtern,

    #[token("false")]
    KwFalse,

    #[token("list")]
    KwList,

    #[token("node")]
    KwNode,

    #[token("null")]
    KwNull,

    #[token("root")]
    KwRoot,

    #[token("target")]
    KwTarget,

    #[token("true")]
    KwTrue,

    #[token("visitor")]
    KwVisitor,

    #[token("weak")]
    KwWeak,

    /// Primitive type keywords. Separate from `Ident` so that a field typed
    /// with a primitive never enters name resolution.
    #[token("bool")]
    KwBool,

    #[token("float")]
    KwFloat,

    #[token("int")]
    KwInt,

    #[token("string")]
    KwString,

    #[regex(r"0[bB][01_]+")]
    BinInt,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexInt,

    /// `0o17`, or a leading-zero literal like `017` (including plain `0`).
    #[regex(r"0[oO][0-7]+|0[0-9_]*")]
    OctInt,

    #[regex(r"[1-9][0-9_]*")]
    DecInt,

    /// Must contain a dot; digits may sit on either side of it.
    #[regex(r"[0-9]*\.[0-9]+|[0-9]+\.[0-9]*")]
    FloatLit,

    /// Single-quoted, doubled-quote escape: `'it''s'`.
    #[regex(r"'(?:''|[^'])*'")]
    CharLit,

    /// Double-quoted, doubled-quote escape: `"say ""hi"""`.
    #[regex(r#""(?:""|[^"])*""#)]
    StrLit,

    /// Defined after keywords so they take precedence.
    #[regex(r"[a-zA-Z_][a-zA-Z_0-9]*")]
    Ident,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    Target,
    Extern,
    Visitor,
    RootSpec,
    NodeDef,
    BaseClause,
    OptionDecl,
    FieldGroup,
    TypeName,
    FieldDecl,
    Ctor,
    CtorArg,
    LitExpr,
    CallExpr,
    ListExpr,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment | BlockComment)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeLang {}

impl Language for TreeLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<TreeLang>;
pub type SyntaxToken = rowan::SyntaxToken<TreeLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// Literal tokens that form a `LitExpr` on their own.
    pub const LITERAL: TokenSet = TokenSet::new(&[
        KwTrue, KwFalse, KwNull, BinInt, HexInt, OctInt, DecInt, FloatLit, CharLit, StrLit,
    ]);

    /// Tokens that can start a field declaration group inside a node body.
    pub const FIELD_FIRST: TokenSet = TokenSet::new(&[
        KwWeak, KwList, KwBool, KwFloat, KwInt, KwString, Ident,
    ]);

    /// Tokens that can name a data type.
    pub const TYPE_NAME: TokenSet = TokenSet::new(&[KwBool, KwFloat, KwInt, KwString, Ident]);
}
