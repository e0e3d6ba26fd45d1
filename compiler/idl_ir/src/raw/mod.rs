//! Raw syntax inputs.
//!
//! The parser (outside this workspace) hands the semantic core a tree of
//! spans and unresolved compound identifiers. These types are that hand-off
//! surface: they record *what was written* and nothing about what it means.

use smallvec::SmallVec;

use crate::{Name, Span};

/// One identifier component, e.g. `io` in `fuchsia.io.Node`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Identifier {
    pub name: Name,
    pub span: Span,
}

impl Identifier {
    pub const fn new(name: Name, span: Span) -> Self {
        Identifier { name, span }
    }
}

/// A dotted name as written in source: `fuchsia.io.Node.Open`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompoundIdentifier {
    pub components: SmallVec<[Identifier; 4]>,
    pub span: Span,
}

impl CompoundIdentifier {
    /// Build from components; the span covers all of them.
    ///
    /// # Panics
    /// Panics if `components` is empty: the parser never produces an empty
    /// compound identifier.
    pub fn new(components: impl IntoIterator<Item = Identifier>) -> Self {
        let components: SmallVec<[Identifier; 4]> = components.into_iter().collect();
        let span = match (components.first(), components.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => panic!("compound identifier must have at least one component"),
        };
        CompoundIdentifier { components, span }
    }

    /// Component names without spans.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.components.iter().map(|c| c.name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Kind of a literal token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralKind {
    /// Integer or floating point text: `42`, `-0x10`, `1.5e3`.
    Numeric,
    /// Quoted string text including the quotes: `"hi\n"`.
    String,
    /// `true` or `false`.
    Bool,
    /// Contents of `///` doc comment lines, markers stripped.
    DocComment,
}

/// A literal token as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawLiteral {
    pub kind: LiteralKind,
    pub text: String,
    pub span: Span,
}

impl RawLiteral {
    pub fn new(kind: LiteralKind, text: impl Into<String>, span: Span) -> Self {
        RawLiteral {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Contents of a string literal with quotes removed and escapes applied.
    ///
    /// The lexer has already rejected malformed escapes; anything it let
    /// through that is not recognized here is kept verbatim.
    pub fn string_contents(&self) -> String {
        let inner = self
            .text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.text);
        unescape(inner)
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('u') if chars.peek() == Some(&'{') => {
                chars.next();
                let hex: String = chars.by_ref().take_while(|&h| h != '}').collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u{");
                        out.push_str(&hex);
                        out.push('}');
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// A constant expression as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RawConstant {
    Identifier(CompoundIdentifier),
    Literal(RawLiteral),
    /// `left | right`
    BinaryOr {
        left: Box<RawConstant>,
        right: Box<RawConstant>,
        span: Span,
    },
}

impl RawConstant {
    pub fn span(&self) -> Span {
        match self {
            RawConstant::Identifier(id) => id.span,
            RawConstant::Literal(lit) => lit.span,
            RawConstant::BinaryOr { span, .. } => *span,
        }
    }
}

/// `name = value` or a bare `value` inside `@attr(...)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawAttributeArg {
    pub name: Option<Identifier>,
    pub value: RawConstant,
    pub span: Span,
}

/// Where an attribute came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AttributeProvenance {
    /// Written as `@name(...)`.
    Default,
    /// Synthesized from `///` doc comment lines.
    DocComment,
}

/// `@name(args...)`, or a doc comment.
///
/// `name` is `None` exactly when `provenance` is `DocComment`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawAttribute {
    pub name: Option<Identifier>,
    pub args: Vec<RawAttributeArg>,
    pub provenance: AttributeProvenance,
    pub span: Span,
}

impl RawAttribute {
    /// A doc comment attribute holding one doc-comment literal argument.
    pub fn doc_comment(text: impl Into<String>, span: Span) -> Self {
        RawAttribute {
            name: None,
            args: vec![RawAttributeArg {
                name: None,
                value: RawConstant::Literal(RawLiteral::new(LiteralKind::DocComment, text, span)),
                span,
            }],
            provenance: AttributeProvenance::DocComment,
            span,
        }
    }
}
