//! Semantic problem definitions.
//!
//! Passes report what went wrong as a [`SemanticProblem`]; rendering to a
//! [`Diagnostic`] happens once, at the end. Names are already rendered to
//! strings when the problem is built, since qualified names need the
//! library arena to print.

use idl_diagnostic::{Diagnostic, ErrorCode};
use idl_ir::Span;

use crate::element::ElementKind;


/// Problems found while resolving and compiling libraries.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SemanticProblem {
    // Name resolution
    NameNotFound {
        span: Span,
        name: String,
        library: String,
    },
    MemberNotFound {
        span: Span,
        member: String,
        decl: String,
    },
    LibraryNotImported {
        span: Span,
        library: String,
    },
    AmbiguousLibraryPrefix {
        span: Span,
        prefix: String,
        candidates: Vec<String>,
    },
    ContextualNameNotFound {
        span: Span,
        name: String,
    },
    AmbiguousContextualReference {
        span: Span,
        name: String,
        member: String,
        decl: String,
    },
    NameCollision {
        span: Span,
        name: String,
        previous_name: String,
        previous_span: Option<Span>,
    },
    IncludeCycle {
        span: Span,
        decl: String,
    },

    // Constants
    ConstantOverflow {
        span: Span,
        value: String,
        ty: String,
    },
    CannotConvert {
        span: Span,
        from: String,
        to: String,
    },
    InvalidConstantType {
        span: Span,
        ty: String,
    },
    BinaryOperandsMismatch {
        span: Span,
        left: String,
        right: String,
    },
    ExpectedConstant {
        span: Span,
        name: String,
        kind: ElementKind,
    },
    MismatchedNameTypeAssignment {
        span: Span,
        expected: String,
        found: String,
    },
    InvalidEnumSubtype {
        span: Span,
        kind: ElementKind,
        ty: String,
    },
    DuplicateMemberValue {
        span: Span,
        member: String,
        previous: String,
        previous_span: Option<Span>,
        value: String,
    },
    BitsMemberNotPowerOfTwo {
        span: Span,
        member: String,
        value: String,
    },
    MalformedNumericLiteral {
        span: Span,
        text: String,
    },

    // Attributes
    DuplicateAttribute {
        span: Span,
        name: String,
        previous_span: Span,
    },
    DuplicateAttributeArg {
        span: Span,
        attribute: String,
        arg: String,
        previous_span: Span,
    },
    AttributeArgsMustAllBeNamed {
        span: Span,
        attribute: String,
    },
    UnknownAttributeArg {
        span: Span,
        attribute: String,
        arg: String,
    },
    MissingRequiredAttributeArg {
        span: Span,
        attribute: String,
        arg: String,
    },
    InvalidAttributePlacement {
        span: Span,
        attribute: String,
        placement: ElementKind,
    },
    UnknownAttribute {
        span: Span,
        name: String,
    },

    // Types
    WrongNumberOfLayoutParameters {
        span: Span,
        layout: String,
        expected: usize,
        found: usize,
    },
    TooManyConstraints {
        span: Span,
        layout: String,
        max: usize,
        found: usize,
    },
    CannotBeOptional {
        span: Span,
        layout: String,
    },
    UnexpectedConstraint {
        span: Span,
        layout: String,
    },
    ExpectedType {
        span: Span,
        name: String,
    },
    ExpectedValueButGotType {
        span: Span,
        layout: String,
    },
    BoxedTypeMustBeStruct {
        span: Span,
    },
    ProtocolConstraintRequired {
        span: Span,
        layout: String,
    },
    MustBeAProtocol {
        span: Span,
        layout: String,
    },
    CannotBoundTwice {
        span: Span,
        layout: String,
    },
    CannotIndicateOptionalTwice {
        span: Span,
        layout: String,
    },

    // Protocols
    DuplicateMethodOrdinal {
        span: Span,
        method: String,
        previous_method: String,
        previous_span: Option<Span>,
        ordinal: u64,
    },
    GeneratedZeroValueOrdinal {
        span: Span,
        method: String,
    },
    InvalidSelectorValue {
        span: Span,
        selector: String,
    },
    ComposingNonProtocol {
        span: Span,
        name: String,
        kind: ElementKind,
    },
}

impl SemanticProblem {
    /// Get the primary span of this problem.
    pub fn span(&self) -> Span {
        match self {
            SemanticProblem::NameNotFound { span, .. }
            | SemanticProblem::MemberNotFound { span, .. }
            | SemanticProblem::LibraryNotImported { span, .. }
            | SemanticProblem::AmbiguousLibraryPrefix { span, .. }
            | SemanticProblem::ContextualNameNotFound { span, .. }
            | SemanticProblem::AmbiguousContextualReference { span, .. }
            | SemanticProblem::NameCollision { span, .. }
            | SemanticProblem::IncludeCycle { span, .. }
            | SemanticProblem::ConstantOverflow { span, .. }
            | SemanticProblem::CannotConvert { span, .. }
            | SemanticProblem::InvalidConstantType { span, .. }
            | SemanticProblem::BinaryOperandsMismatch { span, .. }
            | SemanticProblem::ExpectedConstant { span, .. }
            | SemanticProblem::MismatchedNameTypeAssignment { span, .. }
            | SemanticProblem::InvalidEnumSubtype { span, .. }
            | SemanticProblem::DuplicateMemberValue { span, .. }
            | SemanticProblem::BitsMemberNotPowerOfTwo { span, .. }
            | SemanticProblem::MalformedNumericLiteral { span, .. }
            | SemanticProblem::DuplicateAttribute { span, .. }
            | SemanticProblem::DuplicateAttributeArg { span, .. }
            | SemanticProblem::AttributeArgsMustAllBeNamed { span, .. }
            | SemanticProblem::UnknownAttributeArg { span, .. }
            | SemanticProblem::MissingRequiredAttributeArg { span, .. }
            | SemanticProblem::InvalidAttributePlacement { span, .. }
            | SemanticProblem::UnknownAttribute { span, .. }
            | SemanticProblem::WrongNumberOfLayoutParameters { span, .. }
            | SemanticProblem::TooManyConstraints { span, .. }
            | SemanticProblem::CannotBeOptional { span, .. }
            | SemanticProblem::UnexpectedConstraint { span, .. }
            | SemanticProblem::ExpectedType { span, .. }
            | SemanticProblem::ExpectedValueButGotType { span, .. }
            | SemanticProblem::BoxedTypeMustBeStruct { span }
            | SemanticProblem::ProtocolConstraintRequired { span, .. }
            | SemanticProblem::MustBeAProtocol { span, .. }
            | SemanticProblem::CannotBoundTwice { span, .. }
            | SemanticProblem::CannotIndicateOptionalTwice { span, .. }
            | SemanticProblem::DuplicateMethodOrdinal { span, .. }
            | SemanticProblem::GeneratedZeroValueOrdinal { span, .. }
            | SemanticProblem::InvalidSelectorValue { span, .. }
            | SemanticProblem::ComposingNonProtocol { span, .. } => *span,
        }
    }

    /// The error code this problem renders with.
    pub fn code(&self) -> ErrorCode {
        match self {
            SemanticProblem::NameNotFound { .. } => ErrorCode::E1001,
            SemanticProblem::MemberNotFound { .. } => ErrorCode::E1002,
            SemanticProblem::LibraryNotImported { .. } => ErrorCode::E1003,
            SemanticProblem::AmbiguousLibraryPrefix { .. } => ErrorCode::E1004,
            SemanticProblem::ContextualNameNotFound { .. } => ErrorCode::E1005,
            SemanticProblem::AmbiguousContextualReference { .. } => ErrorCode::E1006,
            SemanticProblem::NameCollision { .. } => ErrorCode::E1007,
            SemanticProblem::IncludeCycle { .. } => ErrorCode::E1008,
            SemanticProblem::ConstantOverflow { .. } => ErrorCode::E2001,
            SemanticProblem::CannotConvert { .. } => ErrorCode::E2002,
            SemanticProblem::InvalidConstantType { .. } => ErrorCode::E2003,
            SemanticProblem::BinaryOperandsMismatch { .. } => ErrorCode::E2004,
            SemanticProblem::ExpectedConstant { .. } => ErrorCode::E2005,
            SemanticProblem::MismatchedNameTypeAssignment { .. } => ErrorCode::E2006,
            SemanticProblem::InvalidEnumSubtype { .. } => ErrorCode::E2007,
            SemanticProblem::DuplicateMemberValue { .. } => ErrorCode::E2008,
            SemanticProblem::BitsMemberNotPowerOfTwo { .. } => ErrorCode::E2009,
            SemanticProblem::MalformedNumericLiteral { .. } => ErrorCode::E2010,
            SemanticProblem::DuplicateAttribute { .. } => ErrorCode::E3001,
            SemanticProblem::DuplicateAttributeArg { .. } => ErrorCode::E3002,
            SemanticProblem::AttributeArgsMustAllBeNamed { .. } => ErrorCode::E3003,
            SemanticProblem::UnknownAttributeArg { .. } => ErrorCode::E3004,
            SemanticProblem::MissingRequiredAttributeArg { .. } => ErrorCode::E3005,
            SemanticProblem::InvalidAttributePlacement { .. } => ErrorCode::E3006,
            SemanticProblem::UnknownAttribute { .. } => ErrorCode::W3001,
            SemanticProblem::WrongNumberOfLayoutParameters { .. } => ErrorCode::E4001,
            SemanticProblem::TooManyConstraints { .. } => ErrorCode::E4002,
            SemanticProblem::CannotBeOptional { .. } => ErrorCode::E4003,
            SemanticProblem::UnexpectedConstraint { .. } => ErrorCode::E4004,
            SemanticProblem::ExpectedType { .. } => ErrorCode::E4005,
            SemanticProblem::ExpectedValueButGotType { .. } => ErrorCode::E4006,
            SemanticProblem::BoxedTypeMustBeStruct { .. } => ErrorCode::E4007,
            SemanticProblem::ProtocolConstraintRequired { .. } => ErrorCode::E4008,
            SemanticProblem::MustBeAProtocol { .. } => ErrorCode::E4009,
            SemanticProblem::CannotBoundTwice { .. } => ErrorCode::E4010,
            SemanticProblem::CannotIndicateOptionalTwice { .. } => ErrorCode::E4011,
            SemanticProblem::DuplicateMethodOrdinal { .. } => ErrorCode::E5001,
            SemanticProblem::GeneratedZeroValueOrdinal { .. } => ErrorCode::E5002,
            SemanticProblem::InvalidSelectorValue { .. } => ErrorCode::E5003,
            SemanticProblem::ComposingNonProtocol { .. } => ErrorCode::E5004,
        }
    }

    /// Check if this is a warning (vs error).
    pub fn is_warning(&self) -> bool {
        self.code().is_warning()
    }

    /// Convert this problem into a diagnostic.
    #[allow(clippy::too_many_lines)]
    pub fn into_diagnostic(&self) -> Diagnostic {
        let code = self.code();
        let base = if self.is_warning() {
            Diagnostic::warning(code)
        } else {
            Diagnostic::error(code)
        };
        match self {
            SemanticProblem::NameNotFound {
                span,
                name,
                library,
            } => base
                .with_message(format!("cannot find `{name}` in library `{library}`"))
                .with_label(*span, "not found"),

            SemanticProblem::MemberNotFound { span, member, decl } => base
                .with_message(format!("`{decl}` has no member named `{member}`"))
                .with_label(*span, "unknown member"),

            SemanticProblem::LibraryNotImported { span, library } => base
                .with_message(format!("library `{library}` is not imported"))
                .with_label(*span, "refers to an unimported library")
                .with_suggestion(format!("add `using {library};`")),

            SemanticProblem::AmbiguousLibraryPrefix {
                span,
                prefix,
                candidates,
            } => base
                .with_message(format!("`{prefix}` could refer to more than one library"))
                .with_label(*span, "ambiguous library prefix")
                .with_note(format!("candidates: {}", candidates.join(", ")))
                .with_suggestion("import one of the libraries under an alias"),

            SemanticProblem::ContextualNameNotFound { span, name } => base
                .with_message(format!("cannot find `{name}` in this context"))
                .with_label(*span, "not a member of the expected type or a declaration"),

            SemanticProblem::AmbiguousContextualReference {
                span,
                name,
                member,
                decl,
            } => base
                .with_message(format!("`{name}` is ambiguous"))
                .with_label(*span, "ambiguous name")
                .with_note(format!("it could be the member `{member}`"))
                .with_note(format!("or the declaration `{decl}`"))
                .with_suggestion("use the fully qualified name"),

            SemanticProblem::NameCollision {
                span,
                name,
                previous_name,
                previous_span,
            } => {
                let mut diag = base
                    .with_message(format!(
                        "the name `{name}` conflicts with `{previous_name}`"
                    ))
                    .with_label(*span, "conflicting declaration")
                    .with_note("names are compared after conversion to lower snake case");
                if let Some(previous) = previous_span {
                    diag = diag.with_secondary_label(*previous, "previously declared here");
                }
                diag
            }

            SemanticProblem::IncludeCycle { span, decl } => base
                .with_message(format!("`{decl}` depends on itself"))
                .with_label(*span, "cycle detected here"),

            SemanticProblem::ConstantOverflow { span, value, ty } => base
                .with_message(format!("`{value}` does not fit in `{ty}`"))
                .with_label(*span, "value out of range"),

            SemanticProblem::CannotConvert { span, from, to } => base
                .with_message(format!("cannot convert `{from}` to `{to}`"))
                .with_label(*span, format!("expected `{to}`")),

            SemanticProblem::InvalidConstantType { span, ty } => base
                .with_message(format!("`{ty}` cannot be the type of a constant"))
                .with_label(*span, "invalid constant type"),

            SemanticProblem::BinaryOperandsMismatch { span, left, right } => base
                .with_message(format!(
                    "`|` needs operands of the same integral type, found `{left}` and `{right}`"
                ))
                .with_label(*span, "mismatched operands"),

            SemanticProblem::ExpectedConstant { span, name, kind } => base
                .with_message(format!("`{name}` is a {kind}, not a constant"))
                .with_label(*span, "expected a constant"),

            SemanticProblem::MismatchedNameTypeAssignment {
                span,
                expected,
                found,
            } => base
                .with_message(format!(
                    "member of `{found}` cannot be assigned to a constant of type `{expected}`"
                ))
                .with_label(*span, "mismatched type"),

            SemanticProblem::InvalidEnumSubtype { span, kind, ty } => {
                let label = if *kind == ElementKind::Bits {
                    "not an unsigned integral type"
                } else {
                    "not an integral type"
                };
                base.with_message(format!("{kind} cannot have underlying type `{ty}`"))
                    .with_label(*span, label)
            }

            SemanticProblem::DuplicateMemberValue {
                span,
                member,
                previous,
                previous_span,
                value,
            } => {
                let mut diag = base
                    .with_message(format!(
                        "`{member}` has the same value ({value}) as `{previous}`"
                    ))
                    .with_label(*span, "duplicate value");
                if let Some(previous_span) = previous_span {
                    diag = diag.with_secondary_label(*previous_span, "value first used here");
                }
                diag
            }

            SemanticProblem::BitsMemberNotPowerOfTwo {
                span,
                member,
                value,
            } => base
                .with_message(format!("bits member `{member}` has value {value}"))
                .with_label(*span, "not a power of two"),

            SemanticProblem::MalformedNumericLiteral { span, text } => base
                .with_message(format!("malformed numeric literal `{text}`"))
                .with_label(*span, "could not parse"),

            SemanticProblem::DuplicateAttribute {
                span,
                name,
                previous_span,
            } => base
                .with_message(format!("duplicate attribute `@{name}`"))
                .with_label(*span, "duplicate")
                .with_secondary_label(*previous_span, "first given here"),

            SemanticProblem::DuplicateAttributeArg {
                span,
                attribute,
                arg,
                previous_span,
            } => base
                .with_message(format!("duplicate argument `{arg}` on `@{attribute}`"))
                .with_label(*span, "duplicate")
                .with_secondary_label(*previous_span, "first given here"),

            SemanticProblem::AttributeArgsMustAllBeNamed { span, attribute } => base
                .with_message(format!("arguments of `@{attribute}` must all be named"))
                .with_label(*span, "unnamed argument")
                .with_note("only an attribute with a single argument may leave it unnamed"),

            SemanticProblem::UnknownAttributeArg {
                span,
                attribute,
                arg,
            } => base
                .with_message(format!("`@{attribute}` has no argument named `{arg}`"))
                .with_label(*span, "unknown argument"),

            SemanticProblem::MissingRequiredAttributeArg {
                span,
                attribute,
                arg,
            } => base
                .with_message(format!("`@{attribute}` requires argument `{arg}`"))
                .with_label(*span, "missing argument"),

            SemanticProblem::InvalidAttributePlacement {
                span,
                attribute,
                placement,
            } => base
                .with_message(format!("`@{attribute}` cannot be placed on a {placement}"))
                .with_label(*span, "invalid placement"),

            SemanticProblem::UnknownAttribute { span, name } => base
                .with_message(format!("unknown attribute `@{name}`"))
                .with_label(*span, "not an official attribute"),

            SemanticProblem::WrongNumberOfLayoutParameters {
                span,
                layout,
                expected,
                found,
            } => base
                .with_message(format!(
                    "`{layout}` expects {expected} layout parameter(s), found {found}"
                ))
                .with_label(*span, "wrong number of parameters"),

            SemanticProblem::TooManyConstraints {
                span,
                layout,
                max,
                found,
            } => base
                .with_message(format!(
                    "`{layout}` accepts at most {max} constraint(s), found {found}"
                ))
                .with_label(*span, "extra constraint"),

            SemanticProblem::CannotBeOptional { span, layout } => base
                .with_message(format!("`{layout}` cannot be optional"))
                .with_label(*span, "not allowed here"),

            SemanticProblem::UnexpectedConstraint { span, layout } => base
                .with_message(format!("unexpected constraint on `{layout}`"))
                .with_label(*span, "not a valid constraint for this layout"),

            SemanticProblem::ExpectedType { span, name } => base
                .with_message(format!("expected a type, found `{name}`"))
                .with_label(*span, "not a type"),

            SemanticProblem::ExpectedValueButGotType { span, layout } => base
                .with_message(format!("`{layout}` expects a value parameter here"))
                .with_label(*span, "expected a constant, found a type"),

            SemanticProblem::BoxedTypeMustBeStruct { span } => base
                .with_message("only structs can be boxed")
                .with_label(*span, "not a struct"),

            SemanticProblem::ProtocolConstraintRequired { span, layout } => base
                .with_message(format!("`{layout}` requires a protocol constraint"))
                .with_label(*span, "missing protocol")
                .with_suggestion(format!("write `{layout}:SomeProtocol`")),

            SemanticProblem::MustBeAProtocol { span, layout } => base
                .with_message(format!("the constraint on `{layout}` must be a protocol"))
                .with_label(*span, "not a protocol"),

            SemanticProblem::CannotBoundTwice { span, layout } => base
                .with_message(format!("`{layout}` is already bounded"))
                .with_label(*span, "second bound"),

            SemanticProblem::CannotIndicateOptionalTwice { span, layout } => base
                .with_message(format!("`{layout}` is already optional"))
                .with_label(*span, "redundant `optional`"),

            SemanticProblem::DuplicateMethodOrdinal {
                span,
                method,
                previous_method,
                previous_span,
                ordinal,
            } => {
                let mut diag = base
                    .with_message(format!(
                        "method `{method}` has the same ordinal ({ordinal:#x}) as `{previous_method}`"
                    ))
                    .with_label(*span, "duplicate ordinal")
                    .with_suggestion("rename one method or give it a `@selector`");
                if let Some(previous_span) = previous_span {
                    diag = diag.with_secondary_label(*previous_span, "ordinal first used here");
                }
                diag
            }

            SemanticProblem::GeneratedZeroValueOrdinal { span, method } => base
                .with_message(format!("the ordinal of `{method}` hashes to zero"))
                .with_label(*span, "zero ordinal")
                .with_suggestion("give the method a different `@selector`"),

            SemanticProblem::InvalidSelectorValue { span, selector } => base
                .with_message(format!("invalid selector `{selector}`"))
                .with_label(*span, "malformed selector")
                .with_note("a selector is an identifier or `library.path/Protocol.Method`"),

            SemanticProblem::ComposingNonProtocol { span, name, kind } => base
                .with_message(format!("cannot compose {kind} `{name}`"))
                .with_label(*span, "not a protocol"),
        }
    }
}
