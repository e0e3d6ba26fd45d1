//! Constant expressions and their compiled values.

mod literal;
mod value;

pub use literal::{numeric_value, untyped_numeric_value};
pub use value::{ConstantError, ConstantValue, ConstantValueKind};

use idl_ir::{RawConstant, RawLiteral, Span};

use crate::reference::Reference;
use crate::typespace::TypeId;

#[cfg(test)]
mod tests;

/// Shape of a constant expression.
#[derive(Clone, Debug)]
pub enum ConstantKind {
    /// A named constant, bits or enum member, or `optional` in a constraint.
    Identifier(Reference),
    Literal(RawLiteral),
    /// `left | right`
    BinaryOr {
        left: Box<Constant>,
        right: Box<Constant>,
    },
}

/// A constant expression plus, once compiled, its value and type.
///
/// Compiling is idempotent: after the first attempt the constant is marked
/// compiled and later attempts return the stored outcome.
#[derive(Debug)]
pub struct Constant {
    pub kind: ConstantKind,
    pub span: Span,
    compiled: bool,
    resolved: Option<(ConstantValue, TypeId)>,
}

impl Constant {
    pub fn new(kind: ConstantKind, span: Span) -> Self {
        Constant {
            kind,
            span,
            compiled: false,
            resolved: None,
        }
    }

    pub fn identifier(reference: Reference, span: Span) -> Self {
        Constant::new(ConstantKind::Identifier(reference), span)
    }

    pub fn literal(literal: RawLiteral) -> Self {
        let span = literal.span;
        Constant::new(ConstantKind::Literal(literal), span)
    }

    pub fn binary_or(left: Constant, right: Constant, span: Span) -> Self {
        Constant::new(
            ConstantKind::BinaryOr {
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Lower a raw constant expression.
    pub fn from_raw(raw: &RawConstant) -> Self {
        match raw {
            RawConstant::Identifier(identifier) => {
                Constant::identifier(Reference::sourced(identifier.clone()), identifier.span)
            }
            RawConstant::Literal(literal) => Constant::literal(literal.clone()),
            RawConstant::BinaryOr { left, right, span } => {
                Constant::binary_or(Constant::from_raw(left), Constant::from_raw(right), *span)
            }
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn value(&self) -> Option<&ConstantValue> {
        self.resolved.as_ref().map(|(value, _)| value)
    }

    pub fn ty(&self) -> Option<TypeId> {
        self.resolved.as_ref().map(|(_, ty)| *ty)
    }

    pub fn reference(&self) -> Option<&Reference> {
        match &self.kind {
            ConstantKind::Identifier(reference) => Some(reference),
            _ => None,
        }
    }

    pub(crate) fn mark_compiled(&mut self) {
        self.compiled = true;
    }

    /// Record the outcome of compilation, replacing any earlier value.
    pub(crate) fn set_resolved(&mut self, value: ConstantValue, ty: TypeId) {
        self.compiled = true;
        self.resolved = Some((value, ty));
    }
}

/// Cloning yields an uncompiled copy of the expression.
impl Clone for Constant {
    fn clone(&self) -> Self {
        Constant::new(self.kind.clone(), self.span)
    }
}
