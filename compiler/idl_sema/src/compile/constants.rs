//! Resolving constant expressions to typed values.

use idl_ir::{LiteralKind, RawLiteral, Span};

use super::CompileStep;
use crate::constant::{
    numeric_value, untyped_numeric_value, Constant, ConstantError, ConstantKind, ConstantValue,
    ConstantValueKind,
};
use crate::element::{DeclBody, DeclKind, ElementKind};
use crate::problem::SemanticProblem;
use crate::reference::{Reference, Target};
use crate::typespace::{Nullability, Type, TypeId};

/// Narrow a constant compiled without an expected type to `ty`, whose
/// values are of `kind`. Constants that already have a concrete type are
/// left alone.
pub fn narrow_constant(
    constant: &mut Constant,
    ty: TypeId,
    kind: ConstantValueKind,
) -> Result<(), ConstantError> {
    if constant.ty() != Some(TypeId::UNTYPED_NUMERIC) {
        return Ok(());
    }
    let Some(value) = constant.value() else {
        return Ok(());
    };
    let narrowed = value.convert(kind)?;
    constant.set_resolved(narrowed, ty);
    Ok(())
}

impl CompileStep<'_> {
    /// Resolve `constant`, converting it to `expected` when given.
    ///
    /// Returns whether the constant has a value. A constant is compiled at
    /// most once; later calls only narrow an untyped result.
    pub(super) fn resolve_constant(
        &mut self,
        constant: &mut Constant,
        expected: Option<TypeId>,
    ) -> bool {
        if constant.is_compiled() {
            return match (expected, constant.ty()) {
                (Some(to), Some(TypeId::UNTYPED_NUMERIC)) if to != TypeId::UNTYPED_NUMERIC => {
                    self.narrow(constant, to)
                }
                _ => constant.is_resolved(),
            };
        }
        let span = constant.span;
        let resolved = match &mut constant.kind {
            ConstantKind::Identifier(reference) => self
                .identifier_constant(reference, span)
                .and_then(|(value, ty)| self.typed(value, ty, expected, span)),
            ConstantKind::Literal(literal) => self.literal_constant(literal, expected),
            ConstantKind::BinaryOr { left, right } => {
                let left_ok = self.resolve_constant(left, expected);
                let right_ok = self.resolve_constant(right, expected);
                if left_ok && right_ok {
                    self.binary_or(left, right, expected, span)
                } else {
                    None
                }
            }
        };
        match resolved {
            Some((value, ty)) => {
                constant.set_resolved(value, ty);
                true
            }
            None => {
                constant.mark_compiled();
                false
            }
        }
    }

    fn narrow(&mut self, constant: &mut Constant, to: TypeId) -> bool {
        let span = constant.span;
        let Some(kind) = self.value_kind_of(to, span) else {
            return false;
        };
        match narrow_constant(constant, to, kind) {
            Ok(()) => true,
            Err(error) => {
                self.report_conversion(error, TypeId::UNTYPED_NUMERIC, to, span);
                false
            }
        }
    }

    /// The value a named constant or bits/enum member holds, with its own
    /// type.
    fn identifier_constant(
        &mut self,
        reference: &Reference,
        span: Span,
    ) -> Option<(ConstantValue, TypeId)> {
        let target = reference.target()?;
        match target {
            Target::Decl(decl) => {
                let kind = self.libraries.decl(decl).kind;
                if kind != DeclKind::Const {
                    self.reporter.error(SemanticProblem::ExpectedConstant {
                        span,
                        name: self.lookup.target_display(target, self.interner),
                        kind: kind.into(),
                    });
                    return None;
                }
                if !self.ensure_compiled(decl, span) {
                    return None;
                }
                match &self.libraries.decl(decl).body {
                    DeclBody::Const { value, .. } => Some((value.value()?.clone(), value.ty()?)),
                    _ => None,
                }
            }
            Target::Member(member) => {
                let parent_kind = self.libraries.decl(member.decl).kind;
                if !matches!(parent_kind, DeclKind::Bits | DeclKind::Enum) {
                    let kind = self
                        .libraries
                        .try_member(member)
                        .map_or(ElementKind::from(parent_kind), |m| m.element_kind());
                    self.reporter.error(SemanticProblem::ExpectedConstant {
                        span,
                        name: self.lookup.target_display(target, self.interner),
                        kind,
                    });
                    return None;
                }
                if !self.ensure_compiled(member.decl, span) {
                    return None;
                }
                let value = self.libraries.member(member).value()?.value()?.clone();
                let ty = self.typespace.intern(Type::Identifier {
                    decl: member.decl,
                    kind: parent_kind,
                    nullability: Nullability::Nonnullable,
                });
                Some((value, ty))
            }
        }
    }

    fn literal_constant(
        &mut self,
        literal: &RawLiteral,
        expected: Option<TypeId>,
    ) -> Option<(ConstantValue, TypeId)> {
        let span = literal.span;
        match literal.kind {
            LiteralKind::String => {
                let contents = literal.string_contents();
                let length = u32::try_from(contents.len()).unwrap_or(u32::MAX);
                let inferred = self.typespace.string_type(length);
                self.typed(ConstantValue::String(contents), inferred, expected, span)
            }
            LiteralKind::DocComment => {
                let value = ConstantValue::DocComment(literal.text.clone());
                self.typed(value, TypeId::UNBOUNDED_STRING, expected, span)
            }
            LiteralKind::Bool => {
                let value = ConstantValue::Bool(literal.text == "true");
                self.typed(value, TypeId::BOOL, expected, span)
            }
            LiteralKind::Numeric => {
                let Some(to) = expected else {
                    return match untyped_numeric_value(&literal.text) {
                        Ok(value) => Some((value, TypeId::UNTYPED_NUMERIC)),
                        Err(error) => {
                            let untyped = TypeId::UNTYPED_NUMERIC;
                            self.report_conversion(error, untyped, untyped, span);
                            None
                        }
                    };
                };
                let kind = self.value_kind_of(to, span)?;
                if !kind.is_numeric() {
                    self.report_conversion(
                        ConstantError::KindMismatch {
                            from: ConstantValueKind::Int64,
                            to: kind,
                        },
                        TypeId::UNTYPED_NUMERIC,
                        to,
                        span,
                    );
                    return None;
                }
                match numeric_value(&literal.text, kind) {
                    Ok(value) => Some((value, to)),
                    Err(error) => {
                        self.report_conversion(error, TypeId::UNTYPED_NUMERIC, to, span);
                        None
                    }
                }
            }
        }
    }

    fn binary_or(
        &mut self,
        left: &Constant,
        right: &Constant,
        expected: Option<TypeId>,
        span: Span,
    ) -> Option<(ConstantValue, TypeId)> {
        let (left_value, right_value) = (left.value()?, right.value()?);
        match left_value.bitwise_or(right_value) {
            Ok(value) => Some((value, expected.or(left.ty())?)),
            Err(ConstantError::Overflow { value, .. }) => {
                let ty = expected.or(left.ty())?;
                self.reporter.error(SemanticProblem::ConstantOverflow {
                    span,
                    value,
                    ty: self.display_type(ty),
                });
                None
            }
            Err(_) => {
                self.reporter.error(SemanticProblem::BinaryOperandsMismatch {
                    span,
                    left: left_value.kind().to_string(),
                    right: right_value.kind().to_string(),
                });
                None
            }
        }
    }

    /// Pair `value` (of type `from`) with `expected`, converting if needed.
    fn typed(
        &mut self,
        value: ConstantValue,
        from: TypeId,
        expected: Option<TypeId>,
        span: Span,
    ) -> Option<(ConstantValue, TypeId)> {
        match expected {
            None => Some((value, from)),
            Some(to) => Some((self.coerce(value, from, to, span)?, to)),
        }
    }

    fn coerce(
        &mut self,
        value: ConstantValue,
        from: TypeId,
        to: TypeId,
        span: Span,
    ) -> Option<ConstantValue> {
        if from == to {
            return Some(value);
        }
        if self.is_bits_or_enum(to) && self.is_bits_or_enum(from) {
            self.reporter.error(SemanticProblem::MismatchedNameTypeAssignment {
                span,
                expected: self.display_type(to),
                found: self.display_type(from),
            });
            return None;
        }
        let Some(kind) = self.value_kind_of(to, span) else {
            if !self.is_bits_or_enum(to) {
                self.reporter.error(SemanticProblem::CannotConvert {
                    span,
                    from: self.display_type(from),
                    to: self.display_type(to),
                });
            }
            return None;
        };
        if kind != ConstantValueKind::String {
            return match value.convert(kind) {
                Ok(converted) => Some(converted),
                Err(error) => {
                    self.report_conversion(error, from, to, span);
                    None
                }
            };
        }

        let Some(text) = value.as_str() else {
            self.report_conversion(
                ConstantError::KindMismatch {
                    from: value.kind(),
                    to: kind,
                },
                from,
                to,
                span,
            );
            return None;
        };
        if let Type::String {
            max_size: Some(max),
            ..
        } = *self.typespace.get(to)
        {
            if text.len() > max as usize {
                self.reporter.error(SemanticProblem::ConstantOverflow {
                    span,
                    value: value.to_string(),
                    ty: self.display_type(to),
                });
                return None;
            }
        }
        Some(value)
    }

    /// Kind of the values of `ty`, looking through bits and enums to their
    /// subtype.
    fn value_kind_of(&mut self, ty: TypeId, span: Span) -> Option<ConstantValueKind> {
        if let Some(kind) = self.typespace.value_kind(ty) {
            return Some(kind);
        }
        let Type::Identifier {
            decl,
            kind: DeclKind::Bits | DeclKind::Enum,
            ..
        } = *self.typespace.get(ty)
        else {
            return None;
        };
        if !self.ensure_compiled(decl, span) {
            return None;
        }
        let subtype = self.libraries.decl(decl).body.type_ctor()?.ty()?;
        self.typespace.value_kind(subtype)
    }

    fn is_bits_or_enum(&self, ty: TypeId) -> bool {
        matches!(
            self.typespace.get(ty),
            Type::Identifier {
                kind: DeclKind::Bits | DeclKind::Enum,
                ..
            }
        )
    }

    fn report_conversion(&mut self, error: ConstantError, from: TypeId, to: TypeId, span: Span) {
        let problem = match error {
            ConstantError::Overflow { value, .. } => SemanticProblem::ConstantOverflow {
                span,
                value,
                ty: self.display_type(to),
            },
            ConstantError::MalformedLiteral(text) => {
                SemanticProblem::MalformedNumericLiteral { span, text }
            }
            ConstantError::KindMismatch { .. } | ConstantError::OperandMismatch { .. } => {
                SemanticProblem::CannotConvert {
                    span,
                    from: self.display_type(from),
                    to: self.display_type(to),
                }
            }
        };
        self.reporter.error(problem);
    }
}
