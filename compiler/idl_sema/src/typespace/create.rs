//! Building types from a layout plus resolved parameters and constraints.
//!
//! The compile step resolves what each parameter and constraint refers to;
//! this module only decides whether that combination is legal for the
//! layout and, if so, which type it denotes.

use idl_ir::Span;

use super::{
    size_bound, InternalSubtype, Nullability, PrimitiveSubtype, TransportEnd, Type, TypeId,
    Typespace,
};
use crate::element::{DeclId, DeclKind};

/// What a type constructor's layout reference resolved to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LayoutKind {
    Primitive(PrimitiveSubtype),
    Internal(InternalSubtype),
    String,
    Vector,
    Array,
    Box,
    Transport(TransportEnd),
    /// A resource declaration, e.g. `zx.Handle`.
    Resource(DeclId),
    /// A struct, table, union, enum, bits or new type.
    Decl { decl: DeclId, kind: DeclKind },
    /// An alias; constraints layer onto the aliased type.
    Alias { aliased: TypeId },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ParamArg {
    Type(TypeId),
    Size(u32),
}

/// A resolved layout parameter.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub arg: ParamArg,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConstraintArg {
    Size(u32),
    Optional,
    Protocol(DeclId),
    /// A declaration that is not a protocol.
    Decl(DeclId),
    HandleSubtype(u32),
    HandleRights(u32),
}

/// A resolved constraint.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Constraint {
    pub arg: ConstraintArg,
    pub span: Span,
}

/// Why a layout rejected its parameters or constraints.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LayoutError {
    WrongNumberOfParameters { expected: usize, found: usize },
    TooManyConstraints { max: usize, found: usize, span: Span },
    CannotBeOptional { span: Span },
    UnexpectedConstraint { span: Span },
    ExpectedType { span: Span },
    ExpectedValue { span: Span },
    BoxedTypeMustBeStruct { span: Span },
    ProtocolConstraintRequired,
    MustBeAProtocol { span: Span },
    CannotBoundTwice { span: Span },
    CannotIndicateOptionalTwice { span: Span },
}

impl Typespace {
    /// Create (or find) the type `layout<params>:constraints`.
    pub fn create(
        &mut self,
        layout: LayoutKind,
        params: &[Param],
        constraints: &[Constraint],
    ) -> Result<TypeId, LayoutError> {
        let mut constraints = constraints;
        let base = match layout {
            LayoutKind::Primitive(subtype) => {
                expect_param_count(params, 0)?;
                Type::Primitive(subtype)
            }
            LayoutKind::Internal(subtype) => {
                expect_param_count(params, 0)?;
                Type::Internal(subtype)
            }
            LayoutKind::String => {
                expect_param_count(params, 0)?;
                Type::String {
                    max_size: None,
                    nullability: Nullability::Nonnullable,
                }
            }
            LayoutKind::Vector => {
                expect_param_count(params, 1)?;
                Type::Vector {
                    element: expect_type(&params[0])?,
                    max_size: None,
                    nullability: Nullability::Nonnullable,
                }
            }
            LayoutKind::Array => {
                expect_param_count(params, 2)?;
                Type::Array {
                    element: expect_type(&params[0])?,
                    size: expect_size(&params[1])?,
                }
            }
            LayoutKind::Box => {
                expect_param_count(params, 1)?;
                let boxed = expect_type(&params[0])?;
                match *self.get(boxed) {
                    Type::Identifier {
                        decl,
                        kind: DeclKind::Struct,
                        ..
                    } => Type::Box {
                        boxed: self.intern(Type::Identifier {
                            decl,
                            kind: DeclKind::Struct,
                            nullability: Nullability::Nonnullable,
                        }),
                    },
                    _ => {
                        return Err(LayoutError::BoxedTypeMustBeStruct {
                            span: params[0].span,
                        })
                    }
                }
            }
            LayoutKind::Transport(end) => {
                expect_param_count(params, 0)?;
                let (first, rest) = constraints
                    .split_first()
                    .ok_or(LayoutError::ProtocolConstraintRequired)?;
                let protocol = match first.arg {
                    ConstraintArg::Protocol(protocol) => protocol,
                    ConstraintArg::Decl(_) => {
                        return Err(LayoutError::MustBeAProtocol { span: first.span })
                    }
                    _ => return Err(LayoutError::ProtocolConstraintRequired),
                };
                constraints = rest;
                Type::TransportSide {
                    end,
                    protocol,
                    nullability: Nullability::Nonnullable,
                }
            }
            LayoutKind::Resource(resource) => {
                expect_param_count(params, 0)?;
                Type::Handle {
                    resource,
                    subtype: None,
                    rights: None,
                    nullability: Nullability::Nonnullable,
                }
            }
            LayoutKind::Decl { decl, kind } => {
                expect_param_count(params, 0)?;
                Type::Identifier {
                    decl,
                    kind,
                    nullability: Nullability::Nonnullable,
                }
            }
            LayoutKind::Alias { aliased } => {
                expect_param_count(params, 0)?;
                *self.get(aliased)
            }
        };

        let max = max_constraints(&base);
        if max > 0 && constraints.len() > max {
            return Err(LayoutError::TooManyConstraints {
                max,
                found: constraints.len(),
                span: constraints[max].span,
            });
        }
        let mut ty = base;
        for constraint in constraints {
            ty = apply_constraint(ty, constraint)?;
        }
        Ok(self.intern(ty))
    }
}

fn expect_param_count(params: &[Param], expected: usize) -> Result<(), LayoutError> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(LayoutError::WrongNumberOfParameters {
            expected,
            found: params.len(),
        })
    }
}

fn expect_type(param: &Param) -> Result<TypeId, LayoutError> {
    match param.arg {
        ParamArg::Type(ty) => Ok(ty),
        ParamArg::Size(_) => Err(LayoutError::ExpectedType { span: param.span }),
    }
}

fn expect_size(param: &Param) -> Result<u32, LayoutError> {
    match param.arg {
        ParamArg::Size(size) => Ok(size),
        ParamArg::Type(_) => Err(LayoutError::ExpectedValue { span: param.span }),
    }
}

fn max_constraints(ty: &Type) -> usize {
    match ty {
        Type::String { .. } | Type::Vector { .. } => 2,
        Type::Handle { .. } => 3,
        Type::TransportSide { .. } => 1,
        Type::Identifier {
            kind: DeclKind::Struct | DeclKind::Union,
            ..
        } => 1,
        _ => 0,
    }
}

fn apply_constraint(ty: Type, constraint: &Constraint) -> Result<Type, LayoutError> {
    let span = constraint.span;
    let make_nullable = |nullability: Nullability| {
        if nullability.is_nullable() {
            Err(LayoutError::CannotIndicateOptionalTwice { span })
        } else {
            Ok(Nullability::Nullable)
        }
    };
    let bound_once = |current: Option<u32>, value: u32| {
        if current.is_some() {
            Err(LayoutError::CannotBoundTwice { span })
        } else {
            Ok(Some(value))
        }
    };

    let constrained = match (ty, constraint.arg) {
        (Type::String { max_size, nullability }, ConstraintArg::Size(n)) => Type::String {
            max_size: bound_once(max_size, n)?.and_then(size_bound),
            nullability,
        },
        (
            Type::Vector {
                element,
                max_size,
                nullability,
            },
            ConstraintArg::Size(n),
        ) => Type::Vector {
            element,
            max_size: bound_once(max_size, n)?.and_then(size_bound),
            nullability,
        },
        (
            Type::Handle {
                resource,
                subtype,
                rights,
                nullability,
            },
            ConstraintArg::HandleSubtype(value),
        ) => Type::Handle {
            resource,
            subtype: bound_once(subtype, value)?,
            rights,
            nullability,
        },
        (
            Type::Handle {
                resource,
                subtype,
                rights,
                nullability,
            },
            ConstraintArg::HandleRights(value),
        ) => Type::Handle {
            resource,
            subtype,
            rights: bound_once(rights, value)?,
            nullability,
        },
        (Type::String { max_size, nullability }, ConstraintArg::Optional) => Type::String {
            max_size,
            nullability: make_nullable(nullability)?,
        },
        (
            Type::Vector {
                element,
                max_size,
                nullability,
            },
            ConstraintArg::Optional,
        ) => Type::Vector {
            element,
            max_size,
            nullability: make_nullable(nullability)?,
        },
        (
            Type::Handle {
                resource,
                subtype,
                rights,
                nullability,
            },
            ConstraintArg::Optional,
        ) => Type::Handle {
            resource,
            subtype,
            rights,
            nullability: make_nullable(nullability)?,
        },
        (
            Type::TransportSide {
                end,
                protocol,
                nullability,
            },
            ConstraintArg::Optional,
        ) => Type::TransportSide {
            end,
            protocol,
            nullability: make_nullable(nullability)?,
        },
        (
            Type::Identifier {
                decl,
                kind: kind @ (DeclKind::Struct | DeclKind::Union),
                nullability,
            },
            ConstraintArg::Optional,
        ) => Type::Identifier {
            decl,
            kind,
            nullability: make_nullable(nullability)?,
        },
        (_, ConstraintArg::Optional) => return Err(LayoutError::CannotBeOptional { span }),
        (_, _) => return Err(LayoutError::UnexpectedConstraint { span }),
    };
    Ok(constrained)
}
