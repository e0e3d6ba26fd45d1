//! Compiling type constructors.
//!
//! Resolves what the layout, each parameter and each constraint refer to,
//! then hands the combination to
//! [`Typespace::create`](crate::typespace::Typespace::create), which owns the
//! rules for what is legal.

use std::mem;

use smallvec::SmallVec;

use idl_ir::Span;

use super::CompileStep;
use crate::constant::{Constant, ConstantKind};
use crate::element::{BuiltinKind, DeclId, DeclKind, MemberKind};
use crate::problem::SemanticProblem;
use crate::reference::{Reference, Target};
use crate::type_ctor::{LayoutParameter, TypeConstructor};
use crate::typespace::{
    Constraint, ConstraintArg, InternalSubtype, LayoutError, LayoutKind, Param, ParamArg,
    PrimitiveSubtype, TransportEnd, Type, TypeId,
};

/// What a resource layout's constraints are interpreted against.
#[derive(Copy, Clone, Debug, Default)]
struct HandleContext {
    /// The enum named by the resource's `subtype` property.
    subtype: Option<DeclId>,
    /// Type of the resource's `rights` property.
    rights: Option<TypeId>,
}

impl CompileStep<'_> {
    /// Compile `ctor` once; later calls return the stored outcome.
    pub(super) fn compile_type_ctor(&mut self, ctor: &mut TypeConstructor) -> Option<TypeId> {
        if ctor.is_compiled() {
            return ctor.ty();
        }
        let resolved = self.create_type(ctor);
        ctor.set_compiled(resolved);
        resolved
    }

    fn create_type(&mut self, ctor: &mut TypeConstructor) -> Option<TypeId> {
        let target = ctor.layout.target()?;
        let layout = self.layout_kind(target, ctor.span)?;

        let parameters = mem::take(&mut ctor.parameters);
        ctor.parameters = parameters
            .into_iter()
            .map(|parameter| self.reinterpret_parameter(parameter))
            .collect();

        let mut complete = true;
        let mut params: SmallVec<[Param; 2]> = SmallVec::new();
        for parameter in &mut ctor.parameters {
            let span = parameter.span();
            let arg = match parameter {
                LayoutParameter::Type(inner) => self.compile_type_ctor(inner).map(ParamArg::Type),
                LayoutParameter::Constant(value) => self.size(value).map(ParamArg::Size),
            };
            match arg {
                Some(arg) => params.push(Param { arg, span }),
                None => complete = false,
            }
        }

        let handle = match layout {
            LayoutKind::Resource(resource) => Some(self.handle_context(resource, ctor.span)),
            _ => None,
        };
        let mut constraints: SmallVec<[Constraint; 3]> = SmallVec::new();
        for constraint in &mut ctor.constraints {
            let span = constraint.span;
            match self.constraint(constraint, handle) {
                Some(arg) => constraints.push(Constraint { arg, span }),
                None => complete = false,
            }
        }
        if !complete {
            return None;
        }

        match self.typespace.create(layout, &params, &constraints) {
            Ok(ty) => Some(ty),
            Err(error) => {
                self.report_layout_error(error, target, ctor.span, &params);
                None
            }
        }
    }

    fn layout_kind(&mut self, target: Target, span: Span) -> Option<LayoutKind> {
        let Target::Decl(decl) = target else {
            self.expected_type(target, span);
            return None;
        };
        if let Some(builtin) = self.libraries.builtin_kind(decl) {
            if let Some(primitive) = PrimitiveSubtype::from_builtin(builtin) {
                return Some(LayoutKind::Primitive(primitive));
            }
            let layout = match builtin {
                BuiltinKind::String => LayoutKind::String,
                BuiltinKind::Vector => LayoutKind::Vector,
                BuiltinKind::Array => LayoutKind::Array,
                BuiltinKind::Box => LayoutKind::Box,
                BuiltinKind::ClientEnd => LayoutKind::Transport(TransportEnd::Client),
                BuiltinKind::ServerEnd => LayoutKind::Transport(TransportEnd::Server),
                BuiltinKind::FrameworkErr => LayoutKind::Internal(InternalSubtype::FrameworkErr),
                BuiltinKind::TransportErr => LayoutKind::Internal(InternalSubtype::TransportErr),
                _ => {
                    self.expected_type(target, span);
                    return None;
                }
            };
            return Some(layout);
        }

        let kind = self.libraries.decl(decl).kind;
        match kind {
            DeclKind::Struct
            | DeclKind::Table
            | DeclKind::Union
            | DeclKind::Enum
            | DeclKind::Bits
            | DeclKind::NewType => Some(LayoutKind::Decl { decl, kind }),
            DeclKind::Resource => Some(LayoutKind::Resource(decl)),
            DeclKind::Alias => {
                if !self.ensure_compiled(decl, span) {
                    return None;
                }
                let aliased = self.libraries.decl(decl).body.type_ctor()?.ty()?;
                Some(LayoutKind::Alias { aliased })
            }
            DeclKind::Const | DeclKind::Protocol | DeclKind::Service | DeclKind::Builtin => {
                self.expected_type(target, span);
                None
            }
        }
    }

    fn expected_type(&mut self, target: Target, span: Span) {
        self.reporter.error(SemanticProblem::ExpectedType {
            span,
            name: self.lookup.target_display(target, self.interner),
        });
    }

    /// `N` in `array<T, N>` parses as a type; make it a constant when it
    /// names one.
    fn reinterpret_parameter(&self, parameter: LayoutParameter) -> LayoutParameter {
        match parameter {
            LayoutParameter::Type(inner)
                if inner.parameters.is_empty()
                    && inner.constraints.is_empty()
                    && self.names_value(&inner.layout) =>
            {
                let span = inner.span;
                LayoutParameter::Constant(Constant::identifier(inner.layout, span))
            }
            other => other,
        }
    }

    fn names_value(&self, reference: &Reference) -> bool {
        match reference.target() {
            Some(Target::Decl(decl)) => self.libraries.decl(decl).kind == DeclKind::Const,
            Some(Target::Member(member)) => matches!(
                self.libraries.decl(member.decl).kind,
                DeclKind::Bits | DeclKind::Enum
            ),
            None => false,
        }
    }

    /// A size: any constant convertible to `uint32`.
    fn size(&mut self, value: &mut Constant) -> Option<u32> {
        if !self.resolve_constant(value, Some(TypeId::UINT32)) {
            return None;
        }
        value.value()?.as_u32()
    }

    fn handle_context(&mut self, resource: DeclId, span: Span) -> HandleContext {
        let mut context = HandleContext::default();
        if !self.ensure_compiled(resource, span) {
            return context;
        }
        for property in &self.libraries.decl(resource).members {
            if property.kind != MemberKind::ResourceProperty {
                continue;
            }
            let Some(ty) = property.type_ctor().and_then(TypeConstructor::ty) else {
                continue;
            };
            match self.interner.lookup(property.name) {
                "subtype" => {
                    if let Type::Identifier {
                        decl,
                        kind: DeclKind::Enum,
                        ..
                    } = *self.typespace.get(ty)
                    {
                        context.subtype = Some(decl);
                    }
                }
                "rights" => context.rights = Some(ty),
                _ => {}
            }
        }
        context
    }

    /// Work out what one constraint means. Returns `None` once a problem
    /// has been reported.
    fn constraint(
        &mut self,
        constant: &mut Constant,
        handle: Option<HandleContext>,
    ) -> Option<ConstraintArg> {
        let target = match &mut constant.kind {
            ConstantKind::Identifier(reference) => {
                if reference.is_contextual() && !self.resolve_contextual(reference, handle) {
                    return None;
                }
                Some(reference.target()?)
            }
            ConstantKind::Literal(_) | ConstantKind::BinaryOr { .. } => None,
        };

        match target {
            Some(Target::Decl(decl)) => {
                match self.libraries.builtin_kind(decl) {
                    Some(BuiltinKind::Optional) => return Some(ConstraintArg::Optional),
                    Some(BuiltinKind::Max) => return Some(ConstraintArg::Size(u32::MAX)),
                    _ => {}
                }
                match self.libraries.decl(decl).kind {
                    DeclKind::Protocol => return Some(ConstraintArg::Protocol(decl)),
                    DeclKind::Const => {}
                    _ => return Some(ConstraintArg::Decl(decl)),
                }
            }
            Some(Target::Member(member)) => {
                let subtype = handle.and_then(|context| context.subtype);
                if subtype == Some(member.decl) {
                    if !self.resolve_constant(constant, None) {
                        return None;
                    }
                    return constant
                        .value()
                        .and_then(|value| value.as_u32())
                        .map(ConstraintArg::HandleSubtype);
                }
            }
            None => {}
        }

        match handle {
            Some(context) => {
                let rights = context.rights.unwrap_or(TypeId::UINT32);
                if !self.resolve_constant(constant, Some(rights)) {
                    return None;
                }
                constant
                    .value()
                    .and_then(|value| value.as_u32())
                    .map(ConstraintArg::HandleRights)
            }
            None => self.size(constant).map(ConstraintArg::Size),
        }
    }

    /// Resolve a bare name in constraint position: a member of the handle
    /// subtype enum, or a declaration visible from the current library.
    fn resolve_contextual(
        &mut self,
        reference: &mut Reference,
        handle: Option<HandleContext>,
    ) -> bool {
        let Some(name) = reference.contextual_name() else {
            return false;
        };
        let member = handle
            .and_then(|context| context.subtype)
            .and_then(|subtype| self.lookup.member(subtype, name.name));
        let decl = self.lookup.decl_or_builtin(self.library, name.name);
        match (member, decl) {
            (Some(member), Some(decl)) => {
                self.reporter.error(SemanticProblem::AmbiguousContextualReference {
                    span: name.span,
                    name: self.interner.lookup(name.name).to_owned(),
                    member: self.lookup.member_display(member, self.interner),
                    decl: self.lookup.decl_display(decl, self.interner),
                });
                reference.mark_failed();
                false
            }
            (Some(member), None) => {
                reference.resolve_to(Target::Member(member));
                true
            }
            (None, Some(decl)) => {
                reference.resolve_to(Target::Decl(decl));
                true
            }
            (None, None) => {
                self.reporter.error(SemanticProblem::ContextualNameNotFound {
                    span: name.span,
                    name: self.interner.lookup(name.name).to_owned(),
                });
                reference.mark_failed();
                false
            }
        }
    }

    fn layout_name(&self, target: Target) -> String {
        match target {
            Target::Decl(decl) => match self.libraries.builtin_kind(decl) {
                Some(builtin) => builtin.name().to_owned(),
                None => self.lookup.decl_display(decl, self.interner),
            },
            Target::Member(_) => self.lookup.target_display(target, self.interner),
        }
    }

    fn report_layout_error(
        &mut self,
        error: LayoutError,
        target: Target,
        span: Span,
        params: &[Param],
    ) {
        let layout = self.layout_name(target);
        let problem = match error {
            LayoutError::WrongNumberOfParameters { expected, found } => {
                SemanticProblem::WrongNumberOfLayoutParameters {
                    span,
                    layout,
                    expected,
                    found,
                }
            }
            LayoutError::TooManyConstraints { max, found, span } => {
                SemanticProblem::TooManyConstraints {
                    span,
                    layout,
                    max,
                    found,
                }
            }
            LayoutError::CannotBeOptional { span } => {
                SemanticProblem::CannotBeOptional { span, layout }
            }
            LayoutError::UnexpectedConstraint { span } => {
                SemanticProblem::UnexpectedConstraint { span, layout }
            }
            LayoutError::ExpectedType { span } => {
                let name = params
                    .iter()
                    .find_map(|param| match param.arg {
                        ParamArg::Size(size) if param.span == span => Some(size.to_string()),
                        _ => None,
                    })
                    .unwrap_or(layout);
                SemanticProblem::ExpectedType { span, name }
            }
            LayoutError::ExpectedValue { span } => {
                SemanticProblem::ExpectedValueButGotType { span, layout }
            }
            LayoutError::BoxedTypeMustBeStruct { span } => {
                SemanticProblem::BoxedTypeMustBeStruct { span }
            }
            LayoutError::ProtocolConstraintRequired => {
                SemanticProblem::ProtocolConstraintRequired { span, layout }
            }
            LayoutError::MustBeAProtocol { span } => {
                SemanticProblem::MustBeAProtocol { span, layout }
            }
            LayoutError::CannotBoundTwice { span } => {
                SemanticProblem::CannotBoundTwice { span, layout }
            }
            LayoutError::CannotIndicateOptionalTwice { span } => {
                SemanticProblem::CannotIndicateOptionalTwice { span, layout }
            }
        };
        self.reporter.error(problem);
    }
}

