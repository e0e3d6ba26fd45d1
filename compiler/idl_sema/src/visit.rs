//! Walking every reference an element holds.

use idl_ir::Span;

use crate::attribute::AttributeList;
use crate::constant::{Constant, ConstantKind};
use crate::element::{Decl, DeclBody, Library, MemberBody};
use crate::reference::Reference;
use crate::type_ctor::{LayoutParameter, TypeConstructor};

/// Where a reference sits.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RefSite {
    /// Nearest enclosing source construct; diagnostics about synthetic
    /// references point here.
    pub anchor: Span,
    /// A bare name here may mean a member of whatever the layout expects.
    pub allow_contextual: bool,
}

pub(crate) fn library_attributes<F>(library: &mut Library, f: &mut F)
where
    F: FnMut(&mut Reference, RefSite),
{
    attributes(&mut library.attributes, f);
}

/// Visit references of a declaration in source order: attributes, body,
/// then members.
pub(crate) fn decl<F>(decl: &mut Decl, f: &mut F)
where
    F: FnMut(&mut Reference, RefSite),
{
    attributes(&mut decl.attributes, f);
    match &mut decl.body {
        DeclBody::Empty | DeclBody::Builtin(_) => {}
        DeclBody::Type(ctor) => type_ctor(ctor, f),
        DeclBody::Const { type_ctor: ctor, value } => {
            type_ctor(ctor, f);
            constant(value, false, f);
        }
    }
    for member in &mut decl.members {
        attributes(&mut member.attributes, f);
        match &mut member.body {
            MemberBody::Value(value) => constant(value, false, f),
            MemberBody::Typed(ctor) => type_ctor(ctor, f),
            MemberBody::Method(method) => {
                if let Some(request) = &mut method.request {
                    type_ctor(request, f);
                }
                if let Some(response) = &mut method.response {
                    type_ctor(response, f);
                }
            }
            MemberBody::Compose(reference) => {
                let anchor = member.span.unwrap_or(Span::DUMMY);
                f(
                    reference,
                    RefSite {
                        anchor,
                        allow_contextual: false,
                    },
                );
            }
        }
    }
}

fn attributes<F>(list: &mut AttributeList, f: &mut F)
where
    F: FnMut(&mut Reference, RefSite),
{
    for attribute in list.iter_mut() {
        for arg in &mut attribute.args {
            constant(&mut arg.value, false, f);
        }
    }
}

fn type_ctor<F>(ctor: &mut TypeConstructor, f: &mut F)
where
    F: FnMut(&mut Reference, RefSite),
{
    f(
        &mut ctor.layout,
        RefSite {
            anchor: ctor.span,
            allow_contextual: false,
        },
    );
    for parameter in &mut ctor.parameters {
        match parameter {
            LayoutParameter::Type(inner) => type_ctor(inner, f),
            LayoutParameter::Constant(value) => constant(value, false, f),
        }
    }
    for constraint in &mut ctor.constraints {
        constant(constraint, true, f);
    }
}

fn constant<F>(value: &mut Constant, allow_contextual: bool, f: &mut F)
where
    F: FnMut(&mut Reference, RefSite),
{
    let anchor = value.span;
    match &mut value.kind {
        ConstantKind::Identifier(reference) => f(
            reference,
            RefSite {
                anchor,
                allow_contextual,
            },
        ),
        ConstantKind::Literal(_) => {}
        ConstantKind::BinaryOr { left, right } => {
            constant(left, false, f);
            constant(right, false, f);
        }
    }
}
