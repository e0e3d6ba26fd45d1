//! Type constructors: `layout<parameters>:constraints` as written.

use idl_ir::Span;

use crate::constant::Constant;
use crate::reference::{Reference, Target};
use crate::typespace::TypeId;

/// One layout parameter.
///
/// A bare identifier such as `N` in `array<T, N>` is parsed as a type
/// constructor with no parameters; compilation reinterprets it as a
/// constant when it resolves to one.
#[derive(Clone, Debug)]
pub enum LayoutParameter {
    Type(TypeConstructor),
    Constant(Constant),
}

impl LayoutParameter {
    pub fn span(&self) -> Span {
        match self {
            LayoutParameter::Type(ctor) => ctor.span,
            LayoutParameter::Constant(constant) => constant.span,
        }
    }
}

#[derive(Debug)]
pub struct TypeConstructor {
    pub layout: Reference,
    pub parameters: Vec<LayoutParameter>,
    pub constraints: Vec<Constant>,
    pub span: Span,
    compiled: bool,
    resolved: Option<TypeId>,
}

impl TypeConstructor {
    pub fn new(layout: Reference, span: Span) -> Self {
        TypeConstructor {
            layout,
            parameters: Vec::new(),
            constraints: Vec::new(),
            span,
            compiled: false,
            resolved: None,
        }
    }

    /// A constructor the compiler made, e.g. the `uint32` subtype of an
    /// enum that names none. `span` is the construct it was made for.
    pub fn synthetic(target: Target, span: Span) -> Self {
        TypeConstructor::new(Reference::synthetic(target), span)
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: LayoutParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constant) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// The type this constructor denotes, once compiled successfully.
    pub fn ty(&self) -> Option<TypeId> {
        self.resolved
    }

    pub(crate) fn set_compiled(&mut self, resolved: Option<TypeId>) {
        self.compiled = true;
        self.resolved = resolved;
    }
}

/// Cloning yields an uncompiled copy.
impl Clone for TypeConstructor {
    fn clone(&self) -> Self {
        TypeConstructor {
            layout: self.layout.clone(),
            parameters: self.parameters.clone(),
            constraints: self.constraints.clone(),
            span: self.span,
            compiled: false,
            resolved: None,
        }
    }
}
