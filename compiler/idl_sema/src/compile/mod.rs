//! The compile step.
//!
//! Compiles every declaration of every user library: type constructors
//! become [`TypeId`]s, constants get values, attributes are checked
//! against their schemas. Declarations another one depends on (consts,
//! aliases, bits, enums, resources) are compiled on demand, so the step
//! needs no separate ordering pass.
//!
//! While a declaration compiles, its attributes, body and members are
//! checked out of the arena. Anything that would read them in that window
//! is a dependency cycle and is reported as one.

mod attributes;
mod constants;
mod types;

pub use constants::narrow_constant;

use std::mem;

use rustc_hash::FxHashMap;

use idl_ir::{Span, StringInterner};

use crate::element::{
    CompileState, DeclBody, DeclId, DeclKind, ElementKind, Libraries, LibraryId, Member,
    MemberBody,
};
use crate::lookup::Lookup;
use crate::problem::SemanticProblem;
use crate::reference::Target;
use crate::reporter::Reporter;
use crate::typespace::{PrimitiveSubtype, Type, TypeId, Typespace};

#[cfg(test)]
mod tests;

pub struct CompileStep<'a> {
    libraries: &'a mut Libraries,
    lookup: &'a Lookup,
    typespace: &'a mut Typespace,
    reporter: &'a mut Reporter,
    interner: &'a StringInterner,
    allow_unknown_attributes: bool,
    /// Library of the declaration being compiled; contextual names fall
    /// back to it.
    library: LibraryId,
}

impl<'a> CompileStep<'a> {
    pub fn new(
        libraries: &'a mut Libraries,
        lookup: &'a Lookup,
        typespace: &'a mut Typespace,
        reporter: &'a mut Reporter,
        interner: &'a StringInterner,
    ) -> Self {
        CompileStep {
            libraries,
            lookup,
            typespace,
            reporter,
            interner,
            allow_unknown_attributes: true,
            library: LibraryId::ROOT,
        }
    }

    #[must_use]
    pub fn allow_unknown_attributes(mut self, allow: bool) -> Self {
        self.allow_unknown_attributes = allow;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) {
        let library_ids: Vec<LibraryId> = self
            .libraries
            .library_ids()
            .filter(|&id| id != LibraryId::ROOT)
            .collect();
        for library_id in library_ids {
            self.library = library_id;
            let library = self.libraries.library_mut(library_id);
            let mut attributes = mem::take(&mut library.attributes);
            self.compile_attributes(&mut attributes, ElementKind::Library);
            self.libraries.library_mut(library_id).attributes = attributes;

            let decl_count = self.libraries.library(library_id).decls.len();
            for index in 0..decl_count {
                self.compile_decl(DeclId::new(library_id, index as u32));
            }
        }
        tracing::debug!(
            errors = self.reporter.error_count(),
            types = self.typespace.len(),
            "libraries compiled"
        );
    }

    /// Make sure `id` is compiled before something at `span` reads it.
    ///
    /// Returns `false` if `id` is mid-compilation, which means the read
    /// closes a cycle; the cycle is reported.
    fn ensure_compiled(&mut self, id: DeclId, span: Span) -> bool {
        match self.libraries.decl(id).state {
            CompileState::Compiled => true,
            CompileState::NotCompiled => {
                self.compile_decl(id);
                true
            }
            CompileState::Compiling => {
                self.reporter.error(SemanticProblem::IncludeCycle {
                    span,
                    decl: self.lookup.decl_display(id, self.interner),
                });
                false
            }
        }
    }

    fn compile_decl(&mut self, id: DeclId) {
        let decl = self.libraries.decl_mut(id);
        if decl.state != CompileState::NotCompiled {
            return;
        }
        decl.state = CompileState::Compiling;
        let kind = decl.kind;
        let span = decl.span.unwrap_or(Span::DUMMY);
        let mut attributes = mem::take(&mut decl.attributes);
        let mut body = mem::take(&mut decl.body);
        let mut members = mem::take(&mut decl.members);
        tracing::trace!(?id, ?kind, "compiling decl");

        let outer_library = mem::replace(&mut self.library, id.library);
        self.compile_attributes(&mut attributes, kind.into());
        for member in &mut members {
            let placement = member.element_kind();
            self.compile_attributes(&mut member.attributes, placement);
        }
        match kind {
            DeclKind::Builtin => {}
            DeclKind::Const => self.compile_const(&mut body),
            DeclKind::Bits | DeclKind::Enum => {
                self.compile_bits_or_enum(kind, span, &mut body, &mut members);
            }
            DeclKind::Alias | DeclKind::NewType => {
                if let DeclBody::Type(ctor) = &mut body {
                    self.compile_type_ctor(ctor);
                }
            }
            DeclKind::Resource => self.compile_resource(&mut body, &mut members),
            DeclKind::Struct
            | DeclKind::Table
            | DeclKind::Union
            | DeclKind::Service
            | DeclKind::Protocol => self.compile_members(&mut members),
        }
        self.library = outer_library;

        let decl = self.libraries.decl_mut(id);
        decl.attributes = attributes;
        decl.body = body;
        decl.members = members;
        decl.state = CompileState::Compiled;
    }

    fn compile_const(&mut self, body: &mut DeclBody) {
        let DeclBody::Const { type_ctor, value } = body else {
            return;
        };
        let Some(ty) = self.compile_type_ctor(type_ctor) else {
            return;
        };
        if !self.is_constable(ty) {
            self.reporter.error(SemanticProblem::InvalidConstantType {
                span: type_ctor.span,
                ty: self.display_type(ty),
            });
            return;
        }
        self.resolve_constant(value, Some(ty));
    }

    /// Types a const declaration may have.
    fn is_constable(&self, ty: TypeId) -> bool {
        match *self.typespace.get(ty) {
            Type::Primitive(_) => true,
            Type::String { nullability, .. } => !nullability.is_nullable(),
            Type::Identifier { kind, .. } => matches!(kind, DeclKind::Bits | DeclKind::Enum),
            _ => false,
        }
    }

    fn compile_bits_or_enum(
        &mut self,
        kind: DeclKind,
        span: Span,
        body: &mut DeclBody,
        members: &mut [Member],
    ) {
        let DeclBody::Type(subtype_ctor) = body else {
            return;
        };
        let Some(subtype) = self.compile_type_ctor(subtype_ctor) else {
            return;
        };
        let valid = match *self.typespace.get(subtype) {
            Type::Primitive(p) => p.is_integral() && (kind == DeclKind::Enum || p.is_unsigned()),
            _ => false,
        };
        if !valid {
            self.reporter.error(SemanticProblem::InvalidEnumSubtype {
                span: subtype_ctor.span,
                kind: kind.into(),
                ty: self.display_type(subtype),
            });
            return;
        }

        let mut seen: FxHashMap<i128, (String, Option<Span>)> = FxHashMap::default();
        for member in members.iter_mut() {
            let name = self.interner.lookup(member.name);
            let MemberBody::Value(value) = &mut member.body else {
                continue;
            };
            if !self.resolve_constant(value, Some(subtype)) {
                continue;
            }
            let Some(number) = value.value().and_then(|v| v.as_integer()) else {
                continue;
            };
            let member_span = member.span.unwrap_or(span);
            if kind == DeclKind::Bits && (number <= 0 || number & (number - 1) != 0) {
                self.reporter.error(SemanticProblem::BitsMemberNotPowerOfTwo {
                    span: member_span,
                    member: name.to_owned(),
                    value: number.to_string(),
                });
            }
            if let Some((previous, previous_span)) = seen.get(&number) {
                self.reporter.error(SemanticProblem::DuplicateMemberValue {
                    span: member_span,
                    member: name.to_owned(),
                    previous: previous.clone(),
                    previous_span: *previous_span,
                    value: number.to_string(),
                });
                continue;
            }
            seen.insert(number, (name.to_owned(), member.span));
        }
    }

    fn compile_resource(&mut self, body: &mut DeclBody, members: &mut [Member]) {
        if let DeclBody::Type(subtype_ctor) = body {
            if let Some(subtype) = self.compile_type_ctor(subtype_ctor) {
                if subtype != TypeId::primitive(PrimitiveSubtype::Uint32) {
                    self.reporter.error(SemanticProblem::InvalidEnumSubtype {
                        span: subtype_ctor.span,
                        kind: ElementKind::Resource,
                        ty: self.display_type(subtype),
                    });
                }
            }
        }
        self.compile_members(members);
    }

    /// Compile the type constructors members hold.
    fn compile_members(&mut self, members: &mut [Member]) {
        for member in members {
            match &mut member.body {
                MemberBody::Typed(ctor) => {
                    self.compile_type_ctor(ctor);
                }
                MemberBody::Method(method) => {
                    if let Some(request) = &mut method.request {
                        self.compile_type_ctor(request);
                    }
                    if let Some(response) = &mut method.response {
                        self.compile_type_ctor(response);
                    }
                }
                MemberBody::Compose(reference) => {
                    let span = reference.source_span().or(member.span).unwrap_or(Span::DUMMY);
                    self.check_compose(reference.target(), span);
                }
                MemberBody::Value(_) => {}
            }
        }
    }

    /// A protocol may only compose other protocols.
    fn check_compose(&mut self, target: Option<Target>, span: Span) {
        let Some(target) = target else {
            return;
        };
        let kind = match target {
            Target::Decl(decl) => match self.libraries.decl(decl).kind {
                DeclKind::Protocol => return,
                kind => ElementKind::from(kind),
            },
            Target::Member(member) => match self.libraries.try_member(member) {
                Some(member) => member.element_kind(),
                None => ElementKind::from(self.libraries.decl(member.decl).kind),
            },
        };
        self.reporter.error(SemanticProblem::ComposingNonProtocol {
            span,
            name: self.lookup.target_display(target, self.interner),
            kind,
        });
    }

    fn display_type(&self, ty: TypeId) -> String {
        self.typespace.display(ty, self.libraries, self.interner)
    }
}
