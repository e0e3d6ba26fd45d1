//! Test support: building libraries without a parser.
//!
//! Every identifier gets a fresh, non-overlapping span so diagnostics can
//! be told apart by position.
//!
//! ```text
//! let mut fx = Fixture::new();
//! let lib = fx.library("test").with_decl(fx.struct_decl("S", vec![("a", fx.type_ctor("uint8"))]));
//! fx.add(lib);
//! let output = fx.compile();
//! ```

use std::cell::Cell;

use idl_ir::{
    CompoundIdentifier, Identifier, LiteralKind, Name, RawLiteral, Span, StringInterner,
};

use crate::attribute::{Attribute, AttributeArg, AttributeList};
use crate::compiler::{compile_libraries, CompileConfig, CompileOutput};
use crate::constant::Constant;
use crate::element::{
    Decl, DeclBody, DeclKind, Libraries, Library, LibraryId, Member, MemberBody, MemberKind,
    Method,
};
use crate::reference::Reference;
use crate::type_ctor::{LayoutParameter, TypeConstructor};

pub struct Fixture {
    pub interner: StringInterner,
    pub libraries: Libraries,
    next_offset: Cell<u32>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let libraries = Libraries::new(&interner);
        Fixture {
            interner,
            libraries,
            next_offset: Cell::new(0),
        }
    }

    fn fresh_span(&self, len: usize) -> Span {
        let start = self.next_offset.get();
        let end = start + u32::try_from(len).unwrap_or(u32::MAX - start);
        self.next_offset.set(end + 1);
        Span::new(start, end)
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn ident(&self, text: &str) -> Identifier {
        Identifier::new(self.interner.intern(text), self.fresh_span(text.len()))
    }

    pub fn compound(&self, dotted: &str) -> CompoundIdentifier {
        CompoundIdentifier::new(dotted.split('.').map(|part| self.ident(part)))
    }

    pub fn reference(&self, dotted: &str) -> Reference {
        Reference::sourced(self.compound(dotted))
    }

    /// `dotted` with no parameters or constraints.
    pub fn type_ctor(&self, dotted: &str) -> TypeConstructor {
        let identifier = self.compound(dotted);
        let span = identifier.span;
        TypeConstructor::new(Reference::sourced(identifier), span)
    }

    /// `dotted<params>:constraints`
    pub fn type_ctor_with(
        &self,
        dotted: &str,
        params: Vec<LayoutParameter>,
        constraints: Vec<Constant>,
    ) -> TypeConstructor {
        let mut ctor = self.type_ctor(dotted);
        ctor.parameters = params;
        ctor.constraints = constraints;
        ctor
    }

    pub fn numeric(&self, text: &str) -> Constant {
        Constant::literal(RawLiteral::new(
            LiteralKind::Numeric,
            text,
            self.fresh_span(text.len()),
        ))
    }

    /// A string literal; quotes are added.
    pub fn string(&self, contents: &str) -> Constant {
        let text = format!("\"{contents}\"");
        let span = self.fresh_span(text.len());
        Constant::literal(RawLiteral::new(LiteralKind::String, text, span))
    }

    pub fn boolean(&self, value: bool) -> Constant {
        let text = if value { "true" } else { "false" };
        Constant::literal(RawLiteral::new(
            LiteralKind::Bool,
            text,
            self.fresh_span(text.len()),
        ))
    }

    pub fn named(&self, dotted: &str) -> Constant {
        let identifier = self.compound(dotted);
        let span = identifier.span;
        Constant::identifier(Reference::sourced(identifier), span)
    }

    pub fn or(&self, left: Constant, right: Constant) -> Constant {
        let span = left.span.merge(right.span);
        Constant::binary_or(left, right, span)
    }

    /// `@name(args)`; an arg with no name is anonymous.
    pub fn attribute(&self, name: &str, args: Vec<(Option<&str>, Constant)>) -> Attribute {
        let name = self.ident(name);
        let args: Vec<AttributeArg> = args
            .into_iter()
            .map(|(arg_name, value)| {
                let arg_name = arg_name.map(|n| self.ident(n));
                let span = match arg_name {
                    Some(n) => n.span.merge(value.span),
                    None => value.span,
                };
                AttributeArg::new(arg_name, value, span, &self.interner)
            })
            .collect();
        let span = args
            .iter()
            .fold(name.span, |span, arg| span.merge(arg.span));
        Attribute::new(name, args, span, &self.interner)
    }

    pub fn doc_comment(&self, text: &str) -> Attribute {
        let raw = idl_ir::RawAttribute::doc_comment(text, self.fresh_span(text.len() + 3));
        Attribute::from_raw(&raw, &self.interner)
    }

    pub fn attributes(&self, attributes: Vec<Attribute>) -> AttributeList {
        AttributeList::new(attributes)
    }

    pub fn library(&self, dotted: &str) -> Library {
        Library::new(dotted.split('.').map(|part| self.interner.intern(part)))
    }

    pub fn add(&mut self, library: Library) -> LibraryId {
        self.libraries.add(library)
    }

    pub fn struct_decl(&self, name: &str, members: Vec<(&str, TypeConstructor)>) -> Decl {
        self.typed_decl(DeclKind::Struct, MemberKind::StructMember, name, members)
    }

    pub fn table_decl(&self, name: &str, members: Vec<(&str, TypeConstructor)>) -> Decl {
        self.typed_decl(DeclKind::Table, MemberKind::TableMember, name, members)
    }

    pub fn union_decl(&self, name: &str, members: Vec<(&str, TypeConstructor)>) -> Decl {
        self.typed_decl(DeclKind::Union, MemberKind::UnionMember, name, members)
    }

    pub fn service_decl(&self, name: &str, members: Vec<(&str, TypeConstructor)>) -> Decl {
        self.typed_decl(DeclKind::Service, MemberKind::ServiceMember, name, members)
    }

    fn typed_decl(
        &self,
        kind: DeclKind,
        member_kind: MemberKind,
        name: &str,
        members: Vec<(&str, TypeConstructor)>,
    ) -> Decl {
        let mut decl = Decl::new(kind, self.ident(name));
        for (member_name, ctor) in members {
            decl = decl.with_member(Member::new(
                member_kind,
                self.ident(member_name),
                MemberBody::Typed(ctor),
            ));
        }
        decl
    }

    pub fn enum_decl(
        &self,
        name: &str,
        subtype: Option<TypeConstructor>,
        members: Vec<(&str, Constant)>,
    ) -> Decl {
        self.valued_decl(DeclKind::Enum, MemberKind::EnumMember, name, subtype, members)
    }

    pub fn bits_decl(
        &self,
        name: &str,
        subtype: Option<TypeConstructor>,
        members: Vec<(&str, Constant)>,
    ) -> Decl {
        self.valued_decl(DeclKind::Bits, MemberKind::BitsMember, name, subtype, members)
    }

    fn valued_decl(
        &self,
        kind: DeclKind,
        member_kind: MemberKind,
        name: &str,
        subtype: Option<TypeConstructor>,
        members: Vec<(&str, Constant)>,
    ) -> Decl {
        let mut decl = Decl::bits_or_enum(kind, self.ident(name), subtype);
        for (member_name, value) in members {
            decl = decl.with_member(Member::new(
                member_kind,
                self.ident(member_name),
                MemberBody::Value(value),
            ));
        }
        decl
    }

    pub fn const_decl(&self, name: &str, type_ctor: TypeConstructor, value: Constant) -> Decl {
        Decl::new(DeclKind::Const, self.ident(name))
            .with_body(DeclBody::Const { type_ctor, value })
    }

    pub fn alias_decl(&self, name: &str, target: TypeConstructor) -> Decl {
        Decl::new(DeclKind::Alias, self.ident(name)).with_body(DeclBody::Type(target))
    }

    pub fn new_type_decl(&self, name: &str, target: TypeConstructor) -> Decl {
        Decl::new(DeclKind::NewType, self.ident(name)).with_body(DeclBody::Type(target))
    }

    /// `resource name : subtype { properties }`
    pub fn resource_decl(
        &self,
        name: &str,
        subtype: TypeConstructor,
        properties: Vec<(&str, TypeConstructor)>,
    ) -> Decl {
        let mut decl =
            Decl::new(DeclKind::Resource, self.ident(name)).with_body(DeclBody::Type(subtype));
        for (property, ctor) in properties {
            decl = decl.with_member(Member::new(
                MemberKind::ResourceProperty,
                self.ident(property),
                MemberBody::Typed(ctor),
            ));
        }
        decl
    }

    pub fn protocol_decl(&self, name: &str, members: Vec<Member>) -> Decl {
        members
            .into_iter()
            .fold(Decl::new(DeclKind::Protocol, self.ident(name)), Decl::with_member)
    }

    /// A method with no payloads.
    pub fn method(&self, name: &str) -> Member {
        Member::new(
            MemberKind::ProtocolMethod,
            self.ident(name),
            MemberBody::Method(Method::default()),
        )
    }

    pub fn method_with(
        &self,
        name: &str,
        request: Option<TypeConstructor>,
        response: Option<TypeConstructor>,
    ) -> Member {
        Member::new(
            MemberKind::ProtocolMethod,
            self.ident(name),
            MemberBody::Method(Method {
                request,
                response,
                ordinal: None,
            }),
        )
    }

    pub fn compose(&self, dotted: &str) -> Member {
        let identifier = self.compound(dotted);
        let name = *identifier
            .components
            .last()
            .unwrap_or_else(|| panic!("empty compound identifier"));
        Member::new(
            MemberKind::ProtocolCompose,
            name,
            MemberBody::Compose(Reference::sourced(identifier)),
        )
    }

    /// Compile everything added so far with unknown attributes allowed.
    /// The fixture is left with only the root library; its interner stays
    /// usable for rendering the output.
    pub fn compile(&mut self) -> CompileOutput {
        self.compile_with(&CompileConfig::default())
    }

    pub fn compile_with(&mut self, config: &CompileConfig) -> CompileOutput {
        let libraries = std::mem::replace(&mut self.libraries, Libraries::new(&self.interner));
        compile_libraries(libraries, &self.interner, config)
    }
}
