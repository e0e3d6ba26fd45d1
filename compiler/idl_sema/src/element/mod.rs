//! The element model: libraries, declarations and their members.
//!
//! Everything is owned by one [`Libraries`] arena and addressed by index
//! handles. Handles are plain `Copy` values, so references between
//! elements never borrow the arena.

use std::fmt;

use smallvec::SmallVec;

use idl_ir::{Identifier, Name, Span, StringInterner};

use crate::attribute::AttributeList;
use crate::constant::Constant;
use crate::ordinal::Ordinal64;
use crate::reference::{Reference, Target};
use crate::type_ctor::TypeConstructor;


/// Index of a library in the [`Libraries`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct LibraryId(u32);

impl LibraryId {
    /// The root library holding the builtin declarations.
    pub const ROOT: LibraryId = LibraryId(0);

    pub const fn from_raw(raw: u32) -> Self {
        LibraryId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A declaration: its library plus its position in that library.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct DeclId {
    pub library: LibraryId,
    pub index: u32,
}

impl DeclId {
    pub const fn new(library: LibraryId, index: u32) -> Self {
        DeclId { library, index }
    }
}

/// A member: its owning declaration plus its position in that declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct MemberId {
    pub decl: DeclId,
    pub index: u32,
}

impl MemberId {
    pub const fn new(decl: DeclId, index: u32) -> Self {
        MemberId { decl, index }
    }
}

/// Any named element: a library, a declaration, or a member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Element {
    Library(LibraryId),
    Decl(DeclId),
    Member(MemberId),
}

/// Top-level declaration kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Alias,
    Bits,
    Builtin,
    Const,
    Enum,
    NewType,
    Protocol,
    Resource,
    Service,
    Struct,
    Table,
    Union,
}

/// Member kinds, one per kind of declaration that has members.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    BitsMember,
    EnumMember,
    StructMember,
    TableMember,
    UnionMember,
    ProtocolMethod,
    ProtocolCompose,
    ResourceProperty,
    ServiceMember,
}

/// Flat kind tag over every element, used for attribute placement and
/// messages. Matches on it are exhaustive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Library,
    Alias,
    Bits,
    BitsMember,
    Builtin,
    Const,
    Enum,
    EnumMember,
    NewType,
    Protocol,
    ProtocolCompose,
    ProtocolMethod,
    Resource,
    ResourceProperty,
    Service,
    ServiceMember,
    Struct,
    StructMember,
    Table,
    TableMember,
    Union,
    UnionMember,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Library => "library",
            ElementKind::Alias => "alias",
            ElementKind::Bits => "bits",
            ElementKind::BitsMember => "bits member",
            ElementKind::Builtin => "builtin",
            ElementKind::Const => "const",
            ElementKind::Enum => "enum",
            ElementKind::EnumMember => "enum member",
            ElementKind::NewType => "new type",
            ElementKind::Protocol => "protocol",
            ElementKind::ProtocolCompose => "protocol composition",
            ElementKind::ProtocolMethod => "method",
            ElementKind::Resource => "resource",
            ElementKind::ResourceProperty => "resource property",
            ElementKind::Service => "service",
            ElementKind::ServiceMember => "service member",
            ElementKind::Struct => "struct",
            ElementKind::StructMember => "struct member",
            ElementKind::Table => "table",
            ElementKind::TableMember => "table member",
            ElementKind::Union => "union",
            ElementKind::UnionMember => "union member",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeclKind> for ElementKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Alias => ElementKind::Alias,
            DeclKind::Bits => ElementKind::Bits,
            DeclKind::Builtin => ElementKind::Builtin,
            DeclKind::Const => ElementKind::Const,
            DeclKind::Enum => ElementKind::Enum,
            DeclKind::NewType => ElementKind::NewType,
            DeclKind::Protocol => ElementKind::Protocol,
            DeclKind::Resource => ElementKind::Resource,
            DeclKind::Service => ElementKind::Service,
            DeclKind::Struct => ElementKind::Struct,
            DeclKind::Table => ElementKind::Table,
            DeclKind::Union => ElementKind::Union,
        }
    }
}

impl From<MemberKind> for ElementKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::BitsMember => ElementKind::BitsMember,
            MemberKind::EnumMember => ElementKind::EnumMember,
            MemberKind::StructMember => ElementKind::StructMember,
            MemberKind::TableMember => ElementKind::TableMember,
            MemberKind::UnionMember => ElementKind::UnionMember,
            MemberKind::ProtocolMethod => ElementKind::ProtocolMethod,
            MemberKind::ProtocolCompose => ElementKind::ProtocolCompose,
            MemberKind::ResourceProperty => ElementKind::ResourceProperty,
            MemberKind::ServiceMember => ElementKind::ServiceMember,
        }
    }
}

/// Builtin declarations of the root library.
///
/// The discriminant is the declaration's index in the root library.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum BuiltinKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Vector,
    Array,
    Box,
    ClientEnd,
    ServerEnd,
    Byte,
    ZxUsize64,
    ZxUintptr64,
    Optional,
    /// The largest size bound, `vector<T>:MAX`.
    Max,
    FrameworkErr,
    TransportErr,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 24] = [
        BuiltinKind::Bool,
        BuiltinKind::Int8,
        BuiltinKind::Int16,
        BuiltinKind::Int32,
        BuiltinKind::Int64,
        BuiltinKind::Uint8,
        BuiltinKind::Uint16,
        BuiltinKind::Uint32,
        BuiltinKind::Uint64,
        BuiltinKind::Float32,
        BuiltinKind::Float64,
        BuiltinKind::String,
        BuiltinKind::Vector,
        BuiltinKind::Array,
        BuiltinKind::Box,
        BuiltinKind::ClientEnd,
        BuiltinKind::ServerEnd,
        BuiltinKind::Byte,
        BuiltinKind::ZxUsize64,
        BuiltinKind::ZxUintptr64,
        BuiltinKind::Optional,
        BuiltinKind::Max,
        BuiltinKind::FrameworkErr,
        BuiltinKind::TransportErr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Bool => "bool",
            BuiltinKind::Int8 => "int8",
            BuiltinKind::Int16 => "int16",
            BuiltinKind::Int32 => "int32",
            BuiltinKind::Int64 => "int64",
            BuiltinKind::Uint8 => "uint8",
            BuiltinKind::Uint16 => "uint16",
            BuiltinKind::Uint32 => "uint32",
            BuiltinKind::Uint64 => "uint64",
            BuiltinKind::Float32 => "float32",
            BuiltinKind::Float64 => "float64",
            BuiltinKind::String => "string",
            BuiltinKind::Vector => "vector",
            BuiltinKind::Array => "array",
            BuiltinKind::Box => "box",
            BuiltinKind::ClientEnd => "client_end",
            BuiltinKind::ServerEnd => "server_end",
            BuiltinKind::Byte => "byte",
            BuiltinKind::ZxUsize64 => "usize64",
            BuiltinKind::ZxUintptr64 => "uintptr64",
            BuiltinKind::Optional => "optional",
            BuiltinKind::Max => "MAX",
            BuiltinKind::FrameworkErr => "framework_err",
            BuiltinKind::TransportErr => "transport_err",
        }
    }

    /// Handle to this builtin's declaration in the root library.
    pub const fn decl_id(self) -> DeclId {
        DeclId::new(LibraryId::ROOT, self as u32)
    }

    fn from_index(index: u32) -> Option<BuiltinKind> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Compilation progress of one declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CompileState {
    #[default]
    NotCompiled,
    Compiling,
    Compiled,
}

/// Kind-specific payload of a declaration.
#[derive(Clone, Debug, Default)]
pub enum DeclBody {
    #[default]
    Empty,
    Builtin(BuiltinKind),
    /// Underlying type: the subtype of bits and enums, the `subtype` of a
    /// resource, or the target of an alias or new type.
    Type(TypeConstructor),
    Const {
        type_ctor: TypeConstructor,
        value: Constant,
    },
}

impl DeclBody {
    pub fn type_ctor(&self) -> Option<&TypeConstructor> {
        match self {
            DeclBody::Type(ctor) | DeclBody::Const { type_ctor: ctor, .. } => Some(ctor),
            DeclBody::Empty | DeclBody::Builtin(_) => None,
        }
    }
}

/// A top-level declaration.
#[derive(Clone, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: Name,
    /// Absent for builtins.
    pub span: Option<Span>,
    pub attributes: AttributeList,
    pub members: Vec<Member>,
    pub body: DeclBody,
    pub state: CompileState,
}

impl Decl {
    pub fn new(kind: DeclKind, name: Identifier) -> Self {
        Decl {
            kind,
            name: name.name,
            span: Some(name.span),
            attributes: AttributeList::default(),
            members: Vec::new(),
            body: DeclBody::Empty,
            state: CompileState::NotCompiled,
        }
    }

    /// A bits or enum declaration. With no subtype written, the subtype is
    /// `uint32` through a synthetic reference anchored at the name.
    ///
    /// # Panics
    /// Panics if `kind` is neither bits nor enum.
    pub fn bits_or_enum(kind: DeclKind, name: Identifier, subtype: Option<TypeConstructor>) -> Self {
        assert!(
            matches!(kind, DeclKind::Bits | DeclKind::Enum),
            "{kind:?} has no subtype"
        );
        let subtype = subtype.unwrap_or_else(|| {
            TypeConstructor::synthetic(Target::Decl(BuiltinKind::Uint32.decl_id()), name.span)
        });
        Decl::new(kind, name).with_body(DeclBody::Type(subtype))
    }

    fn builtin(kind: BuiltinKind, name: Name) -> Self {
        Decl {
            kind: DeclKind::Builtin,
            name,
            span: None,
            attributes: AttributeList::default(),
            members: Vec::new(),
            body: DeclBody::Builtin(kind),
            state: CompileState::Compiled,
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeList) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: DeclBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn builtin_kind(&self) -> Option<BuiltinKind> {
        match self.body {
            DeclBody::Builtin(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        self.kind.into()
    }
}

/// A protocol method.
#[derive(Clone, Debug, Default)]
pub struct Method {
    pub request: Option<TypeConstructor>,
    pub response: Option<TypeConstructor>,
    /// Set by the ordinal step.
    pub ordinal: Option<Ordinal64>,
}

/// Kind-specific payload of a member.
#[derive(Clone, Debug)]
pub enum MemberBody {
    /// Bits and enum members.
    Value(Constant),
    /// Struct, table, union and service members, and resource properties.
    Typed(TypeConstructor),
    Method(Method),
    /// `compose Other;` inside a protocol.
    Compose(Reference),
}

/// A member of a declaration.
#[derive(Clone, Debug)]
pub struct Member {
    pub kind: MemberKind,
    pub name: Name,
    pub span: Option<Span>,
    pub attributes: AttributeList,
    pub body: MemberBody,
}

impl Member {
    pub fn new(kind: MemberKind, name: Identifier, body: MemberBody) -> Self {
        Member {
            kind,
            name: name.name,
            span: Some(name.span),
            attributes: AttributeList::default(),
            body,
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeList) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn value(&self) -> Option<&Constant> {
        match &self.body {
            MemberBody::Value(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn type_ctor(&self) -> Option<&TypeConstructor> {
        match &self.body {
            MemberBody::Typed(ctor) => Some(ctor),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&Method> {
        match &self.body {
            MemberBody::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        self.kind.into()
    }
}

/// `using fuchsia.io as io;`
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Dependency {
    pub library: LibraryId,
    pub alias: Option<Name>,
    pub span: Option<Span>,
}

/// A library: a dotted name, its imports and its declarations.
#[derive(Clone, Debug)]
pub struct Library {
    pub name: SmallVec<[Name; 4]>,
    pub span: Option<Span>,
    pub attributes: AttributeList,
    pub dependencies: Vec<Dependency>,
    pub decls: Vec<Decl>,
}

impl Library {
    pub fn new(name: impl IntoIterator<Item = Name>) -> Self {
        Library {
            name: name.into_iter().collect(),
            span: None,
            attributes: AttributeList::default(),
            dependencies: Vec::new(),
            decls: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dependency(mut self, library: LibraryId, alias: Option<Name>) -> Self {
        self.dependencies.push(Dependency {
            library,
            alias,
            span: None,
        });
        self
    }

    #[must_use]
    pub fn with_decl(mut self, decl: Decl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Append a declaration, returning its position.
    pub fn push_decl(&mut self, decl: Decl) -> u32 {
        let index = u32::try_from(self.decls.len())
            .unwrap_or_else(|_| panic!("library exceeded u32::MAX declarations"));
        self.decls.push(decl);
        index
    }
}

/// Fully qualified name of a declaration or member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualifiedName {
    pub library: LibraryId,
    pub decl: Name,
    pub member: Option<Name>,
}

/// Arena owning every library of a compilation.
///
/// Library 0 is always the root library `fidl` holding the builtins.
#[derive(Clone, Debug)]
pub struct Libraries {
    libraries: Vec<Library>,
}

impl Libraries {
    /// Create an arena holding only the root library.
    pub fn new(interner: &StringInterner) -> Self {
        let mut root = Library::new([interner.intern("fidl")]);
        for kind in BuiltinKind::ALL {
            root.push_decl(Decl::builtin(kind, interner.intern(kind.name())));
        }
        Libraries {
            libraries: vec![root],
        }
    }

    /// Add a library. Dependencies must already be present.
    ///
    /// # Panics
    /// Panics if a dependency refers to a library not yet added.
    pub fn add(&mut self, library: Library) -> LibraryId {
        let id = LibraryId(
            u32::try_from(self.libraries.len())
                .unwrap_or_else(|_| panic!("too many libraries")),
        );
        for dep in &library.dependencies {
            assert!(
                dep.library < id,
                "library dependency {:?} must be added before its dependents",
                dep.library
            );
        }
        self.libraries.push(library);
        id
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn library(&self, id: LibraryId) -> &Library {
        &self.libraries[id.index()]
    }

    pub fn library_mut(&mut self, id: LibraryId) -> &mut Library {
        &mut self.libraries[id.index()]
    }

    /// Every library id in dependency order, root first.
    pub fn library_ids(&self) -> impl Iterator<Item = LibraryId> {
        (0..self.libraries.len()).map(|i| LibraryId(i as u32))
    }

    /// Every declaration in dependency order, builtins first.
    pub fn decl_ids(&self) -> Vec<DeclId> {
        self.library_ids()
            .flat_map(|lib| {
                (0..self.library(lib).decls.len()).map(move |i| DeclId::new(lib, i as u32))
            })
            .collect()
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.library(id.library).decls[id.index as usize]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.library_mut(id.library).decls[id.index as usize]
    }

    /// # Panics
    /// Panics if the owning declaration's members are checked out for
    /// compilation; callers only read members of compiled declarations.
    pub fn member(&self, id: MemberId) -> &Member {
        &self.decl(id.decl).members[id.index as usize]
    }

    /// The member, unless its declaration is being compiled.
    pub fn try_member(&self, id: MemberId) -> Option<&Member> {
        self.decl(id.decl).members.get(id.index as usize)
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut Member {
        &mut self.decl_mut(id.decl).members[id.index as usize]
    }

    /// The builtin a root declaration stands for, if `id` names one.
    pub fn builtin_kind(&self, id: DeclId) -> Option<BuiltinKind> {
        if id.library == LibraryId::ROOT {
            BuiltinKind::from_index(id.index)
        } else {
            None
        }
    }

    pub fn qualified_name(&self, decl: DeclId, member: Option<MemberId>) -> QualifiedName {
        QualifiedName {
            library: decl.library,
            decl: self.decl(decl).name,
            member: member.map(|m| self.member(m).name),
        }
    }

    /// `fuchsia.io`
    pub fn library_name(&self, id: LibraryId, interner: &StringInterner) -> String {
        join_components(&self.library(id).name, interner)
    }

    /// `fuchsia.io/Node.Open`
    pub fn display_name(&self, name: &QualifiedName, interner: &StringInterner) -> String {
        let mut out = self.library_name(name.library, interner);
        out.push('/');
        out.push_str(interner.lookup(name.decl));
        if let Some(member) = name.member {
            out.push('.');
            out.push_str(interner.lookup(member));
        }
        out
    }

    pub fn display_decl(&self, decl: DeclId, interner: &StringInterner) -> String {
        self.display_name(&self.qualified_name(decl, None), interner)
    }
}

pub(crate) fn join_components(components: &[Name], interner: &StringInterner) -> String {
    let mut out = String::new();
    for (i, component) in components.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(interner.lookup(*component));
    }
    out
}
