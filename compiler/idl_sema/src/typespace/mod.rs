//! The typespace: every distinct type of a compilation, stored once.
//!
//! A [`Type`] is a plain value. Interning it yields a [`TypeId`], and two
//! structurally equal types always yield the same id, so type identity is
//! id equality. Primitive and internal types live at fixed ids.

mod create;

pub use create::{Constraint, ConstraintArg, LayoutError, LayoutKind, Param, ParamArg};

use rustc_hash::FxHashMap;

use idl_ir::StringInterner;

use crate::constant::ConstantValueKind;
use crate::element::{BuiltinKind, DeclId, DeclKind, Libraries};


/// Handle to an interned [`Type`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeId(u32);

impl TypeId {
    pub const BOOL: TypeId = TypeId(0);
    pub const INT8: TypeId = TypeId(1);
    pub const INT16: TypeId = TypeId(2);
    pub const INT32: TypeId = TypeId(3);
    pub const INT64: TypeId = TypeId(4);
    pub const UINT8: TypeId = TypeId(5);
    pub const UINT16: TypeId = TypeId(6);
    pub const UINT32: TypeId = TypeId(7);
    pub const UINT64: TypeId = TypeId(8);
    pub const ZX_USIZE64: TypeId = TypeId(9);
    pub const ZX_UINTPTR64: TypeId = TypeId(10);
    pub const FLOAT32: TypeId = TypeId(11);
    pub const FLOAT64: TypeId = TypeId(12);
    pub const FRAMEWORK_ERR: TypeId = TypeId(13);
    pub const TRANSPORT_ERR: TypeId = TypeId(14);
    pub const UNTYPED_NUMERIC: TypeId = TypeId(15);
    pub const UNBOUNDED_STRING: TypeId = TypeId(16);

    /// Number of pre-populated entries.
    const FIXED: u32 = 17;

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn primitive(subtype: PrimitiveSubtype) -> TypeId {
        TypeId(subtype as u32)
    }

    pub const fn internal(subtype: InternalSubtype) -> TypeId {
        match subtype {
            InternalSubtype::FrameworkErr => TypeId::FRAMEWORK_ERR,
            InternalSubtype::TransportErr => TypeId::TRANSPORT_ERR,
        }
    }
}

/// Scalar types. The discriminant is the fixed [`TypeId`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum PrimitiveSubtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    ZxUsize64,
    ZxUintptr64,
    Float32,
    Float64,
}

impl PrimitiveSubtype {
    pub const ALL: [PrimitiveSubtype; 13] = [
        PrimitiveSubtype::Bool,
        PrimitiveSubtype::Int8,
        PrimitiveSubtype::Int16,
        PrimitiveSubtype::Int32,
        PrimitiveSubtype::Int64,
        PrimitiveSubtype::Uint8,
        PrimitiveSubtype::Uint16,
        PrimitiveSubtype::Uint32,
        PrimitiveSubtype::Uint64,
        PrimitiveSubtype::ZxUsize64,
        PrimitiveSubtype::ZxUintptr64,
        PrimitiveSubtype::Float32,
        PrimitiveSubtype::Float64,
    ];

    pub fn name(self) -> &'static str {
        self.value_kind().as_str()
    }

    pub fn value_kind(self) -> ConstantValueKind {
        match self {
            PrimitiveSubtype::Bool => ConstantValueKind::Bool,
            PrimitiveSubtype::Int8 => ConstantValueKind::Int8,
            PrimitiveSubtype::Int16 => ConstantValueKind::Int16,
            PrimitiveSubtype::Int32 => ConstantValueKind::Int32,
            PrimitiveSubtype::Int64 => ConstantValueKind::Int64,
            PrimitiveSubtype::Uint8 => ConstantValueKind::Uint8,
            PrimitiveSubtype::Uint16 => ConstantValueKind::Uint16,
            PrimitiveSubtype::Uint32 => ConstantValueKind::Uint32,
            PrimitiveSubtype::Uint64 => ConstantValueKind::Uint64,
            PrimitiveSubtype::ZxUsize64 => ConstantValueKind::ZxUsize64,
            PrimitiveSubtype::ZxUintptr64 => ConstantValueKind::ZxUintptr64,
            PrimitiveSubtype::Float32 => ConstantValueKind::Float32,
            PrimitiveSubtype::Float64 => ConstantValueKind::Float64,
        }
    }

    pub fn is_integral(self) -> bool {
        self.value_kind().is_integral()
    }

    /// `uint8` through `uint64`, the types bits may have.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveSubtype::Uint8
                | PrimitiveSubtype::Uint16
                | PrimitiveSubtype::Uint32
                | PrimitiveSubtype::Uint64
        )
    }

    /// The primitive a builtin declaration names, if any.
    pub fn from_builtin(kind: BuiltinKind) -> Option<PrimitiveSubtype> {
        let subtype = match kind {
            BuiltinKind::Bool => PrimitiveSubtype::Bool,
            BuiltinKind::Int8 => PrimitiveSubtype::Int8,
            BuiltinKind::Int16 => PrimitiveSubtype::Int16,
            BuiltinKind::Int32 => PrimitiveSubtype::Int32,
            BuiltinKind::Int64 => PrimitiveSubtype::Int64,
            BuiltinKind::Uint8 | BuiltinKind::Byte => PrimitiveSubtype::Uint8,
            BuiltinKind::Uint16 => PrimitiveSubtype::Uint16,
            BuiltinKind::Uint32 => PrimitiveSubtype::Uint32,
            BuiltinKind::Uint64 => PrimitiveSubtype::Uint64,
            BuiltinKind::ZxUsize64 => PrimitiveSubtype::ZxUsize64,
            BuiltinKind::ZxUintptr64 => PrimitiveSubtype::ZxUintptr64,
            BuiltinKind::Float32 => PrimitiveSubtype::Float32,
            BuiltinKind::Float64 => PrimitiveSubtype::Float64,
            _ => return None,
        };
        Some(subtype)
    }
}

/// Types only the compiler can name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InternalSubtype {
    FrameworkErr,
    TransportErr,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Nullability {
    Nullable,
    Nonnullable,
}

impl Nullability {
    pub fn is_nullable(self) -> bool {
        self == Nullability::Nullable
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TransportEnd {
    Client,
    Server,
}

/// A type value. Compare through [`TypeId`] after interning.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Primitive(PrimitiveSubtype),
    Internal(InternalSubtype),
    /// Type of a numeric literal compiled with no expected type.
    UntypedNumeric,
    String {
        max_size: Option<u32>,
        nullability: Nullability,
    },
    Vector {
        element: TypeId,
        max_size: Option<u32>,
        nullability: Nullability,
    },
    Array {
        element: TypeId,
        size: u32,
    },
    Handle {
        resource: DeclId,
        subtype: Option<u32>,
        rights: Option<u32>,
        nullability: Nullability,
    },
    TransportSide {
        end: TransportEnd,
        protocol: DeclId,
        nullability: Nullability,
    },
    /// `box<Struct>`, always nullable.
    Box {
        boxed: TypeId,
    },
    /// A user declaration used as a type: struct, table, union, enum, bits
    /// or new type.
    Identifier {
        decl: DeclId,
        kind: DeclKind,
        nullability: Nullability,
    },
}

impl Type {
    pub fn nullability(&self) -> Nullability {
        match *self {
            Type::String { nullability, .. }
            | Type::Vector { nullability, .. }
            | Type::Handle { nullability, .. }
            | Type::TransportSide { nullability, .. }
            | Type::Identifier { nullability, .. } => nullability,
            Type::Box { .. } => Nullability::Nullable,
            Type::Primitive(_)
            | Type::Internal(_)
            | Type::UntypedNumeric
            | Type::Array { .. } => Nullability::Nonnullable,
        }
    }
}

/// Size bound of a string or vector; `u32::MAX` is the same as no bound.
pub(crate) fn size_bound(max_size: u32) -> Option<u32> {
    (max_size != u32::MAX).then_some(max_size)
}

/// Owner of every [`Type`] of a compilation.
#[derive(Clone, Debug)]
pub struct Typespace {
    types: Vec<Type>,
    index: FxHashMap<Type, TypeId>,
}

impl Default for Typespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Typespace {
    /// Create a typespace holding the primitive and internal types.
    pub fn new() -> Self {
        let mut typespace = Typespace {
            types: Vec::with_capacity(64),
            index: FxHashMap::default(),
        };
        for subtype in PrimitiveSubtype::ALL {
            typespace.intern(Type::Primitive(subtype));
        }
        typespace.intern(Type::Internal(InternalSubtype::FrameworkErr));
        typespace.intern(Type::Internal(InternalSubtype::TransportErr));
        typespace.intern(Type::UntypedNumeric);
        typespace.intern(Type::String {
            max_size: None,
            nullability: Nullability::Nonnullable,
        });
        debug_assert_eq!(typespace.types.len(), TypeId::FIXED as usize);
        typespace
    }

    /// Store `ty` if new; either way return its id.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.index.get(&ty) {
            return id;
        }
        let id = TypeId(
            u32::try_from(self.types.len())
                .unwrap_or_else(|_| panic!("typespace exceeded u32::MAX types")),
        );
        self.types.push(ty);
        self.index.insert(ty, id);
        id
    }

    /// # Panics
    /// Panics if `id` did not come from this typespace.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `string:max_size`, non-nullable. `string:MAX` is the unbounded
    /// string.
    pub fn string_type(&mut self, max_size: u32) -> TypeId {
        self.intern(Type::String {
            max_size: size_bound(max_size),
            nullability: Nullability::Nonnullable,
        })
    }

    pub fn unbounded_string_type(&self) -> TypeId {
        TypeId::UNBOUNDED_STRING
    }

    pub fn untyped_numeric_type(&self) -> TypeId {
        TypeId::UNTYPED_NUMERIC
    }

    /// The constant-value kind values of this type hold, if it has one.
    ///
    /// Bits and enum types are looked through to their subtype by the
    /// caller, which knows the declarations.
    pub fn value_kind(&self, id: TypeId) -> Option<ConstantValueKind> {
        match self.get(id) {
            Type::Primitive(subtype) => Some(subtype.value_kind()),
            Type::String { .. } => Some(ConstantValueKind::String),
            _ => None,
        }
    }

    /// Human readable rendering, e.g. `vector<string:64>:optional`.
    pub fn display(&self, id: TypeId, libraries: &Libraries, interner: &StringInterner) -> String {
        let mut constraints: Vec<String> = Vec::new();
        let base = match *self.get(id) {
            Type::Primitive(subtype) => subtype.name().to_owned(),
            Type::Internal(InternalSubtype::FrameworkErr) => "framework_err".to_owned(),
            Type::Internal(InternalSubtype::TransportErr) => "transport_err".to_owned(),
            Type::UntypedNumeric => "untyped numeric".to_owned(),
            Type::String { max_size, .. } => {
                constraints.extend(max_size.map(|n| n.to_string()));
                "string".to_owned()
            }
            Type::Vector {
                element, max_size, ..
            } => {
                constraints.extend(max_size.map(|n| n.to_string()));
                format!("vector<{}>", self.display(element, libraries, interner))
            }
            Type::Array { element, size } => {
                format!("array<{}, {size}>", self.display(element, libraries, interner))
            }
            Type::Handle {
                resource,
                subtype,
                rights,
                ..
            } => {
                constraints.extend(subtype.map(|s| s.to_string()));
                constraints.extend(rights.map(|r| format!("{r:#x}")));
                libraries.display_decl(resource, interner)
            }
            Type::TransportSide { end, protocol, .. } => {
                constraints.push(libraries.display_decl(protocol, interner));
                match end {
                    TransportEnd::Client => "client_end".to_owned(),
                    TransportEnd::Server => "server_end".to_owned(),
                }
            }
            Type::Box { boxed } => format!("box<{}>", self.display(boxed, libraries, interner)),
            Type::Identifier { decl, .. } => libraries.display_decl(decl, interner),
        };
        if !matches!(self.get(id), Type::Box { .. }) && self.get(id).nullability().is_nullable() {
            constraints.push("optional".to_owned());
        }
        match constraints.len() {
            0 => base,
            1 => format!("{base}:{}", constraints[0]),
            _ => format!("{base}:<{}>", constraints.join(", ")),
        }
    }
}
