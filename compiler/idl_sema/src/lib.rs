//! IDL Sema - the semantic core of the IDL compiler.
//!
//! Takes libraries whose declarations hold unresolved references, raw
//! constants and raw attributes, and turns them into resolved elements,
//! typed constant values, canonical types and method ordinals.
//!
//! # Main Entry Points
//!
//! - [`compile_libraries`]: runs the whole pipeline
//! - [`Reference`]: the name-resolution state machine
//! - [`Typespace`]: canonical owner of every type
//! - [`generated_ordinal64`]: the method ordinal hash
//!
//! # Pipeline
//!
//! 1. `lookup`: name tables, declaration collisions
//! 2. `resolve`: every reference gets a key, then a target
//! 3. `compile`: types, constants and attributes, on demand
//! 4. `ordinal`: method ordinals and their uniqueness

pub mod attribute;
pub mod compile;
pub mod compiler;
pub mod constant;
pub mod element;
pub mod lookup;
pub mod ordinal;
pub mod problem;
pub mod reference;
pub mod reporter;
pub mod resolve;
pub mod testing;
pub mod type_ctor;
pub mod typespace;
mod visit;

pub use attribute::{Attribute, AttributeArg, AttributeList};
pub use compile::{narrow_constant, CompileStep};
pub use compiler::{compile_libraries, CompileConfig, CompileOutput};
pub use constant::{Constant, ConstantError, ConstantKind, ConstantValue, ConstantValueKind};
pub use element::{
    BuiltinKind, CompileState, Decl, DeclBody, DeclId, DeclKind, Element, ElementKind, Libraries,
    Library, LibraryId, Member, MemberBody, MemberId, MemberKind, Method, QualifiedName,
};
pub use lookup::Lookup;
pub use ordinal::{generated_ordinal64, is_valid_selector, selector, Ordinal64, OrdinalStep};
pub use problem::SemanticProblem;
pub use reference::{Key, RefState, Reference, Target};
pub use reporter::Reporter;
pub use resolve::ResolveStep;
pub use type_ctor::{LayoutParameter, TypeConstructor};
pub use typespace::{Type, TypeId, Typespace};
