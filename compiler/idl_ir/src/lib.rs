//! IDL IR - shared vocabulary for the IDL compiler.
//!
//! This crate holds the pieces every later phase agrees on:
//! - Spans for source locations (file + byte range)
//! - Names for interned identifiers
//! - Canonical-name rules used for collision and attribute lookups
//! - Raw syntax inputs handed over by the parser: compound identifiers,
//!   literal tokens and attribute lists
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier strings become `Name(u32)`
//! - **Spans Everywhere**: anything that came from source keeps its `Span`
//! - **Raw Means Unresolved**: nothing in [`raw`] knows what a name denotes

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod canonical;
mod interner;
mod name;
pub mod raw;
mod span;

pub use canonical::{canonicalize, is_valid_identifier, is_valid_library_component};
pub use interner::{StringInterner, StringLookup};
pub use name::Name;
pub use raw::{
    AttributeProvenance, CompoundIdentifier, Identifier, LiteralKind, RawAttribute,
    RawAttributeArg, RawConstant, RawLiteral,
};
pub use span::{FileId, Span, SpanError};
