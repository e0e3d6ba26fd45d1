//! Method ordinals.
//!
//! A method's ordinal is derived from the SHA-256 digest of its fully
//! qualified selector, `library.path/Protocol.Selector`: the first eight
//! digest bytes read little-endian, with the top bit cleared.

mod step;

pub use step::OrdinalStep;

use sha2::{Digest, Sha256};

use idl_ir::{is_valid_identifier, is_valid_library_component, Span};

use crate::attribute::AttributeList;


/// Ordinals never use the top bit; it is reserved by the wire format.
const ORDINAL_MASK: u64 = 0x7fff_ffff_ffff_ffff;

/// A 64-bit method ordinal and the construct it was computed for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ordinal64 {
    value: u64,
    span: Span,
}

impl Ordinal64 {
    pub fn value(self) -> u64 {
        self.value
    }

    pub fn span(self) -> Span {
        self.span
    }
}

/// The selector of a method: the `@selector` argument if present and
/// compiled, else the method's own name.
pub fn selector<'a>(attributes: &'a AttributeList, method_name: &'a str) -> &'a str {
    attributes
        .get("selector")
        .and_then(|attribute| attribute.get_arg("value"))
        .and_then(|arg| arg.value.value())
        .and_then(|value| value.as_str())
        .unwrap_or(method_name)
}

/// Compute the ordinal of `selector` on `protocol` in the library named by
/// `library`.
///
/// A selector containing `/` is already fully qualified and is hashed as
/// written.
pub fn generated_ordinal64(
    library: &[&str],
    protocol: &str,
    selector: &str,
    span: Span,
) -> Ordinal64 {
    let qualified = if selector.contains('/') {
        selector.to_owned()
    } else {
        format!("{}/{protocol}.{selector}", library.join("."))
    };
    let digest = Sha256::digest(qualified.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    Ordinal64 {
        value: u64::from_le_bytes(prefix) & ORDINAL_MASK,
        span,
    }
}

/// Check a `@selector` value: either an identifier, or
/// `library.path/Protocol.Method`.
pub fn is_valid_selector(selector: &str) -> bool {
    let Some((library, rest)) = selector.split_once('/') else {
        return is_valid_identifier(selector);
    };
    let Some((protocol, method)) = rest.split_once('.') else {
        return false;
    };
    !library.is_empty()
        && library.split('.').all(is_valid_library_component)
        && is_valid_identifier(protocol)
        && is_valid_identifier(method)
}
