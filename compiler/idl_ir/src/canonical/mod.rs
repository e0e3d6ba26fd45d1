//! Canonical names.
//!
//! Two identifiers collide when their canonical forms are equal, so `FooBar`,
//! `foo_bar` and `FOO_BAR` all denote the same attribute or declaration.
//! The canonical form is lower snake case.

/// Convert an identifier to its canonical lower snake case form.
///
/// A word boundary is inserted before an uppercase letter that follows a
/// lowercase letter or digit, and before an uppercase letter that starts a
/// new lowercase run (`HTTPServer` becomes `http_server`). Runs of
/// underscores collapse into one.
pub fn canonicalize(identifier: &str) -> String {
    let bytes = identifier.as_bytes();
    let mut canonical = String::with_capacity(identifier.len() + 4);
    let mut prev = b'_';
    for (i, &c) in bytes.iter().enumerate() {
        if c == b'_' {
            if prev != b'_' {
                canonical.push('_');
            }
        } else {
            let after_lower = (prev.is_ascii_lowercase() || prev.is_ascii_digit())
                && c.is_ascii_uppercase();
            let starts_word = prev != b'_'
                && c.is_ascii_uppercase()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
            if after_lower || starts_word {
                canonical.push('_');
            }
            canonical.push(char::from(c.to_ascii_lowercase()));
        }
        prev = c;
    }
    canonical
}

/// Check `[a-zA-Z]([a-zA-Z0-9_]*[a-zA-Z0-9])?`.
pub fn is_valid_identifier(identifier: &str) -> bool {
    let bytes = identifier.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphabetic()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

/// Check `[a-z][a-z0-9]*` for one dot-separated library name component.
pub fn is_valid_library_component(component: &str) -> bool {
    let mut bytes = component.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_lowercase())
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests;
