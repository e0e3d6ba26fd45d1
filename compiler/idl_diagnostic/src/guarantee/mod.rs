//! Proof that an error was emitted.

use std::fmt;

/// Zero-sized proof that at least one error diagnostic was recorded.
///
/// Only the reporting paths can mint one, so a function returning
/// `Result<T, ErrorGuaranteed>` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Mint a token. Call only right after recording an error.
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Mint a token for reporters living outside this crate.
    ///
    /// The caller asserts it has just stored an error-severity problem.
    pub const fn new_unchecked() -> Self {
        ErrorGuaranteed(())
    }

    /// Get a token if `count` errors were emitted and `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
