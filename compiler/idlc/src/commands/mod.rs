//! Driver commands.
//!
//! Each command validates its arguments and returns the text to print.

mod canonical;
mod explain;
mod ordinal;
mod selector;

pub use canonical::canonical_names;
pub use explain::explain_error;
pub use ordinal::method_ordinal;
pub use selector::check_selector;

#[cfg(test)]
mod tests;

/// Why a command could not produce output.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown error code '{0}'")]
    UnknownErrorCode(String),

    #[error("invalid library name '{0}'")]
    InvalidLibraryName(String),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}
