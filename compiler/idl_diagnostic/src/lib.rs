//! Diagnostic system for the IDL compiler.
//!
//! Every user-facing failure becomes a [`Diagnostic`]:
//! - an [`ErrorCode`] for searchability (`idlc explain E1001`)
//! - a message saying what went wrong
//! - a primary label saying where
//! - optional notes and suggestions
//!
//! The [`ErrorGuaranteed`] token is type-level proof that an error was
//! recorded, so a pass that gives up on an element cannot forget to say why.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
