//! The pipeline: lookup, resolve, compile, ordinals.

use idl_diagnostic::{Diagnostic, DiagnosticConfig, ErrorGuaranteed};
use idl_ir::StringInterner;

use crate::compile::CompileStep;
use crate::element::Libraries;
use crate::lookup::Lookup;
use crate::ordinal::OrdinalStep;
use crate::problem::SemanticProblem;
use crate::reporter::Reporter;
use crate::resolve::ResolveStep;
use crate::typespace::Typespace;

/// Knobs for one compilation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CompileConfig {
    /// Stop rendering diagnostics after this many errors; 0 means no limit.
    pub error_limit: usize,
    pub warnings_as_errors: bool,
    /// Accept attributes the compiler has no schema for without a warning.
    pub allow_unknown_attributes: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            error_limit: 0,
            warnings_as_errors: false,
            allow_unknown_attributes: true,
        }
    }
}

/// Everything a compilation produces.
#[derive(Debug)]
pub struct CompileOutput {
    /// Every reference is now resolved or failed.
    pub libraries: Libraries,
    pub typespace: Typespace,
    pub reporter: Reporter,
    error_limit: usize,
}

impl CompileOutput {
    pub fn problems(&self) -> &[SemanticProblem] {
        self.reporter.problems()
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.reporter.has_errors()
    }

    /// Render the collected problems, sorted and capped by the configured
    /// error limit.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.reporter.diagnostics(DiagnosticConfig {
            error_limit: self.error_limit,
            deduplicate: true,
        })
    }
}

/// Resolve and compile `libraries`.
///
/// Every step runs even after errors, so one compilation reports as many
/// independent problems as it can find.
#[tracing::instrument(level = "debug", skip_all, fields(libraries = libraries.len()))]
pub fn compile_libraries(
    mut libraries: Libraries,
    interner: &StringInterner,
    config: &CompileConfig,
) -> CompileOutput {
    let mut reporter = Reporter::new(config.warnings_as_errors);
    let mut typespace = Typespace::new();

    let lookup = Lookup::build(&libraries, interner, &mut reporter);
    ResolveStep::new(&lookup, interner, &mut reporter).run(&mut libraries);
    CompileStep::new(&mut libraries, &lookup, &mut typespace, &mut reporter, interner)
        .allow_unknown_attributes(config.allow_unknown_attributes)
        .run();
    OrdinalStep::new(&lookup, interner, &mut reporter).run(&mut libraries);

    tracing::debug!(
        errors = reporter.error_count(),
        problems = reporter.problems().len(),
        "compilation finished"
    );
    CompileOutput {
        libraries,
        typespace,
        reporter,
        error_limit: config.error_limit,
    }
}
