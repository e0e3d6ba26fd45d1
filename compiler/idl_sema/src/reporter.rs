//! Problem collection for the semantic passes.

use idl_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorGuaranteed};

use crate::problem::SemanticProblem;

/// Collects problems in report order.
#[derive(Clone, Debug, Default)]
pub struct Reporter {
    problems: Vec<SemanticProblem>,
    error_count: usize,
    warnings_as_errors: bool,
}

impl Reporter {
    pub fn new(warnings_as_errors: bool) -> Self {
        Reporter {
            warnings_as_errors,
            ..Reporter::default()
        }
    }

    /// Record an error.
    pub fn error(&mut self, problem: SemanticProblem) -> ErrorGuaranteed {
        debug_assert!(!problem.is_warning(), "{problem:?} is a warning");
        tracing::debug!(code = %problem.code(), span = ?problem.span(), "error");
        self.problems.push(problem);
        self.error_count += 1;
        ErrorGuaranteed::new_unchecked()
    }

    /// Record a warning. Counts as an error under `warnings_as_errors`.
    pub fn warn(&mut self, problem: SemanticProblem) {
        debug_assert!(problem.is_warning(), "{problem:?} is an error");
        tracing::debug!(code = %problem.code(), span = ?problem.span(), "warning");
        self.problems.push(problem);
        if self.warnings_as_errors {
            self.error_count += 1;
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn problems(&self) -> &[SemanticProblem] {
        &self.problems
    }

    /// Render every problem, sorted by position and capped by `config`.
    pub fn diagnostics(&self, config: DiagnosticConfig) -> Vec<Diagnostic> {
        let mut queue = DiagnosticQueue::with_config(config);
        for problem in &self.problems {
            let diag = problem.into_diagnostic();
            let diag = if self.warnings_as_errors {
                diag.into_error()
            } else {
                diag
            };
            queue.add(diag);
        }
        queue.flush()
    }
}
