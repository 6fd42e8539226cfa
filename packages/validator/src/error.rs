use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Bundle of every error-level diagnostic a validation pass produced
#[derive(Error, Debug)]
#[error("document failed validation with {} error(s)", .diagnostics.len())]
pub struct ValidationError {
    pub diagnostics: Vec<Diagnostic>,
}
