use pipeflow_migrate::MigrateError;
use pipeflow_model::ModelError;
use pipeflow_validator::ValidationError;
use thiserror::Error;

/// Errors surfaced by the editing layer.
///
/// An empty undo or redo stack is not an error; those calls return
/// `Ok(false)` instead.
#[derive(Error, Debug)]
pub enum EditError {
    /// A precondition failed before anything was mutated.
    #[error(transparent)]
    Precondition(#[from] ModelError),

    /// The document could not be brought up to the current schema.
    #[error("malformed document: {0}")]
    Malformed(#[from] MigrateError),

    /// Strict-mode load rejected the document.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
