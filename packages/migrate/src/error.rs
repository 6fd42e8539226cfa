use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Document has no version string")]
    MissingVersion,

    #[error("Malformed version string: {0}")]
    MalformedVersion(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}
