use thiserror::Error;

/// Failure classes the catalog surfaces to the initiating action. Nothing
/// here is retried and nothing is fatal to the process; each error is scoped
/// to the single in-flight operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unresolved reference: {0}")]
    ReferenceNotFound(String),

    #[error("unknown semester code: {0}")]
    UnknownSemester(i32),

    #[error("transport: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}
