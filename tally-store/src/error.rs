use crate::path::DocPath;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transaction read set invalidated by a concurrent commit on `{0}`")]
    Conflict(DocPath),

    #[error("transaction aborted after {0} conflicting attempts")]
    TooManyAttempts(u32),

    #[error("invalid document path `{0}`")]
    InvalidPath(String),

    #[error("invalid collection path `{0}`")]
    InvalidCollectionPath(String),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
