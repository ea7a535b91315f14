use tally_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("must be authenticated")]
    Unauthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store `{0}`")]
    Store(#[from] StoreError),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
