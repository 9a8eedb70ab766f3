pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network request failed")]
    Network(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("downloaded archive is corrupt: {0}")]
    ArchiveCorrupt(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("bundle structure invalid: {0}")]
    StructureInvalid(String),

    #[error("i/o failure while handling bundle archive")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] airlift_store::StoreError),
}
