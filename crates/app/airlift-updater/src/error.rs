pub type UpdaterResult<T> = std::result::Result<T, UpdaterError>;

#[derive(Debug, thiserror::Error)]
pub enum UpdaterError {
    #[error("invalid updater configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] airlift_store::StoreError),

    #[error(transparent)]
    Client(#[from] airlift_client::ClientError),

    #[error("scalar storage failure")]
    Storage(#[from] std::io::Error),
}
