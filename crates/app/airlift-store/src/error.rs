use std::path::PathBuf;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no bundle with id {id}")]
    NotFound { id: String },

    #[error("bundle {id} is not verified and cannot be activated")]
    NotVerified { id: String },

    #[error("a bundle named {version_name} already exists")]
    DuplicateVersion { version_name: String },

    #[error("bundle {id} is protected and cannot be deleted")]
    Protected { id: String },

    #[error("bundle {id} has no published payload")]
    MissingPayload { id: String },

    #[error("failed to read catalog from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write catalog to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog")]
    Parse(#[from] serde_json::Error),
}
