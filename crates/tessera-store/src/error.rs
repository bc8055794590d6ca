use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access table metadata at {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table metadata")]
    Json(#[from] serde_json::Error),
    #[error("unsupported format version {found} (this build reads version {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("unknown logical type tag '{0}'")]
    UnknownLogicalType(String),
    #[error("column '{column}': {detail}")]
    ColumnDecode { column: String, detail: String },
    #[error(transparent)]
    Table(#[from] tessera_columnar::TableError),
    #[error(transparent)]
    Dictionary(#[from] tessera_columnar::DictionaryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot build worker pool: {0}")]
    ThreadPool(String),
}
