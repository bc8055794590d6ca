//! Columnar persistence for Tessera tables.
//!
//! A table is stored as a directory container: a `Metadata.json` descriptor
//! plus one compressed file per column, named by the column's persistent id.
//! Writer and reader fan the columns out over a bounded worker pool; the
//! reader reassembles the table in metadata order and fails the whole read
//! if any column fails.

#![forbid(unsafe_code)]

mod codec;
mod compression;
mod error;
mod metadata;
mod reader;
mod wire;
mod writer;

pub use crate::codec::FLUSH_EVERY;
pub use crate::compression::{CompressionKind, EncryptionKind};
pub use crate::error::{Result, StoreError};
pub use crate::metadata::{
    read_metadata, write_metadata, ColumnMetadata, KeyWidthKind, TableMetadata, FORMAT_VERSION,
    METADATA_FILE_NAME,
};
pub use crate::reader::{read_table, read_table_with_registry, ReadOptions};
pub use crate::writer::{write_table, WriteOptions};
