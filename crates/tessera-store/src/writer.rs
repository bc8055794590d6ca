//! Persisting a table as a directory container.
//!
//! The container is a directory named after the (sanitized) table name. It
//! holds `Metadata.json` plus one compressed file per column, named by the
//! column's persistent id. Writing replaces any existing container of the
//! same name wholesale.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use rayon::prelude::*;
use tessera_columnar::{Column, Table};

use crate::codec;
use crate::compression::{CompressionKind, EncryptionKind};
use crate::error::{Result, StoreError};
use crate::metadata::{self, ColumnMetadata, TableMetadata};

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub compression: CompressionKind,
    pub encryption: EncryptionKind,
    /// Upper bound on concurrently encoded columns.
    pub threads: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            compression: CompressionKind::default(),
            encryption: EncryptionKind::default(),
            threads: default_threads(),
        }
    }
}

pub(crate) fn default_threads() -> usize {
    thread::available_parallelism().map(usize::from).unwrap_or(1)
}

/// Writes `table` under `parent`, returning the container path.
///
/// Metadata is written before any column data so a reader that sees the
/// container mid-write fails on a short column file rather than on absent
/// structure. An existing container of the same name is deleted first.
pub fn write_table(parent: &Path, table: &Table, options: &WriteOptions) -> Result<PathBuf> {
    let dir = parent.join(sanitize_name(table.name()));
    if dir.exists() {
        log::warn!("replacing existing table container at {}", dir.display());
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;

    let table_metadata =
        TableMetadata::for_table(table, options.compression, options.encryption);
    metadata::write_metadata(&dir, &table_metadata)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .build()
        .map_err(|e| StoreError::ThreadPool(e.to_string()))?;
    pool.install(|| {
        table
            .columns()
            .par_iter()
            .zip(table_metadata.columns.par_iter())
            .try_for_each(|(column, column_meta)| {
                write_column(&dir, column, column_meta, options.compression)
            })
    })?;

    log::debug!(
        "wrote table '{}' ({} columns, {} rows) to {}",
        table.name(),
        table.column_count(),
        table.row_count(),
        dir.display()
    );
    Ok(dir)
}

fn write_column(
    dir: &Path,
    column: &Column,
    meta: &ColumnMetadata,
    compression: CompressionKind,
) -> Result<()> {
    let path = dir.join(meta.file_name());
    let file = fs::File::create(path)?;
    let mut out = compression.wrap_writer(file);
    codec::write_values(&mut out, column.values())?;
    out.flush()?;
    Ok(())
}

/// Turns a table name into a directory name: whitespace is removed and path
/// separators become underscores. An empty result falls back to "table".
pub(crate) fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "table".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_whitespace_and_separators() {
        assert_eq!(sanitize_name("my table"), "mytable");
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_name(" ta b "), "tab");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_name(""), "table");
        assert_eq!(sanitize_name("   "), "table");
    }
}
