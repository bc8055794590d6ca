//! Loading a table container back into memory.
//!
//! Columns decode in parallel and finish in arbitrary order; the table is
//! reassembled strictly in metadata order before it is returned. Any column
//! failure fails the whole read.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tessera_columnar::{Column, Table, TypeRegistry};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::metadata::{self, ColumnMetadata, TableMetadata, FORMAT_VERSION};
use crate::writer::default_threads;

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Column names to load; `None` loads every column. Names that match no
    /// stored column are ignored.
    pub selected_columns: Option<Vec<String>>,
    /// Upper bound on concurrently decoded columns.
    pub threads: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            selected_columns: None,
            threads: default_threads(),
        }
    }
}

impl ReadOptions {
    fn wants(&self, name: &str) -> bool {
        match &self.selected_columns {
            None => true,
            Some(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Reads the container at `dir` with every logical type enabled.
pub fn read_table(dir: &Path, options: &ReadOptions) -> Result<Table> {
    read_table_with_registry(dir, options, &TypeRegistry::all())
}

/// Reads the container at `dir`, resolving logical type tags through
/// `registry`. A stored tag the registry does not carry fails the read.
pub fn read_table_with_registry(
    dir: &Path,
    options: &ReadOptions,
    registry: &TypeRegistry,
) -> Result<Table> {
    let table_metadata = metadata::read_metadata(dir)?;
    if table_metadata.format_version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: table_metadata.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let selected: Vec<&ColumnMetadata> = table_metadata
        .columns
        .iter()
        .filter(|meta| options.wants(&meta.name))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .build()
        .map_err(|e| StoreError::ThreadPool(e.to_string()))?;
    let decoded: Vec<(String, Column)> = pool.install(|| {
        selected
            .par_iter()
            .map(|meta| {
                let column = read_column(dir, meta, &table_metadata, registry)?;
                Ok((meta.name.clone(), column))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let order: Vec<String> = selected.iter().map(|meta| meta.name.clone()).collect();
    let columns = reassemble(decoded, &order)?;
    log::debug!(
        "read table '{}' ({} columns, {} rows) from {}",
        table_metadata.name,
        columns.len(),
        table_metadata.row_count,
        dir.display()
    );
    Ok(Table::with_columns(&table_metadata.name, columns)?)
}

fn read_column(
    dir: &Path,
    meta: &ColumnMetadata,
    table_metadata: &TableMetadata,
    registry: &TypeRegistry,
) -> Result<Column> {
    let logical_type = registry
        .by_tag(&meta.logical_type)
        .ok_or_else(|| StoreError::UnknownLogicalType(meta.logical_type.clone()))?;
    let file = fs::File::open(dir.join(meta.file_name()))?;
    let mut input = table_metadata.compression.wrap_reader(file);
    let values = codec::read_values(&mut input, meta, logical_type, table_metadata.row_count)
        .map_err(|err| match err {
            already @ StoreError::ColumnDecode { .. } => already,
            other => StoreError::ColumnDecode {
                column: meta.name.clone(),
                detail: other.to_string(),
            },
        })?;
    Ok(Column::new(meta.name.clone(), values))
}

/// Puts decoded columns back into declared order. Decode runs in parallel,
/// so `decoded` arrives keyed by name rather than by position.
fn reassemble(decoded: Vec<(String, Column)>, order: &[String]) -> Result<Vec<Column>> {
    let mut by_name: HashMap<String, Column> = decoded.into_iter().collect();
    order
        .iter()
        .map(|name| {
            by_name.remove(name).ok_or_else(|| StoreError::ColumnDecode {
                column: name.clone(),
                detail: "column decoded but never returned".to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_columnar::{ColumnValues, ScalarArray};

    fn int_column(name: &str, values: Vec<i32>) -> (String, Column) {
        (
            name.to_owned(),
            Column::new(name, ColumnValues::Int32(ScalarArray::from_values(values))),
        )
    }

    #[test]
    fn reassemble_restores_declared_order() {
        // Simulate workers finishing out of order.
        let decoded = vec![
            int_column("c", vec![3]),
            int_column("a", vec![1]),
            int_column("b", vec![2]),
        ];
        let order = ["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let columns = reassemble(decoded, &order).unwrap();
        let names: Vec<&str> = columns.iter().map(Column::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn reassemble_fails_on_a_gap() {
        let decoded = vec![int_column("a", vec![1])];
        let order = ["a".to_owned(), "b".to_owned()];
        let err = reassemble(decoded, &order).unwrap_err();
        assert!(matches!(err, StoreError::ColumnDecode { column, .. } if column == "b"));
    }

    #[test]
    fn selection_matches_exact_names_only() {
        let options = ReadOptions {
            selected_columns: Some(vec!["qty".to_owned()]),
            threads: 1,
        };
        assert!(options.wants("qty"));
        assert!(!options.wants("qt"));
        assert!(!options.wants("quantity"));
        assert!(ReadOptions::default().wants("anything"));
    }
}
