use thiserror::Error;

use crate::column::Column;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumnName(String),
}

/// A named, ordered collection of equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builds a table, checking that every column has the same row count and
    /// a distinct name.
    pub fn with_columns(
        name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<Self, TableError> {
        let expected = columns.first().map(Column::row_count).unwrap_or(0);
        for column in &columns {
            if column.row_count() != expected {
                return Err(TableError::RowCountMismatch {
                    column: column.name().to_owned(),
                    expected,
                    actual: column.row_count(),
                });
            }
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == column.name()) {
                return Err(TableError::DuplicateColumnName(column.name().to_owned()));
            }
        }
        Ok(Table {
            name: name.into(),
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::row_count).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnValues, ScalarArray};

    fn int_column(name: &str, values: Vec<i32>) -> Column {
        Column::new(name, ColumnValues::Int32(ScalarArray::from_values(values)))
    }

    #[test]
    fn uniform_row_counts_accepted() {
        let table = Table::with_columns(
            "t",
            vec![int_column("a", vec![1, 2]), int_column("b", vec![3, 4])],
        )
        .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert!(table.column("a").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn ragged_row_counts_rejected() {
        let err = Table::with_columns(
            "t",
            vec![int_column("a", vec![1, 2]), int_column("b", vec![3])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TableError::RowCountMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Table::with_columns(
            "t",
            vec![int_column("a", vec![1]), int_column("a", vec![2])],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumnName(name) if name == "a"));
    }

    #[test]
    fn empty_table_has_zero_rows() {
        let table = Table::new("empty");
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }
}
