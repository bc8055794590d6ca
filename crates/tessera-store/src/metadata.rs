//! The `Metadata.json` descriptor at the root of every table container.
//!
//! The descriptor is the source of truth for column order, row count and the
//! per-column facts a reader needs before it can decode a column file
//! (logical type, and for text columns the dictionary geometry). Column
//! files themselves carry no header.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_columnar::{Column, ColumnValues, KeyWidth, Table};
use uuid::Uuid;

use crate::compression::{CompressionKind, EncryptionKind};
use crate::error::{Result, StoreError};

pub const METADATA_FILE_NAME: &str = "Metadata.json";

/// Bumped whenever the container layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub format_version: u32,
    pub name: String,
    pub row_count: usize,
    pub compression: CompressionKind,
    pub encryption: EncryptionKind,
    /// On-disk column order. Readers reassemble tables in this order no
    /// matter which columns finish decoding first.
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub fn for_table(
        table: &Table,
        compression: CompressionKind,
        encryption: EncryptionKind,
    ) -> Self {
        TableMetadata {
            format_version: FORMAT_VERSION,
            name: table.name().to_owned(),
            row_count: table.row_count(),
            compression,
            encryption,
            columns: table.columns().iter().map(ColumnMetadata::for_column).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Persistent identity; also the column's file name within the
    /// container. Survives column renames.
    pub id: Uuid,
    pub name: String,
    pub logical_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_width: Option<KeyWidthKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_key: Option<usize>,
}

impl ColumnMetadata {
    pub fn for_column(column: &Column) -> Self {
        let mut meta = ColumnMetadata {
            id: Uuid::new_v4(),
            name: column.name().to_owned(),
            logical_type: column.logical_type().tag().to_owned(),
            key_width: None,
            cardinality: None,
            next_key: None,
        };
        if let ColumnValues::Text(text) = column.values() {
            let dictionary = text.dictionary();
            meta.key_width = Some(dictionary.width().into());
            meta.cardinality = Some(dictionary.cardinality());
            meta.next_key = Some(dictionary.next_key());
        }
        meta
    }

    pub fn file_name(&self) -> String {
        self.id.to_string()
    }
}

/// [`KeyWidth`] as it appears in metadata JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyWidthKind {
    Narrow,
    Medium,
    Wide,
}

impl From<KeyWidth> for KeyWidthKind {
    fn from(width: KeyWidth) -> Self {
        match width {
            KeyWidth::Narrow => KeyWidthKind::Narrow,
            KeyWidth::Medium => KeyWidthKind::Medium,
            KeyWidth::Wide => KeyWidthKind::Wide,
        }
    }
}

impl From<KeyWidthKind> for KeyWidth {
    fn from(kind: KeyWidthKind) -> Self {
        match kind {
            KeyWidthKind::Narrow => KeyWidth::Narrow,
            KeyWidthKind::Medium => KeyWidth::Medium,
            KeyWidthKind::Wide => KeyWidth::Wide,
        }
    }
}

pub fn write_metadata(dir: &Path, metadata: &TableMetadata) -> Result<()> {
    let path = dir.join(METADATA_FILE_NAME);
    let file = File::create(&path).map_err(|source| StoreError::Metadata {
        path: path.clone(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), metadata)?;
    Ok(())
}

pub fn read_metadata(dir: &Path) -> Result<TableMetadata> {
    let path = dir.join(METADATA_FILE_NAME);
    let file = File::open(&path).map_err(|source| StoreError::Metadata {
        path: path.clone(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_columnar::{ScalarArray, TextArray};

    #[test]
    fn text_columns_record_dictionary_geometry() {
        let mut text = TextArray::new();
        for value in ["a", "b", "a"] {
            text.push(Some(value)).unwrap();
        }
        let column = Column::new("tag", ColumnValues::Text(text));
        let meta = ColumnMetadata::for_column(&column);
        assert_eq!(meta.logical_type, "text");
        assert_eq!(meta.key_width, Some(KeyWidthKind::Narrow));
        assert_eq!(meta.cardinality, Some(2));
        assert_eq!(meta.next_key, Some(2));
    }

    #[test]
    fn fixed_width_columns_omit_dictionary_fields() {
        let column = Column::new(
            "n",
            ColumnValues::Int64(ScalarArray::from_values(vec![1, 2])),
        );
        let meta = ColumnMetadata::for_column(&column);
        assert_eq!(meta.logical_type, "int64");
        assert!(meta.key_width.is_none());
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("keyWidth"));
        assert!(!json.contains("cardinality"));
    }

    #[test]
    fn metadata_json_round_trips() {
        let table = Table::with_columns(
            "trades",
            vec![Column::new(
                "qty",
                ColumnValues::Int32(ScalarArray::from_values(vec![5, 6, 7])),
            )],
        )
        .unwrap();
        let meta = TableMetadata::for_table(
            &table,
            CompressionKind::SnappyFramed,
            EncryptionKind::None,
        );
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"formatVersion\":1"));
        assert!(json.contains("\"rowCount\":3"));
        assert!(json.contains("\"compression\":\"SNAPPY_FRAMED\""));
        let parsed: TableMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "trades");
        assert_eq!(parsed.columns.len(), 1);
        assert_eq!(parsed.columns[0].id, meta.columns[0].id);
    }
}
