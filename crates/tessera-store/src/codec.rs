//! The body encoding of a single column file.
//!
//! Fixed-width columns are the bare values back to back, one per row, with
//! the missing sentinel in-band. Booleans are one byte per row. Free-text
//! columns are `row_count` length-prefixed strings back to back. A
//! dictionary text column is five sections: entry keys in key order, entry
//! strings in the same order, the keys again, their occurrence counts, then
//! the per-row key stream. Nothing is self-describing; the table metadata
//! supplies the row count, key width and cardinality that delimit each
//! section, and the section order is a fixed wire contract.

use std::io::{self, Read, Write};

use tessera_columnar::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};
use tessera_columnar::{
    BooleanArray, ColumnValues, Dictionary, FreeTextArray, KeyWidth, LogicalType, ScalarArray,
    TextArray,
};

use crate::error::{Result, StoreError};
use crate::metadata::ColumnMetadata;
use crate::wire;

/// Writers flush after this many values so a long column streams to disk
/// instead of pooling in the encoder.
pub const FLUSH_EVERY: usize = 20_000;

/// Readers never trust a metadata-declared count for preallocation beyond
/// this many elements; larger vectors grow as bytes actually arrive, so a
/// corrupt row count fails on EOF instead of aborting on allocation.
const PREALLOC_LIMIT: usize = 1 << 16;

fn bounded_capacity(declared: usize) -> usize {
    declared.min(PREALLOC_LIMIT)
}

pub fn write_values<W: Write>(out: &mut W, values: &ColumnValues) -> io::Result<()> {
    match values {
        ColumnValues::Boolean(a) => write_run(out, a.cells(), |o, v| wire::write_u8(o, *v)),
        ColumnValues::Int8(a) => write_run(out, a.values(), |o, v| wire::write_i8(o, *v)),
        ColumnValues::Int16(a) => write_run(out, a.values(), |o, v| wire::write_i16(o, *v)),
        ColumnValues::Int32(a) => write_run(out, a.values(), |o, v| wire::write_i32(o, *v)),
        ColumnValues::Int64(a) => write_run(out, a.values(), |o, v| wire::write_i64(o, *v)),
        ColumnValues::Float32(a) => write_run(out, a.values(), |o, v| wire::write_f32(o, *v)),
        ColumnValues::Float64(a) => write_run(out, a.values(), |o, v| wire::write_f64(o, *v)),
        ColumnValues::Time(a) => write_run(out, a.values(), |o, v| wire::write_u32(o, v.to_bits())),
        ColumnValues::Date(a) => write_run(out, a.values(), |o, v| wire::write_u32(o, v.to_bits())),
        ColumnValues::DateTime(a) => {
            write_run(out, a.values(), |o, v| wire::write_u64(o, v.to_bits()))
        }
        ColumnValues::Instant(a) => {
            write_run(out, a.values(), |o, v| wire::write_u64(o, v.to_bits()))
        }
        ColumnValues::Text(a) => write_dictionary(out, a.dictionary()),
        ColumnValues::FreeText(a) => {
            write_run(out, a.values(), |o, v| wire::write_str(o, v))
        }
    }
}

fn write_run<W, T>(
    out: &mut W,
    values: &[T],
    write: impl Fn(&mut W, &T) -> io::Result<()>,
) -> io::Result<()>
where
    W: Write,
{
    for (i, value) in values.iter().enumerate() {
        write(out, value)?;
        if (i + 1) % FLUSH_EVERY == 0 {
            out.flush()?;
        }
    }
    Ok(())
}

fn write_key<W: Write>(out: &mut W, width: KeyWidth, key: usize) -> io::Result<()> {
    match width {
        KeyWidth::Narrow => wire::write_u8(out, key as u8),
        KeyWidth::Medium => wire::write_u16(out, key as u16),
        KeyWidth::Wide => wire::write_u32(out, key as u32),
    }
}

fn read_key<R: Read>(input: &mut R, width: KeyWidth) -> io::Result<usize> {
    Ok(match width {
        KeyWidth::Narrow => wire::read_u8(input)? as usize,
        KeyWidth::Medium => wire::read_u16(input)? as usize,
        KeyWidth::Wide => wire::read_u32(input)? as usize,
    })
}

fn write_dictionary<W: Write>(out: &mut W, dictionary: &Dictionary) -> io::Result<()> {
    let width = dictionary.width();
    let entries = dictionary.entries_ordered_by_key();
    for (key, _, _) in &entries {
        write_key(out, width, *key)?;
    }
    for (_, value, _) in &entries {
        wire::write_str(out, value)?;
    }
    for (key, _, _) in &entries {
        write_key(out, width, *key)?;
    }
    for (_, _, count) in &entries {
        wire::write_u32(out, *count)?;
    }
    for (i, key) in dictionary.row_keys().into_iter().enumerate() {
        write_key(out, width, key)?;
        if (i + 1) % FLUSH_EVERY == 0 {
            out.flush()?;
        }
    }
    Ok(())
}

pub fn read_values<R: Read>(
    input: &mut R,
    meta: &ColumnMetadata,
    logical_type: LogicalType,
    row_count: usize,
) -> Result<ColumnValues> {
    Ok(match logical_type {
        LogicalType::Boolean => {
            let mut cells = Vec::with_capacity(bounded_capacity(row_count));
            for _ in 0..row_count {
                let cell = wire::read_u8(input)?;
                if cell > BooleanArray::MISSING {
                    return Err(StoreError::ColumnDecode {
                        column: meta.name.clone(),
                        detail: format!("invalid boolean cell {cell}"),
                    });
                }
                cells.push(cell);
            }
            ColumnValues::Boolean(BooleanArray::from_cells(cells))
        }
        LogicalType::Int8 => ColumnValues::Int8(read_run(input, row_count, wire::read_i8)?),
        LogicalType::Int16 => ColumnValues::Int16(read_run(input, row_count, wire::read_i16)?),
        LogicalType::Int32 => ColumnValues::Int32(read_run(input, row_count, wire::read_i32)?),
        LogicalType::Int64 => ColumnValues::Int64(read_run(input, row_count, wire::read_i64)?),
        LogicalType::Float32 => ColumnValues::Float32(read_run(input, row_count, wire::read_f32)?),
        LogicalType::Float64 => ColumnValues::Float64(read_run(input, row_count, wire::read_f64)?),
        LogicalType::Time => ColumnValues::Time(read_run(input, row_count, |r| {
            wire::read_u32(r).map(PackedTime::from_bits)
        })?),
        LogicalType::Date => ColumnValues::Date(read_run(input, row_count, |r| {
            wire::read_u32(r).map(PackedDate::from_bits)
        })?),
        LogicalType::DateTime => ColumnValues::DateTime(read_run(input, row_count, |r| {
            wire::read_u64(r).map(PackedDateTime::from_bits)
        })?),
        LogicalType::Instant => ColumnValues::Instant(read_run(input, row_count, |r| {
            wire::read_u64(r).map(PackedInstant::from_bits)
        })?),
        LogicalType::Text => {
            ColumnValues::Text(TextArray::from_dictionary(read_dictionary(
                input, meta, row_count,
            )?))
        }
        LogicalType::FreeText => {
            let mut values = Vec::with_capacity(bounded_capacity(row_count));
            for _ in 0..row_count {
                values.push(wire::read_str(input)?);
            }
            ColumnValues::FreeText(FreeTextArray::from_values(values))
        }
    })
}

fn read_run<R, T>(
    input: &mut R,
    row_count: usize,
    read: impl Fn(&mut R) -> io::Result<T>,
) -> io::Result<ScalarArray<T>>
where
    R: Read,
    T: tessera_columnar::ScalarValue,
{
    let mut values = Vec::with_capacity(bounded_capacity(row_count));
    for _ in 0..row_count {
        values.push(read(input)?);
    }
    Ok(ScalarArray::from_values(values))
}

fn read_dictionary<R: Read>(
    input: &mut R,
    meta: &ColumnMetadata,
    row_count: usize,
) -> Result<Dictionary> {
    let decode_err = |detail: String| StoreError::ColumnDecode {
        column: meta.name.clone(),
        detail,
    };
    let width: KeyWidth = meta
        .key_width
        .ok_or_else(|| decode_err("text column metadata is missing keyWidth".to_owned()))?
        .into();
    let cardinality = meta
        .cardinality
        .ok_or_else(|| decode_err("text column metadata is missing cardinality".to_owned()))?;

    let mut keys = Vec::with_capacity(bounded_capacity(cardinality));
    for _ in 0..cardinality {
        keys.push(read_key(input, width)?);
    }
    let mut values = Vec::with_capacity(bounded_capacity(cardinality));
    for _ in 0..cardinality {
        values.push(wire::read_str(input)?);
    }
    let mut count_keys = Vec::with_capacity(bounded_capacity(cardinality));
    for _ in 0..cardinality {
        count_keys.push(read_key(input, width)?);
    }
    let mut counts = std::collections::HashMap::with_capacity(bounded_capacity(cardinality));
    for key in count_keys {
        counts.insert(key, wire::read_u32(input)?);
    }
    let entries = keys
        .iter()
        .zip(values)
        .map(|(&key, value)| {
            let count = counts
                .get(&key)
                .copied()
                .ok_or_else(|| decode_err(format!("no occurrence count for key {key}")))?;
            Ok((key, value, count))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut row_keys = Vec::with_capacity(bounded_capacity(row_count));
    for _ in 0..row_count {
        row_keys.push(read_key(input, width)?);
    }
    let next_key = meta
        .next_key
        .unwrap_or_else(|| keys.iter().max().map_or(0, |&max| max + 1));
    Ok(Dictionary::from_parts(width, entries, row_keys, next_key)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use uuid::Uuid;

    use tessera_columnar::Column;

    fn meta_for(column: &Column) -> ColumnMetadata {
        ColumnMetadata::for_column(column)
    }

    fn round_trip(column: &Column, row_count: usize) -> ColumnValues {
        let meta = meta_for(column);
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        let logical_type = column.logical_type();
        read_values(&mut Cursor::new(buf), &meta, logical_type, row_count).unwrap()
    }

    #[test]
    fn fixed_width_bodies_have_no_header() {
        let column = Column::new(
            "n",
            ColumnValues::Int32(ScalarArray::from_values(vec![1, i32::MIN, -7])),
        );
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        // Three values, four bytes each, nothing else.
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[0..4], &[0, 0, 0, 1]);
    }

    #[test]
    fn scalar_values_round_trip_with_sentinels() {
        let column = Column::new(
            "n",
            ColumnValues::Int64(ScalarArray::from_values(vec![42, i64::MIN, -1])),
        );
        let values = round_trip(&column, 3);
        match values {
            ColumnValues::Int64(a) => {
                assert_eq!(a.get(0), Some(42));
                assert_eq!(a.get(1), None);
                assert_eq!(a.get(2), Some(-1));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn float_nan_survives_the_trip() {
        let column = Column::new(
            "x",
            ColumnValues::Float64(ScalarArray::from_values(vec![0.5, f64::NAN])),
        );
        match round_trip(&column, 2) {
            ColumnValues::Float64(a) => {
                assert_eq!(a.get(0), Some(0.5));
                assert_eq!(a.get(1), None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn temporal_values_round_trip_as_packed_bits() {
        let mut times: ScalarArray<PackedTime> = ScalarArray::new();
        times.push(PackedTime::from_hms_milli(23, 59, 59, 999));
        times.push_missing();
        let column = Column::new("t", ColumnValues::Time(times));
        match round_trip(&column, 2) {
            ColumnValues::Time(a) => {
                assert_eq!(a.get(0), Some(PackedTime::from_hms_milli(23, 59, 59, 999)));
                assert_eq!(a.get(1), None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn dictionary_round_trips_entries_counts_and_rows() {
        let mut text = TextArray::new();
        for value in [Some("b"), Some("a"), None, Some("b"), Some("b")] {
            text.push(value).unwrap();
        }
        let column = Column::new("tag", ColumnValues::Text(text));
        match round_trip(&column, 5) {
            ColumnValues::Text(a) => {
                assert_eq!(a.get(0), Some("b"));
                assert_eq!(a.get(1), Some("a"));
                assert_eq!(a.get(2), None);
                assert_eq!(a.dictionary().cardinality(), 3);
                assert_eq!(a.dictionary().count_of("b"), 3);
                assert_eq!(a.dictionary().count_of(""), 1);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn free_text_round_trips_without_a_dictionary() {
        let mut text = FreeTextArray::new();
        text.push(Some("alpha"));
        text.push(None);
        text.push(Some("alpha"));
        let column = Column::new("note", ColumnValues::FreeText(text));
        match round_trip(&column, 3) {
            ColumnValues::FreeText(a) => {
                assert_eq!(a.get(0), Some("alpha"));
                assert_eq!(a.get(1), None);
                assert_eq!(a.get(2), Some("alpha"));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn free_text_body_is_strings_back_to_back() {
        let mut text = FreeTextArray::new();
        text.push(Some("ab"));
        text.push(Some("c"));
        let column = Column::new("note", ColumnValues::FreeText(text));
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        assert_eq!(buf, [0, 0, 0, 2, b'a', b'b', 0, 0, 0, 1, b'c']);
    }

    #[test]
    fn dictionary_sections_are_keys_strings_countkeys_counts_rows() {
        let mut text = TextArray::new();
        text.push(Some("b")).unwrap();
        text.push(Some("a")).unwrap();
        let column = Column::new("tag", ColumnValues::Text(text));
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        // Narrow width: "b" -> key 0, "a" -> key 1, one occurrence each.
        #[rustfmt::skip]
        let expected = [
            0u8, 1,                                 // entry keys
            0, 0, 0, 1, b'b', 0, 0, 0, 1, b'a',     // entry strings
            0, 1,                                   // count keys
            0, 0, 0, 1, 0, 0, 0, 1,                 // counts
            0, 1,                                   // row keys
        ];
        assert_eq!(buf, expected);
    }

    #[test]
    fn huge_declared_row_count_fails_instead_of_allocating() {
        let column = Column::new(
            "n",
            ColumnValues::Int32(ScalarArray::from_values(vec![1, 2])),
        );
        let meta = meta_for(&column);
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        // A row count far beyond the bytes present must surface as a decode
        // error, not an allocation abort.
        let err = read_values(
            &mut Cursor::new(buf),
            &meta,
            LogicalType::Int32,
            usize::MAX / 2,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn text_metadata_must_carry_geometry() {
        let meta = ColumnMetadata {
            id: Uuid::new_v4(),
            name: "tag".to_owned(),
            logical_type: "text".to_owned(),
            key_width: None,
            cardinality: Some(1),
            next_key: Some(1),
        };
        let err = read_values(&mut Cursor::new(Vec::new()), &meta, LogicalType::Text, 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnDecode { .. }));
    }

    #[test]
    fn truncated_body_fails() {
        let column = Column::new(
            "n",
            ColumnValues::Int32(ScalarArray::from_values(vec![1, 2])),
        );
        let meta = meta_for(&column);
        let mut buf = Vec::new();
        write_values(&mut buf, column.values()).unwrap();
        buf.truncate(buf.len() - 1);
        let err =
            read_values(&mut Cursor::new(buf), &meta, LogicalType::Int32, 2).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
