//! In-memory columnar table model for Tessera.
//!
//! This crate focuses on:
//! - A typed column abstraction (name, logical type, row count, value access).
//! - Adaptive dictionary encoding for text columns, generic over key width.
//! - Packed temporal values: calendar dates/times encoded as single integers
//!   with arithmetic defined directly on the packed representation.
//!
//! Persistence lives in `tessera-store`; this crate knows nothing about files.

#![forbid(unsafe_code)]

mod column;
mod dictionary;
mod table;
pub mod temporal;
mod types;

pub use crate::column::{
    BooleanArray, Column, ColumnValues, FreeTextArray, ScalarArray, ScalarValue, TextArray,
};
pub use crate::dictionary::{Dictionary, DictionaryError, DictionaryKey, DictionaryMap, KeyWidth};
pub use crate::table::{Table, TableError};
pub use crate::types::{LogicalType, TypeRegistry};
