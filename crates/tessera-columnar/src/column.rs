//! In-memory column representations.
//!
//! Fixed-width values live in flat vectors with an in-band missing sentinel:
//! the minimum value for signed integers, NaN for floats, all-ones bits for
//! the packed temporal types. Booleans use one byte per row (0, 1, or 2 for
//! missing). Text is dictionary encoded.

use crate::dictionary::{Dictionary, DictionaryError};
use crate::temporal::{PackedDate, PackedDateTime, PackedInstant, PackedTime};
use crate::types::LogicalType;

/// A fixed-width value with an in-band missing sentinel.
pub trait ScalarValue: Copy {
    const MISSING: Self;

    fn is_missing(self) -> bool;

    /// Equality that treats two missing values as equal. For floats this
    /// makes NaN compare equal to NaN, which `==` does not.
    fn same(self, other: Self) -> bool;
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            const MISSING: Self = <$ty>::MIN;

            fn is_missing(self) -> bool {
                self == Self::MISSING
            }

            fn same(self, other: Self) -> bool {
                self == other
            }
        }
    )*};
}

int_scalar!(i8, i16, i32, i64);

macro_rules! float_scalar {
    ($($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            const MISSING: Self = <$ty>::NAN;

            fn is_missing(self) -> bool {
                self.is_nan()
            }

            fn same(self, other: Self) -> bool {
                (self.is_nan() && other.is_nan()) || self == other
            }
        }
    )*};
}

float_scalar!(f32, f64);

macro_rules! packed_scalar {
    ($($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            const MISSING: Self = <$ty>::MISSING;

            fn is_missing(self) -> bool {
                <$ty>::is_missing(self)
            }

            fn same(self, other: Self) -> bool {
                self == other
            }
        }
    )*};
}

packed_scalar!(PackedTime, PackedDate, PackedDateTime, PackedInstant);

/// A flat vector of fixed-width values.
#[derive(Debug, Clone, Default)]
pub struct ScalarArray<T: ScalarValue> {
    values: Vec<T>,
}

impl<T: ScalarValue> ScalarArray<T> {
    pub fn new() -> Self {
        ScalarArray { values: Vec::new() }
    }

    pub fn from_values(values: Vec<T>) -> Self {
        ScalarArray { values }
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    pub fn push_missing(&mut self) {
        self.values.push(T::MISSING);
    }

    /// The value at `row`, `None` if it carries the missing sentinel.
    pub fn get(&self, row: usize) -> Option<T> {
        let value = self.values[row];
        if value.is_missing() {
            None
        } else {
            Some(value)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: ScalarValue> PartialEq for ScalarArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(&a, &b)| a.same(b))
    }
}

/// A boolean column: one byte per row, 0 = false, 1 = true, 2 = missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanArray {
    cells: Vec<u8>,
}

impl BooleanArray {
    pub const FALSE: u8 = 0;
    pub const TRUE: u8 = 1;
    pub const MISSING: u8 = 2;

    pub fn new() -> Self {
        BooleanArray { cells: Vec::new() }
    }

    pub fn from_cells(cells: Vec<u8>) -> Self {
        debug_assert!(cells.iter().all(|&c| c <= Self::MISSING));
        BooleanArray { cells }
    }

    pub fn push(&mut self, value: Option<bool>) {
        self.cells.push(match value {
            Some(false) => Self::FALSE,
            Some(true) => Self::TRUE,
            None => Self::MISSING,
        });
    }

    pub fn get(&self, row: usize) -> Option<bool> {
        match self.cells[row] {
            Self::FALSE => Some(false),
            Self::TRUE => Some(true),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// A dictionary-encoded text column. A missing cell is stored as the empty
/// string, so it cannot be told apart from a present empty string.
#[derive(Debug, Clone, Default)]
pub struct TextArray {
    dictionary: Dictionary,
}

impl TextArray {
    pub fn new() -> Self {
        TextArray {
            dictionary: Dictionary::new(),
        }
    }

    pub fn from_dictionary(dictionary: Dictionary) -> Self {
        TextArray { dictionary }
    }

    pub fn push(&mut self, value: Option<&str>) -> Result<(), DictionaryError> {
        self.dictionary.append(value.unwrap_or(""))
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        let value = self.dictionary.get(row);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn len(&self) -> usize {
        self.dictionary.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.row_count() == 0
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

impl PartialEq for TextArray {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && (0..self.len()).all(|row| self.dictionary.get(row) == other.dictionary.get(row))
    }
}

/// A text column stored verbatim, one string per row, no dictionary. Used
/// when values rarely repeat and interning would only add overhead. As with
/// [`TextArray`], a missing cell is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeTextArray {
    values: Vec<String>,
}

impl FreeTextArray {
    pub fn new() -> Self {
        FreeTextArray { values: Vec::new() }
    }

    pub fn from_values(values: Vec<String>) -> Self {
        FreeTextArray { values }
    }

    pub fn push(&mut self, value: Option<&str>) {
        self.values.push(value.unwrap_or("").to_owned());
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        let value = self.values[row].as_str();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// The values of one column, tagged with its logical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Boolean(BooleanArray),
    Int8(ScalarArray<i8>),
    Int16(ScalarArray<i16>),
    Int32(ScalarArray<i32>),
    Int64(ScalarArray<i64>),
    Float32(ScalarArray<f32>),
    Float64(ScalarArray<f64>),
    Time(ScalarArray<PackedTime>),
    Date(ScalarArray<PackedDate>),
    DateTime(ScalarArray<PackedDateTime>),
    Instant(ScalarArray<PackedInstant>),
    Text(TextArray),
    FreeText(FreeTextArray),
}

impl ColumnValues {
    pub fn logical_type(&self) -> LogicalType {
        match self {
            ColumnValues::Boolean(_) => LogicalType::Boolean,
            ColumnValues::Int8(_) => LogicalType::Int8,
            ColumnValues::Int16(_) => LogicalType::Int16,
            ColumnValues::Int32(_) => LogicalType::Int32,
            ColumnValues::Int64(_) => LogicalType::Int64,
            ColumnValues::Float32(_) => LogicalType::Float32,
            ColumnValues::Float64(_) => LogicalType::Float64,
            ColumnValues::Time(_) => LogicalType::Time,
            ColumnValues::Date(_) => LogicalType::Date,
            ColumnValues::DateTime(_) => LogicalType::DateTime,
            ColumnValues::Instant(_) => LogicalType::Instant,
            ColumnValues::Text(_) => LogicalType::Text,
            ColumnValues::FreeText(_) => LogicalType::FreeText,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ColumnValues::Boolean(a) => a.len(),
            ColumnValues::Int8(a) => a.len(),
            ColumnValues::Int16(a) => a.len(),
            ColumnValues::Int32(a) => a.len(),
            ColumnValues::Int64(a) => a.len(),
            ColumnValues::Float32(a) => a.len(),
            ColumnValues::Float64(a) => a.len(),
            ColumnValues::Time(a) => a.len(),
            ColumnValues::Date(a) => a.len(),
            ColumnValues::DateTime(a) => a.len(),
            ColumnValues::Instant(a) => a.len(),
            ColumnValues::Text(a) => a.len(),
            ColumnValues::FreeText(a) => a.len(),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_type(&self) -> LogicalType {
        self.values.logical_type()
    }

    pub fn row_count(&self) -> usize {
        self.values.row_count()
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn as_boolean(&self) -> Option<&BooleanArray> {
        match &self.values {
            ColumnValues::Boolean(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<&ScalarArray<i32>> {
        match &self.values {
            ColumnValues::Int32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<&ScalarArray<i64>> {
        match &self.values {
            ColumnValues::Int64(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&ScalarArray<f64>> {
        match &self.values {
            ColumnValues::Float64(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&ScalarArray<PackedTime>> {
        match &self.values {
            ColumnValues::Time(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&ScalarArray<PackedDate>> {
        match &self.values {
            ColumnValues::Date(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextArray> {
        match &self.values {
            ColumnValues::Text(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_free_text(&self) -> Option<&FreeTextArray> {
        match &self.values {
            ColumnValues::FreeText(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_array_hides_sentinels() {
        let mut ints: ScalarArray<i32> = ScalarArray::new();
        ints.push(7);
        ints.push_missing();
        ints.push(i32::MIN);
        assert_eq!(ints.get(0), Some(7));
        assert_eq!(ints.get(1), None);
        // The sentinel itself reads back as missing.
        assert_eq!(ints.get(2), None);
        assert_eq!(ints.values(), &[7, i32::MIN, i32::MIN]);
    }

    #[test]
    fn float_missing_is_nan_and_arrays_still_compare_equal() {
        let mut a: ScalarArray<f64> = ScalarArray::new();
        a.push(1.5);
        a.push_missing();
        let mut b: ScalarArray<f64> = ScalarArray::new();
        b.push(1.5);
        b.push(f64::NAN);
        assert_eq!(a.get(1), None);
        assert_eq!(a, b);
    }

    #[test]
    fn boolean_array_three_states() {
        let mut bools = BooleanArray::new();
        bools.push(Some(true));
        bools.push(Some(false));
        bools.push(None);
        assert_eq!(bools.get(0), Some(true));
        assert_eq!(bools.get(1), Some(false));
        assert_eq!(bools.get(2), None);
        assert_eq!(bools.cells(), &[1, 0, 2]);
    }

    #[test]
    fn text_array_stores_missing_as_empty() {
        let mut text = TextArray::new();
        text.push(Some("alpha")).unwrap();
        text.push(None).unwrap();
        text.push(Some("")).unwrap();
        assert_eq!(text.get(0), Some("alpha"));
        assert_eq!(text.get(1), None);
        // A present empty string is indistinguishable from missing.
        assert_eq!(text.get(2), None);
        assert_eq!(text.dictionary().cardinality(), 2);
    }

    #[test]
    fn free_text_array_stores_rows_verbatim() {
        let mut text = FreeTextArray::new();
        text.push(Some("one-off note"));
        text.push(None);
        text.push(Some("one-off note"));
        assert_eq!(text.get(0), Some("one-off note"));
        assert_eq!(text.get(1), None);
        // No interning: repeated values are stored twice.
        assert_eq!(text.values().len(), 3);
        let column = Column::new("note", ColumnValues::FreeText(text));
        assert_eq!(column.logical_type(), LogicalType::FreeText);
        assert!(column.as_free_text().is_some());
        assert!(column.as_text().is_none());
    }

    #[test]
    fn column_reports_type_and_rows() {
        let column = Column::new(
            "measure",
            ColumnValues::Float64(ScalarArray::from_values(vec![1.0, 2.0])),
        );
        assert_eq!(column.name(), "measure");
        assert_eq!(column.logical_type(), LogicalType::Float64);
        assert_eq!(column.row_count(), 2);
        assert!(column.as_float64().is_some());
        assert!(column.as_text().is_none());
    }

    #[test]
    fn temporal_sentinels_read_back_missing() {
        let mut times: ScalarArray<PackedTime> = ScalarArray::new();
        times.push(PackedTime::from_hms(9, 30, 0));
        times.push_missing();
        assert!(times.get(0).is_some());
        assert_eq!(times.get(1), None);
        assert_eq!(times.values()[1].to_bits(), u32::MAX);
    }
}
