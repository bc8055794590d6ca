/// Logical type of a column, independent of its physical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Time of day, millisecond precision, packed into a `u32`.
    Time,
    /// Calendar date packed into a `u32`.
    Date,
    /// Date + time of day packed into a `u64`.
    DateTime,
    /// Point on the epoch timeline packed into a `u64`.
    Instant,
    /// Dictionary-encoded text.
    Text,
    /// Text stored verbatim per row, no dictionary. For columns whose values
    /// rarely repeat, where interning would only add overhead.
    FreeText,
}

impl LogicalType {
    pub const ALL: [LogicalType; 13] = [
        LogicalType::Boolean,
        LogicalType::Int8,
        LogicalType::Int16,
        LogicalType::Int32,
        LogicalType::Int64,
        LogicalType::Float32,
        LogicalType::Float64,
        LogicalType::Time,
        LogicalType::Date,
        LogicalType::DateTime,
        LogicalType::Instant,
        LogicalType::Text,
        LogicalType::FreeText,
    ];

    /// The stable tag used to identify this type in metadata documents.
    pub fn tag(self) -> &'static str {
        match self {
            LogicalType::Boolean => "boolean",
            LogicalType::Int8 => "int8",
            LogicalType::Int16 => "int16",
            LogicalType::Int32 => "int32",
            LogicalType::Int64 => "int64",
            LogicalType::Float32 => "float32",
            LogicalType::Float64 => "float64",
            LogicalType::Time => "time",
            LogicalType::Date => "date",
            LogicalType::DateTime => "date_time",
            LogicalType::Instant => "instant",
            LogicalType::Text => "text",
            LogicalType::FreeText => "free_text",
        }
    }
}

/// Immutable lookup from metadata type tags to logical types.
///
/// Constructed once and passed by reference into whatever parses metadata.
/// There is deliberately no global registry; a reduced registry (fewer types)
/// is valid and useful in tests.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<LogicalType>,
}

impl TypeRegistry {
    /// Registry covering every supported logical type.
    pub fn all() -> Self {
        Self {
            entries: LogicalType::ALL.to_vec(),
        }
    }

    /// Registry restricted to the given types.
    pub fn with_types(types: &[LogicalType]) -> Self {
        Self {
            entries: types.to_vec(),
        }
    }

    pub fn by_tag(&self, tag: &str) -> Option<LogicalType> {
        self.entries.iter().copied().find(|t| t.tag() == tag)
    }

    pub fn contains(&self, logical_type: LogicalType) -> bool {
        self.entries.contains(&logical_type)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::all()
    }
}
