//! Dictionary encoding for text columns.
//!
//! Every distinct string is interned once and each row stores only a small
//! integer key. The key width grows with the observed cardinality: one byte
//! up to 256 distinct values, two bytes up to 65,536, four bytes beyond
//! that. [`Dictionary`] hides the width behind a `usize` API and promotes
//! itself to the next width when the current key space fills up.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DictionaryError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("{0:?} key space exhausted at {} distinct values", .0.max_cardinality())]
    KeySpaceExhausted(KeyWidth),
    #[error("row key {0} has no dictionary entry")]
    DanglingRowKey(usize),
}

/// Storage width of a dictionary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyWidth {
    Narrow,
    Medium,
    Wide,
}

impl KeyWidth {
    pub fn bytes(self) -> usize {
        match self {
            KeyWidth::Narrow => 1,
            KeyWidth::Medium => 2,
            KeyWidth::Wide => 4,
        }
    }

    /// Largest number of distinct values this width can key.
    pub fn max_cardinality(self) -> usize {
        match self {
            KeyWidth::Narrow => 1 << 8,
            KeyWidth::Medium => 1 << 16,
            // Capped below the full u32 range so cardinality arithmetic
            // stays within i32 for interoperating tools.
            KeyWidth::Wide => 1 << 31,
        }
    }

    /// Smallest width able to hold `cardinality` distinct values.
    pub fn for_cardinality(cardinality: usize) -> KeyWidth {
        if cardinality <= KeyWidth::Narrow.max_cardinality() {
            KeyWidth::Narrow
        } else if cardinality <= KeyWidth::Medium.max_cardinality() {
            KeyWidth::Medium
        } else {
            KeyWidth::Wide
        }
    }

    fn next(self) -> Option<KeyWidth> {
        match self {
            KeyWidth::Narrow => Some(KeyWidth::Medium),
            KeyWidth::Medium => Some(KeyWidth::Wide),
            KeyWidth::Wide => None,
        }
    }
}

/// An unsigned integer type usable as a dictionary key.
pub trait DictionaryKey: Copy + Eq + Hash + Ord {
    const WIDTH: KeyWidth;

    fn from_usize(value: usize) -> Self;
    fn as_usize(self) -> usize;
}

impl DictionaryKey for u8 {
    const WIDTH: KeyWidth = KeyWidth::Narrow;

    fn from_usize(value: usize) -> Self {
        value as u8
    }

    fn as_usize(self) -> usize {
        self as usize
    }
}

impl DictionaryKey for u16 {
    const WIDTH: KeyWidth = KeyWidth::Medium;

    fn from_usize(value: usize) -> Self {
        value as u16
    }

    fn as_usize(self) -> usize {
        self as usize
    }
}

impl DictionaryKey for u32 {
    const WIDTH: KeyWidth = KeyWidth::Wide;

    fn from_usize(value: usize) -> Self {
        value as u32
    }

    fn as_usize(self) -> usize {
        self as usize
    }
}

/// The interning table for one key width: forward and reverse maps plus a
/// per-key reference count, and the per-row key stream.
///
/// Keys are assigned densely from zero in first-appearance order; a key is
/// never reused while any row references it.
#[derive(Debug, Clone, Default)]
pub struct DictionaryMap<K: DictionaryKey> {
    row_keys: Vec<K>,
    key_to_value: HashMap<K, Arc<str>>,
    value_to_key: HashMap<Arc<str>, K>,
    key_to_count: HashMap<K, u32>,
    next_key: usize,
}

impl<K: DictionaryKey> DictionaryMap<K> {
    pub fn new() -> Self {
        DictionaryMap {
            row_keys: Vec::new(),
            key_to_value: HashMap::new(),
            value_to_key: HashMap::new(),
            key_to_count: HashMap::new(),
            next_key: 0,
        }
    }

    /// Appends one row, interning `value` if it has not been seen.
    pub fn append(&mut self, value: &str) -> Result<()> {
        let key = self.intern(value)?;
        *self.key_to_count.entry(key).or_insert(0) += 1;
        self.row_keys.push(key);
        Ok(())
    }

    /// Replaces the value at `row`. The old key's count is decremented and
    /// its entry dropped once nothing references it.
    pub fn set(&mut self, row: usize, value: &str) -> Result<()> {
        let old = self.row_keys[row];
        let key = self.intern(value)?;
        *self.key_to_count.entry(key).or_insert(0) += 1;
        self.row_keys[row] = key;
        self.release(old);
        Ok(())
    }

    fn intern(&mut self, value: &str) -> Result<K> {
        if let Some(&key) = self.value_to_key.get(value) {
            return Ok(key);
        }
        if self.next_key >= K::WIDTH.max_cardinality() {
            return Err(DictionaryError::KeySpaceExhausted(K::WIDTH));
        }
        let key = K::from_usize(self.next_key);
        self.next_key += 1;
        let shared: Arc<str> = Arc::from(value);
        self.key_to_value.insert(key, Arc::clone(&shared));
        self.value_to_key.insert(shared, key);
        Ok(key)
    }

    fn release(&mut self, key: K) {
        let count = self
            .key_to_count
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no count for key {}", key.as_usize()));
        *count -= 1;
        if *count == 0 {
            self.key_to_count.remove(&key);
            if let Some(value) = self.key_to_value.remove(&key) {
                self.value_to_key.remove(&value);
            }
        }
    }

    /// The key assigned to `value`, if interned.
    pub fn key_for(&self, value: &str) -> Option<K> {
        self.value_to_key.get(value).copied()
    }

    /// The value behind `key`. Panics on an unassigned key; looking one up
    /// is a caller bug.
    pub fn value(&self, key: K) -> &str {
        self.key_to_value
            .get(&key)
            .unwrap_or_else(|| panic!("no entry for key {}", key.as_usize()))
    }

    /// The value at `row`.
    pub fn get(&self, row: usize) -> &str {
        self.value(self.row_keys[row])
    }

    /// How many rows hold `value`.
    pub fn count_of(&self, value: &str) -> u32 {
        self.key_for(value)
            .and_then(|key| self.key_to_count.get(&key).copied())
            .unwrap_or(0)
    }

    /// How many rows hold the value behind `key`.
    pub fn count_of_key(&self, key: K) -> u32 {
        self.key_to_count.get(&key).copied().unwrap_or(0)
    }

    /// Drops `key` and its value from all three maps. Eviction policy is the
    /// caller's; removing a key that rows still reference leaves those rows
    /// dangling.
    pub fn remove(&mut self, key: K) {
        if let Some(value) = self.key_to_value.remove(&key) {
            self.value_to_key.remove(&value);
        }
        self.key_to_count.remove(&key);
    }

    /// Number of distinct values currently interned.
    pub fn cardinality(&self) -> usize {
        self.key_to_value.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn row_keys(&self) -> &[K] {
        &self.row_keys
    }

    pub fn next_key(&self) -> usize {
        self.next_key
    }

    /// All (key, value, count) entries ordered by key.
    pub fn entries_ordered_by_key(&self) -> Vec<(K, &str, u32)> {
        let mut entries: Vec<_> = self
            .key_to_value
            .iter()
            .map(|(&key, value)| (key, value.as_ref(), self.key_to_count[&key]))
            .collect();
        entries.sort_by_key(|&(key, _, _)| key);
        entries
    }

    /// All distinct values ordered by key, i.e. first-appearance order for a
    /// dictionary that has seen no replacements.
    pub fn values_ordered_by_key(&self) -> Vec<&str> {
        self.entries_ordered_by_key()
            .into_iter()
            .map(|(_, value, _)| value)
            .collect()
    }

    /// Rebuilds a map from its serialized parts. Every row key must name an
    /// entry.
    pub fn from_parts(
        entries: Vec<(K, String, u32)>,
        row_keys: Vec<K>,
        next_key: usize,
    ) -> Result<Self> {
        let mut key_to_value = HashMap::with_capacity(entries.len());
        let mut value_to_key = HashMap::with_capacity(entries.len());
        let mut key_to_count = HashMap::with_capacity(entries.len());
        for (key, value, count) in entries {
            let shared: Arc<str> = Arc::from(value.as_str());
            key_to_value.insert(key, Arc::clone(&shared));
            value_to_key.insert(shared, key);
            key_to_count.insert(key, count);
        }
        for &key in &row_keys {
            if !key_to_value.contains_key(&key) {
                return Err(DictionaryError::DanglingRowKey(key.as_usize()));
            }
        }
        Ok(DictionaryMap {
            row_keys,
            key_to_value,
            value_to_key,
            key_to_count,
            next_key,
        })
    }

    /// Copies this map into the next wider key type, preserving every key
    /// assignment and row position.
    fn widen<W: DictionaryKey>(&self) -> DictionaryMap<W> {
        let mut wider = DictionaryMap::new();
        wider.next_key = self.next_key;
        wider.row_keys = self
            .row_keys
            .iter()
            .map(|&key| W::from_usize(key.as_usize()))
            .collect();
        for (&key, value) in &self.key_to_value {
            let wide_key = W::from_usize(key.as_usize());
            wider.key_to_value.insert(wide_key, Arc::clone(value));
            wider.value_to_key.insert(Arc::clone(value), wide_key);
            wider.key_to_count.insert(wide_key, self.key_to_count[&key]);
        }
        wider
    }
}

/// A dictionary of any key width, presenting keys as `usize`.
#[derive(Debug, Clone)]
pub enum Dictionary {
    Narrow(DictionaryMap<u8>),
    Medium(DictionaryMap<u16>),
    Wide(DictionaryMap<u32>),
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::new()
    }
}

impl Dictionary {
    /// An empty dictionary at the narrowest width.
    pub fn new() -> Self {
        Dictionary::Narrow(DictionaryMap::new())
    }

    pub fn with_width(width: KeyWidth) -> Self {
        match width {
            KeyWidth::Narrow => Dictionary::Narrow(DictionaryMap::new()),
            KeyWidth::Medium => Dictionary::Medium(DictionaryMap::new()),
            KeyWidth::Wide => Dictionary::Wide(DictionaryMap::new()),
        }
    }

    pub fn width(&self) -> KeyWidth {
        match self {
            Dictionary::Narrow(_) => KeyWidth::Narrow,
            Dictionary::Medium(_) => KeyWidth::Medium,
            Dictionary::Wide(_) => KeyWidth::Wide,
        }
    }

    /// Appends one row, promoting to the next key width if the current one
    /// is exhausted. Promotion preserves existing key assignments and row
    /// order.
    pub fn append(&mut self, value: &str) -> Result<()> {
        loop {
            let exhausted = match self {
                Dictionary::Narrow(map) => map.append(value),
                Dictionary::Medium(map) => map.append(value),
                Dictionary::Wide(map) => map.append(value),
            };
            match exhausted {
                Ok(()) => return Ok(()),
                Err(DictionaryError::KeySpaceExhausted(_)) => self.promote()?,
                Err(other) => return Err(other),
            }
        }
    }

    pub fn set(&mut self, row: usize, value: &str) -> Result<()> {
        loop {
            let result = match self {
                Dictionary::Narrow(map) => map.set(row, value),
                Dictionary::Medium(map) => map.set(row, value),
                Dictionary::Wide(map) => map.set(row, value),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(DictionaryError::KeySpaceExhausted(_)) => self.promote()?,
                Err(other) => return Err(other),
            }
        }
    }

    /// Widens in place. Fails only at the widest width.
    pub fn promote(&mut self) -> Result<()> {
        *self = match self {
            Dictionary::Narrow(map) => Dictionary::Medium(map.widen()),
            Dictionary::Medium(map) => Dictionary::Wide(map.widen()),
            Dictionary::Wide(_) => {
                return Err(DictionaryError::KeySpaceExhausted(KeyWidth::Wide))
            }
        };
        Ok(())
    }

    pub fn get(&self, row: usize) -> &str {
        match self {
            Dictionary::Narrow(map) => map.get(row),
            Dictionary::Medium(map) => map.get(row),
            Dictionary::Wide(map) => map.get(row),
        }
    }

    pub fn key_for(&self, value: &str) -> Option<usize> {
        match self {
            Dictionary::Narrow(map) => map.key_for(value).map(u8::as_usize),
            Dictionary::Medium(map) => map.key_for(value).map(u16::as_usize),
            Dictionary::Wide(map) => map.key_for(value).map(u32::as_usize),
        }
    }

    pub fn value(&self, key: usize) -> &str {
        match self {
            Dictionary::Narrow(map) => map.value(u8::from_usize(key)),
            Dictionary::Medium(map) => map.value(u16::from_usize(key)),
            Dictionary::Wide(map) => map.value(u32::from_usize(key)),
        }
    }

    pub fn count_of(&self, value: &str) -> u32 {
        match self {
            Dictionary::Narrow(map) => map.count_of(value),
            Dictionary::Medium(map) => map.count_of(value),
            Dictionary::Wide(map) => map.count_of(value),
        }
    }

    pub fn count_of_key(&self, key: usize) -> u32 {
        match self {
            Dictionary::Narrow(map) => map.count_of_key(u8::from_usize(key)),
            Dictionary::Medium(map) => map.count_of_key(u16::from_usize(key)),
            Dictionary::Wide(map) => map.count_of_key(u32::from_usize(key)),
        }
    }

    pub fn remove(&mut self, key: usize) {
        match self {
            Dictionary::Narrow(map) => map.remove(u8::from_usize(key)),
            Dictionary::Medium(map) => map.remove(u16::from_usize(key)),
            Dictionary::Wide(map) => map.remove(u32::from_usize(key)),
        }
    }

    pub fn cardinality(&self) -> usize {
        match self {
            Dictionary::Narrow(map) => map.cardinality(),
            Dictionary::Medium(map) => map.cardinality(),
            Dictionary::Wide(map) => map.cardinality(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Dictionary::Narrow(map) => map.row_count(),
            Dictionary::Medium(map) => map.row_count(),
            Dictionary::Wide(map) => map.row_count(),
        }
    }

    pub fn next_key(&self) -> usize {
        match self {
            Dictionary::Narrow(map) => map.next_key(),
            Dictionary::Medium(map) => map.next_key(),
            Dictionary::Wide(map) => map.next_key(),
        }
    }

    /// All (key, value, count) entries ordered by key.
    pub fn entries_ordered_by_key(&self) -> Vec<(usize, &str, u32)> {
        match self {
            Dictionary::Narrow(map) => map
                .entries_ordered_by_key()
                .into_iter()
                .map(|(k, v, c)| (k.as_usize(), v, c))
                .collect(),
            Dictionary::Medium(map) => map
                .entries_ordered_by_key()
                .into_iter()
                .map(|(k, v, c)| (k.as_usize(), v, c))
                .collect(),
            Dictionary::Wide(map) => map
                .entries_ordered_by_key()
                .into_iter()
                .map(|(k, v, c)| (k.as_usize(), v, c))
                .collect(),
        }
    }

    /// The per-row key stream as width-erased keys.
    pub fn row_keys(&self) -> Vec<usize> {
        match self {
            Dictionary::Narrow(map) => map.row_keys().iter().map(|k| k.as_usize()).collect(),
            Dictionary::Medium(map) => map.row_keys().iter().map(|k| k.as_usize()).collect(),
            Dictionary::Wide(map) => map.row_keys().iter().map(|k| k.as_usize()).collect(),
        }
    }

    /// Rebuilds a dictionary of the given width from serialized parts.
    pub fn from_parts(
        width: KeyWidth,
        entries: Vec<(usize, String, u32)>,
        row_keys: Vec<usize>,
        next_key: usize,
    ) -> Result<Self> {
        fn narrow<K: DictionaryKey>(
            entries: Vec<(usize, String, u32)>,
            row_keys: Vec<usize>,
            next_key: usize,
        ) -> Result<DictionaryMap<K>> {
            let entries = entries
                .into_iter()
                .map(|(k, v, c)| (K::from_usize(k), v, c))
                .collect();
            let row_keys = row_keys.into_iter().map(K::from_usize).collect();
            DictionaryMap::from_parts(entries, row_keys, next_key)
        }
        Ok(match width {
            KeyWidth::Narrow => Dictionary::Narrow(narrow(entries, row_keys, next_key)?),
            KeyWidth::Medium => Dictionary::Medium(narrow(entries, row_keys, next_key)?),
            KeyWidth::Wide => Dictionary::Wide(narrow(entries, row_keys, next_key)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_assigns_dense_keys_in_first_appearance_order() {
        let mut map: DictionaryMap<u8> = DictionaryMap::new();
        for value in ["red", "green", "red", "blue", "green", "red"] {
            map.append(value).unwrap();
        }
        assert_eq!(map.row_count(), 6);
        assert_eq!(map.cardinality(), 3);
        assert_eq!(map.key_for("red"), Some(0));
        assert_eq!(map.key_for("green"), Some(1));
        assert_eq!(map.key_for("blue"), Some(2));
        assert_eq!(map.key_for("yellow"), None);
        assert_eq!(map.count_of("red"), 3);
        assert_eq!(map.count_of("blue"), 1);
        assert_eq!(map.count_of("yellow"), 0);
        assert_eq!(map.get(3), "blue");
        assert_eq!(map.values_ordered_by_key(), vec!["red", "green", "blue"]);
    }

    #[test]
    fn narrow_key_space_is_exactly_256() {
        let mut map: DictionaryMap<u8> = DictionaryMap::new();
        for i in 0..256 {
            map.append(&format!("v{i}")).unwrap();
        }
        // Re-appending an interned value still fits.
        map.append("v0").unwrap();
        assert_eq!(
            map.append("v256"),
            Err(DictionaryError::KeySpaceExhausted(KeyWidth::Narrow))
        );
    }

    #[test]
    fn remove_keeps_maps_consistent() {
        let mut map: DictionaryMap<u8> = DictionaryMap::new();
        map.append("a").unwrap();
        map.append("b").unwrap();
        let key = map.key_for("a").unwrap();
        assert_eq!(map.count_of_key(key), 1);
        map.remove(key);
        assert_eq!(map.key_for("a"), None);
        assert_eq!(map.count_of_key(key), 0);
        assert_eq!(map.cardinality(), 1);
        // Removed keys are never reassigned.
        map.append("c").unwrap();
        assert_eq!(map.key_for("c"), Some(2));
    }

    #[test]
    fn set_releases_unreferenced_entries() {
        let mut map: DictionaryMap<u16> = DictionaryMap::new();
        map.append("a").unwrap();
        map.append("b").unwrap();
        map.set(0, "c").unwrap();
        assert_eq!(map.get(0), "c");
        assert_eq!(map.cardinality(), 2);
        assert_eq!(map.key_for("a"), None);
        // Released keys are not recycled.
        assert_eq!(map.key_for("c"), Some(2));
    }

    #[test]
    fn promotion_preserves_keys_and_rows() {
        let mut dict = Dictionary::new();
        for i in 0..300 {
            dict.append(&format!("v{}", i % 300)).unwrap();
        }
        assert_eq!(dict.width(), KeyWidth::Medium);
        assert_eq!(dict.cardinality(), 300);
        assert_eq!(dict.row_count(), 300);
        // Keys assigned while narrow survive the promotion unchanged.
        assert_eq!(dict.key_for("v0"), Some(0));
        assert_eq!(dict.key_for("v255"), Some(255));
        assert_eq!(dict.key_for("v299"), Some(299));
        assert_eq!(dict.get(0), "v0");
        assert_eq!(dict.get(299), "v299");
    }

    #[test]
    fn promotion_keeps_counts() {
        let mut dict = Dictionary::new();
        for _ in 0..3 {
            dict.append("hot").unwrap();
        }
        for i in 0..256 {
            dict.append(&format!("v{i}")).unwrap();
        }
        assert_eq!(dict.width(), KeyWidth::Medium);
        assert_eq!(dict.count_of("hot"), 3);
        assert_eq!(dict.count_of("v255"), 1);
    }

    #[test]
    fn width_for_cardinality() {
        assert_eq!(KeyWidth::for_cardinality(0), KeyWidth::Narrow);
        assert_eq!(KeyWidth::for_cardinality(256), KeyWidth::Narrow);
        assert_eq!(KeyWidth::for_cardinality(257), KeyWidth::Medium);
        assert_eq!(KeyWidth::for_cardinality(65_536), KeyWidth::Medium);
        assert_eq!(KeyWidth::for_cardinality(65_537), KeyWidth::Wide);
    }

    #[test]
    fn from_parts_round_trips() {
        let mut dict = Dictionary::new();
        for value in ["x", "y", "x", "z"] {
            dict.append(value).unwrap();
        }
        let entries = dict
            .entries_ordered_by_key()
            .into_iter()
            .map(|(k, v, c)| (k, v.to_owned(), c))
            .collect();
        let rebuilt =
            Dictionary::from_parts(dict.width(), entries, dict.row_keys(), dict.next_key())
                .unwrap();
        assert_eq!(rebuilt.row_count(), 4);
        assert_eq!(rebuilt.get(2), "x");
        assert_eq!(rebuilt.count_of("x"), 2);
        assert_eq!(rebuilt.key_for("z"), dict.key_for("z"));
    }

    #[test]
    fn from_parts_rejects_dangling_row_keys() {
        let err = Dictionary::from_parts(
            KeyWidth::Narrow,
            vec![(0, "only".to_owned(), 1)],
            vec![0, 7],
            1,
        )
        .unwrap_err();
        assert_eq!(err, DictionaryError::DanglingRowKey(7));
    }

    #[test]
    fn wide_width_cannot_promote() {
        let mut dict = Dictionary::with_width(KeyWidth::Wide);
        dict.append("v").unwrap();
        assert_eq!(
            dict.promote(),
            Err(DictionaryError::KeySpaceExhausted(KeyWidth::Wide))
        );
    }
}
