//! NBT tag types.
//!
//! Compound accessors follow the Java edition conventions used by block
//! entities: `get_int("Missing")` yields 0 rather than an error, so load
//! hooks can read optional keys without branching.

use std::collections::BTreeMap;
use std::fmt;

/// A named root compound (the root always has a name, usually the empty string).
#[derive(Debug, Clone, PartialEq)]
pub struct NbtRoot {
    pub name: String,
    pub compound: NbtCompound,
}

impl NbtRoot {
    pub fn new(name: impl Into<String>, compound: NbtCompound) -> Self {
        Self {
            name: name.into(),
            compound,
        }
    }
}

/// Represents any NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtTag {
    pub const END: u8 = 0;
    pub const COMPOUND: u8 = 10;

    /// Numeric tag type ID (1-12). TAG_End (0) has no value form.
    pub fn type_id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => 1,
            NbtTag::Short(_) => 2,
            NbtTag::Int(_) => 3,
            NbtTag::Long(_) => 4,
            NbtTag::Float(_) => 5,
            NbtTag::Double(_) => 6,
            NbtTag::ByteArray(_) => 7,
            NbtTag::String(_) => 8,
            NbtTag::List(_) => 9,
            NbtTag::Compound(_) => 10,
            NbtTag::IntArray(_) => 11,
            NbtTag::LongArray(_) => 12,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            NbtTag::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            NbtTag::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            NbtTag::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NbtTag]> {
        match self {
            NbtTag::List(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for NbtTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtTag::Byte(v) => write!(f, "{v}b"),
            NbtTag::Short(v) => write!(f, "{v}s"),
            NbtTag::Int(v) => write!(f, "{v}"),
            NbtTag::Long(v) => write!(f, "{v}L"),
            NbtTag::Float(v) => write!(f, "{v}f"),
            NbtTag::Double(v) => write!(f, "{v}d"),
            NbtTag::ByteArray(v) => write!(f, "[B; {} elements]", v.len()),
            NbtTag::String(v) => write!(f, "\"{v}\""),
            NbtTag::List(v) => write!(f, "[{} elements]", v.len()),
            NbtTag::Compound(v) => write!(f, "{{{} entries}}", v.len()),
            NbtTag::IntArray(v) => write!(f, "[I; {} elements]", v.len()),
            NbtTag::LongArray(v) => write!(f, "[L; {} elements]", v.len()),
        }
    }
}

/// A compound tag: ordered map of name -> tag.
///
/// Keys are kept sorted so that encoding the same compound twice yields
/// identical bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NbtCompound {
    entries: BTreeMap<String, NbtTag>,
}

impl NbtCompound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&NbtTag> {
        self.entries.get(key)
    }

    /// Insert a tag, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, tag: NbtTag) -> Option<NbtTag> {
        self.entries.insert(key.into(), tag)
    }

    pub fn remove(&mut self, key: &str) -> Option<NbtTag> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NbtTag)> {
        self.entries.iter()
    }

    pub fn put_byte(&mut self, key: impl Into<String>, value: i8) {
        self.insert(key, NbtTag::Byte(value));
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.insert(key, NbtTag::Int(value));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, NbtTag::String(value.into()));
    }

    pub fn put_list(&mut self, key: impl Into<String>, values: Vec<NbtTag>) {
        self.insert(key, NbtTag::List(values));
    }

    pub fn put_compound(&mut self, key: impl Into<String>, value: NbtCompound) {
        self.insert(key, NbtTag::Compound(value));
    }

    /// Byte value under `key`, or 0 when absent or not a byte.
    pub fn get_byte(&self, key: &str) -> i8 {
        self.get(key).and_then(NbtTag::as_byte).unwrap_or(0)
    }

    /// Int value under `key`, or 0 when absent or not an int.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get(key).and_then(NbtTag::as_int).unwrap_or(0)
    }

    /// String value under `key`, or `""` when absent or not a string.
    pub fn get_string(&self, key: &str) -> &str {
        self.get(key).and_then(NbtTag::as_string).unwrap_or_default()
    }

    /// List under `key`, or an empty slice.
    pub fn get_list(&self, key: &str) -> &[NbtTag] {
        self.get(key).and_then(NbtTag::as_list).unwrap_or_default()
    }

    pub fn get_compound(&self, key: &str) -> Option<&NbtCompound> {
        self.get(key).and_then(NbtTag::as_compound)
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    fn from_iter<I: IntoIterator<Item = (String, NbtTag)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids() {
        assert_eq!(NbtTag::Byte(0).type_id(), 1);
        assert_eq!(NbtTag::Int(0).type_id(), 3);
        assert_eq!(NbtTag::String(String::new()).type_id(), 8);
        assert_eq!(NbtTag::List(vec![]).type_id(), 9);
        assert_eq!(NbtTag::Compound(NbtCompound::new()).type_id(), 10);
        assert_eq!(NbtTag::LongArray(vec![]).type_id(), 12);
    }

    #[test]
    fn missing_keys_read_as_defaults() {
        let c = NbtCompound::new();
        assert_eq!(c.get_int("Progress"), 0);
        assert_eq!(c.get_byte("Slot"), 0);
        assert_eq!(c.get_string("id"), "");
        assert!(c.get_list("Items").is_empty());
    }

    #[test]
    fn mistyped_int_reads_as_zero() {
        let mut c = NbtCompound::new();
        c.put_string("Progress", "12");
        assert_eq!(c.get_int("Progress"), 0);
    }

    #[test]
    fn put_then_get() {
        let mut c = NbtCompound::new();
        c.put_int("FuelTime", 1599);
        c.put_byte("Slot", 9);
        assert_eq!(c.get_int("FuelTime"), 1599);
        assert_eq!(c.get_byte("Slot"), 9);
        assert!(c.contains("FuelTime"));
        assert_eq!(c.len(), 2);
    }
}
