//! The value model shared by every field spec.

use crate::timestamp::Id3Timestamp;

/// A decoded (or to-be-encoded) frame field value.
///
/// One tagged union flows through the whole catalogue: primitive specs
/// produce [`UInt`](FieldValue::UInt), [`Text`](FieldValue::Text) or
/// [`Binary`](FieldValue::Binary); the bespoke binary specs keep their
/// natural element types in dedicated variants instead of forcing lists
/// of records on callers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent value. Validating `None` keeps the field unset.
    #[default]
    None,
    /// Unsigned integer (bytes, counters, selector values).
    UInt(u64),
    /// Fractional value (volume adjustments, peaks).
    Float(f64),
    /// Decoded text.
    Text(String),
    /// Opaque bytes.
    Binary(Vec<u8>),
    /// Parsed timestamp.
    Timestamp(Id3Timestamp),
    /// Values of a repeated single-spec field, in payload order.
    List(Vec<FieldValue>),
    /// One row of a repeated multi-spec field.
    Record(Vec<FieldValue>),
    /// Synchronised text events as `(text, time)` pairs, in payload order.
    SyncedText(Vec<(String, u32)>),
    /// Key events as `(event type, time)` pairs, in payload order.
    KeyEvents(Vec<(i8, u32)>),
    /// Equalisation points as `(frequency in Hz, adjustment in dB)` pairs.
    VolumeTable(Vec<(f64, f64)>),
    /// Seek index fractions.
    IndexPoints(Vec<u16>),
}

impl FieldValue {
    /// True only for [`FieldValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    /// The contained integer, if this is a [`FieldValue::UInt`].
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FieldValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// The contained text, if this is a [`FieldValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::UInt(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Binary(value)
    }
}

impl From<Id3Timestamp> for FieldValue {
    fn from(value: Id3Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}
