//! Primitive field specs: bytes, integers, fixed strings and raw data.

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::spec::{DowngradeOptions, FieldSpec};
use crate::value::FieldValue;

/// A single unsigned byte.
pub struct ByteSpec {
    name: String,
    stores: Option<ContextKey>,
}

impl ByteSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ByteSpec { name: name.into(), stores: None }
    }

    /// A byte field whose decoded value feeds a context key, e.g. the
    /// seek index bit width.
    pub fn stored(name: impl Into<String>, key: ContextKey) -> Self {
        ByteSpec { name: name.into(), stores: Some(key) }
    }
}

impl FieldSpec for ByteSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        match data.split_first() {
            Some((&first, rest)) => Ok((FieldValue::UInt(u64::from(first)), rest)),
            None => Err(SpecError::MalformedFrame("byte field on empty buffer")),
        }
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::UInt(v) => match u8::try_from(*v) {
                Ok(b) => Ok(vec![b]),
                Err(_) => Err(SpecError::Range("byte value does not fit in 8 bits")),
            },
            _ => Err(SpecError::Format("byte field requires an integer")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::UInt(v) if v <= 0xff => Ok(FieldValue::UInt(v)),
            FieldValue::Binary(b) if b.len() == 1 => Ok(FieldValue::UInt(u64::from(b[0]))),
            _ => Err(SpecError::Range("byte value does not fit in 8 bits")),
        }
    }

    fn stores(&self) -> Option<ContextKey> {
        self.stores
    }
}

/// An unsigned integer filling the whole remaining payload, base 256.
/// Play counters use this; the field grows a byte at a time as the
/// count overflows its current width.
pub struct IntegerSpec {
    name: String,
}

impl IntegerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        IntegerSpec { name: name.into() }
    }
}

impl FieldSpec for IntegerSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        Ok((
            FieldValue::UInt(tagcodec_synchsafe::decode(data, 8)),
            &data[data.len()..],
        ))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::UInt(v) => tagcodec_synchsafe::encode(*v, 8, None)
                .map_err(|_| SpecError::Range("integer too wide")),
            _ => Err(SpecError::Format("integer field requires an integer")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        validate_integer(value)
    }
}

/// An unsigned integer with a fixed byte width, base 256, big-endian.
pub struct SizedIntegerSpec {
    name: String,
    size: usize,
    stores: Option<ContextKey>,
}

impl SizedIntegerSpec {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        SizedIntegerSpec { name: name.into(), size, stores: None }
    }

    /// A sized integer whose decoded value feeds a context key, e.g. the
    /// seek index point count.
    pub fn stored(name: impl Into<String>, size: usize, key: ContextKey) -> Self {
        SizedIntegerSpec { name: name.into(), size, stores: Some(key) }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl FieldSpec for SizedIntegerSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        if data.len() < self.size {
            return Err(SpecError::MalformedFrame("truncated sized integer"));
        }
        let (field, rest) = data.split_at(self.size);
        Ok((FieldValue::UInt(tagcodec_synchsafe::decode(field, 8)), rest))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::UInt(v) => tagcodec_synchsafe::encode(*v, 8, Some(self.size))
                .map_err(|_| SpecError::Range("integer does not fit the declared width")),
            _ => Err(SpecError::Format("integer field requires an integer")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match validate_integer(value)? {
            FieldValue::UInt(v) if self.size < 8 && v >> (self.size * 8) != 0 => {
                Err(SpecError::Range("integer does not fit the declared width"))
            }
            other => Ok(other),
        }
    }

    fn stores(&self) -> Option<ContextKey> {
        self.stores
    }
}

fn validate_integer(value: FieldValue) -> Result<FieldValue, SpecError> {
    match value {
        FieldValue::None => Ok(FieldValue::None),
        FieldValue::UInt(v) => Ok(FieldValue::UInt(v)),
        FieldValue::Text(s) => match s.parse::<u64>() {
            Ok(v) => Ok(FieldValue::UInt(v)),
            Err(_) => Err(SpecError::Format("integer field requires an integer")),
        },
        _ => Err(SpecError::Format("integer field requires an integer")),
    }
}

/// The text encoding selector byte.
///
/// Reads leniently: selector values 4..=15 pass through undisturbed for
/// the context to reject, and a byte of 16 or more is taken to be the
/// first byte of the next field from a writer that skipped the selector
/// entirely. In that case the value is 0 and nothing is consumed.
pub struct EncodingSpec {
    name: String,
}

impl EncodingSpec {
    pub fn new(name: impl Into<String>) -> Self {
        EncodingSpec { name: name.into() }
    }
}

impl FieldSpec for EncodingSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        match data.split_first() {
            Some((&first, rest)) if first < 16 => Ok((FieldValue::UInt(u64::from(first)), rest)),
            Some(_) => Ok((FieldValue::UInt(0), data)),
            None => Err(SpecError::MalformedFrame("encoding byte on empty buffer")),
        }
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::UInt(v) => match u8::try_from(*v) {
                Ok(b) => Ok(vec![b]),
                Err(_) => Err(SpecError::Range("encoding must be 0..=3")),
            },
            _ => Err(SpecError::Format("encoding field requires an integer")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::UInt(v) if v <= 3 => Ok(FieldValue::UInt(v)),
            _ => Err(SpecError::Range("encoding must be 0..=3")),
        }
    }

    /// ID3v2.3 knows only Latin-1 and UTF-16 with byte order mark; the
    /// v2.4-only encodings map to UTF-16.
    fn downgrade(
        &self,
        _ctx: &FrameContext,
        value: FieldValue,
        _opts: &DowngradeOptions,
    ) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::UInt(v) => Ok(FieldValue::UInt(v.min(1))),
            other => Ok(other),
        }
    }

    fn stores(&self) -> Option<ContextKey> {
        Some(ContextKey::Encoding)
    }
}

/// Fixed-length Latin-1 text (language codes, date fragments).
pub struct StringSpec {
    name: String,
    len: usize,
}

impl StringSpec {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        StringSpec { name: name.into(), len }
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl FieldSpec for StringSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        if data.len() < self.len {
            return Err(SpecError::MalformedFrame("truncated fixed-length string"));
        }
        let (field, rest) = data.split_at(self.len);
        let text: String = field.iter().map(|&b| char::from(b)).collect();
        Ok((FieldValue::Text(text), rest))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            // An unset field still occupies its bytes.
            FieldValue::None => Ok(vec![0; self.len]),
            FieldValue::Text(s) => {
                let mut out = crate::encoding::TextEncoding::Latin1.encode(s)?;
                out.resize(self.len, 0);
                Ok(out)
            }
            _ => Err(SpecError::Format("string field requires text")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        let text = match value {
            FieldValue::None => return Ok(FieldValue::None),
            FieldValue::Text(s) => s,
            FieldValue::Binary(b) => b.iter().map(|&x| char::from(x)).collect(),
            _ => return Err(SpecError::Format("string field requires text")),
        };
        let actual = text.chars().count();
        if actual == self.len {
            Ok(FieldValue::Text(text))
        } else {
            Err(SpecError::LengthMismatch { expected: self.len, actual })
        }
    }
}

/// The opaque remainder of a frame payload.
pub struct BinaryDataSpec {
    name: String,
}

impl BinaryDataSpec {
    pub fn new(name: impl Into<String>) -> Self {
        BinaryDataSpec { name: name.into() }
    }
}

impl FieldSpec for BinaryDataSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        Ok((FieldValue::Binary(data.to_vec()), &data[data.len()..]))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::None => Ok(Vec::new()),
            FieldValue::Binary(b) => Ok(b.clone()),
            FieldValue::Text(s) if s.is_ascii() => Ok(s.as_bytes().to_vec()),
            FieldValue::Text(_) => Err(SpecError::Format("binary data from text must be ascii")),
            FieldValue::UInt(v) => Ok(v.to_string().into_bytes()),
            _ => Err(SpecError::Format("binary field requires bytes")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::Binary(b) => Ok(FieldValue::Binary(b)),
            FieldValue::Text(s) if s.is_ascii() => Ok(FieldValue::Binary(s.into_bytes())),
            FieldValue::Text(_) => Err(SpecError::Format("binary data from text must be ascii")),
            FieldValue::UInt(v) => Ok(FieldValue::Binary(v.to_string().into_bytes())),
            _ => Err(SpecError::Format("binary field requires bytes")),
        }
    }
}
