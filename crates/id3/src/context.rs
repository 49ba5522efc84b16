//! Per-frame decoding context.

use crate::encoding::TextEncoding;
use crate::value::FieldValue;

/// A context key a spec may read from, or store into, a [`FrameContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    /// The selected text encoding.
    Encoding,
    /// Seek index bit width (`b`).
    BitWidth,
    /// Seek index point count (`N`).
    Count,
}

/// Mutable state shared by the fields of one frame while it is decoded
/// or encoded.
///
/// Field lists are walked in catalogue order; each field whose spec
/// declares a stored key feeds its decoded value into the context, and
/// later specs read it from here. A spec reading a key before any field
/// stored it sees `None`: text specs then fall back to Latin-1 and the
/// seek index degrades to an empty result, so a missing selector never
/// aborts a decode. One context serves one frame; concurrent decodes
/// each use their own.
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    /// Selected text encoding, if an encoding field has been decoded.
    pub encoding: Option<TextEncoding>,
    /// Seek index bit width, if a width field has been decoded.
    pub bit_width: Option<u8>,
    /// Seek index point count, if a count field has been decoded.
    pub count: Option<u32>,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with the text encoding already selected.
    pub fn with_encoding(encoding: TextEncoding) -> Self {
        FrameContext {
            encoding: Some(encoding),
            ..Self::default()
        }
    }

    /// The effective text encoding: Latin-1 until one is selected.
    pub fn text_encoding(&self) -> TextEncoding {
        self.encoding.unwrap_or(TextEncoding::Latin1)
    }

    /// Stores a decoded field value under `key`.
    ///
    /// Never fails: a value of the wrong variant or outside the key's
    /// range leaves the key unset. The walk has to survive whatever the
    /// payload contained.
    pub fn store(&mut self, key: ContextKey, value: &FieldValue) {
        match key {
            ContextKey::Encoding => {
                self.encoding = value
                    .as_uint()
                    .and_then(|v| u8::try_from(v).ok())
                    .and_then(|b| TextEncoding::try_from(b).ok());
            }
            ContextKey::BitWidth => {
                self.bit_width = value.as_uint().and_then(|v| u8::try_from(v).ok());
            }
            ContextKey::Count => {
                self.count = value.as_uint().and_then(|v| u32::try_from(v).ok());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_latin1() {
        let ctx = FrameContext::new();
        assert_eq!(ctx.encoding, None);
        assert_eq!(ctx.text_encoding(), TextEncoding::Latin1);
    }

    #[test]
    fn stores_encoding() {
        let mut ctx = FrameContext::new();
        ctx.store(ContextKey::Encoding, &FieldValue::UInt(3));
        assert_eq!(ctx.encoding, Some(TextEncoding::Utf8));
        assert_eq!(ctx.text_encoding(), TextEncoding::Utf8);
    }

    #[test]
    fn unusable_value_leaves_key_unset() {
        let mut ctx = FrameContext::new();
        ctx.store(ContextKey::Encoding, &FieldValue::UInt(9));
        assert_eq!(ctx.encoding, None);
        ctx.store(ContextKey::Encoding, &FieldValue::Text("1".into()));
        assert_eq!(ctx.encoding, None);
        ctx.store(ContextKey::BitWidth, &FieldValue::UInt(999));
        assert_eq!(ctx.bit_width, None);
    }

    #[test]
    fn stores_seek_index_parameters() {
        let mut ctx = FrameContext::new();
        ctx.store(ContextKey::BitWidth, &FieldValue::UInt(16));
        ctx.store(ContextKey::Count, &FieldValue::UInt(120));
        assert_eq!(ctx.bit_width, Some(16));
        assert_eq!(ctx.count, Some(120));
    }

    #[test]
    fn restore_overwrites() {
        let mut ctx = FrameContext::with_encoding(TextEncoding::Utf16);
        ctx.store(ContextKey::Encoding, &FieldValue::UInt(0));
        assert_eq!(ctx.encoding, Some(TextEncoding::Latin1));
    }
}
