//! Encoding-aware text specs.

use crate::context::{ContextKey, FrameContext};
use crate::encoding::split_terminated;
use crate::error::SpecError;
use crate::spec::FieldSpec;
use crate::timestamp::Id3Timestamp;
use crate::value::FieldValue;

/// Semantic intent of a text field's content.
///
/// The intent does not change wire behaviour; it tags fields whose
/// content an upper layer may want to check as a numeral (track numbers)
/// or a `part/total` pair (disc numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextIntent {
    #[default]
    Plain,
    Numeric,
    NumericPart,
}

/// Variable-length text in the frame's selected encoding, terminated by
/// the encoding's terminator.
pub struct EncodedTextSpec {
    name: String,
    intent: TextIntent,
}

impl EncodedTextSpec {
    pub fn new(name: impl Into<String>) -> Self {
        EncodedTextSpec { name: name.into(), intent: TextIntent::Plain }
    }

    /// A text field whose content is a numeral.
    pub fn numeric(name: impl Into<String>) -> Self {
        EncodedTextSpec { name: name.into(), intent: TextIntent::Numeric }
    }

    /// A text field whose content is a `part/total` numeral pair.
    pub fn numeric_part(name: impl Into<String>) -> Self {
        EncodedTextSpec { name: name.into(), intent: TextIntent::NumericPart }
    }

    pub fn intent(&self) -> TextIntent {
        self.intent
    }
}

impl FieldSpec for EncodedTextSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let enc = ctx.text_encoding();
        let width = enc.terminator().len();
        let (content, rest) = split_terminated(data, width);
        if content.len() < width {
            // Nothing, or a stray byte too short to be a code unit.
            return Ok((FieldValue::Text(String::new()), rest));
        }
        Ok((FieldValue::Text(enc.decode(content)?), rest))
    }

    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::Text(s) => {
                let enc = ctx.text_encoding();
                let mut out = enc.encode(s)?;
                out.extend_from_slice(enc.terminator());
                Ok(out)
            }
            _ => Err(SpecError::Format("text field requires text")),
        }
    }

    fn validate(&self, ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::Text(s) => {
                ctx.text_encoding().encode(&s)?;
                Ok(FieldValue::Text(s))
            }
            _ => Err(SpecError::Format("text field requires text")),
        }
    }

    fn reads(&self) -> &[ContextKey] {
        &[ContextKey::Encoding]
    }

    fn merges_on_downgrade(&self) -> bool {
        true
    }
}

/// Text that is Latin-1 on the wire no matter what encoding the frame
/// selected (owner identifiers, URLs).
pub struct Latin1TextSpec {
    name: String,
}

impl Latin1TextSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Latin1TextSpec { name: name.into() }
    }
}

impl FieldSpec for Latin1TextSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let (content, rest) = split_terminated(data, 1);
        let text: String = content.iter().map(|&b| char::from(b)).collect();
        Ok((FieldValue::Text(text), rest))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::Text(s) => {
                let mut out = crate::encoding::TextEncoding::Latin1.encode(s)?;
                out.push(0);
                Ok(out)
            }
            _ => Err(SpecError::Format("text field requires text")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::Text(s) => {
                crate::encoding::TextEncoding::Latin1.encode(&s)?;
                Ok(FieldValue::Text(s))
            }
            _ => Err(SpecError::Format("text field requires text")),
        }
    }

    fn merges_on_downgrade(&self) -> bool {
        true
    }
}

/// Timestamp text: an encoded-text field whose value is parsed into an
/// [`Id3Timestamp`]. Serialising puts the `T` date/time separator back,
/// as the canonical in-memory form uses a space.
pub struct TimestampSpec {
    inner: EncodedTextSpec,
}

impl TimestampSpec {
    pub fn new(name: impl Into<String>) -> Self {
        TimestampSpec { inner: EncodedTextSpec::new(name) }
    }
}

impl FieldSpec for TimestampSpec {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        match self.inner.read(ctx, data)? {
            (FieldValue::Text(s), rest) => {
                Ok((FieldValue::Timestamp(Id3Timestamp::new(&s)), rest))
            }
            (_, rest) => Ok((FieldValue::Timestamp(Id3Timestamp::new("")), rest)),
        }
    }

    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::Timestamp(ts) => {
                let wire = ts.text().replace(' ', "T");
                self.inner.write(ctx, &FieldValue::Text(wire))
            }
            _ => Err(SpecError::Format("timestamp field requires a timestamp")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::Timestamp(ts) => Ok(FieldValue::Timestamp(ts)),
            FieldValue::Text(s) => Ok(FieldValue::Timestamp(Id3Timestamp::new(&s))),
            _ => Err(SpecError::Format("timestamp field requires a timestamp")),
        }
    }

    fn reads(&self) -> &[ContextKey] {
        self.inner.reads()
    }

    // Timestamps never merge on downgrade: a joined list of dates is
    // not a date.
}
