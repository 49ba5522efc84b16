//! Timed text and key event specs.
//!
//! Reference: ID3 tag version 2.4.0 - Native Frames §4.7 (ETCO) and
//! §4.9 (SYLT).

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::spec::FieldSpec;
use crate::value::FieldValue;

/// The event body of a synchronised lyrics frame: terminated text and a
/// 32-bit timestamp, repeated to the end of the payload.
///
/// The terminator search is a raw byte scan. Unlike plain text fields it
/// is not aligned to code units, matching how these frames have always
/// been parsed in the wild.
pub struct SynchronizedTextSpec {
    name: String,
}

impl SynchronizedTextSpec {
    pub fn new(name: impl Into<String>) -> Self {
        SynchronizedTextSpec { name: name.into() }
    }
}

impl FieldSpec for SynchronizedTextSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let enc = ctx.text_encoding();
        let term = enc.terminator();
        let mut events = Vec::new();
        let mut rest = data;
        while !rest.is_empty() {
            let idx = match rest.windows(term.len()).position(|w| w == term) {
                Some(idx) => idx,
                None => {
                    return Err(SpecError::MalformedFrame(
                        "synchronised text missing terminator",
                    ))
                }
            };
            let text = enc.decode(&rest[..idx])?;
            let after = idx + term.len();
            let time = match &rest[after..] {
                [a, b, c, d, ..] => u32::from_be_bytes([*a, *b, *c, *d]),
                _ => {
                    return Err(SpecError::MalformedFrame(
                        "synchronised text missing timestamp",
                    ))
                }
            };
            events.push((text, time));
            rest = &rest[after + 4..];
        }
        Ok((FieldValue::SyncedText(events), rest))
    }

    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let events = match value {
            FieldValue::SyncedText(events) => events,
            _ => return Err(SpecError::Format("synchronised text requires timed events")),
        };
        let enc = ctx.text_encoding();
        let mut out = Vec::new();
        for (text, time) in events {
            out.extend(enc.encode(text)?);
            out.extend_from_slice(enc.terminator());
            out.extend_from_slice(&time.to_be_bytes());
        }
        Ok(out)
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::SyncedText(events) => Ok(FieldValue::SyncedText(events)),
            _ => Err(SpecError::Format("synchronised text requires timed events")),
        }
    }

    fn reads(&self) -> &[ContextKey] {
        &[ContextKey::Encoding]
    }
}

/// Timed key events (intro, verse, chorus...): a signed event type byte
/// and a 32-bit timestamp, repeated to the end of the payload.
pub struct KeyEventSpec {
    name: String,
}

impl KeyEventSpec {
    pub fn new(name: impl Into<String>) -> Self {
        KeyEventSpec { name: name.into() }
    }
}

impl FieldSpec for KeyEventSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let mut events = Vec::new();
        let mut rest = data;
        while let [kind, a, b, c, d, tail @ ..] = rest {
            events.push((*kind as i8, u32::from_be_bytes([*a, *b, *c, *d])));
            rest = tail;
        }
        // A trailing fragment shorter than one event is left unconsumed.
        Ok((FieldValue::KeyEvents(events), rest))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let events = match value {
            FieldValue::KeyEvents(events) => events,
            _ => return Err(SpecError::Format("key events require typed events")),
        };
        let mut out = Vec::with_capacity(events.len() * 5);
        for (kind, time) in events {
            out.push(*kind as u8);
            out.extend_from_slice(&time.to_be_bytes());
        }
        Ok(out)
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::KeyEvents(events) => Ok(FieldValue::KeyEvents(events)),
            _ => Err(SpecError::Format("key events require typed events")),
        }
    }
}
