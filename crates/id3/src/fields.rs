//! Ordered field lists and the whole-payload walk.

use log::warn;
use thiserror::Error;

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::spec::FieldSpec;
use crate::value::FieldValue;

/// A field list is mis-ordered: a field reads a context key that no
/// earlier field stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field `{field}` reads {key:?} before any field stores it")]
pub struct ContextOrderError {
    pub field: String,
    pub key: ContextKey,
}

/// The ordered field specs of one frame kind.
///
/// Decoding walks the specs front to back, threading the unconsumed
/// remainder and the shared [`FrameContext`] through them, so selector
/// fields decoded early (encoding, seek index geometry) steer the specs
/// after them. Encoding performs the same walk over values.
pub struct FieldList {
    specs: Vec<Box<dyn FieldSpec>>,
}

impl FieldList {
    pub fn new(specs: Vec<Box<dyn FieldSpec>>) -> Self {
        FieldList { specs }
    }

    pub fn specs(&self) -> &[Box<dyn FieldSpec>] {
        &self.specs
    }

    /// Decodes every field of `data` in order.
    ///
    /// Each spec must find a non-empty buffer; a payload that runs out
    /// mid-walk is malformed even where the next spec could decode
    /// nothing, since a frame that short was not written by this
    /// grammar. Returns the values in spec order and whatever trailing
    /// bytes no spec consumed; non-zero leftovers are logged, zero
    /// padding is not.
    pub fn read_all<'a>(
        &self,
        ctx: &mut FrameContext,
        data: &'a [u8],
    ) -> Result<(Vec<FieldValue>, &'a [u8]), SpecError> {
        let mut values = Vec::with_capacity(self.specs.len());
        let mut rest = data;
        for spec in &self.specs {
            if rest.is_empty() {
                return Err(SpecError::MalformedFrame("frame payload exhausted"));
            }
            let (value, next) = spec.read(ctx, rest)?;
            if let Some(key) = spec.stores() {
                ctx.store(key, &value);
            }
            values.push(value);
            rest = next;
        }
        if rest.iter().any(|&b| b != 0) {
            warn!("{} leftover byte(s) after frame fields", rest.len());
        }
        Ok((values, rest))
    }

    /// Encodes `values` back into one payload, one value per spec.
    pub fn write_all(
        &self,
        ctx: &mut FrameContext,
        values: &[FieldValue],
    ) -> Result<Vec<u8>, SpecError> {
        if values.len() != self.specs.len() {
            return Err(SpecError::LengthMismatch {
                expected: self.specs.len(),
                actual: values.len(),
            });
        }
        let mut out = Vec::new();
        for (spec, value) in self.specs.iter().zip(values) {
            if let Some(key) = spec.stores() {
                ctx.store(key, value);
            }
            out.extend(spec.write(ctx, value)?);
        }
        Ok(out)
    }

    /// Checks that every context key read by a field is stored by some
    /// field before it. A catalogue that fails this would decode with
    /// fallback context no matter what the payload says.
    pub fn verify_context_order(&self) -> Result<(), ContextOrderError> {
        let mut stored: Vec<ContextKey> = Vec::new();
        for spec in &self.specs {
            for key in spec.reads() {
                if !stored.contains(key) {
                    return Err(ContextOrderError {
                        field: spec.name().to_owned(),
                        key: *key,
                    });
                }
            }
            if let Some(key) = spec.stores() {
                stored.push(key);
            }
        }
        Ok(())
    }
}
