//! Audio seek point index spec.
//!
//! Reference: ID3 tag version 2.4.0 - Native Frames §4.30 (ASPI).

use log::warn;

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::spec::FieldSpec;
use crate::value::FieldValue;

/// The fraction table of a seek index frame: `N` points of `b` bits
/// each, both taken from earlier fields of the same frame through the
/// context.
///
/// Only widths of 8 and 16 bits exist. Any other width is logged and
/// decoded as an empty index with nothing consumed, so one bad frame
/// does not take the tag down.
pub struct AspiIndexSpec {
    name: String,
}

impl AspiIndexSpec {
    pub fn new(name: impl Into<String>) -> Self {
        AspiIndexSpec { name: name.into() }
    }

    fn point_size(&self, ctx: &FrameContext) -> Option<usize> {
        match ctx.bit_width {
            Some(16) => Some(2),
            Some(8) => Some(1),
            _ => None,
        }
    }
}

impl FieldSpec for AspiIndexSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let size = match self.point_size(ctx) {
            Some(size) => size,
            None => {
                warn!(
                    "invalid seek index bit width {:?}, expected 8 or 16",
                    ctx.bit_width
                );
                return Ok((FieldValue::IndexPoints(Vec::new()), data));
            }
        };
        let count = match ctx.count {
            Some(count) => count as usize,
            None => {
                warn!("seek index point count missing from frame");
                return Ok((FieldValue::IndexPoints(Vec::new()), data));
            }
        };
        let need = count
            .checked_mul(size)
            .ok_or(SpecError::MalformedFrame("seek index too large"))?;
        if data.len() < need {
            return Err(SpecError::MalformedFrame("truncated seek index"));
        }
        let (body, rest) = data.split_at(need);
        let points = if size == 2 {
            body.chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect()
        } else {
            body.iter().map(|&b| u16::from(b)).collect()
        };
        Ok((FieldValue::IndexPoints(points), rest))
    }

    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let points = match value {
            FieldValue::IndexPoints(points) => points,
            _ => return Err(SpecError::Format("seek index requires index points")),
        };
        let size = match self.point_size(ctx) {
            Some(size) => size,
            None => return Err(SpecError::Range("seek index bit width must be 8 or 16")),
        };
        if let Some(count) = ctx.count {
            if count as usize != points.len() {
                return Err(SpecError::LengthMismatch {
                    expected: count as usize,
                    actual: points.len(),
                });
            }
        }
        let mut out = Vec::with_capacity(points.len() * size);
        for &point in points {
            if size == 2 {
                out.extend_from_slice(&point.to_be_bytes());
            } else {
                match u8::try_from(point) {
                    Ok(b) => out.push(b),
                    Err(_) => {
                        return Err(SpecError::Range("seek index point does not fit in 8 bits"))
                    }
                }
            }
        }
        Ok(out)
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::IndexPoints(points) => Ok(FieldValue::IndexPoints(points)),
            _ => Err(SpecError::Format("seek index requires index points")),
        }
    }

    fn reads(&self) -> &[ContextKey] {
        &[ContextKey::BitWidth, ContextKey::Count]
    }
}
