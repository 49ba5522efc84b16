//! Relative volume and equalisation specs.
//!
//! Reference: ID3 tag version 2.4.0 - Native Frames §4.11 and §4.12.

use std::collections::BTreeMap;

use crate::context::FrameContext;
use crate::error::SpecError;
use crate::spec::FieldSpec;
use crate::value::FieldValue;

/// Speaker position of a relative volume adjustment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Other = 0,
    MasterVolume = 1,
    FrontRight = 2,
    FrontLeft = 3,
    BackRight = 4,
    BackLeft = 5,
    FrontCentre = 6,
    BackCentre = 7,
    Subwoofer = 8,
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Channel::Other),
            1 => Ok(Channel::MasterVolume),
            2 => Ok(Channel::FrontRight),
            3 => Ok(Channel::FrontLeft),
            4 => Ok(Channel::BackRight),
            5 => Ok(Channel::BackLeft),
            6 => Ok(Channel::FrontCentre),
            7 => Ok(Channel::BackCentre),
            8 => Ok(Channel::Subwoofer),
            other => Err(other),
        }
    }
}

/// The channel selector byte of a relative volume frame.
///
/// Reads any byte so broken payloads survive; validation holds assigned
/// values to the nine defined channels.
pub struct ChannelSpec {
    name: String,
}

impl ChannelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ChannelSpec { name: name.into() }
    }
}

impl FieldSpec for ChannelSpec {
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
            None => Err(SpecError::MalformedFrame("channel byte on empty buffer")),
        }
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        match value {
            FieldValue::UInt(v) => match u8::try_from(*v) {
                Ok(b) => Ok(vec![b]),
                Err(_) => Err(SpecError::Range("channel type must be 0..=8")),
            },
            _ => Err(SpecError::Format("channel field requires an integer")),
        }
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::UInt(v) if v <= Channel::Subwoofer as u64 => Ok(FieldValue::UInt(v)),
            FieldValue::Binary(b) if b.len() == 1 && b[0] <= Channel::Subwoofer as u8 => {
                Ok(FieldValue::UInt(u64::from(b[0])))
            }
            _ => Err(SpecError::Range("channel type must be 0..=8")),
        }
    }
}

/// A volume adjustment in dB, stored as a signed 16-bit multiple of
/// 1/512 dB.
pub struct VolumeAdjustmentSpec {
    name: String,
}

impl VolumeAdjustmentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        VolumeAdjustmentSpec { name: name.into() }
    }
}

impl FieldSpec for VolumeAdjustmentSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        match data {
            [a, b, rest @ ..] => {
                let raw = i16::from_be_bytes([*a, *b]);
                Ok((FieldValue::Float(f64::from(raw) / 512.0), rest))
            }
            _ => Err(SpecError::MalformedFrame("truncated volume adjustment")),
        }
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let raw = scale_to_i16(value, 512.0, "volume adjustment out of range")?;
        Ok(raw.to_be_bytes().to_vec())
    }

    fn validate(&self, _ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            other => {
                scale_to_i16(&other, 512.0, "volume adjustment out of range")?;
                Ok(canonical_float(other))
            }
        }
    }
}

/// A peak volume with variable wire precision.
///
/// The payload carries a bit count followed by that many bits of peak,
/// left-aligned; at most 32 bits are significant. The decoded value is
/// the peak as a fraction of `2^31 - 1`.
pub struct VolumePeakSpec {
    name: String,
}

impl VolumePeakSpec {
    pub fn new(name: impl Into<String>) -> Self {
        VolumePeakSpec { name: name.into() }
    }
}

impl FieldSpec for VolumePeakSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let (&bits, rest) = match data.split_first() {
            Some(split) => split,
            None => return Err(SpecError::MalformedFrame("peak volume on empty buffer")),
        };
        let vol_bytes = usize::min(4, (usize::from(bits) + 7) >> 3);
        if vol_bytes > rest.len() {
            return Err(SpecError::MalformedFrame("peak volume data shorter than declared"));
        }
        let shift = u32::from((8 - (bits & 7)) & 7) + (4 - vol_bytes as u32) * 8;
        let mut peak: u64 = 0;
        for &byte in &rest[..vol_bytes] {
            peak = (peak << 8) | u64::from(byte);
        }
        peak <<= shift;
        let value = peak as f64 / f64::from(i32::MAX);
        Ok((FieldValue::Float(value), &rest[vol_bytes..]))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let scaled = match value {
            FieldValue::Float(v) => (v * 32768.0).round(),
            FieldValue::UInt(v) => (*v as f64 * 32768.0).round(),
            _ => return Err(SpecError::Format("peak volume requires a number")),
        };
        if !(0.0..=65535.0).contains(&scaled) {
            return Err(SpecError::Range("peak volume out of range"));
        }
        // Always re-serialise at 16-bit precision.
        let mut out = vec![0x10];
        out.extend_from_slice(&(scaled as u16).to_be_bytes());
        Ok(out)
    }

    fn validate(&self, ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            other => {
                self.write(ctx, &other)?;
                Ok(canonical_float(other))
            }
        }
    }
}

/// Equalisation points: `(frequency, adjustment)` pairs of a u16 count
/// of half-Hz and an i16 count of 1/512 dB.
///
/// Duplicate frequencies collapse to the last occurrence in payload
/// order, and the table is kept sorted by ascending frequency.
pub struct EqualisationSpec {
    name: String,
}

impl EqualisationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        EqualisationSpec { name: name.into() }
    }
}

impl FieldSpec for EqualisationSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        _ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        // Keyed on the raw half-Hz value, so ordering and deduplication
        // stay integral.
        let mut table = BTreeMap::new();
        let mut rest = data;
        while let [a, b, c, d, tail @ ..] = rest {
            table.insert(u16::from_be_bytes([*a, *b]), i16::from_be_bytes([*c, *d]));
            rest = tail;
        }
        let pairs = table
            .into_iter()
            .map(|(freq, adj)| (f64::from(freq) / 2.0, f64::from(adj) / 512.0))
            .collect();
        Ok((FieldValue::VolumeTable(pairs), rest))
    }

    fn write(&self, _ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let pairs = match value {
            FieldValue::VolumeTable(pairs) => pairs,
            _ => return Err(SpecError::Format("equalisation requires a volume table")),
        };
        let mut sorted = pairs.clone();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut out = Vec::with_capacity(sorted.len() * 4);
        for (freq, adj) in sorted {
            let raw_freq = (freq * 2.0).trunc();
            if !(0.0..=65535.0).contains(&raw_freq) {
                return Err(SpecError::Range("frequency out of range"));
            }
            let raw_adj = (adj * 512.0).trunc();
            if !(-32768.0..=32767.0).contains(&raw_adj) {
                return Err(SpecError::Range("volume adjustment out of range"));
            }
            out.extend_from_slice(&(raw_freq as u16).to_be_bytes());
            out.extend_from_slice(&(raw_adj as i16).to_be_bytes());
        }
        Ok(out)
    }

    fn validate(&self, ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        match value {
            FieldValue::None => Ok(FieldValue::None),
            FieldValue::VolumeTable(pairs) => {
                self.write(ctx, &FieldValue::VolumeTable(pairs.clone()))?;
                Ok(FieldValue::VolumeTable(pairs))
            }
            _ => Err(SpecError::Format("equalisation requires a volume table")),
        }
    }
}

/// Scales to a signed 16-bit wire value, rounding to nearest. Rejects
/// values that land outside `i16`, including NaN and infinities.
fn scale_to_i16(value: &FieldValue, factor: f64, msg: &'static str) -> Result<i16, SpecError> {
    let scaled = match value {
        FieldValue::Float(v) => (v * factor).round(),
        FieldValue::UInt(v) => (*v as f64 * factor).round(),
        _ => return Err(SpecError::Format("volume field requires a number")),
    };
    if !(-32768.0..=32767.0).contains(&scaled) {
        return Err(SpecError::Range(msg));
    }
    Ok(scaled as i16)
}

fn canonical_float(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::UInt(v) => FieldValue::Float(v as f64),
        other => other,
    }
}
