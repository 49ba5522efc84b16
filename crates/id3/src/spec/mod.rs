//! The field spec catalogue.
//!
//! Each spec describes one field of a frame payload: how the field is
//! read off the remaining buffer, written back, validated on assignment
//! and coerced for ID3v2.3 export. Specs are configuration, built once
//! per frame kind; all per-decode state lives in [`FrameContext`].
//!
//! Reference: ID3 tag version 2.4.0 - Native Frames (id3.org).

mod aspi;
mod multi;
mod primitive;
mod synced;
mod text;
mod volume;

pub use aspi::AspiIndexSpec;
pub use multi::MultiSpec;
pub use primitive::{
    BinaryDataSpec, ByteSpec, EncodingSpec, IntegerSpec, SizedIntegerSpec, StringSpec,
};
pub use synced::{KeyEventSpec, SynchronizedTextSpec};
pub use text::{EncodedTextSpec, Latin1TextSpec, TextIntent, TimestampSpec};
pub use volume::{
    Channel, ChannelSpec, EqualisationSpec, VolumeAdjustmentSpec, VolumePeakSpec,
};

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::value::FieldValue;

/// Options for the ID3v2.3 downgrade pass.
#[derive(Debug, Clone, Default)]
pub struct DowngradeOptions {
    /// Separator used to join values of fields v2.3 cannot repeat.
    /// `None` keeps multiple values as they are.
    pub sep: Option<String>,
}

impl DowngradeOptions {
    /// Options that join repeated text values with `sep`.
    pub fn joining(sep: impl Into<String>) -> Self {
        DowngradeOptions { sep: Some(sep.into()) }
    }
}

/// One field of a frame payload.
///
/// `read` consumes the field's bytes from the front of the buffer and
/// returns the decoded value with the exact unconsumed remainder, which
/// feeds the next field's `read`. `write` serialises a value that has
/// been through `validate`; handing it anything else may fail with any
/// error. `validate` coerces an assigned value to canonical form without
/// touching any buffer. All three leave the spec itself untouched, so
/// one spec instance can serve any number of concurrent decodes.
pub trait FieldSpec: Send + Sync {
    /// The field's name within its frame.
    fn name(&self) -> &str;

    /// Decodes one value off the front of `data`.
    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError>;

    /// Serialises a validated value.
    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError>;

    /// Coerces `value` to canonical form, or rejects it.
    fn validate(&self, ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError>;

    /// Coerces `value` to a form legal under ID3v2.3.
    ///
    /// The default keeps the value unchanged; specs whose v2.4 range is
    /// wider than v2.3 allows override this.
    fn downgrade(
        &self,
        _ctx: &FrameContext,
        value: FieldValue,
        _opts: &DowngradeOptions,
    ) -> Result<FieldValue, SpecError> {
        Ok(value)
    }

    /// Context keys this spec reads while decoding or encoding.
    fn reads(&self) -> &[ContextKey] {
        &[]
    }

    /// The context key populated by this field's decoded value, if any.
    fn stores(&self) -> Option<ContextKey> {
        None
    }

    /// Whether repeated values of this spec collapse into one joined
    /// value when a downgrade separator is given. True for plain text
    /// specs; timestamps keep their multiplicity.
    fn merges_on_downgrade(&self) -> bool {
        false
    }
}
