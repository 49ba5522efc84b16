//! ID3v2.4 frame field codecs.
//!
//! A frame payload is a sequence of typed fields. This crate implements
//! the closed catalogue of field specs that read each field off a raw
//! payload, write it back, validate assigned values and coerce values
//! for ID3v2.3 export. The layer above — frame headers, flags, the tag
//! container — is out of scope; these are the grammar rules it composes.
//!
//! Decoding is deliberately forgiving: real-world tags are full of
//! missing selector bytes, stray terminators and short payloads, so
//! specs prefer a degraded value over a refusal wherever the original
//! writers' mistakes are recoverable. Validation of values assigned by
//! a caller is strict.
//!
//! Reference: ID3 tag version 2.4.0 - Main Structure and Native Frames
//! (id3.org).
//!
//! # Example
//!
//! ```
//! use tagcodec_id3::{
//!     EncodedTextSpec, EncodingSpec, FieldList, FieldValue, FrameContext, StringSpec,
//! };
//!
//! // Encoding selector, language code, then two strings in the
//! // selected encoding: the shape of a lyrics frame.
//! let fields = FieldList::new(vec![
//!     Box::new(EncodingSpec::new("encoding")),
//!     Box::new(StringSpec::new("lang", 3)),
//!     Box::new(EncodedTextSpec::new("desc")),
//!     Box::new(EncodedTextSpec::new("text")),
//! ]);
//!
//! let mut ctx = FrameContext::new();
//! let (values, rest) = fields.read_all(&mut ctx, b"\x00engdesc\x00the text")?;
//! assert_eq!(values[1], FieldValue::Text("eng".into()));
//! assert_eq!(values[3], FieldValue::Text("the text".into()));
//! assert_eq!(rest, b"");
//! # Ok::<(), tagcodec_id3::SpecError>(())
//! ```

pub mod context;
pub mod encoding;
pub mod error;
pub mod fields;
pub mod spec;
pub mod timestamp;
pub mod value;

pub use context::{ContextKey, FrameContext};
pub use encoding::TextEncoding;
pub use error::SpecError;
pub use fields::{ContextOrderError, FieldList};
pub use spec::{
    AspiIndexSpec, BinaryDataSpec, ByteSpec, Channel, ChannelSpec, DowngradeOptions,
    EncodedTextSpec, EncodingSpec, EqualisationSpec, FieldSpec, IntegerSpec, KeyEventSpec,
    Latin1TextSpec, MultiSpec, SizedIntegerSpec, StringSpec, SynchronizedTextSpec, TextIntent,
    TimestampSpec, VolumeAdjustmentSpec, VolumePeakSpec,
};
pub use timestamp::Id3Timestamp;
pub use value::FieldValue;

#[cfg(test)]
mod tests {
    use super::*;

    fn latin1() -> FrameContext {
        FrameContext::with_encoding(TextEncoding::Latin1)
    }

    fn utf16() -> FrameContext {
        FrameContext::with_encoding(TextEncoding::Utf16)
    }

    // ---------------------------------------------------- round trips

    #[test]
    fn every_spec_round_trips_its_canonical_value() {
        let cases: Vec<(Box<dyn FieldSpec>, FrameContext, FieldValue)> = vec![
            (Box::new(ByteSpec::new("b")), latin1(), FieldValue::UInt(0x7f)),
            (Box::new(IntegerSpec::new("n")), latin1(), FieldValue::UInt(123_456_789)),
            (Box::new(SizedIntegerSpec::new("n", 4)), latin1(), FieldValue::UInt(0xdead)),
            (Box::new(EncodingSpec::new("enc")), latin1(), FieldValue::UInt(2)),
            (Box::new(StringSpec::new("lang", 3)), latin1(), FieldValue::Text("eng".into())),
            (Box::new(BinaryDataSpec::new("data")), latin1(), FieldValue::Binary(vec![0, 1, 255])),
            (Box::new(EncodedTextSpec::new("t")), utf16(), FieldValue::Text("p\u{e8}re \u{266a}".into())),
            (Box::new(Latin1TextSpec::new("url")), utf16(), FieldValue::Text("http://x/".into())),
            (
                Box::new(TimestampSpec::new("d")),
                latin1(),
                FieldValue::Timestamp(Id3Timestamp::new("2004-11-30 12:00:00")),
            ),
            (Box::new(ChannelSpec::new("c")), latin1(), FieldValue::UInt(Channel::MasterVolume as u64)),
            // 1/512 steps are exactly representable.
            (Box::new(VolumeAdjustmentSpec::new("g")), latin1(), FieldValue::Float(-2.5)),
            (
                Box::new(EqualisationSpec::new("eq")),
                latin1(),
                FieldValue::VolumeTable(vec![(100.0, 1.0), (1000.0, -3.0)]),
            ),
            (
                Box::new(SynchronizedTextSpec::new("lyrics")),
                utf16(),
                FieldValue::SyncedText(vec![
                    ("\u{266a}".into(), 100),
                    ("\u{266b}\u{266a}".into(), 2500),
                ]),
            ),
            (
                Box::new(KeyEventSpec::new("events")),
                latin1(),
                FieldValue::KeyEvents(vec![(1, 0), (8, 180_000)]),
            ),
            (
                Box::new(MultiSpec::with_sep("text", vec![Box::new(EncodedTextSpec::new("text")) as _], "\u{0}")),
                latin1(),
                FieldValue::List(vec![FieldValue::Text("a".into()), FieldValue::Text("b".into())]),
            ),
        ];
        for (spec, ctx, value) in cases {
            let written = spec.write(&ctx, &value).unwrap();
            let (read_back, rest) = spec.read(&ctx, &written).unwrap();
            assert_eq!(read_back, value, "{} did not round-trip", spec.name());
            assert!(rest.is_empty(), "{} left {} byte(s)", spec.name(), rest.len());
        }
    }

    #[test]
    fn sixteen_bit_peaks_are_stable_on_the_wire() {
        let spec = VolumePeakSpec::new("peak");
        let ctx = latin1();
        for bytes in [&b"\x10\x00\x00"[..], b"\x10\x80\x00", b"\x10\xff\xff", b"\x10\x12\x34"] {
            let (value, rest) = spec.read(&ctx, bytes).unwrap();
            assert_eq!(rest, b"");
            assert_eq!(spec.write(&ctx, &value).unwrap(), bytes);
        }
    }

    #[test]
    fn validated_values_write_cleanly() {
        // validate -> write must not fail for accepted inputs.
        let spec = EncodedTextSpec::new("t");
        let ctx = utf16();
        let value = spec.validate(&ctx, FieldValue::Text("ok".into())).unwrap();
        spec.write(&ctx, &value).unwrap();

        let spec = IntegerSpec::new("n");
        let value = spec.validate(&ctx, FieldValue::Text("99".into())).unwrap();
        assert_eq!(spec.write(&ctx, &value).unwrap(), b"\x63");
    }

    // ----------------------------------------------------- remainders

    #[test]
    fn reads_return_the_exact_suffix() {
        let cases: Vec<(Box<dyn FieldSpec>, &[u8])> = vec![
            (Box::new(ByteSpec::new("b")), b"\x01"),
            (Box::new(SizedIntegerSpec::new("n", 2)), b"\x00\x05"),
            (Box::new(EncodingSpec::new("enc")), b"\x03"),
            (Box::new(StringSpec::new("lang", 3)), b"eng"),
            (Box::new(EncodedTextSpec::new("t")), b"text\x00"),
            (Box::new(Latin1TextSpec::new("u")), b"url\x00"),
            (Box::new(VolumeAdjustmentSpec::new("g")), b"\x02\x00"),
            (Box::new(VolumePeakSpec::new("p")), b"\x10\x80\x00"),
        ];
        let suffix = b"\x09rest of the frame";
        for (spec, prefix) in cases {
            let mut payload = prefix.to_vec();
            payload.extend_from_slice(suffix);
            let (_, rest) = spec.read(&latin1(), &payload).unwrap();
            assert_eq!(rest, suffix, "{} consumed the wrong prefix", spec.name());
        }
    }

    // ------------------------------------------------ container walks

    /// Comment-frame shape: selector, language, description, multi-text.
    fn comment_fields() -> FieldList {
        FieldList::new(vec![
            Box::new(EncodingSpec::new("encoding")),
            Box::new(StringSpec::new("lang", 3)),
            Box::new(EncodedTextSpec::new("desc")),
            Box::new(MultiSpec::with_sep(
                "text",
                vec![Box::new(EncodedTextSpec::new("text")) as _],
                "\u{0}",
            )),
        ])
    }

    #[test]
    fn comment_walk_utf16() {
        let fields = comment_fields();
        let mut payload = vec![0x01];
        payload.extend_from_slice(b"eng");
        payload.extend_from_slice(b"\xff\xfe\x64\x00\x00\x00"); // "d"
        payload.extend_from_slice(b"\xff\xfe\x68\x00\x69\x00"); // "hi"
        let mut ctx = FrameContext::new();
        let (values, rest) = fields.read_all(&mut ctx, &payload).unwrap();
        assert_eq!(values[2], FieldValue::Text("d".into()));
        assert_eq!(values[3], FieldValue::List(vec![FieldValue::Text("hi".into())]));
        assert_eq!(rest, b"");

        let mut ctx = FrameContext::new();
        let written = fields.write_all(&mut ctx, &values).unwrap();
        let (again, _) = fields.read_all(&mut FrameContext::new(), &written).unwrap();
        assert_eq!(again, values);
    }

    #[test]
    fn play_counter_walk() {
        let fields = FieldList::new(vec![Box::new(IntegerSpec::new("count")) as _]);
        let (values, rest) = fields.read_all(&mut FrameContext::new(), b"\x00\x00\x12\x34").unwrap();
        assert_eq!(values, vec![FieldValue::UInt(0x1234)]);
        assert_eq!(rest, b"");
    }

    #[test]
    fn popularimeter_walk() {
        // Terminated text, then a byte, then a greedy counter.
        let fields = FieldList::new(vec![
            Box::new(Latin1TextSpec::new("email")) as Box<dyn FieldSpec>,
            Box::new(ByteSpec::new("rating")),
            Box::new(IntegerSpec::new("count")),
        ]);
        let (values, rest) = fields
            .read_all(&mut FrameContext::new(), b"a@b\x00\xff\x00\x00\x01\x00")
            .unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Text("a@b".into()),
                FieldValue::UInt(255),
                FieldValue::UInt(256),
            ]
        );
        assert_eq!(rest, b"");
    }

    // ------------------------------------------------------ downgrade

    #[test]
    fn downgrade_walk_joins_text_and_clamps_encoding() {
        let specs: Vec<Box<dyn FieldSpec>> = vec![
            Box::new(EncodingSpec::new("encoding")),
            Box::new(MultiSpec::with_sep(
                "text",
                vec![Box::new(EncodedTextSpec::new("text")) as _],
                "\u{0}",
            )),
        ];
        let values = [
            FieldValue::UInt(3),
            FieldValue::List(vec![
                FieldValue::Text("alice".into()),
                FieldValue::Text("bob".into()),
            ]),
        ];
        let ctx = latin1();
        let opts = DowngradeOptions::joining("/");
        let down: Vec<FieldValue> = specs
            .iter()
            .zip(values)
            .map(|(spec, value)| spec.downgrade(&ctx, value, &opts).unwrap())
            .collect();
        assert_eq!(down[0], FieldValue::UInt(1));
        assert_eq!(down[1], FieldValue::List(vec![FieldValue::Text("alice/bob".into())]));
    }

    #[test]
    fn downgrade_keeps_timestamp_multiplicity() {
        let spec = MultiSpec::new("dates", vec![Box::new(TimestampSpec::new("date")) as _]);
        let value = FieldValue::List(vec![
            FieldValue::Timestamp(Id3Timestamp::new("1999")),
            FieldValue::Timestamp(Id3Timestamp::new("2004")),
        ]);
        let down = spec
            .downgrade(&latin1(), value.clone(), &DowngradeOptions::joining("/"))
            .unwrap();
        assert_eq!(down, value);
    }

    #[test]
    fn downgrade_without_options_is_identity() {
        let spec = MultiSpec::with_sep("text", vec![Box::new(EncodedTextSpec::new("text")) as _], "\u{0}");
        let value = FieldValue::List(vec![
            FieldValue::Text("x".into()),
            FieldValue::Text("y".into()),
        ]);
        assert_eq!(
            spec.downgrade(&latin1(), value.clone(), &DowngradeOptions::default()).unwrap(),
            value
        );
    }

    // ----------------------------------------------------- resilience

    #[test]
    fn missing_encoding_selector_still_decodes() {
        // A writer that dropped the selector byte: the first text byte
        // is pushed back and everything decodes as Latin-1.
        let fields = FieldList::new(vec![
            Box::new(EncodingSpec::new("encoding")) as Box<dyn FieldSpec>,
            Box::new(MultiSpec::with_sep(
                "text",
                vec![Box::new(EncodedTextSpec::new("text")) as _],
                "\u{0}",
            )),
        ]);
        let mut ctx = FrameContext::new();
        let (values, rest) = fields.read_all(&mut ctx, b"Artist").unwrap();
        assert_eq!(values[0], FieldValue::UInt(0));
        assert_eq!(values[1], FieldValue::List(vec![FieldValue::Text("Artist".into())]));
        assert_eq!(rest, b"");
    }

    #[test]
    fn out_of_range_selector_falls_back_to_latin1() {
        let fields = FieldList::new(vec![
            Box::new(EncodingSpec::new("encoding")) as Box<dyn FieldSpec>,
            Box::new(EncodedTextSpec::new("text")),
        ]);
        let mut ctx = FrameContext::new();
        // Selector 5 is in the lenient pass-through range but selects
        // nothing; the text still decodes.
        let (values, _) = fields.read_all(&mut ctx, b"\x05caf\xe9").unwrap();
        assert_eq!(values[0], FieldValue::UInt(5));
        assert_eq!(ctx.encoding, None);
        assert_eq!(values[1], FieldValue::Text("caf\u{e9}".into()));
    }

    #[test]
    fn bad_seek_geometry_degrades_to_empty_index() {
        let fields = FieldList::new(vec![
            Box::new(SizedIntegerSpec::new("S", 4)) as Box<dyn FieldSpec>,
            Box::new(SizedIntegerSpec::new("L", 4)),
            Box::new(SizedIntegerSpec::stored("N", 2, ContextKey::Count)),
            Box::new(ByteSpec::stored("b", ContextKey::BitWidth)),
            Box::new(AspiIndexSpec::new("Fi")),
        ]);
        let mut payload = vec![0; 8];
        payload.extend_from_slice(&[0, 2]); // N = 2
        payload.push(12); // unsupported width
        payload.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        let mut ctx = FrameContext::new();
        let (values, rest) = fields.read_all(&mut ctx, &payload).unwrap();
        assert_eq!(values[4], FieldValue::IndexPoints(Vec::new()));
        assert_eq!(rest, b"\xaa\xbb\xcc");
    }

    #[test]
    fn malformed_frames_are_frame_local() {
        let fields = comment_fields();
        let err = fields
            .read_all(&mut FrameContext::new(), b"\x00en")
            .unwrap_err();
        assert!(err.is_frame_local());
        assert_eq!(err, SpecError::MalformedFrame("truncated fixed-length string"));
    }

    #[test]
    fn catalogue_orderings_verify() {
        assert!(comment_fields().verify_context_order().is_ok());
        let backwards = FieldList::new(vec![
            Box::new(EncodedTextSpec::new("text")) as Box<dyn FieldSpec>,
            Box::new(EncodingSpec::new("encoding")),
        ]);
        let err = backwards.verify_context_order().unwrap_err();
        assert_eq!(err.field, "text");
        assert_eq!(err.key, ContextKey::Encoding);
    }
}
