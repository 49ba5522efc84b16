//! Frame text encodings and terminator handling.
//!
//! ID3v2.4 frames select one of four text encodings with a leading byte;
//! the encoding decides both the codec and the width of the string
//! terminator. The set is closed by the format.
//!
//! Reference: ID3 tag version 2.4.0 - Main Structure §4.

use crate::error::SpecError;

/// A text encoding selectable by an ID3v2.4 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextEncoding {
    /// ISO-8859-1, single-byte terminator.
    Latin1 = 0,
    /// UTF-16 with byte order mark, two-byte terminator.
    Utf16 = 1,
    /// UTF-16 big-endian without byte order mark, two-byte terminator.
    Utf16Be = 2,
    /// UTF-8, single-byte terminator.
    Utf8 = 3,
}

impl TryFrom<u8> for TextEncoding {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(TextEncoding::Latin1),
            1 => Ok(TextEncoding::Utf16),
            2 => Ok(TextEncoding::Utf16Be),
            3 => Ok(TextEncoding::Utf8),
            other => Err(other),
        }
    }
}

impl TextEncoding {
    /// The terminator byte sequence for this encoding.
    pub fn terminator(self) -> &'static [u8] {
        match self {
            TextEncoding::Latin1 | TextEncoding::Utf8 => &[0x00],
            TextEncoding::Utf16 | TextEncoding::Utf16Be => &[0x00, 0x00],
        }
    }

    /// Decodes `data` as text in this encoding.
    ///
    /// Latin-1 never fails. UTF-16 honours a leading byte order mark and
    /// assumes little-endian when it is absent; the big-endian variant
    /// takes no mark at all, so a leading U+FEFF survives as a character.
    pub fn decode(self, data: &[u8]) -> Result<String, SpecError> {
        match self {
            TextEncoding::Latin1 => Ok(data.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf8 => match std::str::from_utf8(data) {
                Ok(s) => Ok(s.to_owned()),
                Err(_) => Err(SpecError::Format("invalid utf-8 text")),
            },
            TextEncoding::Utf16 => match data {
                [0xff, 0xfe, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
                [0xfe, 0xff, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
                rest => decode_utf16(rest, u16::from_le_bytes),
            },
            TextEncoding::Utf16Be => decode_utf16(data, u16::from_be_bytes),
        }
    }

    /// Encodes `text` in this encoding, without a terminator.
    ///
    /// Fails with [`SpecError::Format`] when `text` contains characters
    /// the encoding cannot represent (Latin-1 only; the Unicode forms
    /// accept any Rust string).
    pub fn encode(self, text: &str) -> Result<Vec<u8>, SpecError> {
        match self {
            TextEncoding::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    if (ch as u32) > 0xff {
                        return Err(SpecError::Format("text not representable in latin-1"));
                    }
                    out.push(ch as u8);
                }
                Ok(out)
            }
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16 => {
                let mut out = vec![0xff, 0xfe];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(out)
            }
            TextEncoding::Utf16Be => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                Ok(out)
            }
        }
    }
}

fn decode_utf16(data: &[u8], read_unit: fn([u8; 2]) -> u16) -> Result<String, SpecError> {
    if data.len() % 2 != 0 {
        return Err(SpecError::Format("utf-16 text has odd byte length"));
    }
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| read_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| SpecError::Format("invalid utf-16 text"))
}

/// Splits `data` at the first terminator of the given width.
///
/// Returns the content before the terminator and the remainder after it.
/// Two-byte terminators match at even offsets only, so a UTF-16 code unit
/// with a zero byte straddling two units (`b"\x00\x31"` after an odd
/// prefix) is not mistaken for the end of the string. Without a
/// terminator the whole input is content and the remainder is empty.
pub fn split_terminated(data: &[u8], width: usize) -> (&[u8], &[u8]) {
    debug_assert!(width == 1 || width == 2);
    if width == 1 {
        match data.iter().position(|&b| b == 0) {
            Some(i) => (&data[..i], &data[i + 1..]),
            None => (data, &data[data.len()..]),
        }
    } else {
        match data.chunks_exact(2).position(|pair| pair == [0, 0]) {
            Some(i) => (&data[..2 * i], &data[2 * i + 2..]),
            None => (data, &data[data.len()..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_round_trip() {
        for byte in 0u8..=3 {
            let enc = TextEncoding::try_from(byte).unwrap();
            assert_eq!(enc as u8, byte);
        }
        assert_eq!(TextEncoding::try_from(4), Err(4));
        assert_eq!(TextEncoding::try_from(0xff), Err(0xff));
    }

    #[test]
    fn terminator_widths() {
        assert_eq!(TextEncoding::Latin1.terminator(), &[0x00]);
        assert_eq!(TextEncoding::Utf8.terminator(), &[0x00]);
        assert_eq!(TextEncoding::Utf16.terminator(), &[0x00, 0x00]);
        assert_eq!(TextEncoding::Utf16Be.terminator(), &[0x00, 0x00]);
    }

    #[test]
    fn latin1_is_total() {
        let all: Vec<u8> = (0u8..=255).collect();
        let text = TextEncoding::Latin1.decode(&all).unwrap();
        assert_eq!(text.chars().count(), 256);
        assert_eq!(TextEncoding::Latin1.encode(&text).unwrap(), all);
    }

    #[test]
    fn latin1_rejects_wide_chars() {
        assert_eq!(
            TextEncoding::Latin1.encode("\u{2603}"),
            Err(SpecError::Format("text not representable in latin-1"))
        );
    }

    #[test]
    fn utf16_decode_honours_bom() {
        // Little-endian with mark, big-endian with mark, bare little-endian.
        assert_eq!(TextEncoding::Utf16.decode(b"\xff\xfe\x41\x00").unwrap(), "A");
        assert_eq!(TextEncoding::Utf16.decode(b"\xfe\xff\x00\x41").unwrap(), "A");
        assert_eq!(TextEncoding::Utf16.decode(b"\x41\x00").unwrap(), "A");
    }

    #[test]
    fn utf16_encode_prepends_le_bom() {
        assert_eq!(TextEncoding::Utf16.encode("A").unwrap(), b"\xff\xfe\x41\x00");
        assert_eq!(TextEncoding::Utf16Be.encode("A").unwrap(), b"\x00\x41");
    }

    #[test]
    fn utf16be_keeps_leading_feff() {
        let text = TextEncoding::Utf16Be.decode(b"\xfe\xff\x00\x41").unwrap();
        assert_eq!(text, "\u{feff}A");
    }

    #[test]
    fn utf16_odd_length_fails() {
        assert_eq!(
            TextEncoding::Utf16.decode(b"\xff\xfe\x41"),
            Err(SpecError::Format("utf-16 text has odd byte length"))
        );
    }

    #[test]
    fn utf16_surrogate_pairs() {
        let encoded = TextEncoding::Utf16.encode("\u{1f3b5}").unwrap();
        assert_eq!(encoded.len(), 2 + 4);
        assert_eq!(TextEncoding::Utf16.decode(&encoded).unwrap(), "\u{1f3b5}");
    }

    #[test]
    fn utf8_invalid_bytes_fail() {
        assert_eq!(
            TextEncoding::Utf8.decode(b"\xc3\x28"),
            Err(SpecError::Format("invalid utf-8 text"))
        );
    }

    #[test]
    fn split_single_byte_terminator() {
        assert_eq!(split_terminated(b"ab\x00cd", 1), (&b"ab"[..], &b"cd"[..]));
        assert_eq!(split_terminated(b"\x00cd", 1), (&b""[..], &b"cd"[..]));
        assert_eq!(split_terminated(b"abcd", 1), (&b"abcd"[..], &b""[..]));
    }

    #[test]
    fn split_double_byte_terminator_is_aligned() {
        // "1" in UTF-16LE is 31 00; the zero byte pairs with the next
        // unit's 31 only at an odd offset, which must not match.
        let data = b"\x31\x00\x31\x00\x00\x00\x42";
        assert_eq!(split_terminated(data, 2), (&b"\x31\x00\x31\x00"[..], &b"\x42"[..]));
    }

    #[test]
    fn split_without_terminator_consumes_all() {
        assert_eq!(split_terminated(b"\x31\x00\x31", 2), (&b"\x31\x00\x31"[..], &b""[..]));
        assert_eq!(split_terminated(b"", 2), (&b""[..], &b""[..]));
    }
}
