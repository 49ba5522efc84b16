//! Synch-safe (bit-padded) big-endian integers.
//!
//! ID3v2 stores sizes and counters as big-endian integers that use only the
//! low bits of each byte. The synch-safe form keeps the top bit of every
//! byte clear (7 payload bits per byte) so tag data never contains a false
//! MPEG sync marker; frame counters use all 8 bits (plain base-256).
//!
//! Reference: ID3 tag version 2.4.0, Main Structure, section 6.2.
//!
//! # Example
//!
//! ```
//! use tagcodec_synchsafe::{decode, encode};
//!
//! // The classic ID3v2 header size: 0x0201 synch-safe is 257.
//! assert_eq!(decode(&[0x00, 0x00, 0x02, 0x01], 7), 257);
//! assert_eq!(encode(257, 7, Some(4)).unwrap(), vec![0x00, 0x00, 0x02, 0x01]);
//! ```

use std::fmt;

/// Error returned when a value does not fit the requested byte width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidthError {
    /// The value that was being encoded.
    pub value: u64,
    /// The requested total byte width.
    pub width: usize,
}

impl fmt::Display for WidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value {} too wide for {} byte(s)", self.value, self.width)
    }
}

impl std::error::Error for WidthError {}

fn payload_mask(bits: u32) -> u8 {
    debug_assert!((1..=8).contains(&bits), "bits must be 1..=8");
    if bits >= 8 {
        0xff
    } else {
        (1u8 << bits) - 1
    }
}

/// Decodes a big-endian integer that carries `bits` payload bits per byte.
///
/// `bits = 7` reads the synch-safe form, `bits = 8` a plain base-256
/// integer. Bits above the payload mask are ignored, so decoding is total:
/// any byte slice yields a value. Payloads wider than 64 significant bits
/// saturate to `u64::MAX` (leading zero bytes cost nothing).
///
/// # Example
///
/// ```
/// use tagcodec_synchsafe::decode;
///
/// assert_eq!(decode(&[0x7f, 0x7f], 7), 0x3fff);
/// assert_eq!(decode(&[0x01, 0x00], 8), 256);
/// assert_eq!(decode(&[], 7), 0);
/// ```
pub fn decode(data: &[u8], bits: u32) -> u64 {
    let mask = payload_mask(bits);
    let mut value: u64 = 0;
    for &byte in data {
        if value >> (64 - bits) != 0 {
            return u64::MAX;
        }
        value = (value << bits) | u64::from(byte & mask);
    }
    value
}

/// Encodes `value` big-endian with `bits` payload bits per byte.
///
/// `width: None` requests the minimal width that fits the value (at least
/// one byte, so zero encodes as `[0x00]`). An explicit width pads with
/// leading zero bytes, or fails with [`WidthError`] when the value needs
/// more bytes than requested.
///
/// # Example
///
/// ```
/// use tagcodec_synchsafe::encode;
///
/// assert_eq!(encode(0x3fff, 7, None).unwrap(), vec![0x7f, 0x7f]);
/// assert_eq!(encode(1, 8, Some(2)).unwrap(), vec![0x00, 0x01]);
/// assert!(encode(256, 8, Some(1)).is_err());
/// ```
pub fn encode(value: u64, bits: u32, width: Option<usize>) -> Result<Vec<u8>, WidthError> {
    let mask = payload_mask(bits);
    let mut out = Vec::new();
    let mut v = value;
    while v != 0 {
        out.push((v as u8) & mask);
        v >>= bits;
    }
    if out.is_empty() {
        out.push(0);
    }
    if let Some(w) = width {
        if out.len() > w {
            return Err(WidthError { value, width: w });
        }
        out.resize(w, 0);
    }
    out.reverse();
    Ok(out)
}
