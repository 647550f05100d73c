//! RFC 7011 variable-length field prefix.
//!
//! A length below 255 is carried in a single byte. Longer values use the
//! escape byte 255 followed by the length as a big-endian u16.

use crate::error::{Result, SavError};
use byteorder::{BigEndian, ByteOrder};

/// Escape byte announcing the 3-byte form.
pub const VARLEN_ESCAPE: u8 = 255;

/// Decodes a varlen prefix from the front of `buf`.
///
/// On success `buf` is advanced past the prefix. On failure `buf` is left
/// untouched.
///
/// # Examples
///
/// ```
/// use sav_ipfix::decode_varlen;
///
/// let data = [255u8, 0x01, 0x02, 0xaa];
/// let mut cursor = &data[..];
/// assert_eq!(decode_varlen(&mut cursor).unwrap(), 0x0102);
/// assert_eq!(cursor, &[0xaa]);
/// ```
pub fn decode_varlen(buf: &mut &[u8]) -> Result<u16> {
    let (length, consumed) = match buf.first() {
        None => return Err(SavError::insufficient(1, 0)),
        Some(&first) if first < VARLEN_ESCAPE => (u16::from(first), 1),
        Some(_) => {
            if buf.len() < 3 {
                return Err(SavError::insufficient(3, buf.len()));
            }
            (BigEndian::read_u16(&buf[1..3]), 3)
        }
    };

    *buf = &buf[consumed..];
    Ok(length)
}

/// Number of bytes the varlen prefix for `length` occupies.
pub const fn encoded_len(length: u16) -> usize {
    if length < VARLEN_ESCAPE as u16 { 1 } else { 3 }
}
