//! Compact length-prefixed binary encoding.
//!
//! Every persisted structure in VaultLock (vaults, lock tokens,
//! encrypted values, whole authenticators) is a sequence of components:
//!
//! - a **property**: size prefix followed by that many bytes (an absent
//!   or empty property is a single `0x00` size byte),
//! - a **raw value**: bytes with no prefix, used when the reader already
//!   knows the width (fixed fields, or "everything that is left"),
//! - a **property list**: a count prefix followed by that many properties,
//! - a **property map**: a property list of alternating key/value pairs.
//!
//! Sizes use a variable-length integer: each byte carries 7 value bits,
//! the high bit marks "more bytes follow", and groups are accumulated
//! big-endian.
//!
//! The format is not self-framing. A decoder must read exactly the
//! shape the encoder wrote, which is why every top-level structure
//! starts with a one-byte format version.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use crate::errors::{Result, VaultLockError};

/// Bits of payload carried by each size byte.
const SIZE_BITS: u32 = 7;

/// High bit of a size byte: another byte follows.
const CONTINUATION: u8 = 0x80;

/// Append the variable-length encoding of `size` to `buf`.
pub fn write_size(buf: &mut Vec<u8>, size: usize) {
    // Collect 7-bit groups least significant first, then emit them
    // most significant first.
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut rest = size;
    loop {
        groups[count] = (rest & 0x7F) as u8;
        count += 1;
        rest >>= SIZE_BITS;
        if rest == 0 {
            break;
        }
    }

    for i in (0..count).rev() {
        let flag = if i == 0 { 0 } else { CONTINUATION };
        buf.push(groups[i] | flag);
    }
}

/// Number of bytes `write_size` emits for `size`.
pub(crate) fn size_len(size: usize) -> usize {
    let mut len = 1;
    let mut rest = size >> SIZE_BITS;
    while rest != 0 {
        len += 1;
        rest >>= SIZE_BITS;
    }
    len
}

/// Decode a size prefix starting at `*pos`, advancing the cursor.
pub(crate) fn read_size(data: &[u8], pos: &mut usize) -> Result<usize> {
    let mut value: usize = 0;
    loop {
        let byte = *data.get(*pos).ok_or_else(|| {
            VaultLockError::Coding("size prefix runs past the end of the buffer".into())
        })?;
        *pos += 1;

        if value > (usize::MAX >> SIZE_BITS) {
            return Err(VaultLockError::Coding("size prefix overflows".into()));
        }
        value = (value << SIZE_BITS) | usize::from(byte & 0x7F);

        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(size: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        write_size(&mut buf, size);
        buf
    }

    #[test]
    fn single_byte_sizes() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7F]);
    }

    #[test]
    fn multi_byte_sizes_are_big_endian() {
        assert_eq!(encoded(128), vec![0x81, 0x00]);
        assert_eq!(encoded(300), vec![0x82, 0x2C]);
        assert_eq!(encoded(16_384), vec![0x81, 0x80, 0x00]);
    }

    #[test]
    fn size_len_matches_encoding() {
        for size in [0, 1, 127, 128, 255, 16_383, 16_384, 1 << 21, usize::MAX] {
            assert_eq!(size_len(size), encoded(size).len(), "size {size}");
        }
    }

    #[test]
    fn read_size_reverses_write_size() {
        for size in [0, 5, 127, 128, 300, 65_535, 1 << 28, usize::MAX] {
            let buf = encoded(size);
            let mut pos = 0;
            assert_eq!(read_size(&buf, &mut pos).unwrap(), size);
            assert_eq!(pos, buf.len());
        }
    }

    #[test]
    fn read_size_rejects_dangling_continuation() {
        let mut pos = 0;
        assert!(read_size(&[0x81], &mut pos).is_err());
    }

    #[test]
    fn read_size_rejects_overflow() {
        let buf = [0xFFu8; 12];
        let mut pos = 0;
        assert!(read_size(&buf, &mut pos).is_err());
    }
}
