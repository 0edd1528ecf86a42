use subtle::ConstantTimeEq;

use super::read_size;
use crate::errors::{Result, VaultLockError};

/// Sequential reader over an encoded buffer.
///
/// Every read advances an internal cursor. A read that would run past
/// the end of the buffer fails with `VaultLockError::Coding`; the
/// decoder is not usable after a failed read.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read one size-prefixed property.
    pub fn read_property(&mut self) -> Result<&'a [u8]> {
        let size = read_size(self.data, &mut self.pos)?;
        self.read_value(size)
    }

    /// Read a property and interpret it as UTF-8.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let bytes = self.read_property()?;
        std::str::from_utf8(bytes)
            .map_err(|e| VaultLockError::Coding(format!("property is not valid UTF-8: {e}")))
    }

    /// Read a property, mapping the zero-length marker to `None`.
    pub fn read_optional_property(&mut self) -> Result<Option<&'a [u8]>> {
        let bytes = self.read_property()?;
        Ok((!bytes.is_empty()).then_some(bytes))
    }

    /// Read a count prefix followed by that many properties.
    pub fn read_property_list(&mut self) -> Result<Vec<&'a [u8]>> {
        let count = read_size(self.data, &mut self.pos)?;
        // Every property needs at least its one-byte size prefix.
        if count > self.remaining() {
            return Err(VaultLockError::Coding(format!(
                "property list claims {count} entries but only {} bytes remain",
                self.remaining()
            )));
        }

        let mut properties = Vec::with_capacity(count);
        for _ in 0..count {
            properties.push(self.read_property()?);
        }
        Ok(properties)
    }

    /// Read a property list of alternating keys and values.
    pub fn read_property_map(&mut self) -> Result<Vec<(&'a [u8], &'a [u8])>> {
        let properties = self.read_property_list()?;
        if properties.len() % 2 != 0 {
            return Err(VaultLockError::Coding(format!(
                "property map has an odd number of entries ({})",
                properties.len()
            )));
        }

        Ok(properties
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect())
    }

    /// Read exactly `len` raw bytes.
    pub fn read_value(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(VaultLockError::Coding(format!(
                "need {len} bytes but only {} remain",
                self.remaining()
            )));
        }
        let value = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(value)
    }

    /// Compare the next `expected.len()` bytes with `expected`.
    ///
    /// The cursor advances whether or not the bytes match.
    pub fn check_value_equals(&mut self, expected: &[u8]) -> Result<bool> {
        let actual = self.read_value(expected.len())?;
        Ok(actual.ct_eq(expected).into())
    }

    /// Consume everything that is left.
    pub fn read_final(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;

    #[test]
    fn check_value_equals_advances_on_mismatch() {
        let mut decoder = Decoder::new(&[1, 2, 3]);
        assert!(!decoder.check_value_equals(&[9]).unwrap());
        assert_eq!(decoder.read_final(), &[2u8, 3]);
    }

    #[test]
    fn read_value_past_end_fails() {
        let mut decoder = Decoder::new(&[1, 2]);
        assert!(decoder.read_value(3).is_err());
        // The failed read consumed nothing.
        assert_eq!(decoder.remaining(), 2);
    }

    #[test]
    fn odd_map_is_rejected() {
        let bytes = Encoder::new().property_list([b"k".as_slice()]).finish();
        let mut decoder = Decoder::new(&bytes);
        assert!(decoder.read_property_map().is_err());
    }

    #[test]
    fn inflated_list_count_is_rejected() {
        let mut decoder = Decoder::new(&[0x7F, 0x00]);
        assert!(decoder.read_property_list().is_err());
    }

    #[test]
    fn invalid_utf8_string_fails() {
        let bytes = Encoder::new().property(&[0xFF, 0xFE]).finish();
        assert!(Decoder::new(&bytes).read_string().is_err());
    }
}
