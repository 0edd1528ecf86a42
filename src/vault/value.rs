//! Plain and encrypted property values.
//!
//! A `Property` is a plaintext byte blob with typed views.  An
//! `EncryptedValue` is the encoded output of hybrid encryption under a
//! vault's public key:
//!
//! ```text
//! [ property(method tag) | property(sealed key) | symmetric ciphertext ]
//! ```

use std::fmt;

use crate::codec::Decoder;
use crate::crypto::hybrid::HybridCiphertext;
use crate::errors::{VaultLockError, Result};

/// A named plaintext value.  Equality is byte equality.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Property(Vec<u8>);

impl Property {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_string(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }

    /// Stored as 4 big-endian bytes.
    pub fn from_int(value: i32) -> Self {
        Self(value.to_be_bytes().to_vec())
    }

    /// Stored as a single `0`/`1` byte.
    pub fn from_bool(value: bool) -> Self {
        Self(vec![u8::from(value)])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_string(&self) -> Result<String> {
        String::from_utf8(self.0.clone())
            .map_err(|e| VaultLockError::Coding(format!("property is not valid UTF-8: {e}")))
    }

    pub fn as_int(&self) -> Result<i32> {
        let raw: [u8; 4] = self.0.as_slice().try_into().map_err(|_| {
            VaultLockError::Coding(format!(
                "int property must be 4 bytes, got {}",
                self.0.len()
            ))
        })?;
        Ok(i32::from_be_bytes(raw))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self.0.as_slice() {
            [0] => Ok(false),
            [1] => Ok(true),
            other => Err(VaultLockError::Coding(format!(
                "bool property must be a single 0 or 1 byte, got {} bytes",
                other.len()
            ))),
        }
    }
}

impl From<&str> for Property {
    fn from(value: &str) -> Self {
        Self::from_string(value)
    }
}

impl From<String> for Property {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Vec<u8>> for Property {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Property {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({} bytes)", self.0.len())
    }
}

/// Encoded hybrid ciphertext with an optional method tag.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncryptedValue(Vec<u8>);

impl EncryptedValue {
    /// Wrap already encoded bytes (e.g. read back from storage).
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// The method tag, `None` for the default hybrid scheme.
    pub fn method(&self) -> Result<Option<String>> {
        let mut decoder = Decoder::new(&self.0);
        let method = decoder.read_string()?;
        Ok((!method.is_empty()).then(|| method.to_string()))
    }

    /// Split into the method tag and the hybrid ciphertext.
    pub(crate) fn parts(&self) -> Result<(&str, HybridCiphertext<'_>)> {
        let mut decoder = Decoder::new(&self.0);
        let method = decoder.read_string()?;
        let ciphertext = HybridCiphertext::parse(decoder.read_final())?;
        Ok((method, ciphertext))
    }

}

impl From<Vec<u8>> for EncryptedValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedValue({} bytes)", self.0.len())
    }
}
