//! Buffers for key material that wipe themselves when dropped.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use super::encryption::KEY_LEN;

/// A 32-byte symmetric key, zeroed on drop.
pub type SecretKey = Zeroizing<[u8; KEY_LEN]>;

/// Variable-length secret bytes (most often a vault private key).
///
/// The contents are overwritten when the value is dropped or
/// explicitly wiped, and never appear in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Copy `bytes` into a new zeroizing buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite and empty the buffer now instead of waiting for drop.
    pub fn wipe(&mut self) {
        self.0.zeroize();
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wipe_empties_the_buffer() {
        let mut secret = SecretBytes::from_slice(&[7u8; 32]);
        assert_eq!(secret.len(), 32);
        secret.wipe();
        assert!(secret.is_empty());
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = SecretBytes::from_slice(b"hunter2");
        let shown = format!("{secret:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("REDACTED"));
    }
}
