//! Persisted result of locking a vault private key.
//!
//! Encoded layout, shared by every lock kind:
//!
//! ```text
//! [version: 1 byte][property(alias)][property(method)][encrypted secret (rest)]
//! ```

use std::fmt;

use crate::codec::{Decoder, Encoder};
use crate::errors::{VaultLockError, Result};

/// Current token encoding version.
pub const TOKEN_FORMAT_VERSION: u8 = 1;

/// The vault private key encrypted under one lock's guard, plus the
/// key-store alias needed to reverse it.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    alias: String,
    method: Option<String>,
    encrypted_secret: Vec<u8>,
}

impl Token {
    pub fn new(alias: impl Into<String>, method: Option<String>, encrypted_secret: Vec<u8>) -> Self {
        Self {
            alias: alias.into(),
            method: method.filter(|m| !m.is_empty()),
            encrypted_secret,
        }
    }

    /// Key-store alias of the entry that guards this token.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Reserved algorithm tag; `None` for the default scheme.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn encrypted_secret(&self) -> &[u8] {
        &self.encrypted_secret
    }

    pub fn encode(&self) -> Vec<u8> {
        Encoder::with_prefix(&[TOKEN_FORMAT_VERSION])
            .property(self.alias.as_bytes())
            .optional_property(self.method.as_deref().map(str::as_bytes))
            .value(&self.encrypted_secret)
            .finish()
    }

    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        if !decoder.check_value_equals(&[TOKEN_FORMAT_VERSION])? {
            return Err(VaultLockError::Coding(format!(
                "unsupported token version, expected {TOKEN_FORMAT_VERSION}"
            )));
        }

        let alias = decoder.read_string()?;
        if alias.is_empty() {
            return Err(VaultLockError::Coding("token has no key-store alias".into()));
        }
        let method = decoder.read_string()?;

        Ok(Self::new(
            alias,
            Some(method.to_string()),
            decoder.read_final().to_vec(),
        ))
    }

    /// Fail unless the token uses the default scheme.
    pub(crate) fn ensure_default_method(&self) -> Result<()> {
        match &self.method {
            None => Ok(()),
            Some(method) => Err(VaultLockError::Coding(format!(
                "unsupported token method '{method}'"
            ))),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("alias", &self.alias)
            .field("method", &self.method)
            .field("encrypted_secret", &format_args!("{} bytes", self.encrypted_secret.len()))
            .finish()
    }
}
