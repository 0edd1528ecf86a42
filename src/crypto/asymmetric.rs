//! X25519 sealed-box asymmetric cipher.
//!
//! Encryption generates an ephemeral X25519 key, agrees a shared secret
//! with the recipient's public key, expands it with HKDF-SHA256 bound to
//! both public keys, and seals the plaintext with AES-256-GCM:
//!
//! ```text
//! [ 32-byte ephemeral public key | 12-byte nonce | ciphertext + 16-byte tag ]
//! ```
//!
//! Like RSA-OAEP it only accepts small payloads (`MAX_PLAINTEXT_LEN`);
//! anything larger goes through the hybrid cipher.

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use super::encryption::{self, KEY_LEN, NONCE_LEN, TAG_LEN};
use super::secret::{SecretBytes, SecretKey};
use crate::errors::{VaultLockError, Result};

/// Algorithm tag stored alongside public keys.
pub const KEY_TYPE: &str = "X25519";

/// Size of an X25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Size of an X25519 private key.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Largest plaintext the asymmetric cipher will seal.
pub const MAX_PLAINTEXT_LEN: usize = 190;

/// Fixed bytes added by sealing.
pub const OVERHEAD: usize = PUBLIC_KEY_LEN + NONCE_LEN + TAG_LEN;

/// HKDF info label for deriving the sealing key.
const HKDF_LABEL: &[u8] = b"vaultlock:sealed-box:v1";

/// A freshly generated X25519 keypair.
#[derive(Debug)]
pub struct KeyPair {
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub private_key: SecretBytes,
}

impl KeyPair {
    pub fn generate() -> Self {
        let secret = random_secret();
        let public = PublicKey::from(&secret);
        Self {
            public_key: public.to_bytes(),
            private_key: SecretBytes::from_slice(secret.as_bytes()),
        }
    }
}

/// Parse and validate private-key bytes.
pub fn parse_private_key(bytes: &[u8]) -> Result<StaticSecret> {
    let raw: [u8; PRIVATE_KEY_LEN] = bytes.try_into().map_err(|_| {
        VaultLockError::Coding(format!(
            "{KEY_TYPE} private key must be {PRIVATE_KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(StaticSecret::from(raw))
}

/// Derive the public half of a private key.
pub fn public_key_of(private_key: &[u8]) -> Result<[u8; PUBLIC_KEY_LEN]> {
    let secret = parse_private_key(private_key)?;
    Ok(PublicKey::from(&secret).to_bytes())
}

/// Seal `plaintext` to `public_key`.
pub fn encrypt(public_key: &[u8; PUBLIC_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(VaultLockError::PlaintextTooLarge {
            size: plaintext.len(),
            max: MAX_PLAINTEXT_LEN,
        });
    }

    let ephemeral = random_secret();
    let ephemeral_public = PublicKey::from(&ephemeral).to_bytes();
    let recipient = PublicKey::from(*public_key);

    let shared = ephemeral.diffie_hellman(&recipient);
    if !shared.was_contributory() {
        return Err(VaultLockError::EncryptionFailed(
            "public key is a low-order point".into(),
        ));
    }

    let key = sealing_key(shared.as_bytes(), &ephemeral_public, public_key)?;
    let sealed = encryption::encrypt(key.as_slice(), plaintext)?;

    let mut output = Vec::with_capacity(PUBLIC_KEY_LEN + sealed.len());
    output.extend_from_slice(&ephemeral_public);
    output.extend_from_slice(&sealed);
    Ok(output)
}

/// Open a sealed box with the recipient's private key.
pub fn decrypt(private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < OVERHEAD {
        return Err(VaultLockError::DecryptionFailed);
    }
    let secret = parse_private_key(private_key)?;
    let own_public = PublicKey::from(&secret).to_bytes();

    let (ephemeral_bytes, sealed) = ciphertext.split_at(PUBLIC_KEY_LEN);
    let mut ephemeral_public = [0u8; PUBLIC_KEY_LEN];
    ephemeral_public.copy_from_slice(ephemeral_bytes);

    let shared = secret.diffie_hellman(&PublicKey::from(ephemeral_public));
    if !shared.was_contributory() {
        return Err(VaultLockError::DecryptionFailed);
    }

    let key = sealing_key(shared.as_bytes(), &ephemeral_public, &own_public)?;
    encryption::decrypt(key.as_slice(), sealed)
}

fn random_secret() -> StaticSecret {
    let mut bytes = [0u8; PRIVATE_KEY_LEN];
    rand::rng().fill_bytes(&mut bytes);
    let secret = StaticSecret::from(bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    secret
}

fn sealing_key(
    shared: &[u8],
    ephemeral_public: &[u8; PUBLIC_KEY_LEN],
    recipient_public: &[u8; PUBLIC_KEY_LEN],
) -> Result<SecretKey> {
    let hk = Hkdf::<Sha256>::new(None, shared);

    let mut info = Vec::with_capacity(HKDF_LABEL.len() + 2 * PUBLIC_KEY_LEN);
    info.extend_from_slice(HKDF_LABEL);
    info.extend_from_slice(ephemeral_public);
    info.extend_from_slice(recipient_public);

    let mut key = SecretKey::default();
    hk.expand(&info, key.as_mut_slice())
        .map_err(|e| VaultLockError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;
    debug_assert_eq!(key.len(), KEY_LEN);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_matching_key() {
        let pair = KeyPair::generate();
        let sealed = encrypt(&pair.public_key, b"symmetric key").unwrap();
        assert_eq!(sealed.len(), OVERHEAD + 13);
        let opened = decrypt(pair.private_key.as_bytes(), &sealed).unwrap();
        assert_eq!(opened, b"symmetric key");
    }

    #[test]
    fn unrelated_private_key_fails() {
        let pair = KeyPair::generate();
        let other = KeyPair::generate();
        let sealed = encrypt(&pair.public_key, b"payload").unwrap();
        assert!(decrypt(other.private_key.as_bytes(), &sealed).is_err());
    }

    #[test]
    fn enforces_plaintext_ceiling() {
        let pair = KeyPair::generate();
        assert!(encrypt(&pair.public_key, &[0u8; MAX_PLAINTEXT_LEN]).is_ok());
        assert!(matches!(
            encrypt(&pair.public_key, &[0u8; MAX_PLAINTEXT_LEN + 1]),
            Err(VaultLockError::PlaintextTooLarge { .. })
        ));
    }

    #[test]
    fn public_key_is_derivable_from_private_key() {
        let pair = KeyPair::generate();
        assert_eq!(
            public_key_of(pair.private_key.as_bytes()).unwrap(),
            pair.public_key
        );
    }

    #[test]
    fn rejects_private_key_of_wrong_length() {
        assert!(parse_private_key(&[0u8; 31]).is_err());
    }
}
