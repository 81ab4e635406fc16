//! Symmetric key material for field encryption.

use crate::error::{Error, Result};
use chacha20poly1305::aead::{rand_core::RngCore, OsRng};
use secrecy::{ExposeSecret, SecretVec};
use std::fmt;

/// Key size in bytes (256 bits), shared by every cipher mode.
pub const KEY_SIZE: usize = 32;

/// A fixed-size symmetric key.
///
/// The bytes are held in a [`SecretVec`] and zeroized on drop. The key is
/// supplied by the caller; this crate never persists it.
///
/// # Example
///
/// ```
/// use bsonseal::key::EncryptionKey;
///
/// let key = EncryptionKey::from_bytes(&[7u8; 32]).unwrap();
/// assert!(EncryptionKey::from_bytes(&[7u8; 16]).is_err());
/// # let _ = key;
/// ```
pub struct EncryptionKey {
    bytes: SecretVec<u8>,
}

impl EncryptionKey {
    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyLength` if `bytes` is not [`KEY_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(Error::InvalidKeyLength { expected: KEY_SIZE, actual: bytes.len() });
        }
        Ok(Self { bytes: SecretVec::new(bytes.to_vec()) })
    }

    /// Creates a key from a hex string (64 hex digits).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the string is not valid hex, or
    /// `Error::InvalidKeyLength` if it decodes to the wrong length.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let mut decoded = hex::decode(encoded.trim())
            .map_err(|e| Error::Config(format!("key is not valid hex: {e}")))?;
        let key = Self::from_bytes(&decoded);
        zeroize::Zeroize::zeroize(&mut decoded);
        key
    }

    /// Draws a fresh key from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns `Error::RandomnessFailure` if the random source is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = vec![0u8; KEY_SIZE];
        OsRng.try_fill_bytes(&mut bytes).map_err(|_| Error::RandomnessFailure)?;
        Ok(Self { bytes: SecretVec::new(bytes) })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl From<[u8; KEY_SIZE]> for EncryptionKey {
    fn from(mut bytes: [u8; KEY_SIZE]) -> Self {
        let key = Self { bytes: SecretVec::new(bytes.to_vec()) };
        zeroize::Zeroize::zeroize(&mut bytes);
        key
    }
}

impl Clone for EncryptionKey {
    fn clone(&self) -> Self {
        Self { bytes: SecretVec::new(self.bytes.expose_secret().to_vec()) }
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for EncryptionKey {}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        let result = EncryptionKey::from_bytes(&[1u8; 31]);
        assert!(matches!(result, Err(Error::InvalidKeyLength { expected: 32, actual: 31 })));

        let result = EncryptionKey::from_bytes(&[]);
        assert!(matches!(result, Err(Error::InvalidKeyLength { expected: 32, actual: 0 })));
    }

    #[test]
    fn test_from_hex() {
        let key = EncryptionKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);

        assert!(matches!(EncryptionKey::from_hex("zz"), Err(Error::Config(_))));
        assert!(matches!(
            EncryptionKey::from_hex("abcd"),
            Err(Error::InvalidKeyLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let key1 = EncryptionKey::generate().unwrap();
        let key2 = EncryptionKey::generate().unwrap();

        assert_eq!(key1.as_bytes().len(), KEY_SIZE);
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = EncryptionKey::from([0x42; KEY_SIZE]);
        let debug = format!("{key:?}");

        assert_eq!(debug, "EncryptionKey([REDACTED])");
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_clone() {
        let key = EncryptionKey::from([9; KEY_SIZE]);
        assert_eq!(key.clone(), key);
    }
}
