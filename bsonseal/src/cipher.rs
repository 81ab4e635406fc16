//! Authenticated encryption of arbitrary byte payloads.
//!
//! Every call draws a fresh random nonce and returns a self-contained
//! envelope:
//!
//! ```text
//! [nonce:N][ciphertext:len(plaintext)][tag:16]
//! ```
//!
//! `N` depends on the [`CipherMode`]. The mode is not recorded in the
//! envelope, so both sides must agree on it.

use crate::error::{Error, Result};
use crate::key::{EncryptionKey, KEY_SIZE};
use chacha20poly1305::{
    aead::{generic_array::typenum::Unsigned, rand_core::RngCore, Aead, AeadCore, OsRng},
    ChaCha20Poly1305, KeyInit, XChaCha20Poly1305,
};
use serde::Deserialize;

/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// AEAD cipher used for field envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    /// XChaCha20-Poly1305 with a 192-bit nonce (default).
    XChaCha20Poly1305,
    /// ChaCha20-Poly1305 with a 96-bit nonce.
    ChaCha20Poly1305,
}

impl Default for CipherMode {
    fn default() -> Self {
        Self::XChaCha20Poly1305
    }
}

impl CipherMode {
    /// Length of the nonce prefix, which is also the shortest input
    /// `decrypt` will attempt to open.
    #[must_use]
    pub const fn nonce_size(self) -> usize {
        match self {
            Self::XChaCha20Poly1305 => 24,
            Self::ChaCha20Poly1305 => 12,
        }
    }

    /// Encrypts `plaintext` under `key` with a freshly generated nonce.
    ///
    /// # Errors
    ///
    /// Returns `Error::RandomnessFailure` if no nonce could be drawn, or
    /// `Error::EncryptionFailed` if the AEAD rejects the payload.
    pub fn encrypt(self, key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::XChaCha20Poly1305 => seal::<XChaCha20Poly1305>(key, plaintext),
            Self::ChaCha20Poly1305 => seal::<ChaCha20Poly1305>(key, plaintext),
        }
    }

    /// Opens an envelope produced by [`CipherMode::encrypt`] with the same mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedCiphertext` if the input is shorter than the
    /// nonce, or `Error::AuthenticationFailed` if the tag does not verify.
    pub fn decrypt(self, key: &EncryptionKey, envelope: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::XChaCha20Poly1305 => open::<XChaCha20Poly1305>(key, envelope),
            Self::ChaCha20Poly1305 => open::<ChaCha20Poly1305>(key, envelope),
        }
    }
}

/// Encrypts `plaintext` with the default [`CipherMode`].
///
/// # Errors
///
/// See [`CipherMode::encrypt`].
///
/// # Example
///
/// ```
/// use bsonseal::cipher::{decrypt, encrypt};
/// use bsonseal::key::EncryptionKey;
///
/// let key = EncryptionKey::generate().unwrap();
/// let envelope = encrypt(&key, b"my string").unwrap();
/// assert_eq!(decrypt(&key, &envelope).unwrap(), b"my string");
/// ```
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    CipherMode::default().encrypt(key, plaintext)
}

/// Decrypts an envelope produced by [`encrypt`].
///
/// # Errors
///
/// See [`CipherMode::decrypt`].
pub fn decrypt(key: &EncryptionKey, envelope: &[u8]) -> Result<Vec<u8>> {
    CipherMode::default().decrypt(key, envelope)
}

fn new_cipher<C: KeyInit>(key: &EncryptionKey) -> Result<C> {
    C::new_from_slice(key.as_bytes())
        .map_err(|_| Error::InvalidKeyLength { expected: KEY_SIZE, actual: key.as_bytes().len() })
}

fn seal<C: KeyInit + Aead>(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = new_cipher::<C>(key)?;

    let mut nonce = chacha20poly1305::aead::Nonce::<C>::default();
    OsRng.try_fill_bytes(nonce.as_mut_slice()).map_err(|_| Error::RandomnessFailure)?;

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    let mut envelope = Vec::with_capacity(nonce.len() + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

fn open<C: KeyInit + Aead>(key: &EncryptionKey, envelope: &[u8]) -> Result<Vec<u8>> {
    let nonce_size = <C as AeadCore>::NonceSize::USIZE;
    if envelope.len() < nonce_size {
        return Err(Error::MalformedCiphertext { len: envelope.len(), min: nonce_size });
    }

    let cipher = new_cipher::<C>(key)?;
    let (nonce, body) = envelope.split_at(nonce_size);

    cipher
        .decrypt(chacha20poly1305::aead::Nonce::<C>::from_slice(nonce), body)
        .map_err(|_| Error::AuthenticationFailed)
}
