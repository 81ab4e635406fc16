//! Typed field adapters.
//!
//! [`Encrypted<T>`] wraps a native value and takes part in serde encoding as
//! a byte field. On encode the value is rendered to canonical bytes and, when
//! the active [`EncryptionConfig`] is enabled, sealed with the cipher. Decode
//! reverses both steps into a fresh value.
//!
//! ```
//! use bsonseal::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Patient {
//!     name: EncryptedString,
//!     age: EncryptedInt,
//! }
//!
//! let config = EncryptionConfig::new(EncryptionKey::generate().unwrap());
//! let patient = Patient { name: "Ada".into(), age: Encrypted(36) };
//!
//! let bytes = bsonseal::document::to_vec(&config, &patient).unwrap();
//! let decoded: Patient = bsonseal::document::from_slice(&config, &bytes).unwrap();
//! assert_eq!(*decoded.name, "Ada");
//! assert_eq!(*decoded.age, 36);
//! ```

use crate::config::{self, EncryptionConfig};
use crate::date::IsoDate;
use crate::error::{Error, Result};
use bson::Document;
use serde::de::{self, SeqAccess, Visitor};
use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};
use zeroize::Zeroizing;

/// Conversion between a native value and its canonical byte form.
///
/// The canonical bytes are the cipher's plaintext, or the stored payload
/// when encryption is disabled.
pub trait FieldValue: Sized {
    /// Short name of the value kind, used in log events.
    const KIND: &'static str;

    /// Renders the value to canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no canonical encoding.
    fn to_canonical(&self) -> Result<Vec<u8>>;

    /// Parses canonical bytes back into a value.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseError` if the bytes are not a valid encoding.
    fn from_canonical(bytes: &[u8]) -> Result<Self>;
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::ParseError(format!("invalid UTF-8: {e}")))
}

impl FieldValue for bool {
    const KIND: &'static str = "bool";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        Ok(vec![u8::from(*self)])
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(Error::ParseError(format!("invalid boolean encoding: {bytes:02x?}"))),
        }
    }
}

impl FieldValue for String {
    const KIND: &'static str = "string";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        utf8(bytes).map(ToString::to_string)
    }
}

// `Display` for f64 prints the shortest text that parses back to the same bits.
impl FieldValue for f64 {
    const KIND: &'static str = "float";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        Ok(self.to_string().into_bytes())
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        let text = utf8(bytes)?;
        text.parse().map_err(|e| Error::ParseError(format!("invalid float {text:?}: {e}")))
    }
}

impl FieldValue for i64 {
    const KIND: &'static str = "int";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        Ok(self.to_string().into_bytes())
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        let text = utf8(bytes)?;
        text.parse().map_err(|e| Error::ParseError(format!("invalid integer {text:?}: {e}")))
    }
}

impl FieldValue for IsoDate {
    const KIND: &'static str = "date";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        Ok(self.as_str().as_bytes().to_vec())
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        utf8(bytes).map(Self::from)
    }
}

impl FieldValue for Document {
    const KIND: &'static str = "map";

    fn to_canonical(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.to_writer(&mut bytes).map_err(|e| Error::Codec(e.to_string()))?;
        Ok(bytes)
    }

    fn from_canonical(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes).map_err(|e| Error::ParseError(format!("invalid document: {e}")))
    }
}

/// A field value that is encrypted when encoded.
///
/// Outside of encoding it behaves like the wrapped value: it dereferences to
/// it, compares like it and converts from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Hash, Default)]
pub struct Encrypted<T>(pub T);

/// Encrypted boolean.
pub type EncryptedBool = Encrypted<bool>;
/// Encrypted UTF-8 string.
pub type EncryptedString = Encrypted<String>;
/// Encrypted 64-bit float.
pub type EncryptedFloat = Encrypted<f64>;
/// Encrypted 64-bit integer.
pub type EncryptedInt = Encrypted<i64>;
/// Encrypted ISO-8601 date string.
pub type EncryptedDate = Encrypted<IsoDate>;
/// Encrypted string-keyed map with arbitrarily nested values.
pub type EncryptedMap = Encrypted<Document>;

impl<T> Encrypted<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the wrapped value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: FieldValue> Encrypted<T> {
    /// Renders the value to the byte payload written by the codec.
    ///
    /// The payload is the canonical bytes when `config` is disabled, and an
    /// envelope around them when enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no canonical encoding or encryption
    /// fails.
    pub fn to_bytes(&self, config: &EncryptionConfig) -> Result<Vec<u8>> {
        let canonical = Zeroizing::new(self.0.to_canonical()?);
        let payload = if config.is_enabled() {
            config.mode().encrypt(config.key(), &canonical)?
        } else {
            canonical.to_vec()
        };

        tracing::trace!(
            kind = T::KIND,
            len = payload.len(),
            encrypted = config.is_enabled(),
            "sealed field"
        );
        Ok(payload)
    }

    /// Builds a value from a byte payload produced by [`to_bytes`](Self::to_bytes)
    /// under a configuration with the same enable flag, key and mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedCiphertext` or `Error::AuthenticationFailed`
    /// if the envelope does not open, and `Error::ParseError` if the
    /// canonical bytes are invalid.
    pub fn from_bytes(config: &EncryptionConfig, payload: &[u8]) -> Result<Self> {
        let value = if config.is_enabled() {
            let canonical = Zeroizing::new(config.mode().decrypt(config.key(), payload)?);
            T::from_canonical(&canonical)?
        } else {
            T::from_canonical(payload)?
        };

        tracing::trace!(
            kind = T::KIND,
            len = payload.len(),
            encrypted = config.is_enabled(),
            "opened field"
        );
        Ok(Self(value))
    }

    /// Replaces the wrapped value with one decoded from `payload`.
    ///
    /// On error the current value is left untouched.
    ///
    /// # Errors
    ///
    /// See [`from_bytes`](Self::from_bytes).
    pub fn load_bytes(&mut self, config: &EncryptionConfig, payload: &[u8]) -> Result<()> {
        *self = Self::from_bytes(config, payload)?;
        Ok(())
    }
}

impl<T> Deref for Encrypted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Encrypted<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Encrypted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl From<&str> for Encrypted<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<T: FieldValue> Serialize for Encrypted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let payload = config::with_active(|config| self.to_bytes(config))
            .map_err(|e| <S::Error as ser::Error>::custom(config::record_error(e)))?;
        serializer.serialize_bytes(&payload)
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for Encrypted<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let payload = deserializer.deserialize_bytes(PayloadVisitor)?;
        config::with_active(|config| Self::from_bytes(config, &payload))
            .map_err(|e| <D::Error as de::Error>::custom(config::record_error(e)))
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an encrypted field byte payload")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Self::Value, E> {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element()? {
            bytes.push(byte);
        }
        Ok(bytes)
    }
}
