//! BSON codec boundary.
//!
//! These functions run the `bson` codec with a configuration in scope, so
//! [`Encrypted`](crate::field::Encrypted) fields anywhere in `T` are sealed on
//! encode and opened on decode. Typed errors raised by field adapters are
//! returned as-is instead of as codec error strings.

use crate::config::{EncryptionConfig, RecordedError};
use crate::error::{Error, Result};
use bson::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

// An adapter error is returned typed only when it is the one the codec
// failed with; errors serde recovered from are dropped.
fn resolve<T, E: Display>(outcome: (std::result::Result<T, E>, Option<RecordedError>)) -> Result<T> {
    match outcome {
        (Ok(value), _) => Ok(value),
        (Err(err), recorded) => {
            let message = err.to_string();
            Err(recorded.and_then(|r| r.matching(&message)).unwrap_or(Error::Codec(message)))
        }
    }
}

/// Encodes `value` to BSON bytes.
///
/// # Errors
///
/// Returns the error raised by the failing encrypted field, or `Error::Codec`
/// if `value` cannot be represented as a BSON document.
pub fn to_vec<T: Serialize>(config: &EncryptionConfig, value: &T) -> Result<Vec<u8>> {
    resolve(config.scope_capturing(|| bson::to_vec(value)))
}

/// Decodes BSON bytes into `T`.
///
/// `config` must match the one used for encoding: same key, cipher mode and
/// enable flag.
///
/// # Errors
///
/// Returns the error raised by the failing encrypted field
/// (`Error::AuthenticationFailed`, `Error::MalformedCiphertext`,
/// `Error::ParseError`), or `Error::Codec` for malformed documents.
pub fn from_slice<T: DeserializeOwned>(config: &EncryptionConfig, bytes: &[u8]) -> Result<T> {
    resolve(config.scope_capturing(|| bson::from_slice(bytes)))
}

/// Encodes `value` to a [`Document`], e.g. for handing to a database driver.
///
/// # Errors
///
/// See [`to_vec`].
pub fn to_document<T: Serialize>(config: &EncryptionConfig, value: &T) -> Result<Document> {
    resolve(config.scope_capturing(|| bson::to_document(value)))
}

/// Decodes a [`Document`] into `T`.
///
/// # Errors
///
/// See [`from_slice`].
pub fn from_document<T: DeserializeOwned>(config: &EncryptionConfig, document: Document) -> Result<T> {
    resolve(config.scope_capturing(|| bson::from_document(document)))
}
