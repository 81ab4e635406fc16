//! Error types for `bsonseal` operations.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for `bsonseal` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The secure random source could not produce a nonce or key
    #[error("secure random source unavailable")]
    RandomnessFailure,

    /// The AEAD refused to encrypt the payload
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Envelope is too short to contain a nonce
    #[error("malformed ciphertext: {len} bytes (minimum: {min})")]
    MalformedCiphertext {
        /// Length of the rejected input
        len: usize,
        /// Minimum length for the cipher mode in use
        min: usize,
    },

    /// Authentication tag verification failed (data may be corrupted or tampered)
    #[error("authentication failed: ciphertext may be corrupted or tampered")]
    AuthenticationFailed,

    /// Canonical bytes could not be converted back into a native value
    #[error("parse error: {0}")]
    ParseError(String),

    /// Key material has the wrong length
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A field hook ran outside of [`EncryptionConfig::scope`](crate::config::EncryptionConfig::scope)
    #[error("no encryption config is active on this thread")]
    NoActiveConfig,

    /// Configuration could not be loaded or validated
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The BSON codec failed for a reason unrelated to field encryption
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_ciphertext_message() {
        let err = Error::MalformedCiphertext { len: 3, min: 24 };
        assert_eq!(err.to_string(), "malformed ciphertext: 3 bytes (minimum: 24)");
    }

    #[test]
    fn test_invalid_key_length_message() {
        let err = Error::InvalidKeyLength { expected: 32, actual: 16 };
        assert_eq!(err.to_string(), "invalid key length: expected 32 bytes, got 16");
    }
}
