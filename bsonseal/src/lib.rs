//! # `bsonseal`
//!
//! Transparent field-level encryption for BSON documents.
//!
//! Wrap sensitive fields of a serde type in [`Encrypted`](field::Encrypted)
//! and encode it through [`document`]. Each wrapped field is stored as a BSON
//! binary holding an authenticated-encryption envelope; every other field is
//! left untouched.
//!
//! ## Features
//!
//! - XChaCha20-Poly1305 (default) or ChaCha20-Poly1305 envelopes with a fresh
//!   random nonce per field
//! - Adapters for booleans, strings, floats, integers, ISO-8601 dates and
//!   nested maps
//! - An enable switch for storing canonical bytes unencrypted
//! - Explicit, per-thread configuration scopes instead of global state
//!
//! ## Example
//!
//! ```rust
//! use bsonseal::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     email: EncryptedString,
//! }
//!
//! let config = EncryptionConfig::new(EncryptionKey::generate()?);
//! let user = User { name: "alice".into(), email: "alice@example.com".into() };
//!
//! let bytes = bsonseal::document::to_vec(&config, &user)?;
//! let decoded: User = bsonseal::document::from_slice(&config, &bytes)?;
//! assert_eq!(*decoded.email, "alice@example.com");
//! # Ok::<(), bsonseal::error::Error>(())
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cipher;
pub mod config;
pub mod date;
pub mod document;
pub mod error;
pub mod field;
pub mod key;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::cipher::{decrypt, encrypt, CipherMode};
    pub use crate::config::{EncryptionConfig, EncryptionSettings};
    pub use crate::date::{IsoDate, ISO8601_FORMAT};
    pub use crate::error::{Error, Result};
    pub use crate::field::{
        Encrypted, EncryptedBool, EncryptedDate, EncryptedFloat, EncryptedInt, EncryptedMap,
        EncryptedString, FieldValue,
    };
    pub use crate::key::{EncryptionKey, KEY_SIZE};
}
