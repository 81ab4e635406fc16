//! Encryption configuration and its per-thread activation.
//!
//! Serde hooks cannot receive extra arguments, so a configuration is made
//! visible to field adapters by running the codec inside
//! [`EncryptionConfig::scope`]. Scopes are per thread and nest; the innermost
//! one is active. Adapters look the active configuration up on every call.

use crate::cipher::CipherMode;
use crate::error::{Error, Result};
use crate::key::EncryptionKey;
use config::builder::DefaultState;
use config::ConfigBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::cell::RefCell;

/// Environment variable prefix read by [`EncryptionSettings::from_env`].
pub const ENV_PREFIX: &str = "BSONSEAL";

thread_local! {
    static ACTIVE: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

struct Frame {
    config: EncryptionConfig,
    error: Option<RecordedError>,
}

/// Runtime configuration for field encryption.
///
/// # Example
///
/// ```
/// use bsonseal::config::EncryptionConfig;
/// use bsonseal::key::EncryptionKey;
///
/// let config = EncryptionConfig::new(EncryptionKey::generate().unwrap());
/// assert!(config.is_enabled());
/// assert!(!config.clone().with_enabled(false).is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionConfig {
    enabled: bool,
    key: EncryptionKey,
    mode: CipherMode,
}

impl EncryptionConfig {
    /// Creates an enabled configuration using the default cipher mode.
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        Self { enabled: true, key, mode: CipherMode::default() }
    }

    /// Creates a configuration that stores canonical bytes unencrypted.
    #[must_use]
    pub fn disabled(key: EncryptionKey) -> Self {
        Self::new(key).with_enabled(false)
    }

    /// Loads and validates a configuration from `BSONSEAL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a variable is missing or malformed, or
    /// `Error::InvalidKeyLength` if the key has the wrong size.
    pub fn from_env() -> Result<Self> {
        EncryptionSettings::from_env()?.into_config()
    }

    /// Sets whether adapters route canonical bytes through the cipher.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the cipher mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: CipherMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns whether encryption is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the key.
    #[must_use]
    pub const fn key(&self) -> &EncryptionKey {
        &self.key
    }

    /// Returns the cipher mode.
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Runs `f` with this configuration active for field adapters on the
    /// current thread. The previous scope is restored when `f` returns or
    /// panics.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let guard = ScopeGuard::enter(self);
        let out = f();
        drop(guard);
        out
    }

    /// Like [`scope`](Self::scope), but also returns the last typed error a
    /// field adapter raised while the scope was active.
    pub(crate) fn scope_capturing<R>(&self, f: impl FnOnce() -> R) -> (R, Option<RecordedError>) {
        let guard = ScopeGuard::enter(self);
        let out = f();
        (out, guard.exit())
    }
}

/// Runs `f` against the innermost active configuration on this thread.
///
/// The stack is not borrowed while `f` runs, so `f` may open nested scopes.
pub(crate) fn with_active<R>(f: impl FnOnce(&EncryptionConfig) -> Result<R>) -> Result<R> {
    let config = ACTIVE
        .with(|stack| stack.borrow().last().map(|frame| frame.config.clone()))
        .ok_or(Error::NoActiveConfig)?;
    f(&config)
}

/// Stores `err` on the innermost scope so the codec boundary can return it
/// unchanged, and returns the message handed to the codec.
///
/// A later error replaces an earlier one; serde may have recovered from it.
pub(crate) fn record_error(err: Error) -> String {
    let message = err.to_string();
    ACTIVE.with(|stack| {
        if let Some(frame) = stack.borrow_mut().last_mut() {
            frame.error = Some(RecordedError { message: message.clone(), error: err });
        }
    });
    message
}

/// A typed adapter error and the message the codec saw for it.
pub(crate) struct RecordedError {
    message: String,
    error: Error,
}

impl RecordedError {
    /// Returns the typed error if `codec_message` was caused by it.
    pub(crate) fn matching(self, codec_message: &str) -> Option<Error> {
        codec_message.contains(&self.message).then_some(self.error)
    }
}

struct ScopeGuard {
    active: bool,
}

impl ScopeGuard {
    fn enter(config: &EncryptionConfig) -> Self {
        tracing::debug!(enabled = config.enabled, mode = ?config.mode, "entering encryption scope");
        ACTIVE.with(|stack| stack.borrow_mut().push(Frame { config: config.clone(), error: None }));
        Self { active: true }
    }

    fn exit(mut self) -> Option<RecordedError> {
        self.active = false;
        ACTIVE.with(|stack| stack.borrow_mut().pop()).and_then(|frame| frame.error)
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.active {
            ACTIVE.with(|stack| stack.borrow_mut().pop());
        }
    }
}

/// Externally supplied settings, deserialized from the environment.
///
/// ```text
/// BSONSEAL_ENABLED=true
/// BSONSEAL_KEY=<64 hex digits>
/// BSONSEAL_MODE=xchacha20poly1305 | chacha20poly1305
/// ```
#[derive(Deserialize)]
pub struct EncryptionSettings {
    /// Whether field encryption is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Hex-encoded key. **Required.**
    pub key: SecretString,

    /// Cipher mode.
    #[serde(default)]
    pub mode: CipherMode,
}

const fn default_enabled() -> bool {
    true
}

impl EncryptionSettings {
    /// Loads settings from `BSONSEAL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the variables cannot be deserialized.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder())
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg = builder.add_source(config::Environment::with_prefix(ENV_PREFIX)).build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Validates the settings into an [`EncryptionConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid hex of the right length.
    pub fn into_config(self) -> Result<EncryptionConfig> {
        let key = EncryptionKey::from_hex(self.key.expose_secret())?;
        Ok(EncryptionConfig::new(key).with_enabled(self.enabled).with_mode(self.mode))
    }
}
