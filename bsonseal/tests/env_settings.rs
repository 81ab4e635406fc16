//! Settings read from real `BSONSEAL_*` environment variables.
//!
//! Kept in its own test binary with a single test so nothing else in the
//! process reads or writes these variables concurrently.

use bsonseal::cipher::CipherMode;
use bsonseal::config::{EncryptionConfig, EncryptionSettings};
use bsonseal::error::Error;
use bsonseal::key::EncryptionKey;

const VARS: [&str; 3] = ["BSONSEAL_KEY", "BSONSEAL_ENABLED", "BSONSEAL_MODE"];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_from_env() {
    clear();
    assert!(matches!(EncryptionSettings::from_env(), Err(Error::Config(_))));

    std::env::set_var("BSONSEAL_KEY", "ab".repeat(32));
    let config = EncryptionConfig::from_env().unwrap();
    assert_eq!(config, EncryptionConfig::new(EncryptionKey::from([0xab; 32])));

    std::env::set_var("BSONSEAL_ENABLED", "false");
    std::env::set_var("BSONSEAL_MODE", "chacha20poly1305");
    let config = EncryptionConfig::from_env().unwrap();
    assert!(!config.is_enabled());
    assert_eq!(config.mode(), CipherMode::ChaCha20Poly1305);
    assert_eq!(config.key(), &EncryptionKey::from([0xab; 32]));

    std::env::set_var("BSONSEAL_KEY", "not hex");
    assert!(matches!(EncryptionConfig::from_env(), Err(Error::Config(_))));

    clear();
}
