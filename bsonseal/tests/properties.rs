//! Property-based tests for the cipher and field adapters.
//!
//! Ciphertexts are non-deterministic, so these check behavior rather than
//! byte-level equality.

use bsonseal::cipher::{decrypt, encrypt, CipherMode};
use bsonseal::config::EncryptionConfig;
use bsonseal::error::Error;
use bsonseal::field::{Encrypted, EncryptedFloat, EncryptedInt, EncryptedString};
use bsonseal::key::EncryptionKey;
use proptest::prelude::*;

fn key() -> EncryptionKey {
    EncryptionKey::from_hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
        .expect("valid test key")
}

fn mode() -> impl Strategy<Value = CipherMode> {
    prop_oneof![Just(CipherMode::XChaCha20Poly1305), Just(CipherMode::ChaCha20Poly1305)]
}

proptest! {
    /// Property: decrypt(encrypt(x)) == x
    #[test]
    fn prop_encrypt_decrypt_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let key = key();
        let envelope = encrypt(&key, &data).unwrap();
        prop_assert_eq!(decrypt(&key, &envelope).unwrap(), data);
    }

    /// Property: flipping any single bit is detected
    #[test]
    fn prop_single_bit_flip_rejected(
        data in prop::collection::vec(any::<u8>(), 0..256),
        mode in mode(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = key();
        let mut envelope = mode.encrypt(&key, &data).unwrap();
        let index = position.index(envelope.len());
        envelope[index] ^= 1 << bit;

        prop_assert!(matches!(mode.decrypt(&key, &envelope), Err(Error::AuthenticationFailed)));
    }

    /// Property: any prefix shorter than the nonce is malformed
    #[test]
    fn prop_short_input_malformed(mode in mode(), len in 0usize..24) {
        let key = key();
        let envelope = mode.encrypt(&key, b"payload").unwrap();
        let len = len.min(mode.nonce_size() - 1);

        let is_malformed = matches!(
            mode.decrypt(&key, &envelope[..len]),
            Err(Error::MalformedCiphertext { .. })
        );
        prop_assert!(is_malformed);
    }

    /// Property: string fields survive a round trip with either flag state
    #[test]
    fn prop_string_field_roundtrip(value in ".*", enabled in any::<bool>()) {
        let config = EncryptionConfig::new(key()).with_enabled(enabled);
        let bytes = EncryptedString::from(value.as_str()).to_bytes(&config).unwrap();
        prop_assert_eq!(EncryptedString::from_bytes(&config, &bytes).unwrap().into_inner(), value);
    }

    /// Property: integer fields survive a round trip
    #[test]
    fn prop_int_field_roundtrip(value in any::<i64>(), enabled in any::<bool>()) {
        let config = EncryptionConfig::new(key()).with_enabled(enabled);
        let bytes = Encrypted(value).to_bytes(&config).unwrap();
        prop_assert_eq!(*EncryptedInt::from_bytes(&config, &bytes).unwrap(), value);
    }

    /// Property: finite floats survive a round trip bit-for-bit
    #[test]
    fn prop_float_field_roundtrip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let config = EncryptionConfig::new(key());
        let bytes = Encrypted(value).to_bytes(&config).unwrap();
        prop_assert_eq!(EncryptedFloat::from_bytes(&config, &bytes).unwrap().to_bits(), value.to_bits());
    }
}
