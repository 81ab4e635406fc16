use bsonseal::cipher::{decrypt, encrypt, CipherMode};
use bsonseal::config::EncryptionConfig;
use bsonseal::document;
use bsonseal::field::{EncryptedInt, EncryptedString};
use bsonseal::key::EncryptionKey;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde::{Deserialize, Serialize};

const PLAINTEXT: &[u8] = b"this is a test";

fn bench_encrypt_decrypt(c: &mut Criterion) {
    let key = EncryptionKey::from([7u8; 32]);

    c.bench_function("encrypt_decrypt", |b| {
        b.iter(|| {
            let envelope = encrypt(black_box(&key), black_box(PLAINTEXT)).unwrap();
            let opened = decrypt(&key, &envelope).unwrap();
            assert_eq!(opened, PLAINTEXT);
        });
    });

    let mode = CipherMode::ChaCha20Poly1305;
    c.bench_function("encrypt_decrypt_chacha20poly1305", |b| {
        b.iter(|| {
            let envelope = mode.encrypt(black_box(&key), black_box(PLAINTEXT)).unwrap();
            mode.decrypt(&key, &envelope).unwrap()
        });
    });
}

#[derive(Serialize, Deserialize)]
struct Record {
    name: String,
    email: EncryptedString,
    balance: EncryptedInt,
}

fn bench_document(c: &mut Criterion) {
    let config = EncryptionConfig::new(EncryptionKey::from([7u8; 32]));
    let record = Record {
        name: "alice".to_string(),
        email: "alice@example.com".into(),
        balance: EncryptedInt::new(100),
    };

    c.bench_function("document_round_trip", |b| {
        b.iter(|| {
            let bytes = document::to_vec(&config, black_box(&record)).unwrap();
            document::from_slice::<Record>(&config, &bytes).unwrap()
        });
    });
}

criterion_group!(benches, bench_encrypt_decrypt, bench_document);
criterion_main!(benches);
