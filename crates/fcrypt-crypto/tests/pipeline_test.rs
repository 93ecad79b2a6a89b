//! Pipeline tests through the public API: key files on disk, whole-file
//! encryption, and sealed output built with either output strategy.

use std::path::{Path, PathBuf};

use fcrypt_core::config::OutputStrategy;
use fcrypt_core::FcryptError;
use fcrypt_crypto::{
    decrypt_file, encrypt_file, load_recipient_key, load_stream_key, seal_file, SealOutput,
    NONCE_SIZE, SEAL_OVERHEAD,
};
use tempfile::TempDir;

fn write_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test file");
    path
}

#[test]
fn stream_pipeline_roundtrip_from_key_file() {
    let tmp = TempDir::new().unwrap();
    let key_path = write_test_file(tmp.path(), "key", &[0u8; 32]);
    let original = b"the quick brown fox jumps over the lazy dog".repeat(100);
    let src = write_test_file(tmp.path(), "src", &original);
    let enc = tmp.path().join("src.out");
    let dec = tmp.path().join("src.out.out");

    let key = load_stream_key(&key_path).unwrap();
    encrypt_file(&key, &src, &enc).unwrap();

    let encrypted = std::fs::read(&enc).unwrap();
    assert_eq!(encrypted.len(), original.len() + NONCE_SIZE);

    decrypt_file(&key, &enc, &dec).unwrap();
    assert_eq!(std::fs::read(&dec).unwrap(), original);
}

#[test]
fn wrong_key_decrypts_to_garbage() {
    let tmp = TempDir::new().unwrap();
    let good = load_stream_key(&write_test_file(tmp.path(), "good", &[1u8; 32])).unwrap();
    let bad = load_stream_key(&write_test_file(tmp.path(), "bad", &[2u8; 32])).unwrap();
    let src = write_test_file(tmp.path(), "src", b"unauthenticated stream cipher");
    let enc = tmp.path().join("enc");
    let dec = tmp.path().join("dec");

    encrypt_file(&good, &src, &enc).unwrap();
    decrypt_file(&bad, &enc, &dec).unwrap();
    let decrypted = std::fs::read(&dec).unwrap();
    assert_ne!(decrypted, b"unauthenticated stream cipher");
}

#[test]
fn short_key_rejected_before_any_output() {
    let tmp = TempDir::new().unwrap();
    let key_path = write_test_file(tmp.path(), "key", &[0u8; 31]);

    let err = load_stream_key(&key_path).unwrap_err();
    assert!(matches!(err, FcryptError::KeyFile { .. }));
}

#[test]
fn sealed_sizes_for_both_strategies() {
    let tmp = TempDir::new().unwrap();
    let pk_path = write_test_file(tmp.path(), "pk", &[9u8; 32]);
    let recipient = load_recipient_key(&pk_path).unwrap();

    for len in [0usize, 1, 1_000_000] {
        let src = write_test_file(tmp.path(), &format!("plain-{len}"), &vec![0x5Au8; len]);
        for strategy in [OutputStrategy::Mmap, OutputStrategy::Buffered] {
            let out = tmp.path().join(format!("sealed-{len}-{strategy:?}"));
            let output = SealOutput::File {
                path: out.clone(),
                strategy,
                mode: 0o600,
            };

            let written = seal_file(&src, &recipient, &output).unwrap();
            assert_eq!(written, (len + SEAL_OVERHEAD) as u64);
            assert_eq!(
                std::fs::metadata(&out).unwrap().len(),
                (len + SEAL_OVERHEAD) as u64
            );
        }
    }
}

#[test]
fn seal_missing_input_creates_no_output() {
    let tmp = TempDir::new().unwrap();
    let recipient = load_recipient_key(&write_test_file(tmp.path(), "pk", &[9u8; 32])).unwrap();
    let out = tmp.path().join("sealed");
    let output = SealOutput::File {
        path: out.clone(),
        strategy: OutputStrategy::Mmap,
        mode: 0o600,
    };

    let err = seal_file(&tmp.path().join("absent"), &recipient, &output).unwrap_err();
    assert!(matches!(err, FcryptError::InputFile { .. }));
    assert!(!out.exists());
}
