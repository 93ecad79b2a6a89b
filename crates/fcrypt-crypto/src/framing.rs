//! Framed stream-cipher files
//!
//! Encrypted file format (binary, unversioned):
//! ```text
//! [N bytes: ciphertext][24 bytes: nonce]
//! ```
//! The ciphertext is exactly as long as the plaintext.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use fcrypt_core::{FcryptError, FcryptResult};

use crate::keys::StreamKey;
use crate::nonce::{split_framed, Nonce};
use crate::stream::{apply_keystream, apply_keystream_in_place};

/// Encrypt `plaintext` under a fresh nonce. Returns the ciphertext and the
/// nonce that must be stored after it.
pub fn encrypt_bytes(key: &StreamKey, plaintext: &[u8]) -> (Vec<u8>, Nonce) {
    let nonce = Nonce::generate();
    let ciphertext = apply_keystream(key, &nonce, plaintext);
    (ciphertext, nonce)
}

/// Decrypt a full `[ciphertext][nonce]` buffer.
pub fn decrypt_bytes(key: &StreamKey, framed: &[u8]) -> FcryptResult<Vec<u8>> {
    let (ciphertext, nonce) = split_framed(framed)?;
    let mut plaintext = ciphertext.to_vec();
    apply_keystream_in_place(key, &nonce, &mut plaintext);
    Ok(plaintext)
}

/// Encrypt `input` into `output` as `[ciphertext][nonce]`.
///
/// Returns the number of bytes written.
pub fn encrypt_file(key: &StreamKey, input: &Path, output: &Path) -> FcryptResult<u64> {
    let plaintext = read_input(input)?;
    let (ciphertext, nonce) = encrypt_bytes(key, &plaintext);
    write_framed(output, &ciphertext, &nonce)?;

    let written = (ciphertext.len() + nonce.as_bytes().len()) as u64;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bytes = written,
        "encrypted"
    );
    Ok(written)
}

/// Decrypt a `[ciphertext][nonce]` file into `output`.
///
/// Nothing is written when the input is shorter than the nonce frame.
pub fn decrypt_file(key: &StreamKey, input: &Path, output: &Path) -> FcryptResult<u64> {
    let framed = read_input(input)?;
    let plaintext = decrypt_bytes(key, &framed)?;
    write_plain(output, &plaintext)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bytes = plaintext.len(),
        "decrypted"
    );
    Ok(plaintext.len() as u64)
}

/// Write ciphertext, then append the nonce in a second open/write/close.
///
/// A failure in either phase aborts and may leave a partial file behind.
pub fn write_framed(path: &Path, ciphertext: &[u8], nonce: &Nonce) -> FcryptResult<()> {
    write_plain(path, ciphertext)?;

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| write_error(path, source))?;
    file.write_all(nonce.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| write_error(path, source))?;

    tracing::debug!(path = %path.display(), "nonce frame appended");
    Ok(())
}

/// Create/truncate `path` and write `bytes` in full.
pub fn write_plain(path: &Path, bytes: &[u8]) -> FcryptResult<()> {
    let mut file = File::create(path).map_err(|source| write_error(path, source))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|source| write_error(path, source))
}

fn read_input(path: &Path) -> FcryptResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| FcryptError::InputFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_error(path: &Path, source: std::io::Error) -> FcryptError {
    FcryptError::Write {
        path: path.to_path_buf(),
        source,
    }
}
