//! Nonce generation and extraction from the trailing frame of a ciphertext file

use fcrypt_core::{FcryptError, FcryptResult};
use rand::RngCore;

use crate::NONCE_SIZE;

/// A 192-bit XChaCha20 nonce. Must never repeat under the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Draw a fresh random nonce. Call once per encryption.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// Split `[ciphertext][nonce]` into its two frames.
///
/// The nonce is the last [`NONCE_SIZE`] bytes; everything before it is
/// ciphertext (possibly empty).
pub fn split_framed(input: &[u8]) -> FcryptResult<(&[u8], Nonce)> {
    let Some(split) = input.len().checked_sub(NONCE_SIZE) else {
        return Err(FcryptError::TruncatedInput {
            len: input.len(),
            min: NONCE_SIZE,
        });
    };
    let (ciphertext, nonce_bytes) = input.split_at(split);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);
    Ok((ciphertext, Nonce(nonce)))
}
