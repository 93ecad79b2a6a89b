//! XChaCha20 keystream application
//!
//! Unauthenticated and self-inverse: the same call encrypts and decrypts.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{Key, XChaCha20, XNonce};

use crate::keys::StreamKey;
use crate::nonce::Nonce;

/// XOR the `(key, nonce)` keystream into `input`, returning a new buffer of
/// the same length.
pub fn apply_keystream(key: &StreamKey, nonce: &Nonce, input: &[u8]) -> Vec<u8> {
    let mut output = input.to_vec();
    apply_keystream_in_place(key, nonce, &mut output);
    output
}

/// In-place form of [`apply_keystream`].
pub fn apply_keystream_in_place(key: &StreamKey, nonce: &Nonce, buf: &mut [u8]) {
    let mut cipher = XChaCha20::new(
        Key::from_slice(key.as_bytes()),
        XNonce::from_slice(nonce.as_bytes()),
    );
    cipher.apply_keystream(buf);
}
