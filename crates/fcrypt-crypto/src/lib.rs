//! fcrypt-crypto: whole-file encryption for the fcrypt tools
//!
//! Symmetric pipeline (`fcrypt-stream`):
//! ```text
//! key file → StreamKey ─┐
//!                       ├→ XChaCha20 keystream → [ciphertext][24-byte nonce]
//! OsRng    → Nonce ─────┘
//! ```
//!
//! Sealed-box pipeline (`fcrypt-seal`):
//! ```text
//! key file → RecipientKey ─┐
//!                          ├→ seal_into(mapped output) → [ephemeral pk][ciphertext][tag]
//! input    → mmap (ro) ────┘
//! ```

pub mod bench;
pub mod framing;
pub mod keys;
pub mod mapping;
pub mod nonce;
pub mod seal;
pub mod stream;

pub use bench::{run_benchmark, BenchReport};
pub use framing::{
    decrypt_bytes, decrypt_file, encrypt_bytes, encrypt_file, write_framed, write_plain,
};
pub use keys::{load_recipient_key, load_stream_key, RecipientKey, StreamKey};
pub use mapping::{BufferedOutput, MappedOutput, OutputRegion, PlaintextSource};
pub use nonce::{split_framed, Nonce};
pub use seal::{seal, seal_file, seal_into, SealOutput};
pub use stream::{apply_keystream, apply_keystream_in_place};

use fcrypt_core::{FcryptError, FcryptResult};
use rand::RngCore;

/// Size of a symmetric stream key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of an X25519 public key
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Bytes a sealed box adds to any plaintext: ephemeral public key + tag
pub const SEAL_OVERHEAD: usize = PUBLIC_KEY_SIZE + TAG_SIZE;

/// Check that the OS random source is usable before any key or nonce is drawn.
pub fn init() -> FcryptResult<()> {
    let mut probe = [0u8; 16];
    rand::rngs::OsRng
        .try_fill_bytes(&mut probe)
        .map_err(|e| FcryptError::CryptoInit(format!("OS random source: {e}")))
}
