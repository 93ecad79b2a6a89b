//! Anonymous-sender sealed boxes
//!
//! Sealed box format (binary):
//! ```text
//! [32 bytes: ephemeral X25519 public key][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! The sender generates a one-off X25519 keypair, computes the shared secret
//! with the recipient key, and expands it with HKDF-SHA256 (info binds both
//! public keys) into an XChaCha20-Poly1305 key and nonce. The ephemeral secret
//! is discarded, so only the recipient's private key can open the box.

use std::path::{Path, PathBuf};

use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use fcrypt_core::config::OutputStrategy;
use fcrypt_core::{FcryptError, FcryptResult};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroizing;

use crate::keys::RecipientKey;
use crate::mapping::{BufferedOutput, MappedOutput, OutputRegion, PlaintextSource};
use crate::{KEY_SIZE, NONCE_SIZE, PUBLIC_KEY_SIZE, SEAL_OVERHEAD};

/// HKDF info prefix for sealed-box key derivation
const SEAL_INFO: &[u8] = b"fcrypt-sealed-box-v1";

/// Where [`seal_file`] puts the sealed box.
#[derive(Debug, Clone)]
pub enum SealOutput {
    File {
        path: PathBuf,
        strategy: OutputStrategy,
        mode: u32,
    },
    Stdout,
}

/// Exact sealed-box length for a plaintext of `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    plaintext_len + SEAL_OVERHEAD
}

/// Seal `plaintext` for `recipient` directly into `out`.
///
/// `out` must be exactly `plaintext.len() + SEAL_OVERHEAD` bytes.
pub fn seal_into(
    out: &mut [u8],
    plaintext: &[u8],
    recipient: &RecipientKey,
) -> FcryptResult<()> {
    let expected = sealed_len(plaintext.len());
    if out.len() != expected {
        return Err(FcryptError::Seal(format!(
            "output buffer is {} bytes, expected {expected}",
            out.len()
        )));
    }

    let recipient_pk = recipient.to_public_key();
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_pk = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient_pk);
    if !shared.was_contributory() {
        return Err(FcryptError::Seal(
            "recipient key is a low-order point".into(),
        ));
    }

    let okm = derive_box_key(
        shared.as_bytes(),
        ephemeral_pk.as_bytes(),
        recipient.as_bytes(),
    )?;
    let (key, nonce) = okm.split_at(KEY_SIZE);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));

    let (epk_slot, rest) = out.split_at_mut(PUBLIC_KEY_SIZE);
    let (body, tag_slot) = rest.split_at_mut(plaintext.len());
    epk_slot.copy_from_slice(ephemeral_pk.as_bytes());
    body.copy_from_slice(plaintext);

    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(nonce), &[], body)
        .map_err(|e| FcryptError::Seal(format!("encryption failed: {e}")))?;
    tag_slot.copy_from_slice(&tag);
    Ok(())
}

/// Seal into a freshly allocated buffer.
pub fn seal(plaintext: &[u8], recipient: &RecipientKey) -> FcryptResult<Vec<u8>> {
    let mut out = vec![0u8; sealed_len(plaintext.len())];
    seal_into(&mut out, plaintext, recipient)?;
    Ok(out)
}

/// Seal the file at `input` for `recipient`, writing the box to `out`.
///
/// The recipient key and the output path are checked before any output file
/// is created or truncated. Returns the sealed length in bytes.
pub fn seal_file(input: &Path, recipient: &RecipientKey, out: &SealOutput) -> FcryptResult<u64> {
    if recipient.is_low_order() {
        return Err(FcryptError::Seal(
            "recipient key is a low-order point".into(),
        ));
    }

    let source = PlaintextSource::open(input)?;
    if let SealOutput::File { path, .. } = out {
        if source.is_same_file(path)? {
            return Err(FcryptError::map(
                path,
                "output would overwrite the input file",
            ));
        }
    }

    let plaintext = source.as_bytes();
    let len = sealed_len(plaintext.len());

    match out {
        SealOutput::File {
            path,
            strategy: OutputStrategy::Mmap,
            mode,
        } => {
            let region = MappedOutput::create(path, len, *mode)?;
            seal_region(region, plaintext, recipient)?;
        }
        SealOutput::File {
            path,
            strategy: OutputStrategy::Buffered,
            mode,
        } => {
            let region = BufferedOutput::create(path, len, *mode)?;
            seal_region(region, plaintext, recipient)?;
        }
        SealOutput::Stdout => {
            let region = BufferedOutput::new(std::io::stdout().lock(), len, "<stdout>");
            seal_region(region, plaintext, recipient)?;
        }
    }

    tracing::info!(
        input = %input.display(),
        output = ?out,
        bytes = len,
        "sealed"
    );
    Ok(len as u64)
}

fn seal_region<R: OutputRegion>(
    mut region: R,
    plaintext: &[u8],
    recipient: &RecipientKey,
) -> FcryptResult<()> {
    seal_into(region.region(), plaintext, recipient)?;
    region.commit()
}

/// HKDF-SHA256: shared secret → XChaCha20-Poly1305 key || nonce.
fn derive_box_key(
    shared: &[u8; 32],
    ephemeral_pk: &[u8; PUBLIC_KEY_SIZE],
    recipient_pk: &[u8; PUBLIC_KEY_SIZE],
) -> FcryptResult<Zeroizing<[u8; KEY_SIZE + NONCE_SIZE]>> {
    let hkdf = Hkdf::<Sha256>::new(None, shared);

    let mut info = Vec::with_capacity(SEAL_INFO.len() + 2 * PUBLIC_KEY_SIZE);
    info.extend_from_slice(SEAL_INFO);
    info.extend_from_slice(ephemeral_pk);
    info.extend_from_slice(recipient_pk);

    let mut okm = Zeroizing::new([0u8; KEY_SIZE + NONCE_SIZE]);
    hkdf.expand(&info, &mut okm[..])
        .map_err(|e| FcryptError::Seal(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}
