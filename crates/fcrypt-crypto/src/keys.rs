//! Key files: fixed-size raw keys read verbatim from disk

use std::io::Read;
use std::path::Path;

use fcrypt_core::{FcryptError, FcryptResult};
use rand::rngs::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::{Zeroize, Zeroizing};

use crate::{KEY_SIZE, PUBLIC_KEY_SIZE};

/// A 256-bit symmetric stream key. Zeroized on drop.
#[derive(Clone)]
pub struct StreamKey {
    bytes: [u8; KEY_SIZE],
}

impl StreamKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for StreamKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A recipient's X25519 public key for sealed boxes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecipientKey {
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl RecipientKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }

    pub(crate) fn to_public_key(self) -> PublicKey {
        PublicKey::from(self.bytes)
    }

    /// Small-order points give an all-zero shared secret with every sender key.
    pub fn is_low_order(&self) -> bool {
        let scratch = EphemeralSecret::random_from_rng(OsRng);
        !scratch
            .diffie_hellman(&self.to_public_key())
            .was_contributory()
    }
}

impl From<PublicKey> for RecipientKey {
    fn from(pk: PublicKey) -> Self {
        Self::from_bytes(pk.to_bytes())
    }
}

impl std::fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.bytes[..4].iter().map(|b| format!("{b:02x}")).collect();
        write!(f, "RecipientKey({prefix}…)")
    }
}

/// Load the symmetric key; the file must be exactly [`KEY_SIZE`] bytes.
pub fn load_stream_key(path: &Path) -> FcryptResult<StreamKey> {
    let bytes = load_key_bytes::<KEY_SIZE>(path)?;
    tracing::debug!(path = %path.display(), "loaded stream key");
    Ok(StreamKey::from_bytes(bytes))
}

/// Load a recipient public key; the file must be exactly [`PUBLIC_KEY_SIZE`] bytes.
pub fn load_recipient_key(path: &Path) -> FcryptResult<RecipientKey> {
    let bytes = load_key_bytes::<PUBLIC_KEY_SIZE>(path)?;
    let key = RecipientKey::from_bytes(bytes);
    if key.is_low_order() {
        return Err(FcryptError::key_file(
            path,
            "public key is a low-order point",
        ));
    }
    tracing::debug!(path = %path.display(), key = ?key, "loaded recipient key");
    Ok(key)
}

/// Read a raw key of exactly `N` bytes.
///
/// The size is checked against metadata before reading, then again against
/// what was actually read in case the file changed in between.
fn load_key_bytes<const N: usize>(path: &Path) -> FcryptResult<[u8; N]> {
    let file = std::fs::File::open(path)
        .map_err(|e| FcryptError::key_file(path, format!("cannot open: {e}")))?;

    let size = file
        .metadata()
        .map_err(|e| FcryptError::key_file(path, format!("cannot stat: {e}")))?
        .len();
    if size != N as u64 {
        return Err(FcryptError::key_file(
            path,
            format!("expected {N} bytes, found {size}"),
        ));
    }

    let key = read_exact_key::<_, N>(file)
        .map_err(|reason| FcryptError::key_file(path, reason))?;
    Ok(*key)
}

/// Read exactly `N` bytes into a fixed buffer and require EOF right after.
///
/// The buffer never grows, so no unzeroized copy of the key is left behind.
fn read_exact_key<R: Read, const N: usize>(mut reader: R) -> Result<Zeroizing<[u8; N]>, String> {
    let mut key = Zeroizing::new([0u8; N]);
    if let Err(e) = reader.read_exact(&mut key[..]) {
        return Err(match e.kind() {
            std::io::ErrorKind::UnexpectedEof => format!("expected {N} bytes, file is shorter"),
            _ => format!("cannot read: {e}"),
        });
    }

    let mut extra = [0u8; 1];
    match reader.read(&mut extra) {
        Ok(0) => Ok(key),
        Ok(_) => Err(format!("expected {N} bytes, file is longer")),
        Err(e) => Err(format!("cannot read: {e}")),
    }
}
