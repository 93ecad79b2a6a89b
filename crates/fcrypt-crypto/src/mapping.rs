//! Memory-mapped plaintext input and pre-sized ciphertext output regions
//!
//! Sealed output is built in place: the output file is extended to its final
//! length, mapped shared read-write, zero-filled, and the sealing operation
//! writes straight into the mapping. [`BufferedOutput`] is the heap-backed
//! alternative with the same contract (exact length, zeroed before sealing).

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fcrypt_core::{FcryptError, FcryptResult};
use memmap2::{Mmap, MmapMut, MmapOptions};

/// Read-only view of a whole input file.
pub struct PlaintextSource {
    path: PathBuf,
    file: File,
    // Zero-length files cannot be mapped.
    map: Option<Mmap>,
}

impl PlaintextSource {
    pub fn open(path: &Path) -> FcryptResult<Self> {
        let input_error = |source| FcryptError::InputFile {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(input_error)?;
        let len = file.metadata().map_err(input_error)?.len();
        if len == 0 {
            return Ok(Self {
                path: path.to_path_buf(),
                file,
                map: None,
            });
        }

        // SAFETY: the mapping is only read. `seal_file` refuses to write its
        // output over this file; truncation by another process is not guarded.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| FcryptError::map(path, e))?;
        tracing::debug!(path = %path.display(), len, "mapped input");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            map: Some(map),
        })
    }

    /// Whether `other` names the file this source was opened from, including
    /// through a hard link or symlink. A path that does not exist is not.
    pub fn is_same_file(&self, other: &Path) -> FcryptResult<bool> {
        match same_file(&self.file, &self.path, other) {
            Ok(same) => Ok(same),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                let reason = format!("cannot compare with input: {e}");
                Err(FcryptError::map(other, reason))
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A zero-initialized byte region of fixed length that is persisted on commit.
pub trait OutputRegion {
    fn region(&mut self) -> &mut [u8];

    fn commit(self) -> FcryptResult<()>
    where
        Self: Sized;
}

/// Output file pre-sized to `len` bytes and mapped shared read-write.
pub struct MappedOutput {
    path: PathBuf,
    map: MmapMut,
}

impl MappedOutput {
    /// Create (or truncate) `path`, extend it to exactly `len` bytes and map it.
    pub fn create(path: &Path, len: usize, mode: u32) -> FcryptResult<Self> {
        if len == 0 {
            return Err(FcryptError::map(path, "cannot map an empty output region"));
        }

        let mut file = create_output_file(path, mode)?;

        // Materialize the final size: seek to the last byte and write it.
        file.seek(SeekFrom::Start(len as u64 - 1))
            .and_then(|_| file.write_all(&[0]))
            .and_then(|()| file.seek(SeekFrom::Start(0)))
            .map_err(|source| FcryptError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        // SAFETY: the file was just created/truncated by us and is sized to
        // `len`; concurrent modification by other processes is not guarded.
        let mut map = unsafe { MmapOptions::new().len(len).map_mut(&file) }
            .map_err(|e| FcryptError::map(path, e))?;
        if map.len() != len {
            return Err(FcryptError::map(
                path,
                format!("mapped {} bytes, expected {len}", map.len()),
            ));
        }
        map.fill(0);

        tracing::debug!(path = %path.display(), len, "mapped output");
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }
}

impl OutputRegion for MappedOutput {
    fn region(&mut self) -> &mut [u8] {
        &mut self.map
    }

    fn commit(self) -> FcryptResult<()> {
        self.map
            .flush()
            .map_err(|e| FcryptError::map(&self.path, format!("flush failed: {e}")))
    }
}

/// Heap-backed output region written to `writer` on commit.
pub struct BufferedOutput<W: Write> {
    label: PathBuf,
    buf: Vec<u8>,
    writer: W,
}

impl<W: Write> BufferedOutput<W> {
    /// `label` names the destination in error messages.
    pub fn new(writer: W, len: usize, label: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            buf: vec![0u8; len],
            writer,
        }
    }
}

impl BufferedOutput<File> {
    pub fn create(path: &Path, len: usize, mode: u32) -> FcryptResult<Self> {
        let file = create_output_file(path, mode)?;
        Ok(Self::new(file, len, path))
    }
}

impl<W: Write> OutputRegion for BufferedOutput<W> {
    fn region(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn commit(mut self) -> FcryptResult<()> {
        self.writer
            .write_all(&self.buf)
            .and_then(|()| self.writer.flush())
            .map_err(|source| FcryptError::Write {
                path: self.label,
                source,
            })
    }
}

#[cfg(unix)]
fn same_file(ours: &File, _our_path: &Path, other: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (ours.metadata()?, std::fs::metadata(other)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(_ours: &File, our_path: &Path, other: &Path) -> std::io::Result<bool> {
    let ours = std::fs::canonicalize(our_path)?;
    Ok(ours == std::fs::canonicalize(other)?)
}

fn create_output_file(path: &Path, mode: u32) -> FcryptResult<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|source| FcryptError::Write {
        path: path.to_path_buf(),
        source,
    })
}
