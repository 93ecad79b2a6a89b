use std::path::PathBuf;

use thiserror::Error;

pub type FcryptResult<T> = Result<T, FcryptError>;

#[derive(Debug, Error)]
pub enum FcryptError {
    /// Invalid arguments from a library caller. Command-line argument errors
    /// are reported by clap before any `FcryptError` exists.
    #[error("usage error: {0}")]
    Usage(String),

    #[error("key file {}: {reason}", path.display())]
    KeyFile { path: PathBuf, reason: String },

    #[error("input file {}", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input too short: {len} bytes (need at least {min} for the nonce frame)")]
    TruncatedInput { len: usize, min: usize },

    #[error("seal operation failed: {0}")]
    Seal(String),

    #[error("mapping {}: {reason}", path.display())]
    Map { path: PathBuf, reason: String },

    #[error("crypto subsystem unavailable: {0}")]
    CryptoInit(String),

    #[error("config error: {0}")]
    Config(String),
}

impl FcryptError {
    /// Process exit code reported by the tools for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FcryptError::CryptoInit(_) => 11,
            FcryptError::Usage(_) => 2,
            _ => 1,
        }
    }

    pub fn key_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FcryptError::KeyFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn map(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        FcryptError::Map {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Exit code for an error surfaced through an `anyhow` context chain.
///
/// Errors that did not originate as an [`FcryptError`] map to 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<FcryptError>()
        .map(FcryptError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes() {
        assert_eq!(FcryptError::CryptoInit("no rng".into()).exit_code(), 11);
        assert_eq!(FcryptError::Usage("bad".into()).exit_code(), 2);
        assert_eq!(FcryptError::Seal("boom".into()).exit_code(), 1);
        assert_eq!(
            FcryptError::TruncatedInput { len: 3, min: 24 }.exit_code(),
            1
        );
    }

    #[test]
    fn test_exit_code_survives_context() {
        let result: Result<(), FcryptError> = Err(FcryptError::CryptoInit("no rng".into()));
        let err = result.context("initializing").unwrap_err();
        assert_eq!(exit_code_for(&err), 11);
    }

    #[test]
    fn test_foreign_error_maps_to_one() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_key_file_message_names_path() {
        let err = FcryptError::key_file("/tmp/k.bin", "expected 32 bytes, found 7");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/k.bin"));
        assert!(msg.contains("expected 32 bytes"));
    }
}
