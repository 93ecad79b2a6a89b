//! fcrypt-core: pieces shared by the `fcrypt-stream` and `fcrypt-seal` tools
//!
//! - `error`: the error taxonomy and its process exit codes
//! - `config`: `fcrypt.toml` schema and loader
//! - `logging`: tracing subscriber setup (always on stderr)

pub mod config;
pub mod error;
pub mod logging;

pub use error::{FcryptError, FcryptResult};
