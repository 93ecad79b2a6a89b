use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FcryptError, FcryptResult};

/// Top-level tool configuration (loaded from fcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FcryptConfig {
    pub log: LogConfig,
    pub stream: StreamConfig,
    pub seal: SealConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level / filter directive (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

/// Symmetric tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Suffix appended to the input path to name the output file
    pub output_suffix: String,
}

/// Sealed-box tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SealConfig {
    /// How the ciphertext file is materialized
    pub output: OutputStrategy,
    /// Unix permission bits for newly created ciphertext files
    pub output_mode: u32,
}

/// Output construction for sealed-box ciphertext files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStrategy {
    /// Pre-size the file and seal directly into a shared mapping
    #[default]
    Mmap,
    /// Seal into a heap buffer, then write it out
    Buffered,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            output_suffix: ".out".into(),
        }
    }
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            output: OutputStrategy::Mmap,
            output_mode: 0o600,
        }
    }
}

/// Default config location, before `~` expansion
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/fcrypt/fcrypt.toml";

/// Load the configuration file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> FcryptResult<FcryptConfig> {
    let path = &expand_tilde(path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(FcryptConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| FcryptError::Config(format!("reading {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| FcryptError::Config(format!("parsing {}: {e}", path.display())))
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[log]
level = "debug"
format = "json"

[stream]
output_suffix = ".enc"

[seal]
output = "buffered"
output_mode = 0o400
"#;
        let config: FcryptConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        assert_eq!(config.stream.output_suffix, ".enc");
        assert_eq!(config.seal.output, OutputStrategy::Buffered);
        assert_eq!(config.seal.output_mode, 0o400);
    }

    #[test]
    fn test_parse_defaults() {
        let config: FcryptConfig = toml::from_str("").unwrap();

        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, "text");
        assert_eq!(config.stream.output_suffix, ".out");
        assert_eq!(config.seal.output, OutputStrategy::Mmap);
        assert_eq!(config.seal.output_mode, 0o600);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[seal]
output = "buffered"
"#;
        let config: FcryptConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.seal.output, OutputStrategy::Buffered);
        // Defaults
        assert_eq!(config.seal.output_mode, 0o600);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result: Result<FcryptConfig, _> = toml::from_str("[seal]\noutput = \"tape\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.stream.output_suffix, ".out");
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcrypt.toml");
        std::fs::write(&path, "[log\nlevel = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, FcryptError::Config(_)));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(
            expand_tilde(Path::new("/etc/fcrypt.toml")),
            PathBuf::from("/etc/fcrypt.toml")
        );
        assert!(!expand_tilde(Path::new(DEFAULT_CONFIG_PATH))
            .to_string_lossy()
            .starts_with('~'));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = FcryptConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: FcryptConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.log.level, parsed.log.level);
        assert_eq!(config.seal.output, parsed.seal.output);
        assert_eq!(config.stream.output_suffix, parsed.stream.output_suffix);
    }
}
