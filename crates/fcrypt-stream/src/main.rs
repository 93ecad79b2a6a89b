//! fcrypt-stream: encrypt or decrypt a file under a pre-shared key
//!
//! Usage:
//!   fcrypt-stream -e -k <keyfile> -i <inputfile>
//!   fcrypt-stream -d -k <keyfile> -i <inputfile>
//!
//! The key file holds exactly 32 raw bytes. Output goes to `<inputfile>.out`
//! (suffix configurable). Encrypted files are `[ciphertext][24-byte nonce]`.
//! Every failure exits with status 1.

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use fcrypt_core::config::{load_config, DEFAULT_CONFIG_PATH};
use fcrypt_core::logging::{init_from_config, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "fcrypt-stream",
    version,
    about = "Encrypt/decrypt a file with XChaCha20 under a pre-shared key"
)]
struct Cli {
    #[command(flatten)]
    direction: Direction,

    /// Key file (exactly 32 raw bytes)
    #[arg(short = 'k', long = "key", value_name = "KEYFILE")]
    key: PathBuf,

    /// Input file; output is written next to it with the configured suffix
    #[arg(short = 'i', long = "input", value_name = "INPUTFILE")]
    input: PathBuf,

    /// Path to fcrypt.toml configuration file
    #[arg(long, short = 'c', env = "FCRYPT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FCRYPT_LOG")]
    log: Option<String>,

    /// Log format (json, text)
    #[arg(long, env = "FCRYPT_LOG_FORMAT")]
    log_format: Option<LogFormatArg>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Direction {
    /// Encrypt the input file
    #[arg(short = 'e', long)]
    encrypt: bool,

    /// Decrypt the input file
    #[arg(short = 'd', long)]
    decrypt: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Usage errors exit 1 like every other failure of this tool.
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        Err(e) => e.exit(),
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fcrypt-stream: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config).context("loading configuration")?;
    let log_format = cli.log_format.map(Into::into);
    init_from_config(&config.log, cli.log.as_deref(), log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %cli.input.display(),
        encrypt = cli.direction.encrypt,
        "fcrypt-stream starting"
    );

    let key = fcrypt_crypto::load_stream_key(&cli.key).context("loading key")?;
    let output = output_path(&cli.input, &config.stream.output_suffix);

    if cli.direction.encrypt {
        fcrypt_crypto::encrypt_file(&key, &cli.input, &output)
            .with_context(|| format!("encrypting {}", cli.input.display()))?;
    } else {
        fcrypt_crypto::decrypt_file(&key, &cli.input, &output)
            .with_context(|| format!("decrypting {}", cli.input.display()))?;
    }
    Ok(())
}

/// `<input><suffix>`, e.g. `notes.txt` → `notes.txt.out`
fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
