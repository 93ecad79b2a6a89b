//! fcrypt-seal: encrypt a file for a recipient's X25519 public key
//!
//! Usage:
//!   fcrypt-seal [options] FILENAME PUBLICKEY
//!
//! Options:
//!   -o, --out FNAME   write the sealed box to FNAME ("-" for stdout)
//!   --bench COUNT     seal COUNT times in memory and print the time per call
//!
//! Exit codes: 0 success, 1 file/key/seal error, 2 bad arguments,
//! 11 crypto subsystem unavailable.

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use fcrypt_core::config::{load_config, FcryptConfig, DEFAULT_CONFIG_PATH};
use fcrypt_core::error::exit_code_for;
use fcrypt_core::logging::{init_from_config, LogFormat};
use fcrypt_crypto::{PlaintextSource, RecipientKey, SealOutput};

#[derive(Parser, Debug)]
#[command(
    name = "fcrypt-seal",
    version,
    about = "Seal a file for a recipient public key (anonymous sender)"
)]
struct Cli {
    /// File to encrypt
    #[arg(value_name = "FILENAME")]
    filename: PathBuf,

    /// Recipient public key file (exactly 32 raw bytes)
    #[arg(value_name = "PUBLICKEY")]
    public_key: PathBuf,

    #[command(flatten)]
    target: Target,

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
struct Target {
    /// Output ciphertext to FNAME ("-" streams to stdout)
    #[arg(short = 'o', long = "out", value_name = "FNAME")]
    out: Option<PathBuf>,

    /// Run the encryption COUNT times and print only benchmarks to stdout
    #[arg(long, value_name = "COUNT")]
    bench: Option<NonZeroU32>,
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
    // clap exits 2 on bad arguments and 0 for --help
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fcrypt-seal: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    fcrypt_crypto::init().context("initializing crypto")?;

    let config = load_config(&cli.config).context("loading configuration")?;
    let log_format = cli.log_format.map(Into::into);
    init_from_config(&config.log, cli.log.as_deref(), log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        input = %cli.filename.display(),
        "fcrypt-seal starting"
    );

    let recipient =
        fcrypt_crypto::load_recipient_key(&cli.public_key).context("loading public key")?;

    // clap's `Target` group guarantees exactly one of the two is set
    match cli.target.bench {
        Some(count) => cmd_bench(&cli.filename, &recipient, count),
        None => {
            let out = cli.target.out.context("--out or --bench is required")?;
            cmd_seal(&config, &cli.filename, &recipient, &out)
        }
    }
}

fn cmd_seal(
    config: &FcryptConfig,
    input: &Path,
    recipient: &RecipientKey,
    out: &Path,
) -> Result<()> {
    let output = seal_output(config, out);
    fcrypt_crypto::seal_file(input, recipient, &output)
        .with_context(|| format!("sealing {}", input.display()))?;
    Ok(())
}

fn cmd_bench(input: &Path, recipient: &RecipientKey, count: NonZeroU32) -> Result<()> {
    let source = PlaintextSource::open(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let report = fcrypt_crypto::run_benchmark(source.as_bytes(), recipient, count)
        .context("benchmarking seal")?;

    info!(
        iterations = report.iterations,
        total_ms = report.total.as_millis() as u64,
        "benchmark complete"
    );
    println!("Time per cycle: {:.9}", report.per_call.as_secs_f64());
    Ok(())
}

/// `-` selects stdout; anything else is a file built with the configured strategy.
fn seal_output(config: &FcryptConfig, out: &Path) -> SealOutput {
    if out == Path::new("-") {
        SealOutput::Stdout
    } else {
        SealOutput::File {
            path: out.to_path_buf(),
            strategy: config.seal.output,
            mode: config.seal.output_mode,
        }
    }
}
