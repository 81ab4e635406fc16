//! `bsonseal` CLI tool for sealing and opening field payloads.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::{Context, Result};
use bsonseal::cipher::CipherMode;
use bsonseal::config::{EncryptionConfig, EncryptionSettings};
use bsonseal::key::EncryptionKey;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bsonseal")]
#[command(about = "bsonseal field encryption CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a UTF-8 value and print the envelope as hex
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,
        /// Value to encrypt
        plaintext: String,
    },
    /// Decrypt a hex envelope and print the value
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,
        /// Print the decrypted bytes as hex instead of UTF-8 text
        #[arg(long)]
        hex: bool,
        /// Hex-encoded envelope
        envelope: String,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Hex-encoded 32-byte key (defaults to BSONSEAL_KEY)
    #[arg(short, long)]
    key: Option<String>,
    /// Cipher mode (overrides the configured mode)
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Xchacha20poly1305,
    Chacha20poly1305,
}

impl From<Mode> for CipherMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Xchacha20poly1305 => Self::XChaCha20Poly1305,
            Mode::Chacha20poly1305 => Self::ChaCha20Poly1305,
        }
    }
}

impl KeyArgs {
    fn resolve(self) -> Result<EncryptionConfig> {
        let config = match self.key {
            Some(hex) => EncryptionConfig::new(EncryptionKey::from_hex(&hex)?),
            None => EncryptionSettings::from_env()
                .and_then(EncryptionSettings::into_config)
                .context("no --key given and BSONSEAL_KEY is not usable")?,
        };
        Ok(match self.mode {
            Some(mode) => config.with_mode(mode.into()),
            None => config,
        })
    }
}

/// Renders decrypted bytes for printing. Non-UTF-8 output is an error
/// unless hex output was requested.
fn render_plaintext(plaintext: Vec<u8>, as_hex: bool) -> Result<String> {
    if as_hex {
        return Ok(hex::encode(plaintext));
    }
    String::from_utf8(plaintext).context("decrypted value is not UTF-8; rerun with --hex")
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Encrypt { key, plaintext } => {
            let config = key.resolve()?;
            let envelope = config.mode().encrypt(config.key(), plaintext.as_bytes())?;
            tracing::debug!(len = envelope.len(), mode = ?config.mode(), "encrypted value");
            println!("{}", hex::encode(envelope));
        }
        Commands::Decrypt { key, hex: as_hex, envelope } => {
            let config = key.resolve()?;
            let envelope = hex::decode(envelope.trim()).context("envelope is not valid hex")?;
            let plaintext = config.mode().decrypt(config.key(), &envelope)?;
            tracing::debug!(len = plaintext.len(), mode = ?config.mode(), "decrypted value");
            println!("{}", render_plaintext(plaintext, as_hex)?);
        }
    }

    Ok(())
}
