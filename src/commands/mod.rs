//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod codebook;
mod embed;
mod extract;
mod supported;

pub use capacity::CapacityCommand;
pub use codebook::CodebookCommand;
pub use embed::EmbedCommand;
pub use extract::ExtractCommand;
pub use supported::SupportedCommand;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use inscrypt::{CoverMedium, MediaCategory, PipelineConfig, Settings, StegoTechnique};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and the loaded settings.
    fn execute(&self, settings: &Settings) -> Result<()>;
}

/// Reads a file, refusing anything larger than `limit` bytes.
pub(crate) fn read_limited(path: &Path, limit: u64, what: &str) -> Result<Vec<u8>> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to read {} {}", what, path.display()))?
        .len();
    if size > limit {
        anyhow::bail!(
            "{} {} is {} bytes, the limit is {} bytes",
            what,
            path.display(),
            size,
            limit
        );
    }
    fs::read(path).with_context(|| format!("Failed to read {} {}", what, path.display()))
}

/// Wraps `bytes` as a cover, using `mime` when given and magic bytes otherwise.
pub(crate) fn to_cover(bytes: Vec<u8>, mime: Option<&str>) -> Result<CoverMedium> {
    let cover = match mime {
        Some(mime) => CoverMedium::from_mime(bytes, mime)?,
        None => CoverMedium::detect(bytes)?,
    };
    Ok(cover)
}

/// Pipeline parameters given on the command line, with settings as fallback.
#[derive(clap::Args, Debug, Default)]
pub struct PipelineArgs {
    /// Comma-separated cipher stack, applied left to right
    /// (e.g. "aes-256-gcm,chacha20-poly1305"). Defaults from settings.
    #[arg(long)]
    pub ciphers: Option<String>,

    /// Hash used for key derivation (sha256, sha3-512, blake2b, shake256, ...)
    #[arg(long)]
    pub hash: Option<String>,

    /// Steganography technique: full id ("audio-parity") or short name ("parity")
    #[arg(long)]
    pub technique: Option<String>,
}

impl PipelineArgs {
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_none() && self.hash.is_none() && self.technique.is_none()
    }

    /// Resolves the configuration for a cover of `category`.
    pub fn resolve(&self, settings: &Settings, category: MediaCategory) -> Result<PipelineConfig> {
        let ciphers = self
            .ciphers
            .clone()
            .unwrap_or_else(|| settings.defaults.ciphers.join(","));
        let hash = self.hash.as_deref().unwrap_or(&settings.defaults.hash);
        let technique = match &self.technique {
            Some(name) => StegoTechnique::parse_for(category, name)?,
            None => settings.technique_for(category)?,
        };

        let config = PipelineConfig::parse(&ciphers, hash, technique.id())?;
        Ok(config)
    }
}
