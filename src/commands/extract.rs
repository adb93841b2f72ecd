//! Extract command - recover a secret hidden by `embed`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use inscrypt::{extract, ConfigSource, ContentKind, EmbeddedArtifact, Settings};

use super::{read_limited, CommandExecutor, PipelineArgs};

/// Recover a secret from a file produced by `embed`.
///
/// The configuration comes from a codebook (--codebook) or from --ciphers,
/// --hash and --technique given by hand. Text secrets are printed unless
/// --output is set; file secrets are written to --output or to their original
/// name in the current directory.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// File carrying the hidden data
    #[arg(short, long)]
    pub input: PathBuf,

    /// Password used when embedding
    #[arg(short, long)]
    pub password: String,

    /// Codebook written by `embed`
    #[arg(long, conflicts_with_all = ["ciphers", "hash", "technique"])]
    pub codebook: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Input MIME type (e.g. "image/png"); detected from content if omitted
    #[arg(long)]
    pub mime: Option<String>,

    /// Where to write the recovered secret
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Keeps only the final component of a recovered file name.
fn safe_file_name(name: &str) -> Option<PathBuf> {
    Path::new(name)
        .file_name()
        .filter(|n| !n.is_empty())
        .map(PathBuf::from)
}

impl CommandExecutor for ExtractCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let bytes = read_limited(&self.input, settings.limits.max_cover_bytes, "input")?;
        let artifact = match &self.mime {
            Some(mime) => {
                let cover = inscrypt::CoverMedium::from_mime(bytes, mime)?;
                EmbeddedArtifact::new(cover.bytes().to_vec(), cover.category())
            }
            None => EmbeddedArtifact::detect(bytes)
                .with_context(|| format!("Cannot read {}", self.input.display()))?,
        };

        let secret = match &self.codebook {
            Some(path) => {
                let raw = fs::read(path)
                    .with_context(|| format!("Failed to read codebook {}", path.display()))?;
                extract(&artifact, &self.password, ConfigSource::Codebook(&raw))?
            }
            None => {
                if self.pipeline.is_empty() {
                    log::warn!("no codebook given, using the configured defaults");
                }
                let config = self.pipeline.resolve(settings, artifact.category())?;
                extract(&artifact, &self.password, ConfigSource::Manual(&config))?
            }
        };

        let target = match (&self.output, secret.kind()) {
            (Some(path), _) => Some(path.clone()),
            (None, ContentKind::Text) => None,
            (None, ContentKind::File) => Some(
                secret
                    .name()
                    .and_then(safe_file_name)
                    .unwrap_or_else(|| PathBuf::from("recovered.bin")),
            ),
        };

        match target {
            Some(path) => {
                if self.output.is_none() && path.exists() {
                    anyhow::bail!(
                        "{} already exists; pass --output to choose where to write",
                        path.display()
                    );
                }
                fs::write(&path, secret.as_bytes())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Recovered {} bytes to {}", secret.len(), path.display());
            }
            None => println!("{}", secret.as_text()?),
        }
        Ok(())
    }
}
