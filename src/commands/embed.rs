//! Embed command - encrypt a secret and hide it in a cover file.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use inscrypt::{embed, required_bits, SecretPayload, Settings};

use super::{read_limited, to_cover, CommandExecutor, PipelineArgs};

/// Encrypt a message or file and hide it in an image, audio or video cover.
///
/// Writes the modified cover (PNG, WAV or Y4M) and a codebook JSON file that
/// records the exact configuration used. Keep the codebook to extract later.
#[derive(Args, Debug)]
pub struct EmbedCommand {
    /// Cover file (image, 16-bit PCM WAV, or Y4M video)
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File to hide (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Password for the cipher stack
    #[arg(short, long)]
    pub password: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Cover MIME type (e.g. "audio/wav"); detected from content if omitted
    #[arg(long)]
    pub mime: Option<String>,

    /// Output path for the modified cover [default: <cover>.inscrypt.<ext>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output path for the codebook [default: <output>.codebook.json]
    #[arg(long)]
    pub codebook: Option<PathBuf>,
}

impl EmbedCommand {
    fn read_secret(&self, settings: &Settings) -> Result<SecretPayload> {
        let limit = settings.limits.max_secret_bytes;

        if let Some(path) = &self.file {
            let data = read_limited(path, limit, "secret file")?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "secret.bin".to_string());
            return Ok(SecretPayload::file(name, data));
        }

        let message = match &self.message {
            Some(m) => m.clone(),
            None => {
                eprintln!("Reading message from stdin (Ctrl+D to finish):");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read message from stdin")?;
                buffer.trim_end_matches(['\r', '\n']).to_string()
            }
        };
        if message.len() as u64 > limit {
            anyhow::bail!("Message is {} bytes, the limit is {} bytes", message.len(), limit);
        }
        Ok(SecretPayload::text(&message))
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => with_suffix(&self.cover, &format!("inscrypt.{}", extension)),
        }
    }
}

/// `dir/name.png` + `suffix` -> `dir/name.suffix`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!("{}.{}", stem, suffix))
}

impl CommandExecutor for EmbedCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let bytes = read_limited(&self.cover, settings.limits.max_cover_bytes, "cover")?;
        let cover = to_cover(bytes, self.mime.as_deref())
            .with_context(|| format!("Cannot use {} as a cover", self.cover.display()))?;
        let config = self.pipeline.resolve(settings, cover.category())?;
        let secret = self.read_secret(settings)?;

        log::info!(
            "{} cover {} ({} bytes), pipeline {}",
            cover.category(),
            self.cover.display(),
            cover.len(),
            config
        );
        log::debug!("secret needs {} bits", required_bits(&secret, &config)?);

        let (artifact, codebook) = embed(&cover, &secret, &self.password, &config)?;

        let output = self.output_path(artifact.extension());
        fs::write(&output, artifact.bytes())
            .with_context(|| format!("Failed to write {}", output.display()))?;

        let codebook_path = match &self.codebook {
            Some(path) => path.clone(),
            None => with_suffix(&output, "codebook.json"),
        };
        fs::write(&codebook_path, codebook.to_json()?)
            .with_context(|| format!("Failed to write codebook {}", codebook_path.display()))?;

        println!("Embedded {} bytes into {}", secret.len(), output.display());
        println!("Codebook written to {}", codebook_path.display());
        Ok(())
    }
}
