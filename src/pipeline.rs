//! The embed and extract pipelines.
//!
//! Embedding runs `Idle -> Validated -> Framed -> Encrypted -> Embedded -> Done`;
//! extraction runs `Idle -> Extracted -> Decrypted -> Unframed -> Done`. Any
//! failure moves the run to `Failed` and surfaces the error unchanged. Each
//! transition is logged at debug level and the full trace is returned with
//! the result.
//!
//! Runs share nothing: every call derives its own keys, decodes its own copy
//! of the cover and can be cancelled only through its own [`CancelToken`].

use std::fmt;

use crate::cancel::{checkpoint, CancelToken};
use crate::codebook::Codebook;
use crate::config::PipelineConfig;
use crate::crypto::{sealed_len, Cascade};
use crate::error::{ErrorKind, InscryptError, Result};
use crate::payload::{self, SecretPayload};
use crate::stego::{self, CoverMedium, EmbeddedArtifact};

/// States of an embed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedState {
    Idle,
    Validated,
    Framed,
    Encrypted,
    Embedded,
    Done,
    Failed(ErrorKind),
}

/// States of an extract run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractState {
    Idle,
    Extracted,
    Decrypted,
    Unframed,
    Done,
    Failed(ErrorKind),
}

trait Stage: Copy + fmt::Debug {
    const IDLE: Self;
    fn failed(kind: ErrorKind) -> Self;
}

impl Stage for EmbedState {
    const IDLE: Self = Self::Idle;

    fn failed(kind: ErrorKind) -> Self {
        Self::Failed(kind)
    }
}

impl Stage for ExtractState {
    const IDLE: Self = Self::Idle;

    fn failed(kind: ErrorKind) -> Self {
        Self::Failed(kind)
    }
}

/// Records and logs transitions of one run.
struct Transitions<S: Stage> {
    run: &'static str,
    trace: Vec<S>,
}

impl<S: Stage> Transitions<S> {
    fn new(run: &'static str) -> Self {
        Self {
            run,
            trace: vec![S::IDLE],
        }
    }

    fn current(&self) -> S {
        self.trace.last().copied().unwrap_or(S::IDLE)
    }

    fn advance(&mut self, next: S) {
        log::debug!("{}: {:?} -> {:?}", self.run, self.current(), next);
        self.trace.push(next);
    }

    fn fail(&mut self, err: InscryptError) -> InscryptError {
        let next = S::failed(err.kind());
        log::debug!("{}: {:?} -> {:?} ({})", self.run, self.current(), next, err);
        self.trace.push(next);
        err
    }
}

/// Per-request knobs.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Checked between stages and between cipher layers.
    pub cancel: Option<CancelToken>,
    /// Codebook timestamp; the current time when `None`.
    pub timestamp: Option<u64>,
}

/// Result of a successful embed.
#[derive(Debug)]
pub struct EmbedOutcome {
    pub artifact: EmbeddedArtifact,
    pub codebook: Codebook,
    pub trace: Vec<EmbedState>,
}

/// Result of a successful extract.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub payload: SecretPayload,
    pub trace: Vec<ExtractState>,
}

/// Where extraction takes its configuration from.
#[derive(Debug, Clone, Copy)]
pub enum ConfigSource<'a> {
    /// Parameters supplied directly.
    Manual(&'a PipelineConfig),
    /// A serialized codebook, verified before use.
    Codebook(&'a [u8]),
}

impl<'a> From<&'a PipelineConfig> for ConfigSource<'a> {
    fn from(config: &'a PipelineConfig) -> Self {
        Self::Manual(config)
    }
}

/// Encrypts `secret` and hides it in a copy of `cover`.
pub fn embed(
    cover: &CoverMedium,
    secret: &SecretPayload,
    password: &str,
    config: &PipelineConfig,
) -> Result<(EmbeddedArtifact, Codebook)> {
    let outcome = embed_with_options(cover, secret, password, config, &PipelineOptions::default())?;
    Ok((outcome.artifact, outcome.codebook))
}

/// [`embed`] with cancellation, a fixed timestamp and the state trace.
pub fn embed_with_options(
    cover: &CoverMedium,
    secret: &SecretPayload,
    password: &str,
    config: &PipelineConfig,
    options: &PipelineOptions,
) -> Result<EmbedOutcome> {
    let mut run = Transitions::new("embed");
    match run_embed(&mut run, cover, secret, password, config, options) {
        Ok((artifact, codebook)) => Ok(EmbedOutcome {
            artifact,
            codebook,
            trace: run.trace,
        }),
        Err(err) => Err(run.fail(err)),
    }
}

fn run_embed(
    run: &mut Transitions<EmbedState>,
    cover: &CoverMedium,
    secret: &SecretPayload,
    password: &str,
    config: &PipelineConfig,
    options: &PipelineOptions,
) -> Result<(EmbeddedArtifact, Codebook)> {
    let cancel = options.cancel.as_ref();

    checkpoint(cancel)?;
    if password.is_empty() {
        return Err(InscryptError::config("password must not be empty"));
    }
    let codec = stego::resolve(config.stego_technique(), cover.category())?;
    run.advance(EmbedState::Validated);

    checkpoint(cancel)?;
    let framed = payload::frame(secret)?;
    run.advance(EmbedState::Framed);

    checkpoint(cancel)?;
    let sealed = Cascade::new(config, password)?.encrypt(&framed, cancel)?;
    run.advance(EmbedState::Encrypted);

    checkpoint(cancel)?;
    let needed = sealed.len() as u64 * 8;
    let capacity = codec.capacity(cover)?;
    if needed > capacity {
        return Err(InscryptError::CapacityExceeded { needed, capacity });
    }
    let artifact = codec.embed(cover, &sealed)?;
    run.advance(EmbedState::Embedded);

    let codebook = match options.timestamp {
        Some(timestamp) => Codebook::build_at(config, timestamp)?,
        None => Codebook::build(config)?,
    };
    run.advance(EmbedState::Done);

    log::info!(
        "embedded {} byte secret as {} bytes of ciphertext using {}",
        secret.len(),
        sealed.len(),
        config
    );
    Ok((artifact, codebook))
}

/// Recovers the secret hidden in `artifact`.
pub fn extract(
    artifact: &EmbeddedArtifact,
    password: &str,
    source: ConfigSource<'_>,
) -> Result<SecretPayload> {
    Ok(extract_with_options(artifact, password, source, &PipelineOptions::default())?.payload)
}

/// [`extract`] with cancellation and the state trace.
pub fn extract_with_options(
    artifact: &EmbeddedArtifact,
    password: &str,
    source: ConfigSource<'_>,
    options: &PipelineOptions,
) -> Result<ExtractOutcome> {
    let mut run = Transitions::new("extract");
    match run_extract(&mut run, artifact, password, source, options) {
        Ok(payload) => Ok(ExtractOutcome {
            payload,
            trace: run.trace,
        }),
        Err(err) => Err(run.fail(err)),
    }
}

fn run_extract(
    run: &mut Transitions<ExtractState>,
    artifact: &EmbeddedArtifact,
    password: &str,
    source: ConfigSource<'_>,
    options: &PipelineOptions,
) -> Result<SecretPayload> {
    let cancel = options.cancel.as_ref();

    checkpoint(cancel)?;
    let loaded;
    let config = match source {
        ConfigSource::Manual(config) => config,
        ConfigSource::Codebook(raw) => {
            loaded = Codebook::load(raw)?;
            &loaded
        }
    };
    if password.is_empty() {
        return Err(InscryptError::config("password must not be empty"));
    }
    let codec = stego::resolve(config.stego_technique(), artifact.category())?;

    let sealed = codec.extract(artifact)?;
    run.advance(ExtractState::Extracted);

    checkpoint(cancel)?;
    let framed = Cascade::new(config, password)?.decrypt(&sealed, cancel)?;
    run.advance(ExtractState::Decrypted);

    checkpoint(cancel)?;
    let payload = payload::unframe(&framed)?;
    run.advance(ExtractState::Unframed);

    run.advance(ExtractState::Done);
    log::info!("extracted {} byte {:?} secret", payload.len(), payload.kind());
    Ok(payload)
}

/// Bits `secret` will occupy in a cover once framed and encrypted under `config`.
pub fn required_bits(secret: &SecretPayload, config: &PipelineConfig) -> Result<u64> {
    let framed = payload::frame(secret)?;
    Ok(sealed_len(framed.len(), &config.ciphers()) as u64 * 8)
}

/// Payload bits `cover` offers to `config`'s technique.
pub fn capacity(cover: &CoverMedium, config: &PipelineConfig) -> Result<u64> {
    stego::resolve(config.stego_technique(), cover.category())?.capacity(cover)
}
