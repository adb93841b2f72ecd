//! # Inscrypt - Encrypt, then hide
//!
//! Inscrypt encrypts a secret (a message or a file) under a password with an
//! ordered stack of ciphers, then hides the ciphertext inside an image, audio
//! or video cover.
//!
//! ## Overview
//!
//! - The secret is **framed** (kind, optional file name, length) and
//!   DEFLATE-compressed when that helps
//! - Each of 1-5 **cipher layers** gets its own key and IV, derived from the
//!   password with the chosen hash
//! - Layers apply in order on the way in and in reverse on the way out; every layer is an AEAD
//! - The ciphertext is **embedded** with a technique matching the cover's media category
//! - A **codebook** records the exact configuration, checksummed, so extraction can replay it
//!
//! ## Example Usage
//!
//! ```no_run
//! use inscrypt::{embed, extract, ConfigSource, CoverMedium, PipelineConfig, SecretPayload};
//!
//! let cover = CoverMedium::detect(std::fs::read("holiday.png").unwrap()).unwrap();
//! let config =
//!     PipelineConfig::parse("aes-256-gcm,xchacha20-poly1305", "sha256", "image-lsb").unwrap();
//!
//! let (artifact, codebook) =
//!     embed(&cover, &SecretPayload::text("hello"), "correct-horse", &config).unwrap();
//! let json = codebook.to_json().unwrap();
//!
//! let source = ConfigSource::Codebook(json.as_bytes());
//! let secret = extract(&artifact, "correct-horse", source).unwrap();
//! assert_eq!(secret.as_text().unwrap(), "hello");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: key derivation, cipher layers and the cascade
//! - [`payload`]: secret payloads and framing
//! - [`stego`]: cover media and steganographic techniques
//! - [`codebook`]: portable configuration records
//! - [`pipeline`]: the embed and extract state machines
//! - [`settings`]: user defaults from `~/.inscrypt/config.toml`

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cancel;
pub mod capabilities;
pub mod codebook;
pub mod config;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod settings;
pub mod stego;

// Re-export commonly used types at the crate root
pub use cancel::CancelToken;
pub use capabilities::{capabilities, Capabilities, TechniqueInfo};
pub use codebook::{Codebook, CodebookLayer, CODEBOOK_VERSION};
pub use config::{CipherLayerSpec, PipelineConfig, MAX_CIPHER_LAYERS};
pub use crypto::{CipherAlgorithm, HashAlgorithm};
pub use error::{ErrorKind, ErrorReport, InscryptError, Result};
pub use payload::{ContentKind, SecretPayload};
pub use pipeline::{
    capacity, embed, embed_with_options, extract, extract_with_options, required_bits,
    ConfigSource, EmbedOutcome, EmbedState, ExtractOutcome, ExtractState, PipelineOptions,
};
pub use settings::{Settings, SettingsError};
pub use stego::{CoverMedium, EmbeddedArtifact, MediaCategory, StegoCodec, StegoTechnique};
