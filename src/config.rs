//! Pipeline configuration: cipher stack, hash and steganographic technique.

use std::fmt;

use crate::crypto::{CipherAlgorithm, HashAlgorithm};
use crate::error::{InscryptError, Result};
use crate::stego::StegoTechnique;

/// Maximum number of cipher layers in one cascade.
pub const MAX_CIPHER_LAYERS: usize = 5;

/// Lowercases an identifier and maps `_` to `-`.
pub(crate) fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

/// One layer of the cascade and its position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherLayerSpec {
    pub algorithm: CipherAlgorithm,
    pub position: usize,
}

/// A complete, validated pipeline configuration.
///
/// Layer order is significant and never rearranged: encryption applies the
/// layers as listed, decryption in reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    layers: Vec<CipherLayerSpec>,
    hash: HashAlgorithm,
    technique: StegoTechnique,
}

impl PipelineConfig {
    /// Builds a configuration from an ordered cipher list.
    pub fn new(
        ciphers: &[CipherAlgorithm],
        hash: HashAlgorithm,
        technique: StegoTechnique,
    ) -> Result<Self> {
        if ciphers.is_empty() || ciphers.len() > MAX_CIPHER_LAYERS {
            return Err(InscryptError::config(format!(
                "between 1 and {} cipher layers are required, got {}",
                MAX_CIPHER_LAYERS,
                ciphers.len()
            )));
        }

        let layers = ciphers
            .iter()
            .enumerate()
            .map(|(position, algorithm)| CipherLayerSpec {
                algorithm: *algorithm,
                position,
            })
            .collect();

        Ok(Self {
            layers,
            hash,
            technique,
        })
    }

    /// Parses identifiers: `ciphers` is a comma-separated list in cascade order.
    pub fn parse(ciphers: &str, hash: &str, technique: &str) -> Result<Self> {
        let ciphers = ciphers
            .split(',')
            .map(|id| {
                if id.trim().is_empty() {
                    Err(InscryptError::config("empty entry in cipher list"))
                } else {
                    id.parse::<CipherAlgorithm>()
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(&ciphers, hash.parse()?, technique.parse()?)
    }

    pub fn cipher_layers(&self) -> &[CipherLayerSpec] {
        &self.layers
    }

    /// Cipher algorithms in cascade order.
    pub fn ciphers(&self) -> Vec<CipherAlgorithm> {
        self.layers.iter().map(|layer| layer.algorithm).collect()
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn stego_technique(&self) -> StegoTechnique {
        self.technique
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ciphers: Vec<&str> = self.layers.iter().map(|l| l.algorithm.id()).collect();
        write!(
            f,
            "{} | {} | {}",
            ciphers.join(" -> "),
            self.hash.id(),
            self.technique.id()
        )
    }
}
