//! Codebooks: portable, checksummed records of a pipeline configuration.
//!
//! A codebook is compact JSON. Identifiers are base64-encoded so the record
//! stays text-safe; this is encoding only and hides nothing. The checksum is
//! a SHA-256 over a canonical rendering of every other field, so any edit to
//! the serialized record is rejected on load.
//!
//! ```json
//! {"version":1,"timestamp":1700000000,
//!  "cipher_layers":[{"position":0,"algorithm":"YWVzLTI1Ni1nY20="}],
//!  "hash_algorithm":"c2hhMjU2","steganography_technique":"aW1hZ2UtbHNi",
//!  "checksum":"…64 hex chars…"}
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::PipelineConfig;
use crate::crypto::{CipherAlgorithm, HashAlgorithm};
use crate::error::{InscryptError, Result};
use crate::stego::StegoTechnique;

/// Codebook format version.
pub const CODEBOOK_VERSION: u32 = 1;

/// One cipher layer as recorded in a codebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodebookLayer {
    pub position: u32,
    pub algorithm: String,
}

/// A serialized pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Codebook {
    pub version: u32,
    pub timestamp: u64,
    pub cipher_layers: Vec<CodebookLayer>,
    pub hash_algorithm: String,
    pub steganography_technique: String,
    pub checksum: String,
}

fn encode_id(id: &str) -> String {
    STANDARD.encode(id.as_bytes())
}

fn decode_id(field: &str, encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| InscryptError::codebook(format!("{} is not valid base64", field)))?;
    String::from_utf8(bytes)
        .map_err(|_| InscryptError::codebook(format!("{} is not valid UTF-8", field)))
}

impl Codebook {
    /// Records `config`, stamped with the current time.
    pub fn build(config: &PipelineConfig) -> Result<Self> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::build_at(config, timestamp)
    }

    /// Records `config` with an explicit UNIX timestamp.
    pub fn build_at(config: &PipelineConfig, timestamp: u64) -> Result<Self> {
        let mut codebook = Self {
            version: CODEBOOK_VERSION,
            timestamp,
            cipher_layers: config
                .cipher_layers()
                .iter()
                .map(|layer| CodebookLayer {
                    position: layer.position as u32,
                    algorithm: encode_id(layer.algorithm.id()),
                })
                .collect(),
            hash_algorithm: encode_id(config.hash_algorithm().id()),
            steganography_technique: encode_id(config.stego_technique().id()),
            checksum: String::new(),
        };
        codebook.checksum = codebook.compute_checksum();
        Ok(codebook)
    }

    /// Parses, verifies and decodes a serialized codebook.
    pub fn load(raw: &[u8]) -> Result<PipelineConfig> {
        Self::parse(raw)?.to_config()
    }

    /// Parses a codebook without verifying it.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| InscryptError::codebook(format!("malformed codebook: {}", e)))
    }

    /// Compact JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| InscryptError::codebook(format!("cannot serialize codebook: {}", e)))
    }

    /// Checks version, checksum and layer positions.
    pub fn verify(&self) -> Result<()> {
        if self.version != CODEBOOK_VERSION {
            return Err(InscryptError::codebook(format!(
                "unsupported codebook version {}",
                self.version
            )));
        }

        if self.checksum != self.compute_checksum() {
            return Err(InscryptError::codebook("checksum mismatch"));
        }

        let mut positions: Vec<u32> = self.cipher_layers.iter().map(|l| l.position).collect();
        positions.sort_unstable();
        if positions.iter().enumerate().any(|(i, p)| *p as usize != i) {
            return Err(InscryptError::codebook(
                "cipher layer positions must run from 0 without gaps",
            ));
        }
        Ok(())
    }

    /// Verifies the codebook and rebuilds the configuration it records.
    pub fn to_config(&self) -> Result<PipelineConfig> {
        self.verify()?;

        let ciphers = self
            .ordered_layers()
            .into_iter()
            .map(|layer| {
                decode_id("cipher algorithm", &layer.algorithm)?
                    .parse::<CipherAlgorithm>()
                    .map_err(as_codebook_error)
            })
            .collect::<Result<Vec<_>>>()?;
        let hash = decode_id("hash algorithm", &self.hash_algorithm)?
            .parse::<HashAlgorithm>()
            .map_err(as_codebook_error)?;
        let technique = decode_id("steganography technique", &self.steganography_technique)?
            .parse::<StegoTechnique>()
            .map_err(as_codebook_error)?;

        PipelineConfig::new(&ciphers, hash, technique).map_err(as_codebook_error)
    }

    fn ordered_layers(&self) -> Vec<&CodebookLayer> {
        let mut layers: Vec<&CodebookLayer> = self.cipher_layers.iter().collect();
        layers.sort_by_key(|layer| layer.position);
        layers
    }

    fn canonical(&self) -> String {
        let mut text = format!(
            "inscrypt-codebook\nversion={}\ntimestamp={}\n",
            self.version, self.timestamp
        );
        for layer in self.ordered_layers() {
            text.push_str(&format!("layer={}:{}\n", layer.position, layer.algorithm));
        }
        text.push_str(&format!("hash={}\n", self.hash_algorithm));
        text.push_str(&format!("stego={}", self.steganography_technique));
        text
    }

    fn compute_checksum(&self) -> String {
        hex::encode(Sha256::digest(self.canonical().as_bytes()))
    }
}

fn as_codebook_error(err: InscryptError) -> InscryptError {
    match err {
        InscryptError::CorruptCodebook(_) => err,
        other => InscryptError::codebook(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> PipelineConfig {
        PipelineConfig::parse(
            "aes-256-gcm,chacha20-poly1305,xchacha20-poly1305",
            "sha3-256",
            "audio-parity",
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let config = sample_config();
        let json = Codebook::build_at(&config, 1_700_000_000).unwrap().to_json().unwrap();

        assert_eq!(Codebook::load(json.as_bytes()).unwrap(), config);
    }

    #[test]
    fn test_layout() {
        let config = PipelineConfig::parse("aes-256-gcm", "sha256", "image-lsb").unwrap();
        let codebook = Codebook::build_at(&config, 42).unwrap();

        assert_eq!(codebook.version, 1);
        assert_eq!(codebook.cipher_layers[0].algorithm, "YWVzLTI1Ni1nY20=");
        assert_eq!(codebook.hash_algorithm, "c2hhMjU2");
        assert_eq!(codebook.steganography_technique, "aW1hZ2UtbHNi");
        assert_eq!(codebook.checksum.len(), 64);
        assert!(codebook
            .checksum
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_every_single_byte_mutation_fails() {
        let json = Codebook::build_at(&sample_config(), 1_700_000_000)
            .unwrap()
            .to_json()
            .unwrap();
        let bytes = json.as_bytes();

        for i in 0..bytes.len() {
            let mut mutated = bytes.to_vec();
            mutated[i] ^= 0x01;
            let err = Codebook::load(&mutated).unwrap_err();
            assert!(
                matches!(err, InscryptError::CorruptCodebook(_)),
                "mutation at byte {} gave {:?}",
                i,
                err
            );
        }
    }

    #[test]
    fn test_layers_are_ordered_by_position() {
        let config = sample_config();
        let mut codebook = Codebook::build_at(&config, 7).unwrap();
        codebook.cipher_layers.reverse();

        let json = codebook.to_json().unwrap();
        assert_eq!(Codebook::load(json.as_bytes()).unwrap(), config);
    }

    #[test]
    fn test_position_gap_rejected() {
        let mut codebook = Codebook::build_at(&sample_config(), 7).unwrap();
        codebook.cipher_layers[2].position = 5;
        codebook.checksum = codebook.compute_checksum();

        let err = codebook.to_config().unwrap_err();
        assert!(matches!(err, InscryptError::CorruptCodebook(_)));
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let mut codebook = Codebook::build_at(&sample_config(), 7).unwrap();
        codebook.cipher_layers[1].position = 0;
        codebook.checksum = codebook.compute_checksum();

        assert!(codebook.to_config().is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut codebook = Codebook::build_at(&sample_config(), 7).unwrap();
        codebook.version = 2;
        codebook.checksum = codebook.compute_checksum();

        let err = codebook.to_config().unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_unknown_identifier_is_corrupt_codebook() {
        let mut codebook = Codebook::build_at(&sample_config(), 7).unwrap();
        codebook.hash_algorithm = encode_id("md5");
        codebook.checksum = codebook.compute_checksum();

        let err = codebook.to_config().unwrap_err();
        assert!(matches!(err, InscryptError::CorruptCodebook(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = Codebook::build_at(&sample_config(), 7).unwrap().to_json().unwrap();
        let extended = json.replacen('{', r#"{"note":"hi","#, 1);

        assert!(Codebook::load(extended.as_bytes()).is_err());
    }

    #[test]
    fn test_not_json() {
        let err = Codebook::load(b"definitely not json").unwrap_err();
        assert!(matches!(err, InscryptError::CorruptCodebook(_)));
    }
}
