//! The list of supported algorithms and techniques.
//!
//! Built once per process and shared read-only.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::MAX_CIPHER_LAYERS;
use crate::crypto::{CipherAlgorithm, HashAlgorithm};
use crate::stego::{MediaCategory, StegoTechnique};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechniqueInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub cipher_algorithms: Vec<&'static str>,
    pub hash_algorithms: Vec<&'static str>,
    pub max_cipher_layers: usize,
    pub steganography_techniques: BTreeMap<MediaCategory, Vec<TechniqueInfo>>,
}

impl Capabilities {
    fn collect() -> Self {
        let steganography_techniques = MediaCategory::ALL
            .into_iter()
            .map(|category| {
                let techniques = StegoTechnique::for_category(category)
                    .map(|t| TechniqueInfo {
                        id: t.id(),
                        name: t.name(),
                        description: t.description(),
                    })
                    .collect();
                (category, techniques)
            })
            .collect();

        Self {
            cipher_algorithms: CipherAlgorithm::ALL.iter().map(|c| c.id()).collect(),
            hash_algorithms: HashAlgorithm::ALL.iter().map(|h| h.id()).collect(),
            max_cipher_layers: MAX_CIPHER_LAYERS,
            steganography_techniques,
        }
    }

    /// Technique ids for one category.
    pub fn techniques(&self, category: MediaCategory) -> Vec<&'static str> {
        self.steganography_techniques
            .get(&category)
            .map(|list| list.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }
}

/// The process-wide capability listing.
pub fn capabilities() -> &'static Capabilities {
    static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();
    CAPABILITIES.get_or_init(Capabilities::collect)
}
