//! User settings for Inscrypt.
//!
//! Defaults for the cipher stack, hash, per-media techniques, size limits and
//! log level, stored in `~/.inscrypt/config.toml`. Set `INSCRYPT_CONFIG` to
//! use another file.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::crypto::{CipherAlgorithm, HashAlgorithm};
use crate::error::InscryptError;
use crate::stego::{MediaCategory, StegoTechnique};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "INSCRYPT_CONFIG";

const MIB: u64 = 1024 * 1024;

/// Errors that can occur when loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    Invalid(#[from] InscryptError),
}

/// Pipeline parameters used when the command line leaves them out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Defaults {
    /// Cipher stack, outermost last.
    pub ciphers: Vec<String>,
    pub hash: String,
    pub image_technique: String,
    pub audio_technique: String,
    pub video_technique: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            ciphers: vec![CipherAlgorithm::Aes256Gcm.id().to_string()],
            hash: HashAlgorithm::Sha256.id().to_string(),
            image_technique: StegoTechnique::ImageLsb.id().to_string(),
            audio_technique: StegoTechnique::AudioLsb.id().to_string(),
            video_technique: StegoTechnique::VideoLsb.id().to_string(),
        }
    }
}

/// Size limits applied by front ends before anything reaches the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
    pub max_cover_bytes: u64,
    pub max_secret_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_cover_bytes: 100 * MIB,
            max_secret_bytes: 16 * MIB,
        }
    }
}

/// The settings file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub defaults: Defaults,
    pub limits: Limits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            defaults: Defaults::default(),
            limits: Limits::default(),
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    ///
    /// Returns the defaults if the file doesn't exist.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from `path`, falling back to defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the settings file.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Checks that every identifier in the file is supported.
    pub fn validate(&self) -> Result<(), InscryptError> {
        for category in MediaCategory::ALL {
            self.pipeline_for(category)?;
        }
        Ok(())
    }

    /// Default technique for `category`.
    pub fn technique_for(&self, category: MediaCategory) -> Result<StegoTechnique, InscryptError> {
        let name = match category {
            MediaCategory::Image => &self.defaults.image_technique,
            MediaCategory::Audio => &self.defaults.audio_technique,
            MediaCategory::Video => &self.defaults.video_technique,
        };
        StegoTechnique::parse_for(category, name)
    }

    /// Default pipeline configuration for covers of `category`.
    pub fn pipeline_for(&self, category: MediaCategory) -> Result<PipelineConfig, InscryptError> {
        let ciphers = self
            .defaults
            .ciphers
            .iter()
            .map(|id| id.parse::<CipherAlgorithm>())
            .collect::<Result<Vec<_>, _>>()?;
        let hash = self.defaults.hash.parse::<HashAlgorithm>()?;

        PipelineConfig::new(&ciphers, hash, self.technique_for(category)?)
    }
}

/// Get the Inscrypt config directory (`~/.inscrypt`).
pub fn get_config_dir() -> Result<PathBuf, SettingsError> {
    dirs::home_dir()
        .map(|home| home.join(".inscrypt"))
        .ok_or(SettingsError::NoConfigDir)
}
