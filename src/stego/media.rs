//! Cover media and embedded artifacts.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::normalize_identifier;
use crate::error::{InscryptError, Result};

/// Broad kind of cover file. Techniques are defined per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Audio,
    Video,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 3] = [Self::Image, Self::Audio, Self::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Guesses the category from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            return Some(Self::Audio);
        }
        if bytes.starts_with(b"YUV4MPEG2") {
            return Some(Self::Video);
        }
        image::guess_format(bytes).ok().map(|_| Self::Image)
    }

    /// Maps a MIME type such as `image/png` to its category.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        let top = mime.split('/').next().unwrap_or_default();
        top.parse()
            .map_err(|_| InscryptError::media(format!("no technique handles MIME type '{}'", mime)))
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = InscryptError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_identifier(s).as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(InscryptError::media(format!("unknown media category '{}'", other))),
        }
    }
}

/// A cover file as supplied by the caller. Never modified.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverMedium {
    bytes: Vec<u8>,
    category: MediaCategory,
}

impl CoverMedium {
    pub fn new(bytes: Vec<u8>, category: MediaCategory) -> Self {
        Self { bytes, category }
    }

    /// Builds a cover, taking the category from the file's magic bytes.
    pub fn detect(bytes: Vec<u8>) -> Result<Self> {
        let category = MediaCategory::sniff(&bytes)
            .ok_or_else(|| InscryptError::media("cover format not recognised"))?;
        Ok(Self::new(bytes, category))
    }

    /// Builds a cover whose category comes from a MIME type.
    pub fn from_mime(bytes: Vec<u8>, mime: &str) -> Result<Self> {
        Ok(Self::new(bytes, MediaCategory::from_mime(mime)?))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for CoverMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverMedium")
            .field("category", &self.category)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A modified copy of a cover carrying embedded data.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedArtifact {
    bytes: Vec<u8>,
    category: MediaCategory,
}

impl EmbeddedArtifact {
    pub fn new(bytes: Vec<u8>, category: MediaCategory) -> Self {
        Self { bytes, category }
    }

    /// Wraps a file that is expected to carry embedded data.
    pub fn detect(bytes: Vec<u8>) -> Result<Self> {
        let cover = CoverMedium::detect(bytes)?;
        Ok(Self::new(cover.bytes, cover.category))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    /// File extension of the container the artifact is written in.
    pub fn extension(&self) -> &'static str {
        match self.category {
            MediaCategory::Image => "png",
            MediaCategory::Audio => "wav",
            MediaCategory::Video => "y4m",
        }
    }
}

impl fmt::Debug for EmbeddedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedArtifact")
            .field("category", &self.category)
            .field("len", &self.bytes.len())
            .finish()
    }
}
