//! Steganography for hiding ciphertext in cover media.
//!
//! Supports:
//! - Image LSB steganography, one or two bit planes (any decodable image, PNG output)
//! - Audio LSB and parity steganography (16-bit PCM WAV)
//! - Video LSB steganography in the luma plane (Y4M)
//!
//! Every technique is an implementation of [`StegoCodec`]; [`resolve`] picks
//! the implementation for a technique and checks it against the cover's
//! category.

pub mod audio;
pub mod image;
pub mod media;
pub mod stream;
pub mod video;

use std::fmt;
use std::str::FromStr;

use crate::config::normalize_identifier;
use crate::error::{InscryptError, Result};

pub use self::audio::{AudioCodec, AudioStego, SampleMode};
pub use self::image::{ImageLsbCodec, ImageStego};
pub use self::media::{CoverMedium, EmbeddedArtifact, MediaCategory};
pub use self::stream::{payload_capacity, OVERHEAD_BITS};
pub use self::video::{VideoLsbCodec, Y4mVideo};

/// A technique's capacity, embed and extract operations.
pub trait StegoCodec: Send + Sync {
    fn technique(&self) -> StegoTechnique;

    /// Payload bits the cover can hold.
    fn capacity(&self, cover: &CoverMedium) -> Result<u64>;

    /// Returns a modified copy of `cover` carrying `payload`.
    fn embed(&self, cover: &CoverMedium, payload: &[u8]) -> Result<EmbeddedArtifact>;

    /// Recovers the payload written by [`StegoCodec::embed`].
    fn extract(&self, artifact: &EmbeddedArtifact) -> Result<Vec<u8>>;
}

/// Supported steganographic techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StegoTechnique {
    ImageLsb,
    ImageLsb2,
    AudioLsb,
    AudioParity,
    VideoLsb,
}

impl StegoTechnique {
    pub const ALL: [StegoTechnique; 5] = [
        Self::ImageLsb,
        Self::ImageLsb2,
        Self::AudioLsb,
        Self::AudioParity,
        Self::VideoLsb,
    ];

    /// Canonical identifier, as stored in codebooks.
    pub fn id(&self) -> &'static str {
        match self {
            Self::ImageLsb => "image-lsb",
            Self::ImageLsb2 => "image-lsb2",
            Self::AudioLsb => "audio-lsb",
            Self::AudioParity => "audio-parity",
            Self::VideoLsb => "video-lsb",
        }
    }

    pub fn category(&self) -> MediaCategory {
        match self {
            Self::ImageLsb | Self::ImageLsb2 => MediaCategory::Image,
            Self::AudioLsb | Self::AudioParity => MediaCategory::Audio,
            Self::VideoLsb => MediaCategory::Video,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageLsb => "Image LSB",
            Self::ImageLsb2 => "Image LSB (2 bit planes)",
            Self::AudioLsb => "Audio LSB",
            Self::AudioParity => "Audio parity coding",
            Self::VideoLsb => "Video luma LSB",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ImageLsb => "Least significant bit of each R, G and B channel; PNG output",
            Self::ImageLsb2 => {
                "Two lowest bits of each R, G and B channel; double capacity, PNG output"
            }
            Self::AudioLsb => "Least significant bit of each 16-bit PCM sample; WAV output",
            Self::AudioParity => "One bit per block of 4 samples via LSB parity; WAV output",
            Self::VideoLsb => "Least significant bit of each luma byte in every Y4M frame",
        }
    }

    /// Tag written into the embedded stream header.
    pub fn tag(&self) -> u8 {
        match self {
            Self::ImageLsb => 0x11,
            Self::ImageLsb2 => 0x12,
            Self::AudioLsb => 0x21,
            Self::AudioParity => 0x22,
            Self::VideoLsb => 0x31,
        }
    }

    /// The codec implementing this technique.
    pub fn codec(&self) -> &'static dyn StegoCodec {
        match self {
            Self::ImageLsb => &image::IMAGE_LSB,
            Self::ImageLsb2 => &image::IMAGE_LSB2,
            Self::AudioLsb => &audio::AUDIO_LSB,
            Self::AudioParity => &audio::AUDIO_PARITY,
            Self::VideoLsb => &video::VIDEO_LSB,
        }
    }

    /// Techniques available for `category`.
    pub fn for_category(category: MediaCategory) -> impl Iterator<Item = StegoTechnique> {
        Self::ALL.into_iter().filter(move |t| t.category() == category)
    }

    /// Parses either a full id (`audio-parity`) or a short name (`parity`)
    /// qualified by `category`.
    pub fn parse_for(category: MediaCategory, name: &str) -> Result<Self> {
        let name = normalize_identifier(name);
        let technique = match name.parse::<Self>() {
            Ok(technique) => technique,
            Err(_) => format!("{}-{}", category, name).parse::<Self>()?,
        };
        if technique.category() != category {
            return Err(InscryptError::media(format!(
                "{} cannot be used with {} covers",
                technique, category
            )));
        }
        Ok(technique)
    }
}

impl fmt::Display for StegoTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StegoTechnique {
    type Err = InscryptError;

    fn from_str(s: &str) -> Result<Self> {
        let id = normalize_identifier(s);
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| {
                InscryptError::config(format!("unsupported steganography technique '{}'", id))
            })
    }
}

/// Returns the codec for `technique`, provided it handles `category`.
pub fn resolve(
    technique: StegoTechnique,
    category: MediaCategory,
) -> Result<&'static dyn StegoCodec> {
    if technique.category() != category {
        return Err(InscryptError::media(format!(
            "technique {} works on {} covers, not {}",
            technique,
            technique.category(),
            category
        )));
    }
    Ok(technique.codec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codecs_report_their_technique() {
        for technique in StegoTechnique::ALL {
            assert_eq!(technique.codec().technique(), technique);
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<u8> = StegoTechnique::ALL.iter().map(|t| t.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), StegoTechnique::ALL.len());
    }

    #[test]
    fn test_resolve_rejects_category_mismatch() {
        let err = resolve(StegoTechnique::AudioLsb, MediaCategory::Image)
            .err()
            .unwrap();
        assert!(matches!(err, InscryptError::UnsupportedMediaType(_)));

        assert!(resolve(StegoTechnique::VideoLsb, MediaCategory::Video).is_ok());
    }

    #[test]
    fn test_for_category() {
        let audio: Vec<_> = StegoTechnique::for_category(MediaCategory::Audio).collect();
        assert_eq!(audio, vec![StegoTechnique::AudioLsb, StegoTechnique::AudioParity]);
    }

    #[test]
    fn test_parse_for() {
        assert_eq!(
            StegoTechnique::parse_for(MediaCategory::Audio, "PARITY").unwrap(),
            StegoTechnique::AudioParity
        );
        assert_eq!(
            StegoTechnique::parse_for(MediaCategory::Image, "image-lsb2").unwrap(),
            StegoTechnique::ImageLsb2
        );
        assert!(StegoTechnique::parse_for(MediaCategory::Image, "audio-lsb").is_err());
        assert!(StegoTechnique::parse_for(MediaCategory::Video, "dct").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        let err = "image-dct".parse::<StegoTechnique>().unwrap_err();
        assert!(matches!(err, InscryptError::InvalidConfiguration(_)));
    }
}
