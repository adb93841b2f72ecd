//! Steganography for audio files.
//!
//! Supports 16-bit PCM WAV only. Two techniques:
//! - `audio-lsb`: one bit in the least significant bit of every sample
//! - `audio-parity`: one bit per block of 4 samples, carried by the parity of
//!   their LSBs; at most one sample per block changes

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

use super::stream::{embed_stream, extract_stream, payload_capacity, BitCarrier};
use super::{CoverMedium, EmbeddedArtifact, MediaCategory, StegoCodec, StegoTechnique};
use crate::error::{InscryptError, Result};

/// Samples per parity block.
pub const PARITY_BLOCK: usize = 4;

/// How bits map onto samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Lsb,
    Parity,
}

/// Audio steganography handler.
pub struct AudioStego {
    /// Audio specification (sample rate, channels, etc.)
    spec: WavSpec,
    /// Audio samples (16-bit signed integers)
    samples: Vec<i16>,
    mode: SampleMode,
}

impl AudioStego {
    /// Decodes a WAV file from bytes.
    pub fn from_bytes(bytes: &[u8], mode: SampleMode) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| InscryptError::media(format!("audio load error: {}", e)))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(InscryptError::media(format!(
                "only 16-bit PCM WAV is supported, got {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| InscryptError::media(format!("audio load error: {}", e)))?;

        Ok(Self {
            spec,
            samples,
            mode,
        })
    }

    /// Returns the capacity in payload bits.
    pub fn capacity(&self) -> u64 {
        payload_capacity(self.bit_len())
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        let total_samples = self.samples.len() / self.spec.channels.max(1) as usize;
        total_samples as f64 / self.spec.sample_rate as f64
    }

    pub fn hide(&mut self, tag: u8, data: &[u8]) -> Result<()> {
        embed_stream(self, tag, data)
    }

    pub fn extract(&self, tag: u8) -> Result<Vec<u8>> {
        extract_stream(self, tag)
    }

    /// Returns the audio as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let save_error = |e: hound::Error| InscryptError::media(format!("audio save error: {}", e));

        let mut bytes = Vec::new();
        {
            let mut writer =
                WavWriter::new(Cursor::new(&mut bytes), self.spec).map_err(save_error)?;
            for sample in &self.samples {
                writer.write_sample(*sample).map_err(save_error)?;
            }
            writer.finalize().map_err(save_error)?;
        }
        Ok(bytes)
    }
}

impl BitCarrier for AudioStego {
    fn bit_len(&self) -> usize {
        match self.mode {
            SampleMode::Lsb => self.samples.len(),
            SampleMode::Parity => self.samples.len() / PARITY_BLOCK,
        }
    }

    fn get_bit(&self, index: usize) -> u8 {
        match self.mode {
            SampleMode::Lsb => (self.samples[index] & 1) as u8,
            SampleMode::Parity => {
                let block = &self.samples[index * PARITY_BLOCK..(index + 1) * PARITY_BLOCK];
                block.iter().fold(0u8, |parity, s| parity ^ (*s & 1) as u8)
            }
        }
    }

    fn set_bit(&mut self, index: usize, bit: u8) {
        match self.mode {
            SampleMode::Lsb => {
                let sample = &mut self.samples[index];
                *sample = (*sample & !1) | bit as i16;
            }
            SampleMode::Parity => {
                if self.get_bit(index) != bit {
                    self.samples[index * PARITY_BLOCK] ^= 1;
                }
            }
        }
    }
}

/// Codec for `audio-lsb` and `audio-parity`.
pub struct AudioCodec {
    technique: StegoTechnique,
    mode: SampleMode,
}

pub(crate) static AUDIO_LSB: AudioCodec = AudioCodec {
    technique: StegoTechnique::AudioLsb,
    mode: SampleMode::Lsb,
};

pub(crate) static AUDIO_PARITY: AudioCodec = AudioCodec {
    technique: StegoTechnique::AudioParity,
    mode: SampleMode::Parity,
};

impl StegoCodec for AudioCodec {
    fn technique(&self) -> StegoTechnique {
        self.technique
    }

    fn capacity(&self, cover: &CoverMedium) -> Result<u64> {
        Ok(AudioStego::from_bytes(cover.bytes(), self.mode)?.capacity())
    }

    fn embed(&self, cover: &CoverMedium, payload: &[u8]) -> Result<EmbeddedArtifact> {
        let mut audio = AudioStego::from_bytes(cover.bytes(), self.mode)?;
        audio.hide(self.technique.tag(), payload)?;

        log::debug!(
            "{}: embedded {} bytes into {:.1}s of audio",
            self.technique,
            payload.len(),
            audio.duration_secs()
        );
        Ok(EmbeddedArtifact::new(audio.to_wav_bytes()?, MediaCategory::Audio))
    }

    fn extract(&self, artifact: &EmbeddedArtifact) -> Result<Vec<u8>> {
        AudioStego::from_bytes(artifact.bytes(), self.mode)?.extract(self.technique.tag())
    }
}

/// Builds a mono 16-bit sine wave WAV for tests.
#[cfg(test)]
pub(crate) fn create_test_wav(sample_count: usize) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let samples: Vec<i16> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * 16000.0) as i16
        })
        .collect();

    AudioStego {
        spec,
        samples,
        mode: SampleMode::Lsb,
    }
    .to_wav_bytes()
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(sample_count: usize) -> CoverMedium {
        CoverMedium::new(create_test_wav(sample_count), MediaCategory::Audio)
    }

    #[test]
    fn test_capacity() {
        let wav = create_test_wav(10_000);
        let lsb = AudioStego::from_bytes(&wav, SampleMode::Lsb).unwrap();
        assert_eq!(lsb.capacity(), 10_000 - 88);

        let parity = AudioStego::from_bytes(&wav, SampleMode::Parity).unwrap();
        assert_eq!(parity.capacity(), 2_500 - 88);
    }

    #[test]
    fn test_lsb_roundtrip() {
        let cover = cover(10_000);
        let data = b"Hello, audio steganography!";

        let artifact = AUDIO_LSB.embed(&cover, data).unwrap();
        assert_eq!(AUDIO_LSB.extract(&artifact).unwrap(), data);
    }

    #[test]
    fn test_parity_roundtrip() {
        let cover = cover(20_000);
        let data: Vec<u8> = (0..500).map(|i| (i * 7 % 256) as u8).collect();

        let artifact = AUDIO_PARITY.embed(&cover, &data).unwrap();
        assert_eq!(AUDIO_PARITY.extract(&artifact).unwrap(), data);
    }

    #[test]
    fn test_parity_changes_at_most_one_sample_per_block() {
        let wav = create_test_wav(8_000);
        let original = AudioStego::from_bytes(&wav, SampleMode::Parity).unwrap();
        let mut hidden = AudioStego::from_bytes(&wav, SampleMode::Parity).unwrap();
        hidden.hide(0x22, &[0xA5; 200]).unwrap();

        for (a, b) in original
            .samples
            .chunks(PARITY_BLOCK)
            .zip(hidden.samples.chunks(PARITY_BLOCK))
        {
            let changed = a.iter().zip(b).filter(|(x, y)| x != y).count();
            assert!(changed <= 1);
        }
    }

    #[test]
    fn test_audio_too_short() {
        let result = AUDIO_LSB.embed(&cover(100), &[0u8; 1000]);
        assert!(matches!(result, Err(InscryptError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_exact_fit() {
        // 88 bits of framing plus 16 payload bytes.
        let cover = cover(88 + 16 * 8);
        assert_eq!(AUDIO_LSB.capacity(&cover).unwrap(), 128);

        assert!(AUDIO_LSB.embed(&cover, &[7u8; 16]).is_ok());
        assert!(AUDIO_LSB.embed(&cover, &[7u8; 17]).is_err());
    }

    #[test]
    fn test_rejects_float_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for i in 0..100 {
                writer.write_sample(i as f32 / 100.0).unwrap();
            }
            writer.finalize().unwrap();
        }

        let result = AudioStego::from_bytes(&bytes, SampleMode::Lsb);
        assert!(matches!(result, Err(InscryptError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_technique_mismatch_detected() {
        let cover = cover(10_000);
        let artifact = AUDIO_LSB.embed(&cover, b"lsb data").unwrap();

        assert!(AUDIO_PARITY.extract(&artifact).is_err());
    }
}
