//! Cover fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};
use image::{ImageOutputFormat, Rgb, RgbImage};

use inscrypt::{CoverMedium, MediaCategory, PipelineConfig};

/// A gradient PNG; every pixel contributes three carrier bits per bit plane.
pub fn png_cover(width: u32, height: u32) -> CoverMedium {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    CoverMedium::new(bytes, MediaCategory::Image)
}

/// Raw WAV bytes: mono 16-bit PCM, one carrier bit per sample for `audio-lsb`.
pub fn wav_bytes(samples: usize) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..samples {
            writer.write_sample(((i * 37) % 2000) as i16 - 1000).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn wav_cover(samples: usize) -> CoverMedium {
    CoverMedium::new(wav_bytes(samples), MediaCategory::Audio)
}

/// A 4:2:0 Y4M clip; every luma byte carries one bit.
pub fn y4m_cover(width: usize, height: usize, frames: usize) -> CoverMedium {
    let mut bytes =
        format!("YUV4MPEG2 W{} H{} F25:1 Ip A1:1 C420jpeg\n", width, height).into_bytes();
    let chroma = 2 * ((width + 1) / 2) * ((height + 1) / 2);
    for n in 0..frames {
        bytes.extend_from_slice(b"FRAME\n");
        bytes.extend((0..width * height).map(|i| ((i * 5 + n) % 256) as u8));
        bytes.extend(std::iter::repeat(128u8).take(chroma));
    }
    CoverMedium::new(bytes, MediaCategory::Video)
}

pub fn config(ciphers: &str, hash: &str, technique: &str) -> PipelineConfig {
    PipelineConfig::parse(ciphers, hash, technique).unwrap()
}
