//! LSB steganography for uncompressed video (YUV4MPEG2 / `.y4m`).
//!
//! Data goes into the least significant bit of each luma (Y) byte, frame
//! after frame. Chroma planes and all headers are copied through unchanged.
//! Each frame owns a fixed range of stream bits, so frames are written in
//! parallel without affecting the output.

use rayon::prelude::*;

use super::stream::{embed_stream, extract_stream, payload_capacity, BitCarrier, BitStream};
use super::{CoverMedium, EmbeddedArtifact, MediaCategory, StegoCodec, StegoTechnique};
use crate::error::{InscryptError, Result};

const STREAM_MAGIC: &[u8] = b"YUV4MPEG2";
const FRAME_MAGIC: &[u8] = b"FRAME";

#[derive(Debug)]
struct Frame {
    /// `FRAME` line including parameters and the trailing newline.
    header: Vec<u8>,
    data: Vec<u8>,
}

/// A parsed Y4M stream.
#[derive(Debug)]
pub struct Y4mVideo {
    header: Vec<u8>,
    width: usize,
    height: usize,
    frames: Vec<Frame>,
}

/// Bytes per frame (luma plus chroma) for a Y4M colourspace tag.
///
/// Dimensions come straight from the header, so every step is checked.
fn frame_len(colorspace: &str, width: usize, height: usize) -> Result<usize> {
    let half_w = width / 2 + width % 2;
    let half_h = height / 2 + height % 2;
    let luma = width.checked_mul(height);
    let chroma = match colorspace {
        "420" | "420jpeg" | "420paldv" | "420mpeg2" => {
            half_w.checked_mul(half_h).and_then(|n| n.checked_mul(2))
        }
        "422" => half_w.checked_mul(height).and_then(|n| n.checked_mul(2)),
        "444" => luma.and_then(|n| n.checked_mul(2)),
        "444alpha" => luma.and_then(|n| n.checked_mul(3)),
        "mono" => Some(0),
        other => {
            return Err(InscryptError::media(format!(
                "unsupported Y4M colourspace '{}' (8-bit only)",
                other
            )))
        }
    };
    luma.zip(chroma)
        .and_then(|(luma, chroma)| luma.checked_add(chroma))
        .ok_or_else(|| InscryptError::media("Y4M frame size overflows"))
}

fn read_line(bytes: &[u8], start: usize) -> Result<(&[u8], usize)> {
    let end = bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|i| start + i)
        .ok_or_else(|| InscryptError::media("truncated Y4M header"))?;
    Ok((&bytes[start..end], end + 1))
}

impl Y4mVideo {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if !bytes.starts_with(STREAM_MAGIC) {
            return Err(InscryptError::media("not a YUV4MPEG2 stream"));
        }

        let (line, mut cursor) = read_line(bytes, 0)?;
        let line = std::str::from_utf8(line)
            .map_err(|_| InscryptError::media("Y4M header is not ASCII"))?;

        let mut width = None;
        let mut height = None;
        let mut colorspace = "420jpeg";
        for token in line.split(' ').skip(1) {
            let mut chars = token.chars();
            let key = chars.next();
            let value = chars.as_str();
            match key {
                Some('W') => width = value.parse::<usize>().ok(),
                Some('H') => height = value.parse::<usize>().ok(),
                Some('C') => colorspace = value,
                _ => {}
            }
        }

        let (width, height) = match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(InscryptError::media("Y4M header lacks frame dimensions")),
        };
        let frame_len = frame_len(colorspace, width, height)?;

        let header = bytes[..cursor].to_vec();
        let mut frames = Vec::new();
        while cursor < bytes.len() {
            if !bytes[cursor..].starts_with(FRAME_MAGIC) {
                return Err(InscryptError::media("malformed Y4M frame header"));
            }
            let (_, data_start) = read_line(bytes, cursor)?;
            let data_end = match data_start.checked_add(frame_len) {
                Some(end) if end <= bytes.len() => end,
                _ => return Err(InscryptError::media("truncated Y4M frame")),
            };

            frames.push(Frame {
                header: bytes[cursor..data_start].to_vec(),
                data: bytes[data_start..data_end].to_vec(),
            });
            cursor = data_end;
        }

        Ok(Self {
            header,
            width,
            height,
            frames,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn luma_len(&self) -> usize {
        self.width * self.height
    }

    /// Returns the capacity in payload bits.
    pub fn capacity(&self) -> u64 {
        payload_capacity(self.bit_len())
    }

    pub fn hide(&mut self, tag: u8, data: &[u8]) -> Result<()> {
        embed_stream(self, tag, data)
    }

    pub fn extract(&self, tag: u8) -> Result<Vec<u8>> {
        extract_stream(self, tag)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self.frames.iter().map(|f| f.header.len() + f.data.len()).sum();
        let mut out = Vec::with_capacity(self.header.len() + body);
        out.extend_from_slice(&self.header);
        for frame in &self.frames {
            out.extend_from_slice(&frame.header);
            out.extend_from_slice(&frame.data);
        }
        out
    }
}

impl BitCarrier for Y4mVideo {
    fn bit_len(&self) -> usize {
        self.frames.len() * self.luma_len()
    }

    fn get_bit(&self, index: usize) -> u8 {
        let luma = self.luma_len();
        self.frames[index / luma].data[index % luma] & 1
    }

    fn set_bit(&mut self, index: usize, bit: u8) {
        let luma = self.luma_len();
        let byte = &mut self.frames[index / luma].data[index % luma];
        *byte = (*byte & 0xFE) | bit;
    }

    fn write_stream(&mut self, stream: &BitStream) {
        let luma = self.luma_len();
        let total = stream.bit_len();

        self.frames
            .par_iter_mut()
            .enumerate()
            .for_each(|(n, frame)| {
                let start = n * luma;
                if start >= total {
                    return;
                }
                let end = total.min(start + luma);
                for (pixel, index) in (start..end).enumerate() {
                    frame.data[pixel] = (frame.data[pixel] & 0xFE) | stream.bit(index);
                }
            });
    }

    fn read_bytes(&self, offset: usize, len: usize) -> Vec<u8> {
        (0..len)
            .into_par_iter()
            .map(|i| {
                let base = offset + i * 8;
                (0..8).fold(0u8, |byte, bit| byte | (self.get_bit(base + bit) << bit))
            })
            .collect()
    }
}

/// Codec for `video-lsb`.
pub struct VideoLsbCodec;

pub(crate) static VIDEO_LSB: VideoLsbCodec = VideoLsbCodec;

impl StegoCodec for VideoLsbCodec {
    fn technique(&self) -> StegoTechnique {
        StegoTechnique::VideoLsb
    }

    fn capacity(&self, cover: &CoverMedium) -> Result<u64> {
        Ok(Y4mVideo::from_bytes(cover.bytes())?.capacity())
    }

    fn embed(&self, cover: &CoverMedium, payload: &[u8]) -> Result<EmbeddedArtifact> {
        let mut video = Y4mVideo::from_bytes(cover.bytes())?;
        video.hide(StegoTechnique::VideoLsb.tag(), payload)?;

        log::debug!(
            "video-lsb: embedded {} bytes across {} frame(s) of {}x{}",
            payload.len(),
            video.frame_count(),
            video.width,
            video.height
        );
        Ok(EmbeddedArtifact::new(video.to_bytes(), MediaCategory::Video))
    }

    fn extract(&self, artifact: &EmbeddedArtifact) -> Result<Vec<u8>> {
        Y4mVideo::from_bytes(artifact.bytes())?.extract(StegoTechnique::VideoLsb.tag())
    }
}

/// Builds a 4:2:0 Y4M clip with a moving gradient for tests.
#[cfg(test)]
pub(crate) fn create_test_y4m(width: usize, height: usize, frames: usize) -> Vec<u8> {
    let mut out =
        format!("YUV4MPEG2 W{} H{} F25:1 Ip A1:1 C420jpeg\n", width, height).into_bytes();
    let chroma = 2 * ((width + 1) / 2) * ((height + 1) / 2);
    for n in 0..frames {
        out.extend_from_slice(b"FRAME\n");
        out.extend((0..width * height).map(|i| ((i + n * 3) % 256) as u8));
        out.extend(std::iter::repeat(128u8).take(chroma));
    }
    out
}
