//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides data in the low bits of the R, G and B channels; alpha is left
//! untouched. `image-lsb` uses one bit plane, `image-lsb2` the lowest two.
//! Covers can be any format the `image` crate decodes; the result is always
//! written as PNG so the bits survive.

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use super::stream::{embed_stream, extract_stream, payload_capacity, BitCarrier};
use super::{CoverMedium, EmbeddedArtifact, MediaCategory, StegoCodec, StegoTechnique};
use crate::error::{InscryptError, Result};

/// Image steganography handler.
pub struct ImageStego {
    pixels: RgbaImage,
    bit_planes: u8,
}

impl ImageStego {
    /// Decodes an image from bytes, using `bit_planes` low bits per channel.
    pub fn from_bytes(bytes: &[u8], bit_planes: u8) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| InscryptError::media(format!("image load error: {}", e)))?;
        Ok(Self::from_image(&image, bit_planes))
    }

    /// Creates a new ImageStego from a DynamicImage.
    pub fn from_image(image: &DynamicImage, bit_planes: u8) -> Self {
        Self {
            pixels: image.to_rgba8(),
            bit_planes: bit_planes.clamp(1, 2),
        }
    }

    /// Returns the capacity in payload bits.
    pub fn capacity(&self) -> u64 {
        payload_capacity(self.bit_len())
    }

    /// Hides `data` under the stream tag `tag`.
    pub fn hide(&mut self, tag: u8, data: &[u8]) -> Result<()> {
        embed_stream(self, tag, data)
    }

    /// Extracts data hidden under `tag`.
    pub fn extract(&self, tag: u8) -> Result<Vec<u8>> {
        extract_stream(self, tag)
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(self.pixels.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| InscryptError::media(format!("image save error: {}", e)))?;
        Ok(bytes)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Maps a carrier bit to (raw buffer index, bit plane).
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        let planes = self.bit_planes as usize;
        let channel = index / planes;
        // Skip alpha: every 3 colour channels occupy 4 bytes.
        ((channel / 3) * 4 + channel % 3, index % planes)
    }
}

impl BitCarrier for ImageStego {
    fn bit_len(&self) -> usize {
        let (width, height) = self.pixels.dimensions();
        (width as usize) * (height as usize) * 3 * self.bit_planes as usize
    }

    fn get_bit(&self, index: usize) -> u8 {
        let (offset, plane) = self.locate(index);
        (self.pixels.as_raw()[offset] >> plane) & 1
    }

    fn set_bit(&mut self, index: usize, bit: u8) {
        let (offset, plane) = self.locate(index);
        let raw: &mut [u8] = &mut self.pixels;
        raw[offset] = (raw[offset] & !(1 << plane)) | (bit << plane);
    }
}

/// Codec for `image-lsb` and `image-lsb2`.
pub struct ImageLsbCodec {
    technique: StegoTechnique,
    bit_planes: u8,
}

pub(crate) static IMAGE_LSB: ImageLsbCodec = ImageLsbCodec {
    technique: StegoTechnique::ImageLsb,
    bit_planes: 1,
};

pub(crate) static IMAGE_LSB2: ImageLsbCodec = ImageLsbCodec {
    technique: StegoTechnique::ImageLsb2,
    bit_planes: 2,
};

impl StegoCodec for ImageLsbCodec {
    fn technique(&self) -> StegoTechnique {
        self.technique
    }

    fn capacity(&self, cover: &CoverMedium) -> Result<u64> {
        Ok(ImageStego::from_bytes(cover.bytes(), self.bit_planes)?.capacity())
    }

    fn embed(&self, cover: &CoverMedium, payload: &[u8]) -> Result<EmbeddedArtifact> {
        let mut stego = ImageStego::from_bytes(cover.bytes(), self.bit_planes)?;
        stego.hide(self.technique.tag(), payload)?;

        let (width, height) = stego.dimensions();
        log::debug!(
            "{}: embedded {} bytes into {}x{} image",
            self.technique,
            payload.len(),
            width,
            height
        );
        Ok(EmbeddedArtifact::new(stego.to_png_bytes()?, MediaCategory::Image))
    }

    fn extract(&self, artifact: &EmbeddedArtifact) -> Result<Vec<u8>> {
        ImageStego::from_bytes(artifact.bytes(), self.bit_planes)?.extract(self.technique.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn cover(width: u32, height: u32) -> CoverMedium {
        let mut bytes = Vec::new();
        create_test_image(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        CoverMedium::new(bytes, MediaCategory::Image)
    }

    #[test]
    fn test_capacity() {
        let stego = ImageStego::from_image(&create_test_image(100, 100), 1);
        // 100x100 pixels, 3 channels, 1 bit each, minus 88 bits of framing
        assert_eq!(stego.capacity(), 30_000 - 88);

        let stego = ImageStego::from_image(&create_test_image(100, 100), 2);
        assert_eq!(stego.capacity(), 60_000 - 88);
    }

    #[test]
    fn test_hide_and_extract_small() {
        let mut stego = ImageStego::from_image(&create_test_image(100, 100), 1);
        stego.hide(0x11, b"Hello, steganography!").unwrap();

        assert_eq!(stego.extract(0x11).unwrap(), b"Hello, steganography!");
    }

    #[test]
    fn test_alpha_untouched() {
        let mut stego = ImageStego::from_image(&create_test_image(20, 20), 2);
        stego.hide(0x12, &[0xFF; 100]).unwrap();

        assert!(stego.pixels.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_codec_png_roundtrip() {
        let cover = cover(64, 64);
        let data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();

        let artifact = IMAGE_LSB2.embed(&cover, &data).unwrap();
        assert_eq!(artifact.category(), MediaCategory::Image);
        assert_eq!(IMAGE_LSB2.extract(&artifact).unwrap(), data);
    }

    #[test]
    fn test_cover_is_not_modified() {
        let cover = cover(32, 32);
        let before = cover.bytes().to_vec();
        IMAGE_LSB.embed(&cover, b"payload").unwrap();
        assert_eq!(cover.bytes(), before.as_slice());
    }

    #[test]
    fn test_image_too_small() {
        let cover = cover(10, 10);
        let result = IMAGE_LSB.embed(&cover, &[0u8; 1000]);
        assert!(matches!(result, Err(InscryptError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_lsb_and_lsb2_do_not_mix() {
        let cover = cover(32, 32);
        let artifact = IMAGE_LSB.embed(&cover, b"one plane").unwrap();

        assert!(IMAGE_LSB2.extract(&artifact).is_err());
    }

    #[test]
    fn test_undecodable_bytes() {
        let cover = CoverMedium::new(b"\x89PNG\r\n\x1a\nbroken".to_vec(), MediaCategory::Image);
        let result = IMAGE_LSB.capacity(&cover);
        assert!(matches!(result, Err(InscryptError::UnsupportedMediaType(_))));
    }
}
