//! The bit stream every technique writes into its cover.
//!
//! Layout, written LSB-first into consecutive carrier bits:
//!
//! ```text
//! "IS" | technique tag (u8) | payload length (u32 LE) | payload | CRC-32 (u32 LE)
//! ```
//!
//! That is 88 bits of overhead on top of the payload. Carriers only decide
//! where bit `i` lives; the header, bounds checks and checksum live here.

use crate::error::{InscryptError, Result};

const MAGIC: [u8; 2] = *b"IS";
const HEADER_LEN: usize = 2 + 1 + 4;
const TRAILER_LEN: usize = 4;

/// Bits of framing added to every embedded payload.
pub const OVERHEAD_BITS: u64 = ((HEADER_LEN + TRAILER_LEN) * 8) as u64;

/// Payload bits available in a carrier of `carrier_bits` bits.
pub fn payload_capacity(carrier_bits: usize) -> u64 {
    (carrier_bits as u64).saturating_sub(OVERHEAD_BITS)
}

/// Bytes laid out for embedding, addressed bit by bit.
pub(crate) struct BitStream {
    bytes: Vec<u8>,
}

impl BitStream {
    pub(crate) fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    #[inline]
    pub(crate) fn bit(&self, index: usize) -> u8 {
        (self.bytes[index / 8] >> (index % 8)) & 1
    }
}

/// Something that stores addressable bits: pixel channels, samples, frames.
pub(crate) trait BitCarrier {
    /// Total number of bits the carrier holds, framing included.
    fn bit_len(&self) -> usize;

    fn get_bit(&self, index: usize) -> u8;

    fn set_bit(&mut self, index: usize, bit: u8);

    /// Writes the whole stream starting at bit 0.
    fn write_stream(&mut self, stream: &BitStream) {
        for index in 0..stream.bit_len() {
            self.set_bit(index, stream.bit(index));
        }
    }

    /// Reads `len` bytes starting at carrier bit `offset`.
    fn read_bytes(&self, offset: usize, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let base = offset + i * 8;
                (0..8).fold(0u8, |byte, bit| byte | (self.get_bit(base + bit) << bit))
            })
            .collect()
    }
}

/// Embeds `payload` under technique `tag`.
///
/// Fails with `CapacityExceeded` before touching the carrier when the payload
/// does not fit.
pub(crate) fn embed_stream<C: BitCarrier>(carrier: &mut C, tag: u8, payload: &[u8]) -> Result<()> {
    let capacity = payload_capacity(carrier.bit_len());
    let needed = payload.len() as u64 * 8;
    if needed > capacity || payload.len() > u32::MAX as usize {
        return Err(InscryptError::CapacityExceeded { needed, capacity });
    }

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    bytes.extend_from_slice(&MAGIC);
    bytes.push(tag);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());

    carrier.write_stream(&BitStream { bytes });
    Ok(())
}

/// Reads back a payload embedded under technique `tag`.
pub(crate) fn extract_stream<C: BitCarrier>(carrier: &C, tag: u8) -> Result<Vec<u8>> {
    let capacity = payload_capacity(carrier.bit_len());
    if (carrier.bit_len() as u64) < OVERHEAD_BITS {
        return Err(InscryptError::media("cover is too small to hold embedded data"));
    }

    let header = carrier.read_bytes(0, HEADER_LEN);
    if header[..2] != MAGIC {
        return Err(InscryptError::media("no embedded data found"));
    }
    if header[2] != tag {
        return Err(InscryptError::media(format!(
            "data was embedded with a different technique (tag {:#04x})",
            header[2]
        )));
    }

    let len = u32::from_le_bytes([header[3], header[4], header[5], header[6]]) as usize;
    if len as u64 * 8 > capacity {
        return Err(InscryptError::media(format!(
            "declared length of {} bytes exceeds cover capacity",
            len
        )));
    }

    let payload = carrier.read_bytes(HEADER_LEN * 8, len);
    let trailer = carrier.read_bytes((HEADER_LEN + len) * 8, TRAILER_LEN);
    let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if crc32fast::hash(&payload) != expected {
        return Err(InscryptError::payload("embedded data failed its CRC-32 check"));
    }

    Ok(payload)
}
