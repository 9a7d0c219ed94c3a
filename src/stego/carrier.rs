// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! The embedding capability shared by both modes, and region framing.
//!
//! An [`Embedder`] exposes an ordered sequence of one-bit slots. The
//! pipeline writes a *region* into those slots:
//!
//! ```text
//! [4 bytes] envelope length (big-endian u32)
//! [N bytes] envelope
//! ```
//!
//! Bytes are expanded MSB first.

use crate::stego::capacity::{EmbedCapacity, REGION_HEADER_LEN};
use crate::stego::dct::JpegCarrier;
use crate::stego::envelope::{self, ENVELOPE_OVERHEAD, MAGIC};
use crate::stego::error::{FormatError, StegoError};
use crate::stego::lsb::RasterCarrier;

/// How the region is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedMode {
    /// Least significant bits of raster color samples; lossless output only.
    Lsb,
    /// Parity of mid-frequency JPEG coefficients.
    Dct(DctColorMode),
}

/// Which JPEG planes DCT mode writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DctColorMode {
    /// Luma only.
    #[default]
    Grayscale,
    /// Luma, then Cb, then Cr.
    Color,
}

/// One carrier image opened for embedding or extraction.
pub trait Embedder {
    /// Number of one-bit slots.
    fn capacity_bits(&self) -> usize;

    /// Write `bits` (each 0 or 1) into the first `bits.len()` slots.
    fn embed_bits(&mut self, bits: &[u8]) -> Result<(), StegoError>;

    /// Read `count` slots starting at slot `start`.
    fn extract_bits(&self, start: usize, count: usize) -> Result<Vec<u8>, StegoError>;

    /// Serialize the (possibly modified) carrier.
    fn to_image_bytes(&self) -> Result<Vec<u8>, StegoError>;
}

/// Whether a carrier is opened to receive data or to give it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Embed,
    Extract,
}

/// Open `bytes` as a carrier for `mode`.
pub fn open_carrier(bytes: &[u8], mode: EmbedMode, purpose: Purpose) -> Result<Box<dyn Embedder>, StegoError> {
    Ok(match mode {
        EmbedMode::Lsb => Box::new(RasterCarrier::from_bytes(bytes, purpose)?),
        EmbedMode::Dct(color) => Box::new(JpegCarrier::from_bytes(bytes, color)?),
    })
}

/// Capacity check, then write length prefix and envelope into the carrier.
pub fn write_region(carrier: &mut dyn Embedder, mode: EmbedMode, envelope: &[u8]) -> Result<(), StegoError> {
    EmbedCapacity::new(mode, carrier.capacity_bits()).check_envelope_fits(envelope.len())?;
    let len = u32::try_from(envelope.len()).map_err(|_| StegoError::Capacity {
        needed: envelope.len(),
        available: u32::MAX as usize,
    })?;
    let mut region = Vec::with_capacity(REGION_HEADER_LEN + envelope.len());
    region.extend_from_slice(&len.to_be_bytes());
    region.extend_from_slice(envelope);
    carrier.embed_bits(&bytes_to_bits(&region))
}

/// Read the envelope bytes back. The magic is checked before the full
/// region is extracted, so foreign images fail fast with `BadMagic`.
///
/// Once the magic matches, the length prefix is clamped to what the carrier
/// can hold and to the fixed envelope header. A damaged prefix then yields a
/// region whose tag does not verify, like any other flipped bit.
pub fn read_region(carrier: &dyn Embedder) -> Result<Vec<u8>, StegoError> {
    let probe_len = REGION_HEADER_LEN + MAGIC.len();
    if carrier.capacity_bits() < probe_len * 8 {
        return Err(FormatError::BadMagic.into());
    }
    let probe = bits_to_bytes(&carrier.extract_bits(0, probe_len * 8)?);
    envelope::check_magic(&probe[REGION_HEADER_LEN..])?;

    let max = carrier.capacity_bits() / 8 - REGION_HEADER_LEN;
    if max < ENVELOPE_OVERHEAD {
        return Err(FormatError::Truncated.into());
    }
    let stored = u32::from_be_bytes([probe[0], probe[1], probe[2], probe[3]]) as usize;
    let len = stored.clamp(ENVELOPE_OVERHEAD, max);
    if len != stored {
        tracing::debug!(stored, len, "region length clamped");
    }
    let bits = carrier.extract_bits(REGION_HEADER_LEN * 8, len * 8)?;
    Ok(bits_to_bytes(&bits))
}

/// Expand bytes into bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .collect()
}

/// Pack bits (MSB first) into bytes; a short last chunk is zero padded.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)))
        })
        .collect()
}
