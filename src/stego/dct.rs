// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! DCT-domain embedding in baseline JPEGs.
//!
//! Every 8x8 block offers [`POSITIONS_PER_BLOCK`] slots at zigzag indices
//! 6..=25: clear of DC and the strongest low frequencies, and below the high
//! frequencies that quantization zeroes out. Blocks are visited Y first,
//! then Cb, then Cr, each in block-raster order, so the luma-only slot
//! sequence is a prefix of the full one.
//!
//! A slot carries `|c| & 1`. A mismatched coefficient moves one step toward
//! zero, or from 0 to 1.
//!
//! Maximum-quality files (every quantization table all ones) are first
//! requantized onto the standard tables at [`NORMALIZED_QUALITY`]. At q100
//! nearly every mid-frequency coefficient is large and any later
//! recompression scrambles parities; normalized files also compress far
//! better. Normalized tables are no longer unity, so a second pass is a
//! no-op and decode sees exactly what encode wrote.

use crate::jpeg::block::ZIGZAG_TO_NATURAL;
use crate::jpeg::error::JpegError;
use crate::jpeg::quant::{scaled_standard_table, QuantTable, TableKind};
use crate::jpeg::JpegCoefficients;
use crate::stego::carrier::{DctColorMode, Embedder};
use crate::stego::error::{CarrierError, FormatError, StegoError};

/// First zigzag index used.
const FIRST_POSITION: usize = 6;

/// Slots per 8x8 block.
pub const POSITIONS_PER_BLOCK: usize = 20;

/// IJG quality that unity tables are normalized to.
pub const NORMALIZED_QUALITY: u8 = 95;

/// Natural-order coefficient indices of the embedding positions.
const POSITIONS: [usize; POSITIONS_PER_BLOCK] = {
    let mut out = [0usize; POSITIONS_PER_BLOCK];
    let mut i = 0;
    while i < POSITIONS_PER_BLOCK {
        out[i] = ZIGZAG_TO_NATURAL[FIRST_POSITION + i];
        i += 1;
    }
    out
};

/// A JPEG carrier in coefficient form.
#[derive(Debug, Clone)]
pub struct JpegCarrier {
    jpeg: JpegCoefficients,
    /// Number of leading planes that carry slots.
    planes: usize,
    /// Slot offset at which each used plane begins.
    plane_starts: Vec<usize>,
    normalized: bool,
}

impl JpegCarrier {
    pub fn from_bytes(bytes: &[u8], color: DctColorMode) -> Result<Self, CarrierError> {
        if !bytes.starts_with(&[0xFF, 0xD8]) {
            return Err(CarrierError::NotJpeg);
        }
        let mut jpeg = JpegCoefficients::from_bytes(bytes)?;
        let normalized = normalize_quality(&mut jpeg)?;
        if normalized {
            tracing::debug!(quality = NORMALIZED_QUALITY, "requantized maximum-quality carrier");
        }

        let planes = match color {
            DctColorMode::Grayscale => 1,
            DctColorMode::Color => jpeg.component_count().min(3),
        };
        let mut plane_starts = Vec::with_capacity(planes);
        let mut offset = 0;
        for i in 0..planes {
            plane_starts.push(offset);
            offset += jpeg.plane(i).block_count() * POSITIONS_PER_BLOCK;
        }
        Ok(Self { jpeg, planes, plane_starts, normalized })
    }

    /// Whether loading requantized a maximum-quality file.
    pub fn was_normalized(&self) -> bool {
        self.normalized
    }

    pub fn coefficients(&self) -> &JpegCoefficients {
        &self.jpeg
    }

    /// Plane and coefficient index of slot `slot`.
    fn locate(&self, slot: usize) -> (usize, usize) {
        let plane = self.plane_starts.partition_point(|&start| start <= slot) - 1;
        let local = slot - self.plane_starts[plane];
        let block = local / POSITIONS_PER_BLOCK;
        let index = block * 64 + POSITIONS[local % POSITIONS_PER_BLOCK];
        (plane, index)
    }
}

impl Embedder for JpegCarrier {
    fn capacity_bits(&self) -> usize {
        (0..self.planes)
            .map(|i| self.jpeg.plane(i).block_count() * POSITIONS_PER_BLOCK)
            .sum()
    }

    fn embed_bits(&mut self, bits: &[u8]) -> Result<(), StegoError> {
        let available = self.capacity_bits();
        if bits.len() > available {
            return Err(StegoError::Capacity { needed: bits.len().div_ceil(8), available: available / 8 });
        }
        let mut changed = 0usize;
        for (slot, &bit) in bits.iter().enumerate() {
            let (plane, index) = self.locate(slot);
            let c = &mut self.jpeg.plane_mut(plane).coefficients_mut()[index];
            let next = embed_bit(*c, bit);
            changed += usize::from(next != *c);
            *c = next;
        }
        tracing::debug!(bits = bits.len(), changed, "coefficients updated");
        Ok(())
    }

    fn extract_bits(&self, start: usize, count: usize) -> Result<Vec<u8>, StegoError> {
        let end = start.checked_add(count).ok_or(FormatError::Truncated)?;
        if end > self.capacity_bits() {
            return Err(FormatError::Truncated.into());
        }
        Ok((start..end)
            .map(|slot| {
                let (plane, index) = self.locate(slot);
                parity(self.jpeg.plane(plane).coefficients()[index])
            })
            .collect())
    }

    fn to_image_bytes(&self) -> Result<Vec<u8>, StegoError> {
        match self.jpeg.to_bytes() {
            Ok(bytes) => Ok(bytes),
            Err(JpegError::MissingHuffmanCode(symbol)) => {
                tracing::debug!(symbol, "rebuilding Huffman tables");
                let mut rebuilt = self.jpeg.clone();
                rebuilt.rebuild_huffman_tables()?;
                Ok(rebuilt.to_bytes()?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parity(c: i16) -> u8 {
    (c.unsigned_abs() & 1) as u8
}

/// Coefficient value carrying `bit`, at most one step from `c`.
fn embed_bit(c: i16, bit: u8) -> i16 {
    if parity(c) == bit & 1 {
        c
    } else if c > 0 {
        c - 1
    } else if c < 0 {
        c + 1
    } else {
        1
    }
}

/// Requantize onto the standard tables when every used table is unity.
/// Returns whether anything changed.
fn normalize_quality(jpeg: &mut JpegCoefficients) -> Result<bool, JpegError> {
    let unity = (0..jpeg.component_count()).all(|i| jpeg.component_quant_table(i).is_some_and(QuantTable::is_unity));
    if !unity {
        return Ok(false);
    }
    let luma = jpeg.frame().components[0].quant_table;
    for id in jpeg.used_quant_ids() {
        let kind = if id == luma { TableKind::Luminance } else { TableKind::Chrominance };
        jpeg.requantize(id, scaled_standard_table(kind, NORMALIZED_QUALITY))?;
    }
    jpeg.rebuild_huffman_tables()?;
    Ok(true)
}
