// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Capacity planning.
//!
//! A carrier with `capacity_bits` one-bit slots holds a region of
//! `floor(capacity_bits / 8)` bytes. Four of those carry the envelope length,
//! and [`ENVELOPE_OVERHEAD`] more carry the envelope header, so the largest
//! ciphertext that fits is
//!
//! ```text
//! floor(capacity_bits / 8) - 4 - 65
//! ```
//!
//! The ciphertext is the compressed payload (AES-GCM-SIV adds no bytes
//! besides the tag, which lives in the header).

use crate::stego::carrier::{open_carrier, EmbedMode, Purpose};
use crate::stego::envelope::ENVELOPE_OVERHEAD;
use crate::stego::error::StegoError;

/// Bytes of big-endian envelope length ahead of the envelope.
pub const REGION_HEADER_LEN: usize = 4;

/// What one carrier can hold in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedCapacity {
    pub mode: EmbedMode,
    pub carrier_bits: usize,
}

impl EmbedCapacity {
    pub fn new(mode: EmbedMode, carrier_bits: usize) -> Self {
        Self { mode, carrier_bits }
    }

    /// Bytes available for the envelope.
    pub fn region_bytes(&self) -> usize {
        (self.carrier_bits / 8).saturating_sub(REGION_HEADER_LEN)
    }

    /// Largest ciphertext, in bytes, that fits. Zero when the carrier cannot
    /// even hold the header.
    pub fn max_payload_bytes(&self) -> usize {
        self.region_bytes().saturating_sub(ENVELOPE_OVERHEAD)
    }

    /// `payload_len` is the ciphertext length.
    pub fn check_fits(&self, payload_len: usize) -> Result<(), StegoError> {
        let available = self.max_payload_bytes();
        if payload_len > available || self.region_bytes() < ENVELOPE_OVERHEAD {
            return Err(StegoError::Capacity { needed: payload_len, available });
        }
        Ok(())
    }

    pub(crate) fn check_envelope_fits(&self, envelope_len: usize) -> Result<(), StegoError> {
        if envelope_len > self.region_bytes() {
            return Err(StegoError::Capacity {
                needed: envelope_len.saturating_sub(ENVELOPE_OVERHEAD),
                available: self.max_payload_bytes(),
            });
        }
        Ok(())
    }
}

/// Open `carrier` in `mode` and report its capacity. For DCT mode this
/// includes quality normalization, so the figure matches what encoding sees.
pub fn capacity(carrier: &[u8], mode: EmbedMode) -> Result<EmbedCapacity, StegoError> {
    let embedder = open_carrier(carrier, mode, Purpose::Embed)?;
    let cap = EmbedCapacity::new(mode, embedder.capacity_bits());
    tracing::debug!(?mode, bits = cap.carrier_bits, max_payload = cap.max_payload_bytes(), "carrier capacity");
    Ok(cap)
}

/// Largest ciphertext in bytes that `carrier` can hold in `mode`.
pub fn max_payload_bytes(carrier: &[u8], mode: EmbedMode) -> Result<usize, StegoError> {
    Ok(capacity(carrier, mode)?.max_payload_bytes())
}

/// Whether a ciphertext of `payload_len` bytes fits in `carrier`.
pub fn check_fits(payload_len: usize, carrier: &[u8], mode: EmbedMode) -> Result<(), StegoError> {
    capacity(carrier, mode)?.check_fits(payload_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        // 100x100 RGB: 30_000 bits -> 3750 bytes -> 3746 region -> 3681 payload
        let cap = EmbedCapacity::new(EmbedMode::Lsb, 100 * 100 * 3);
        assert_eq!(cap.region_bytes(), 3746);
        assert_eq!(cap.max_payload_bytes(), 3681);
    }

    #[test]
    fn partial_bytes_are_floored() {
        let cap = EmbedCapacity::new(EmbedMode::Lsb, 8 * 80 + 7);
        assert_eq!(cap.region_bytes(), 76);
        assert_eq!(cap.max_payload_bytes(), 11);
    }

    #[test]
    fn boundary() {
        let cap = EmbedCapacity::new(EmbedMode::Lsb, 8 * 200);
        let max = cap.max_payload_bytes();
        assert!(cap.check_fits(max).is_ok());
        match cap.check_fits(max + 1) {
            Err(StegoError::Capacity { needed, available }) => {
                assert_eq!(needed, max + 1);
                assert_eq!(available, max);
            }
            other => panic!("expected Capacity, got {other:?}"),
        }
    }

    #[test]
    fn tiny_carrier_holds_nothing() {
        let cap = EmbedCapacity::new(EmbedMode::Lsb, 8 * 60);
        assert_eq!(cap.max_payload_bytes(), 0);
        assert!(matches!(cap.check_fits(0), Err(StegoError::Capacity { .. })));
        assert_eq!(EmbedCapacity::new(EmbedMode::Lsb, 0).region_bytes(), 0);
    }

    #[test]
    fn exactly_header_sized_region_holds_empty_ciphertext() {
        let cap = EmbedCapacity::new(EmbedMode::Lsb, 8 * (REGION_HEADER_LEN + ENVELOPE_OVERHEAD));
        assert_eq!(cap.max_payload_bytes(), 0);
        assert!(cap.check_fits(0).is_ok());
    }
}
