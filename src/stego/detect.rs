// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Embedding mode detection.
//!
//! The container picks the first guess (JPEG -> DCT, anything else -> LSB);
//! the other mode is tried once if the first finds no envelope magic or
//! cannot read the file at all. DCT is always probed with full-plane
//! traversal, which reads grayscale and color embeddings alike.

use crate::stego::carrier::{open_carrier, read_region, DctColorMode, EmbedMode, Purpose};
use crate::stego::error::{FormatError, StegoError};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Modes to probe, most likely first.
fn candidates(bytes: &[u8]) -> [EmbedMode; 2] {
    let dct = EmbedMode::Dct(DctColorMode::Color);
    if bytes.starts_with(&JPEG_SOI) {
        [dct, EmbedMode::Lsb]
    } else {
        [EmbedMode::Lsb, dct]
    }
}

/// Read the region of `bytes` in a known mode.
pub(crate) fn extract_region(bytes: &[u8], mode: EmbedMode) -> Result<Vec<u8>, StegoError> {
    let carrier = open_carrier(bytes, mode, Purpose::Extract)?;
    read_region(carrier.as_ref())
}

/// Find the mode whose region starts with the envelope magic and return
/// that region. Errors past the magic check (truncated length) are final.
pub(crate) fn locate(bytes: &[u8]) -> Result<(EmbedMode, Vec<u8>), StegoError> {
    for (attempt, mode) in candidates(bytes).into_iter().enumerate() {
        match extract_region(bytes, mode) {
            Ok(region) => {
                tracing::debug!(?mode, region_len = region.len(), "envelope located");
                return Ok((mode, region));
            }
            Err(StegoError::Format(FormatError::BadMagic)) | Err(StegoError::UnsupportedCarrier(_)) => {
                if attempt == 0 {
                    tracing::warn!(?mode, "no envelope in first-guess mode, trying the other");
                }
            }
            Err(e) => return Err(e),
        }
    }
    Err(FormatError::NoStegoDataFound.into())
}

/// Which mode `stego` was written with.
pub fn detect(stego: &[u8]) -> Result<EmbedMode, FormatError> {
    match locate(stego) {
        Ok((mode, _)) => Ok(mode),
        Err(StegoError::Format(e)) => Err(e),
        Err(_) => Err(FormatError::NoStegoDataFound),
    }
}
