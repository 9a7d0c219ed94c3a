// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Brotli compression of the serialized payload.
//!
//! Compression is unconditional, so there is no flag to tamper with and the
//! decoder always inflates.

use std::io::{Read, Write};

use zeroize::Zeroizing;

use crate::stego::error::StegoError;

/// Brotli quality (0-11). 9 keeps multi-megabyte file payloads fast.
const BROTLI_QUALITY: u32 = 9;

/// Brotli LG_WINDOW_SIZE (4 MiB window).
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

const BUFFER_SIZE: usize = 4096;

pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut output, BUFFER_SIZE, BROTLI_QUALITY, BROTLI_LG_WINDOW_SIZE);
        writer.write_all(data).expect("writing into a Vec should not fail");
        // flushed on drop
    }
    output
}

/// Inflate at most `limit` bytes. Malformed input or output beyond the
/// limit is [`StegoError::PayloadCorrupted`]. The output is plaintext and is
/// wiped on drop.
pub fn decompress(data: &[u8], limit: usize) -> Result<Zeroizing<Vec<u8>>, StegoError> {
    let mut output = Zeroizing::new(Vec::new());
    brotli::Decompressor::new(data, BUFFER_SIZE)
        .take(limit as u64 + 1)
        .read_to_end(&mut *output)
        .map_err(|_| StegoError::PayloadCorrupted)?;
    if output.len() > limit {
        tracing::warn!(limit, "decompressed payload exceeds limit");
        return Err(StegoError::PayloadCorrupted);
    }
    Ok(output)
}
