// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for JPEG coefficient parsing and re-encoding.

use thiserror::Error;

/// Errors raised while reading or writing a JPEG coefficient stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JpegError {
    /// Input ended in the middle of a segment or scan.
    #[error("unexpected end of JPEG data")]
    UnexpectedEof,
    /// The stream does not start with SOI (0xFFD8).
    #[error("missing SOI marker (not a JPEG)")]
    InvalidSoi,
    /// Progressive (SOF2) streams cannot carry coefficient payloads here.
    #[error("progressive JPEG is not supported")]
    Progressive,
    /// Lossless, hierarchical or arithmetic-coded process.
    #[error("unsupported JPEG process: SOF marker 0xFF{0:02X}")]
    UnsupportedProcess(u8),
    /// Only 8-bit sample precision is handled.
    #[error("unsupported sample precision: {0}-bit")]
    UnsupportedPrecision(u8),
    /// A marker segment has an inconsistent length or field.
    #[error("invalid marker data: {0}")]
    InvalidMarkerData(&'static str),
    /// Quantization or Huffman table ID outside 0..=3.
    #[error("invalid table ID: {0}")]
    InvalidTableId(u8),
    /// A component refers to a table that was never defined.
    #[error("missing {kind} table {id}")]
    MissingTable { kind: &'static str, id: u8 },
    /// SOS selects a component ID that SOF did not declare.
    #[error("unknown component ID in SOS: {0}")]
    UnknownComponent(u8),
    /// The first scan does not cover every frame component.
    #[error("scan covers {found} of {expected} components")]
    PartialScan { found: usize, expected: usize },
    /// No Huffman code matched the bit stream.
    #[error("Huffman decode error")]
    HuffmanDecode,
    /// The active Huffman table has no code for a symbol being written.
    #[error("Huffman table has no code for symbol 0x{0:02X}")]
    MissingHuffmanCode(u8),
    /// Zero width/height or sampling factors outside 1..=4.
    #[error("invalid image dimensions or sampling factors")]
    InvalidDimensions,
}

pub type Result<T> = std::result::Result<T, JpegError>;
