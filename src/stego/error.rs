// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] is what every public operation returns. Decryption failure
//! is a single variant with a fixed message: it never says which secret
//! factor was wrong or whether the data was damaged instead.

use thiserror::Error;

use crate::jpeg::error::JpegError;

/// Errors from encoding, decoding and capacity queries.
#[derive(Debug, Error)]
pub enum StegoError {
    /// Caller input was rejected before any work was done.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    /// The encrypted payload does not fit in the carrier.
    #[error("payload needs {needed} bytes but the carrier holds at most {available}")]
    Capacity { needed: usize, available: usize },
    /// The embedded region is not a readable envelope.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Authentication tag mismatch.
    #[error("decryption failed: wrong credentials or damaged data")]
    Decryption,
    /// The carrier image cannot be used in the requested mode.
    #[error("unsupported carrier: {0}")]
    UnsupportedCarrier(#[from] CarrierError),
    /// The tag verified but the plaintext did not decompress or parse.
    #[error("payload corrupted after decryption")]
    PayloadCorrupted,
}

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("reference photo is empty")]
    EmptyReferencePhoto,
    #[error("passphrase is empty")]
    EmptyPassphrase,
    #[error("a PIN or a private key is required")]
    MissingSecondFactor,
    #[error("PIN must be 6 to 9 digits")]
    InvalidPin,
    #[error("private key is empty")]
    EmptyPrivateKey,
    #[error("channel key is empty")]
    EmptyChannelKey,
    #[error("filename longer than {max} bytes")]
    FilenameTooLong { max: usize },
    #[error("invalid key derivation parameters: {0}")]
    KdfParams(String),
    #[error("decompression limit must be non-zero")]
    ZeroDecompressionLimit,
}

/// Envelope header problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The region does not start with the envelope magic.
    #[error("no envelope magic at the start of the embedded region")]
    BadMagic,
    /// Magic matched but the format version differs.
    #[error("envelope format version {found} is not supported (expected {supported})")]
    VersionMismatch { found: u8, supported: u8 },
    /// The region is shorter than the fixed envelope header.
    #[error("embedded region is truncated")]
    Truncated,
    /// Neither embedding mode found an envelope.
    #[error("no hidden data found in this image")]
    NoStegoDataFound,
}

/// Why a carrier image cannot be used.
#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("invalid JPEG: {0}")]
    Jpeg(#[from] JpegError),
    #[error("cannot decode image: {0}")]
    Raster(String),
    #[error("{0} carriers are lossy or palette based; use PNG, BMP or TIFF")]
    LossyFormat(&'static str),
    #[error("unrecognized image container")]
    Unrecognized,
    #[error("image is {width}x{height}; at most 8192 per side and 16 megapixels")]
    TooLarge { width: u32, height: u32 },
    #[error("DCT mode needs a JPEG carrier")]
    NotJpeg,
}

impl From<JpegError> for StegoError {
    fn from(e: JpegError) -> Self {
        Self::UnsupportedCarrier(CarrierError::Jpeg(e))
    }
}
