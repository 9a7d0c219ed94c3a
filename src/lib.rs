// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # veilpix-core
//!
//! Pure-Rust steganography engine for hiding encrypted text or files in
//! images. Provides two embedding modes:
//!
//! - **LSB**: least significant bits of PNG/BMP/TIFF color samples. Output
//!   is PNG.
//! - **DCT**: parity of mid-frequency coefficients of baseline JPEGs, luma
//!   only or luma plus chroma. Output is JPEG.
//!
//! Keys come from Argon2id over a reference photo, a passphrase, a PIN
//! and/or private key, and an optional channel key. Payloads are
//! Brotli-compressed and sealed with AES-256-GCM-SIV. All processing is
//! local; the JPEG coefficient codec (`jpeg` module) is std only.
//!
//! # Carrier limits
//!
//! - DCT mode reads sequential JPEGs whose first scan carries every
//!   component. Baseline files split into several non-interleaved scans
//!   (one per component, as some encoders write for 4:1:1) are rejected
//!   with [`JpegError::PartialScan`]; progressive files with
//!   [`JpegError::Progressive`].
//! - Carriers wider or taller than 8192 pixels, or above 16 megapixels, are
//!   refused from their headers ([`JpegError::InvalidDimensions`],
//!   [`CarrierError::TooLarge`]).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use veilpix_core::{decode, encode, EmbedMode, Payload, SecretFactors, StegoConfig};
//!
//! let cover = std::fs::read("cover.png").unwrap();
//! let reference = std::fs::read("reference.jpg").unwrap();
//! let factors = SecretFactors::new(reference, "amber violin quiet harbor").with_pin("482913");
//! let config = StegoConfig::default();
//!
//! let stego = encode(&Payload::text("Meet at midnight"), &factors, &cover, EmbedMode::Lsb, &config).unwrap();
//! let payload = decode(&stego, &factors, None, &config).unwrap();
//! assert_eq!(payload, Payload::text("Meet at midnight"));
//! ```

pub mod jpeg;
pub mod stego;

pub use jpeg::error::{JpegError, Result as JpegResult};
pub use jpeg::JpegCoefficients;
pub use stego::{capacity, check_fits, decode, detect, encode, max_payload_bytes};
pub use stego::{CarrierError, FormatError, StegoError, ValidationError};
pub use stego::{DctColorMode, EmbedCapacity, EmbedMode};
pub use stego::{ENVELOPE_OVERHEAD, FORMAT_VERSION, MAGIC};
pub use stego::{FilePayload, KdfParams, Payload, SecretFactors, StegoConfig};
