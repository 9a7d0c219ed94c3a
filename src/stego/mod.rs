// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Steganographic encoding and decoding.
//!
//! Two embedding modes share one envelope format, one cipher (AES-256-GCM-SIV)
//! and one key derivation (Argon2id over every secret factor):
//!
//! - **LSB** ([`EmbedMode::Lsb`]): least significant bits of the color
//!   samples of a lossless raster. Highest capacity; the output must never
//!   be recompressed.
//! - **DCT** ([`EmbedMode::Dct`]): parity of mid-frequency coefficients of a
//!   baseline JPEG, luma only or luma plus chroma.
//!
//! [`decode`] without a mode auto-detects which one was used.

pub mod capacity;
pub mod carrier;
pub mod cipher;
pub mod compress;
pub mod config;
pub mod dct;
pub mod detect;
pub mod envelope;
pub mod error;
pub mod factors;
pub mod kdf;
pub mod lsb;
pub mod payload;
mod pipeline;

pub use capacity::{capacity, check_fits, max_payload_bytes, EmbedCapacity};
pub use carrier::{DctColorMode, EmbedMode, Embedder};
pub use config::{KdfParams, StegoConfig};
pub use detect::detect;
pub use envelope::{StegoEnvelope, ENVELOPE_OVERHEAD, FORMAT_VERSION, MAGIC};
pub use error::{CarrierError, FormatError, StegoError, ValidationError};
pub use factors::SecretFactors;
pub use payload::{FilePayload, Payload, MAX_FILENAME_LEN};
pub use pipeline::{decode, encode};
