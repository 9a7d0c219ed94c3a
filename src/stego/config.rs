// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Runtime configuration: Argon2id cost and the decompression ceiling.
//!
//! Values encode and decode must agree on bit-for-bit (envelope magic, DCT
//! positions, normalization quality) are constants, not configuration.

use serde::{Deserialize, Serialize};

use crate::stego::error::ValidationError;

/// Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB (default 262144 = 256 MiB).
    pub memory_kib: u32,
    /// Passes over memory (default 4).
    pub iterations: u32,
    /// Lanes (default 4).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 256 * 1024,
            iterations: 4,
            parallelism: 4,
        }
    }
}

/// Settings shared by encode and decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub kdf: KdfParams,
    /// Upper bound on the decompressed payload size.
    pub max_decompressed_bytes: usize,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            max_decompressed_bytes: 32 * 1024 * 1024,
        }
    }
}

impl StegoConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_decompressed_bytes == 0 {
            return Err(ValidationError::ZeroDecompressionLimit);
        }
        self.kdf.argon2_params().map(|_| ())
    }
}

impl KdfParams {
    /// Argon2 parameter block with a 32-byte output.
    pub(crate) fn argon2_params(&self) -> Result<argon2::Params, ValidationError> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, Some(32))
            .map_err(|e| ValidationError::KdfParams(e.to_string()))
    }
}
