// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Envelope header codec.
//!
//! ```text
//! [4 bytes ] magic "VPXS"
//! [1 byte  ] format version
//! [32 bytes] Argon2id salt
//! [12 bytes] AES-GCM-SIV nonce
//! [16 bytes] authentication tag
//! [N bytes ] ciphertext (compressed payload)
//! ```
//!
//! Only [`FORMAT_VERSION`] is parsed. Anything else with the right magic is
//! a [`FormatError::VersionMismatch`], never a best-effort parse.

use crate::stego::cipher::{NONCE_LEN, TAG_LEN};
use crate::stego::error::FormatError;
use crate::stego::kdf::SALT_LEN;

pub const MAGIC: [u8; 4] = *b"VPXS";
pub const FORMAT_VERSION: u8 = 5;

/// Magic plus version; authenticated as AEAD associated data.
pub const PREFIX_LEN: usize = MAGIC.len() + 1;

/// Fixed bytes ahead of the ciphertext.
pub const ENVELOPE_OVERHEAD: usize = PREFIX_LEN + SALT_LEN + NONCE_LEN + TAG_LEN;

const _: () = assert!(ENVELOPE_OVERHEAD == 65);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StegoEnvelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl StegoEnvelope {
    /// The associated data bound to the ciphertext.
    pub fn prefix() -> [u8; PREFIX_LEN] {
        let mut p = [0u8; PREFIX_LEN];
        p[..MAGIC.len()].copy_from_slice(&MAGIC);
        p[MAGIC.len()] = FORMAT_VERSION;
        p
    }

    pub fn serialized_len(&self) -> usize {
        ENVELOPE_OVERHEAD + self.ciphertext.len()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&Self::prefix());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse a region extracted from a carrier. Magic is checked first, then
    /// the version, then the fixed-width fields.
    pub fn parse(region: &[u8]) -> Result<Self, FormatError> {
        check_magic(region)?;
        match region.get(MAGIC.len()) {
            None => return Err(FormatError::Truncated),
            Some(&FORMAT_VERSION) => {}
            Some(&found) => {
                return Err(FormatError::VersionMismatch { found, supported: FORMAT_VERSION });
            }
        }
        if region.len() < ENVELOPE_OVERHEAD {
            return Err(FormatError::Truncated);
        }
        let (salt, rest) = region[PREFIX_LEN..].split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);
        Ok(Self {
            salt: salt.try_into().map_err(|_| FormatError::Truncated)?,
            nonce: nonce.try_into().map_err(|_| FormatError::Truncated)?,
            tag: tag.try_into().map_err(|_| FormatError::Truncated)?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// `BadMagic` unless `bytes` starts with [`MAGIC`].
pub fn check_magic(bytes: &[u8]) -> Result<(), FormatError> {
    if bytes.starts_with(&MAGIC) {
        Ok(())
    } else {
        Err(FormatError::BadMagic)
    }
}
