// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Hybrid key derivation.
//!
//! All secret factors are folded into one Argon2id input, in this fixed
//! order:
//!
//! 1. SHA-256 of the reference photo bytes
//! 2. the passphrase, trimmed and lowercased
//! 3. the PIN digits (empty when absent)
//! 4. the private key bytes (empty when absent)
//! 5. the channel key bytes (empty when absent)
//!
//! The salt is random per message and travels in the envelope header, so
//! the same factors never produce the same key twice.

use std::fmt;

use argon2::{Algorithm, Argon2, Version};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::stego::config::KdfParams;
use crate::stego::error::ValidationError;
use crate::stego::factors::SecretFactors;

/// Salt length carried in the envelope.
pub const SALT_LEN: usize = 32;
/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// A 256-bit key, wiped on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DerivedKey").field(&"[REDACTED]").finish()
    }
}

/// Argon2id instance with validated cost parameters.
pub struct KeyDerivation {
    argon2: Argon2<'static>,
}

impl KeyDerivation {
    pub fn new(params: &KdfParams) -> Result<Self, ValidationError> {
        let params = params.argon2_params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Derive the message key. Factors are expected to be validated.
    pub fn derive(&self, factors: &SecretFactors, salt: &[u8; SALT_LEN]) -> DerivedKey {
        let material = key_material(factors);
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        self.argon2
            .hash_password_into(&material, salt, &mut *key)
            .expect("Argon2 derivation with validated parameters should not fail");
        DerivedKey(key)
    }
}

fn key_material(factors: &SecretFactors) -> Zeroizing<Vec<u8>> {
    let photo_hash = Sha256::digest(factors.reference_photo());
    let passphrase = Zeroizing::new(factors.normalized_passphrase());

    let mut material = Zeroizing::new(Vec::with_capacity(
        photo_hash.len()
            + passphrase.len()
            + factors.pin().len()
            + factors.private_key().len()
            + factors.channel_key().len(),
    ));
    material.extend_from_slice(&photo_hash);
    material.extend_from_slice(passphrase.as_bytes());
    material.extend_from_slice(factors.pin());
    material.extend_from_slice(factors.private_key());
    material.extend_from_slice(factors.channel_key());
    material
}

/// Fresh random salt from the thread-local CSPRNG.
pub fn random_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
