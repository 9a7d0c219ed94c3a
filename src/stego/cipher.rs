// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! AES-256-GCM-SIV with a detached tag.
//!
//! GCM-SIV tolerates nonce reuse far better than plain GCM, which matters
//! because nonces are random and stored next to the ciphertext. The tag is
//! kept separate so the envelope can hold it in a fixed header field.

use aes_gcm_siv::aead::{AeadInPlace, KeyInit};
use aes_gcm_siv::{Aes256GcmSiv, Key, Nonce, Tag};
use zeroize::Zeroizing;

use crate::stego::error::StegoError;
use crate::stego::kdf::DerivedKey;

/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Output of [`encrypt`]. Ciphertext length equals plaintext length.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

fn cipher_for(key: &DerivedKey) -> Aes256GcmSiv {
    Aes256GcmSiv::new(Key::<Aes256GcmSiv>::from_slice(key.as_bytes()))
}

/// Encrypt under a fresh random nonce, authenticating `aad` alongside.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey, aad: &[u8]) -> Sealed {
    use rand::RngCore;
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher_for(key)
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut buffer)
        .expect("AES-GCM-SIV encrypt should not fail");

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Sealed { nonce, tag: tag_bytes, ciphertext: buffer }
}

/// Verify and decrypt. Any failure is [`StegoError::Decryption`].
pub fn decrypt(
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
    key: &DerivedKey,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, StegoError> {
    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher_for(key)
        .decrypt_in_place_detached(Nonce::from_slice(nonce), aad, buffer.as_mut_slice(), Tag::from_slice(tag))
        .map_err(|_| StegoError::Decryption)?;
    Ok(buffer)
}
