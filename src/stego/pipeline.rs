// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Encode/decode pipeline.
//!
//! Encode:
//! 1. Validate factors, config and payload; open the carrier
//! 2. Serialize and Brotli-compress the payload
//! 3. Check capacity (the ciphertext is as long as the compressed payload)
//! 4. Derive the key with a fresh salt, encrypt with the envelope prefix as AAD
//! 5. Serialize the envelope, write the region, re-encode the image
//!
//! Decode runs the same steps backwards and stops at the first failure.
//! Wrong credentials and tampering both surface as
//! [`StegoError::Decryption`].

use crate::stego::capacity::EmbedCapacity;
use crate::stego::carrier::{open_carrier, write_region, EmbedMode, Purpose};
use crate::stego::cipher;
use crate::stego::compress;
use crate::stego::config::StegoConfig;
use crate::stego::detect;
use crate::stego::envelope::StegoEnvelope;
use crate::stego::error::StegoError;
use crate::stego::factors::SecretFactors;
use crate::stego::kdf::{self, KeyDerivation};
use crate::stego::payload::Payload;

/// Hide `payload` in `carrier` and return the stego image.
///
/// LSB output is PNG; DCT output is JPEG.
///
/// # Errors
/// - [`StegoError::Validation`] for missing or malformed inputs.
/// - [`StegoError::UnsupportedCarrier`] if `carrier` cannot be used in `mode`.
/// - [`StegoError::Capacity`] if the encrypted payload does not fit. The
///   carrier is not modified.
pub fn encode(
    payload: &Payload,
    factors: &SecretFactors,
    carrier: &[u8],
    mode: EmbedMode,
    config: &StegoConfig,
) -> Result<Vec<u8>, StegoError> {
    factors.validate()?;
    config.validate()?;
    payload.validate()?;

    let mut embedder = open_carrier(carrier, mode, Purpose::Embed)?;
    let cap = EmbedCapacity::new(mode, embedder.capacity_bits());
    tracing::debug!(?mode, carrier_bits = cap.carrier_bits, "carrier opened");

    let serialized = payload.to_bytes();
    let compressed = compress::compress(&serialized);
    tracing::debug!(raw = serialized.len(), compressed = compressed.len(), "payload compressed");
    cap.check_fits(compressed.len())?;

    let kdf = KeyDerivation::new(&config.kdf)?;
    let salt = kdf::random_salt();
    let key = kdf.derive(factors, &salt);
    let sealed = cipher::encrypt(&compressed, &key, &StegoEnvelope::prefix());

    let envelope = StegoEnvelope {
        salt,
        nonce: sealed.nonce,
        tag: sealed.tag,
        ciphertext: sealed.ciphertext,
    }
    .serialize();
    write_region(embedder.as_mut(), mode, &envelope)?;
    tracing::debug!(envelope_len = envelope.len(), max_payload = cap.max_payload_bytes(), "region embedded");

    embedder.to_image_bytes()
}

/// Recover the payload hidden in `stego`. With `mode == None` the mode is
/// detected.
///
/// # Errors
/// - [`StegoError::Validation`] for missing or malformed inputs.
/// - [`StegoError::Format`] when no readable envelope is present.
/// - [`StegoError::Decryption`] for wrong credentials or damaged data.
/// - [`StegoError::PayloadCorrupted`] if the authenticated plaintext is unusable.
pub fn decode(
    stego: &[u8],
    factors: &SecretFactors,
    mode: Option<EmbedMode>,
    config: &StegoConfig,
) -> Result<Payload, StegoError> {
    factors.validate()?;
    config.validate()?;

    let region = match mode {
        Some(mode) => detect::extract_region(stego, mode)?,
        None => detect::locate(stego)?.1,
    };
    let envelope = StegoEnvelope::parse(&region)?;
    tracing::debug!(ciphertext = envelope.ciphertext.len(), "envelope parsed");

    let kdf = KeyDerivation::new(&config.kdf)?;
    let key = kdf.derive(factors, &envelope.salt);
    let compressed = cipher::decrypt(
        &envelope.nonce,
        &envelope.ciphertext,
        &envelope.tag,
        &key,
        &StegoEnvelope::prefix(),
    )?;

    // wiped on drop, like `compressed`
    let serialized = compress::decompress(&compressed, config.max_decompressed_bytes)?;
    tracing::debug!(len = serialized.len(), "payload decompressed");
    Payload::from_bytes(serialized.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::carrier::DctColorMode;
    use crate::stego::config::KdfParams;
    use crate::stego::error::{FormatError, ValidationError};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

    fn fast() -> StegoConfig {
        StegoConfig {
            kdf: KdfParams { memory_kib: 1024, iterations: 1, parallelism: 1 },
            ..StegoConfig::default()
        }
    }

    fn factors() -> SecretFactors {
        SecretFactors::new(b"reference".to_vec(), "amber violin quiet harbor").with_pin("482913")
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(w, h, |x, y| Rgb([(x * 5 + y) as u8, (y * 3) as u8, (x ^ y) as u8]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn lsb_roundtrip_with_detection() {
        let cover = png(64, 64);
        let stego = encode(&Payload::text("hello"), &factors(), &cover, EmbedMode::Lsb, &fast()).unwrap();
        assert_eq!(detect::detect(&stego), Ok(EmbedMode::Lsb));
        assert_eq!(decode(&stego, &factors(), None, &fast()).unwrap(), Payload::text("hello"));
        assert_eq!(decode(&stego, &factors(), Some(EmbedMode::Lsb), &fast()).unwrap(), Payload::text("hello"));
    }

    #[test]
    fn validation_comes_first() {
        let cover = png(8, 8);
        let no_second = SecretFactors::new(b"r".to_vec(), "words");
        let err = encode(&Payload::text("x"), &no_second, &cover, EmbedMode::Lsb, &fast()).unwrap_err();
        assert!(matches!(err, StegoError::Validation(ValidationError::MissingSecondFactor)));

        let zero = StegoConfig { max_decompressed_bytes: 0, ..fast() };
        let err = decode(&cover, &factors(), None, &zero).unwrap_err();
        assert!(matches!(err, StegoError::Validation(ValidationError::ZeroDecompressionLimit)));
    }

    #[test]
    fn too_small_carrier_is_capacity_error() {
        let cover = png(8, 8);
        let err = encode(&Payload::text("x"), &factors(), &cover, EmbedMode::Lsb, &fast()).unwrap_err();
        assert!(matches!(err, StegoError::Capacity { available: 0, .. }));
    }

    #[test]
    fn dct_on_png_is_unsupported() {
        let err = encode(
            &Payload::text("x"),
            &factors(),
            &png(64, 64),
            EmbedMode::Dct(DctColorMode::Color),
            &fast(),
        )
        .unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedCarrier(_)));
    }

    #[test]
    fn clean_image_has_nothing() {
        let err = decode(&png(64, 64), &factors(), None, &fast()).unwrap_err();
        assert!(matches!(err, StegoError::Format(FormatError::NoStegoDataFound)));
    }
}
