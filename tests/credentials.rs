// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Every secret factor must matter, and bad factors are rejected up front.

mod common;

use common::*;
use veilpix_core::{decode, encode, EmbedMode, Payload, SecretFactors, StegoError, ValidationError};

const PASSPHRASE: &str = "amber violin quiet harbor";

fn full_factors() -> SecretFactors {
    SecretFactors::new(reference_photo(), PASSPHRASE)
        .with_pin("482913")
        .with_private_key(b"-----private key bytes-----".to_vec())
        .with_channel_key(b"channel-7".to_vec())
}

fn stego_with(factors: &SecretFactors) -> Vec<u8> {
    let cover = rgb_png(96, 96, 11);
    encode(&Payload::text("credential check"), factors, &cover, EmbedMode::Lsb, &fast_config()).unwrap()
}

fn assert_decryption_fails(stego: &[u8], factors: &SecretFactors, what: &str) {
    let result = decode(stego, factors, None, &fast_config());
    assert!(matches!(result, Err(StegoError::Decryption)), "changed {what}: got {result:?}");
}

#[test]
fn all_factors_roundtrip() {
    let stego = stego_with(&full_factors());
    let decoded = decode(&stego, &full_factors(), None, &fast_config()).unwrap();
    assert_eq!(decoded, Payload::text("credential check"));
}

#[test]
fn each_factor_changes_the_key() {
    let stego = stego_with(&full_factors());
    let mut other_photo = reference_photo();
    other_photo[40] ^= 0x01;

    let variants = [
        (
            "reference photo",
            SecretFactors::new(other_photo, PASSPHRASE)
                .with_pin("482913")
                .with_private_key(b"-----private key bytes-----".to_vec())
                .with_channel_key(b"channel-7".to_vec()),
        ),
        (
            "passphrase",
            SecretFactors::new(reference_photo(), "amber violin quiet harbour")
                .with_pin("482913")
                .with_private_key(b"-----private key bytes-----".to_vec())
                .with_channel_key(b"channel-7".to_vec()),
        ),
        (
            "PIN",
            SecretFactors::new(reference_photo(), PASSPHRASE)
                .with_pin("482914")
                .with_private_key(b"-----private key bytes-----".to_vec())
                .with_channel_key(b"channel-7".to_vec()),
        ),
        (
            "private key",
            SecretFactors::new(reference_photo(), PASSPHRASE)
                .with_pin("482913")
                .with_private_key(b"-----private key bytes-----!".to_vec())
                .with_channel_key(b"channel-7".to_vec()),
        ),
        (
            "channel key",
            SecretFactors::new(reference_photo(), PASSPHRASE)
                .with_pin("482913")
                .with_private_key(b"-----private key bytes-----".to_vec())
                .with_channel_key(b"channel-8".to_vec()),
        ),
        (
            "missing channel key",
            SecretFactors::new(reference_photo(), PASSPHRASE)
                .with_pin("482913")
                .with_private_key(b"-----private key bytes-----".to_vec()),
        ),
    ];
    for (what, factors) in &variants {
        assert_decryption_fails(&stego, factors, what);
    }
}

#[test]
fn passphrase_case_and_padding_are_ignored() {
    let stego = stego_with(&factors());
    let shouty = SecretFactors::new(reference_photo(), "  Amber VIOLIN quiet Harbor \n").with_pin("482913");
    assert_eq!(decode(&stego, &shouty, None, &fast_config()).unwrap(), Payload::text("credential check"));
}

#[test]
fn private_key_alone_is_a_second_factor() {
    let factors = SecretFactors::new(reference_photo(), PASSPHRASE).with_private_key(vec![7u8; 32]);
    let stego = stego_with(&factors);
    assert_eq!(decode(&stego, &factors, None, &fast_config()).unwrap(), Payload::text("credential check"));
}

#[test]
fn invalid_factors_are_rejected_before_work() {
    let cover = rgb_png(32, 32, 12);
    let cases = [
        (SecretFactors::new(Vec::new(), PASSPHRASE).with_pin("482913"), ValidationError::EmptyReferencePhoto),
        (SecretFactors::new(reference_photo(), "   ").with_pin("482913"), ValidationError::EmptyPassphrase),
        (SecretFactors::new(reference_photo(), PASSPHRASE), ValidationError::MissingSecondFactor),
        (SecretFactors::new(reference_photo(), PASSPHRASE).with_pin("12345"), ValidationError::InvalidPin),
        (SecretFactors::new(reference_photo(), PASSPHRASE).with_pin("12345a"), ValidationError::InvalidPin),
        (SecretFactors::new(reference_photo(), PASSPHRASE).with_private_key(Vec::new()), ValidationError::EmptyPrivateKey),
        (
            SecretFactors::new(reference_photo(), PASSPHRASE).with_pin("482913").with_channel_key(Vec::new()),
            ValidationError::EmptyChannelKey,
        ),
    ];
    for (factors, expected) in cases {
        match encode(&Payload::text("x"), &factors, &cover, EmbedMode::Lsb, &fast_config()) {
            Err(StegoError::Validation(got)) => assert_eq!(got, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
        match decode(&cover, &factors, None, &fast_config()) {
            Err(StegoError::Validation(got)) => assert_eq!(got, expected),
            other => panic!("expected {expected:?} on decode, got {other:?}"),
        }
    }
}

#[test]
fn long_filename_is_rejected() {
    let cover = rgb_png(64, 64, 13);
    let payload = Payload::file(Some("n".repeat(256)), b"data".to_vec());
    let result = encode(&payload, &factors(), &cover, EmbedMode::Lsb, &fast_config());
    assert!(matches!(result, Err(StegoError::Validation(ValidationError::FilenameTooLong { max: 255 }))));
}

#[test]
fn error_messages_do_not_leak_secrets() {
    let stego = stego_with(&factors());
    let wrong = SecretFactors::new(reference_photo(), PASSPHRASE).with_pin("999999");
    let msg = decode(&stego, &wrong, None, &fast_config()).unwrap_err().to_string();
    assert!(!msg.contains("999999"));
    assert!(!msg.contains("amber"));
    assert!(!format!("{wrong:?}").contains("999999"));
}
