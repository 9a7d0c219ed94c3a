// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! The secret factors both parties must hold.
//!
//! A reference photo and a passphrase are always required. At least one of
//! a PIN or a private key must be added on top, and a channel key can bind
//! messages to one group of users. Factors are wiped from memory on drop
//! and never printed.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::stego::error::ValidationError;

/// Accepted PIN lengths.
pub const PIN_DIGITS: std::ops::RangeInclusive<usize> = 6..=9;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretFactors {
    reference_photo: Vec<u8>,
    passphrase: String,
    pin: Option<String>,
    private_key: Option<Vec<u8>>,
    channel_key: Option<Vec<u8>>,
}

impl SecretFactors {
    /// Required factors. Add a PIN or private key before use.
    pub fn new(reference_photo: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
        Self {
            reference_photo: reference_photo.into(),
            passphrase: passphrase.into(),
            pin: None,
            private_key: None,
            channel_key: None,
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// Raw key material, e.g. the bytes of a PEM file.
    pub fn with_private_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn with_channel_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.channel_key = Some(key.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reference_photo.is_empty() {
            return Err(ValidationError::EmptyReferencePhoto);
        }
        if self.passphrase.trim().is_empty() {
            return Err(ValidationError::EmptyPassphrase);
        }
        if self.pin.is_none() && self.private_key.is_none() {
            return Err(ValidationError::MissingSecondFactor);
        }
        if let Some(pin) = &self.pin {
            validate_pin(pin)?;
        }
        if self.private_key.as_ref().is_some_and(|k| k.is_empty()) {
            return Err(ValidationError::EmptyPrivateKey);
        }
        if self.channel_key.as_ref().is_some_and(|k| k.is_empty()) {
            return Err(ValidationError::EmptyChannelKey);
        }
        Ok(())
    }

    pub(crate) fn reference_photo(&self) -> &[u8] {
        &self.reference_photo
    }

    /// Passphrase with surrounding whitespace removed, lowercased.
    pub(crate) fn normalized_passphrase(&self) -> String {
        self.passphrase.trim().to_lowercase()
    }

    pub(crate) fn pin(&self) -> &[u8] {
        self.pin.as_deref().unwrap_or_default().as_bytes()
    }

    pub(crate) fn private_key(&self) -> &[u8] {
        self.private_key.as_deref().unwrap_or_default()
    }

    pub(crate) fn channel_key(&self) -> &[u8] {
        self.channel_key.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for SecretFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretFactors")
            .field("reference_photo", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .field("pin", &self.pin.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("channel_key", &self.channel_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// 6 to 9 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if PIN_DIGITS.contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> SecretFactors {
        SecretFactors::new(b"photo-bytes".to_vec(), "apple river stone cloud")
    }

    #[test]
    fn pin_or_key_required() {
        assert_eq!(base().validate(), Err(ValidationError::MissingSecondFactor));
        assert!(base().with_pin("123456").validate().is_ok());
        assert!(base().with_private_key(b"-----BEGIN KEY-----".to_vec()).validate().is_ok());
    }

    #[test]
    fn required_factors_checked_first() {
        let f = SecretFactors::new(Vec::new(), "pass").with_pin("123456");
        assert_eq!(f.validate(), Err(ValidationError::EmptyReferencePhoto));
        let f = SecretFactors::new(b"x".to_vec(), "  \t ").with_pin("123456");
        assert_eq!(f.validate(), Err(ValidationError::EmptyPassphrase));
    }

    #[test]
    fn empty_optional_factors_rejected() {
        let f = base().with_pin("123456").with_channel_key(Vec::new());
        assert_eq!(f.validate(), Err(ValidationError::EmptyChannelKey));
        let f = base().with_private_key(Vec::new());
        assert_eq!(f.validate(), Err(ValidationError::EmptyPrivateKey));
    }

    #[test]
    fn passphrase_normalization() {
        let f = SecretFactors::new(b"x".to_vec(), "  Apple River ");
        assert_eq!(f.normalized_passphrase(), "apple river");
    }

    #[test]
    fn debug_redacts_everything() {
        let f = base().with_pin("987654").with_channel_key(b"team".to_vec());
        let s = format!("{f:?}");
        assert!(!s.contains("987654"));
        assert!(!s.contains("apple"));
        assert!(!s.contains("team"));
    }

    proptest! {
        #[test]
        fn digit_pins_of_valid_length_pass(pin in "[0-9]{6,9}") {
            prop_assert!(validate_pin(&pin).is_ok());
        }

        #[test]
        fn short_or_long_pins_fail(pin in "[0-9]{0,5}|[0-9]{10,14}") {
            prop_assert_eq!(validate_pin(&pin), Err(ValidationError::InvalidPin));
        }

        #[test]
        fn non_digit_pins_fail(pin in "[0-9]{3}[a-zA-Z ][0-9]{3}") {
            prop_assert_eq!(validate_pin(&pin), Err(ValidationError::InvalidPin));
        }
    }
}
