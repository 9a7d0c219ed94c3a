// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Payload serialization.
//!
//! The type tag and filename live inside the encrypted content, never in the
//! envelope header:
//!
//! ```text
//! text:  [0x01][UTF-8 message]
//! file:  [0x02][name_len: u8][name: UTF-8, name_len bytes][content]
//! ```
//!
//! `name_len == 0` means the file was sent without a name.

use crate::stego::error::{StegoError, ValidationError};

const KIND_TEXT: u8 = 0x01;
const KIND_FILE: u8 = 0x02;

/// Longest filename carried, in UTF-8 bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// What the sender hid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    File(FilePayload),
}

/// A binary attachment with its original name, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

impl Payload {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    pub fn file(filename: Option<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::File(FilePayload { filename, content: content.into() })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::File(FilePayload { filename: Some(name), .. }) if name.len() > MAX_FILENAME_LEN => {
                Err(ValidationError::FilenameTooLong { max: MAX_FILENAME_LEN })
            }
            _ => Ok(()),
        }
    }

    /// Serialized form fed to the compressor. Call [`validate`](Self::validate)
    /// first; longer filenames are cut at a character boundary.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => {
                let mut out = Vec::with_capacity(1 + text.len());
                out.push(KIND_TEXT);
                out.extend_from_slice(text.as_bytes());
                out
            }
            Self::File(file) => {
                let name = file.filename.as_deref().map(clip_filename).unwrap_or_default();
                let mut out = Vec::with_capacity(2 + name.len() + file.content.len());
                out.push(KIND_FILE);
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
                out.extend_from_slice(&file.content);
                out
            }
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, StegoError> {
        let (&kind, body) = data.split_first().ok_or(StegoError::PayloadCorrupted)?;
        match kind {
            KIND_TEXT => {
                let text = std::str::from_utf8(body).map_err(|_| StegoError::PayloadCorrupted)?;
                Ok(Self::Text(text.to_owned()))
            }
            KIND_FILE => {
                let (&name_len, rest) = body.split_first().ok_or(StegoError::PayloadCorrupted)?;
                let name_len = usize::from(name_len);
                if rest.len() < name_len {
                    return Err(StegoError::PayloadCorrupted);
                }
                let (name, content) = rest.split_at(name_len);
                let filename = match name_len {
                    0 => None,
                    _ => Some(
                        std::str::from_utf8(name)
                            .map_err(|_| StegoError::PayloadCorrupted)?
                            .to_owned(),
                    ),
                };
                Ok(Self::File(FilePayload { filename, content: content.to_vec() }))
            }
            _ => Err(StegoError::PayloadCorrupted),
        }
    }
}

fn clip_filename(name: &str) -> &str {
    if name.len() <= MAX_FILENAME_LEN {
        return name;
    }
    let mut end = MAX_FILENAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_layout() {
        let bytes = Payload::text("hi").to_bytes();
        assert_eq!(bytes, [0x01, b'h', b'i']);
        assert_eq!(Payload::from_bytes(&bytes).unwrap(), Payload::text("hi"));
    }

    #[test]
    fn file_with_and_without_name() {
        let named = Payload::file(Some("notes.txt".into()), vec![0u8, 1, 2, 0xFF]);
        let bytes = named.to_bytes();
        assert_eq!(&bytes[..2], &[0x02, 9]);
        assert_eq!(Payload::from_bytes(&bytes).unwrap(), named);

        let anonymous = Payload::file(None, b"raw".to_vec());
        assert_eq!(anonymous.to_bytes(), [0x02, 0, b'r', b'a', b'w']);
        assert_eq!(Payload::from_bytes(&anonymous.to_bytes()).unwrap(), anonymous);
    }

    #[test]
    fn unicode_filename() {
        let p = Payload::file(Some("\u{00fc}bersicht-\u{1f4c4}.pdf".into()), b"%PDF".to_vec());
        assert_eq!(Payload::from_bytes(&p.to_bytes()).unwrap(), p);
    }

    #[test]
    fn long_filename_rejected_by_validate() {
        let p = Payload::file(Some("a".repeat(256)), Vec::new());
        assert_eq!(p.validate(), Err(ValidationError::FilenameTooLong { max: 255 }));
        assert!(Payload::file(Some("a".repeat(255)), Vec::new()).validate().is_ok());
    }

    #[test]
    fn clipping_respects_char_boundaries() {
        let name = "\u{00e9}".repeat(200);
        let clipped = clip_filename(&name);
        assert!(clipped.len() <= MAX_FILENAME_LEN);
        assert_eq!(clipped.len() % 2, 0);
    }

    #[test]
    fn malformed_payloads() {
        let cases: [&[u8]; 5] = [&[], &[0x07, 1, 2], &[0x01, 0xC3], &[0x02], &[0x02, 5, b'a']];
        for bad in cases {
            assert!(matches!(Payload::from_bytes(bad), Err(StegoError::PayloadCorrupted)), "{bad:?}");
        }
    }
}
