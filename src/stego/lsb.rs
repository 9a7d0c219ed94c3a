// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! LSB embedding in lossless raster images.
//!
//! One bit per color sample, row-major pixel order, channels in storage
//! order (L or R, G, B). Alpha samples are skipped and never modified.
//! Output is always PNG in the carrier's own layout.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};

use crate::jpeg::markers::{MAX_DIMENSION, MAX_PIXELS};
use crate::stego::carrier::{Embedder, Purpose};
use crate::stego::error::{CarrierError, FormatError, StegoError};

/// 8-bit sample layouts the carrier keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    L8,
    La8,
    Rgb8,
    Rgba8,
}

impl Layout {
    fn channels(self) -> usize {
        match self {
            Self::L8 => 1,
            Self::La8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    fn color_channels(self) -> usize {
        match self {
            Self::L8 | Self::La8 => 1,
            Self::Rgb8 | Self::Rgba8 => 3,
        }
    }

    fn extended(self) -> ExtendedColorType {
        match self {
            Self::L8 => ExtendedColorType::L8,
            Self::La8 => ExtendedColorType::La8,
            Self::Rgb8 => ExtendedColorType::Rgb8,
            Self::Rgba8 => ExtendedColorType::Rgba8,
        }
    }
}

/// A decoded raster held as interleaved 8-bit samples.
#[derive(Debug, Clone)]
pub struct RasterCarrier {
    layout: Layout,
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// Lossless containers accepted as encode input.
fn check_lossless(format: ImageFormat) -> Result<(), CarrierError> {
    match format {
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff => Ok(()),
        ImageFormat::Jpeg => Err(CarrierError::LossyFormat("JPEG")),
        ImageFormat::Gif => Err(CarrierError::LossyFormat("GIF")),
        ImageFormat::WebP => Err(CarrierError::LossyFormat("WebP")),
        _ => Err(CarrierError::Unrecognized),
    }
}

/// Same frame limits as the JPEG codec, checked from the header alone.
fn check_dimensions(width: u32, height: u32) -> Result<(), CarrierError> {
    let side = u32::from(MAX_DIMENSION);
    if width > side || height > side || u64::from(width) * u64::from(height) > u64::from(MAX_PIXELS) {
        return Err(CarrierError::TooLarge { width, height });
    }
    Ok(())
}

impl RasterCarrier {
    /// Decode `bytes`. Encode carriers must be PNG, BMP or TIFF; extraction
    /// takes anything the decoder reads.
    pub fn from_bytes(bytes: &[u8], purpose: Purpose) -> Result<Self, CarrierError> {
        let format = image::guess_format(bytes).map_err(|_| CarrierError::Unrecognized)?;
        if purpose == Purpose::Embed {
            check_lossless(format)?;
        }
        let raster = |e: image::ImageError| CarrierError::Raster(e.to_string());
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(raster)?;
        check_dimensions(width, height)?;
        let img = ImageReader::with_format(Cursor::new(bytes), format).decode().map_err(raster)?;
        Ok(Self::from_image(img))
    }

    /// Reduce any decoded image to one of the 8-bit layouts.
    pub fn from_image(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (layout, samples) = match img.color() {
            ColorType::L8 | ColorType::L16 => (Layout::L8, img.into_luma8().into_raw()),
            ColorType::La8 | ColorType::La16 => (Layout::La8, img.into_luma_alpha8().into_raw()),
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (Layout::Rgb8, img.into_rgb8().into_raw()),
            c if c.has_alpha() => (Layout::Rgba8, img.into_rgba8().into_raw()),
            _ => (Layout::Rgb8, img.into_rgb8().into_raw()),
        };
        Self { layout, width, height, samples }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn has_alpha(&self) -> bool {
        self.layout.channels() != self.layout.color_channels()
    }

    /// Index into `samples` of embedding slot `slot`.
    fn sample_index(&self, slot: usize) -> usize {
        let cc = self.layout.color_channels();
        (slot / cc) * self.layout.channels() + slot % cc
    }
}

impl Embedder for RasterCarrier {
    fn capacity_bits(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.color_channels()
    }

    fn embed_bits(&mut self, bits: &[u8]) -> Result<(), StegoError> {
        let available = self.capacity_bits();
        if bits.len() > available {
            return Err(StegoError::Capacity { needed: bits.len().div_ceil(8), available: available / 8 });
        }
        for (slot, &bit) in bits.iter().enumerate() {
            let i = self.sample_index(slot);
            self.samples[i] = (self.samples[i] & 0xFE) | (bit & 1);
        }
        Ok(())
    }

    fn extract_bits(&self, start: usize, count: usize) -> Result<Vec<u8>, StegoError> {
        let end = start.checked_add(count).ok_or(FormatError::Truncated)?;
        if end > self.capacity_bits() {
            return Err(FormatError::Truncated.into());
        }
        Ok((start..end).map(|slot| self.samples[self.sample_index(slot)] & 1).collect())
    }

    fn to_image_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&self.samples, self.width, self.height, self.layout.extended())
            .map_err(|e| CarrierError::Raster(e.to_string()))?;
        Ok(out)
    }
}
