// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Carrier generators and credentials shared by the integration tests.
//!
//! Carriers are synthesized from a seeded ChaCha stream, smoothed so JPEG
//! blocks look like photo content rather than white noise.

#![allow(dead_code)]

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, ImageFormat, Luma, Rgb, Rgba};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use veilpix_core::{KdfParams, SecretFactors, StegoConfig};

/// Argon2 cheap enough for tests.
pub fn fast_config() -> StegoConfig {
    StegoConfig {
        kdf: KdfParams { memory_kib: 1024, iterations: 1, parallelism: 1 },
        ..StegoConfig::default()
    }
}

pub fn reference_photo() -> Vec<u8> {
    rgb_png(32, 32, 99)
}

pub fn factors() -> SecretFactors {
    SecretFactors::new(reference_photo(), "amber violin quiet harbor").with_pin("482913")
}

/// Interleaved samples: a smooth gradient plus seeded noise.
fn samples(w: u32, h: u32, channels: u32, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Vec::with_capacity((w * h * channels) as usize);
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let base = (x * 3 + y * 2 + c * 40) % 200;
                out.push((base + rng.gen_range(0..40)) as u8);
            }
        }
    }
    out
}

fn encode_as(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

pub fn rgb_image(w: u32, h: u32, seed: u64) -> DynamicImage {
    let buf: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(w, h, samples(w, h, 3, seed)).unwrap();
    DynamicImage::ImageRgb8(buf)
}

pub fn rgb_png(w: u32, h: u32, seed: u64) -> Vec<u8> {
    encode_as(rgb_image(w, h, seed), ImageFormat::Png)
}

pub fn rgb_bmp(w: u32, h: u32, seed: u64) -> Vec<u8> {
    encode_as(rgb_image(w, h, seed), ImageFormat::Bmp)
}

pub fn rgba_png(w: u32, h: u32, seed: u64) -> Vec<u8> {
    let mut raw = samples(w, h, 4, seed);
    for (i, px) in raw.chunks_mut(4).enumerate() {
        px[3] = (i % 251) as u8;
    }
    let buf: ImageBuffer<Rgba<u8>, _> = ImageBuffer::from_raw(w, h, raw).unwrap();
    encode_as(DynamicImage::ImageRgba8(buf), ImageFormat::Png)
}

pub fn gray_png(w: u32, h: u32, seed: u64) -> Vec<u8> {
    let buf: ImageBuffer<Luma<u8>, _> = ImageBuffer::from_raw(w, h, samples(w, h, 1, seed)).unwrap();
    encode_as(DynamicImage::ImageLuma8(buf), ImageFormat::Png)
}

pub fn rgb_jpeg(w: u32, h: u32, quality: u8, seed: u64) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&samples(w, h, 3, seed), w, h, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

pub fn gray_jpeg(w: u32, h: u32, quality: u8, seed: u64) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&samples(w, h, 1, seed), w, h, ExtendedColorType::L8)
        .unwrap();
    out
}

/// Random bytes that Brotli cannot shrink.
pub fn incompressible(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}
