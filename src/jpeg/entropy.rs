// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-level access to entropy-coded segments.
//!
//! Both directions are MSB first and handle byte stuffing (`0xFF` is written
//! as `0xFF 0x00`). When the reader runs into a marker it stops consuming
//! input and yields zero bits, so a short final segment decodes the same way
//! libjpeg decodes it.

use super::error::{JpegError, Result};

pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    current: u8,
    remaining: u8,
    pending_marker: Option<u8>,
}

impl<'a> BitReader<'a> {
    /// Reader starting at `pos`, the first byte after the SOS header.
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos,
            current: 0,
            remaining: 0,
            pending_marker: None,
        }
    }

    pub fn read_bit(&mut self) -> Result<u8> {
        if self.remaining == 0 {
            self.current = self.next_byte()?;
            self.remaining = 8;
        }
        self.remaining -= 1;
        Ok((self.current >> self.remaining) & 1)
    }

    /// Read `count` bits (0..=16), right aligned.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        let mut value = 0u16;
        for _ in 0..count {
            value = (value << 1) | u16::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Marker hit while reading, if any.
    pub fn pending_marker(&self) -> Option<u8> {
        self.pending_marker
    }

    /// Drop buffered bits and step over the RSTn marker that ends the
    /// current restart interval. A missing marker is tolerated.
    pub fn restart(&mut self) {
        self.remaining = 0;
        if let Some(m) = self.pending_marker {
            if (0xD0..=0xD7).contains(&m) {
                self.pending_marker = None;
            }
            return;
        }
        while self.pos + 1 < self.data.len() && self.data[self.pos] == 0xFF {
            let next = self.data[self.pos + 1];
            if next == 0xFF {
                self.pos += 1;
            } else if (0xD0..=0xD7).contains(&next) {
                self.pos += 2;
                return;
            } else {
                return;
            }
        }
    }

    fn next_byte(&mut self) -> Result<u8> {
        if self.pending_marker.is_some() {
            return Ok(0);
        }
        loop {
            let byte = *self.data.get(self.pos).ok_or(JpegError::UnexpectedEof)?;
            if byte != 0xFF {
                self.pos += 1;
                return Ok(byte);
            }
            let next = *self.data.get(self.pos + 1).ok_or(JpegError::UnexpectedEof)?;
            match next {
                0x00 => {
                    self.pos += 2;
                    return Ok(0xFF);
                }
                // fill byte
                0xFF => self.pos += 1,
                marker => {
                    self.pos += 2;
                    self.pending_marker = Some(marker);
                    return Ok(0);
                }
            }
        }
    }
}

#[derive(Default)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    filled: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `count` bits of `value` (count 0..=16).
    pub fn write_bits(&mut self, value: u16, count: u8) {
        if count == 0 {
            return;
        }
        let mask = (1u32 << count) - 1;
        self.acc = (self.acc << count) | (u32::from(value) & mask);
        self.filled += count;
        while self.filled >= 8 {
            self.filled -= 8;
            let byte = (self.acc >> self.filled) as u8;
            self.push(byte);
        }
        self.acc &= (1u32 << self.filled) - 1;
    }

    /// Pad the last partial byte with 1-bits, leaving the writer empty.
    pub fn pad_to_byte(&mut self) {
        if self.filled > 0 {
            let pad = 8 - self.filled;
            self.write_bits((1u16 << pad) - 1, pad);
        }
    }

    /// Write a marker (no stuffing) after padding the current byte.
    pub fn write_marker(&mut self, marker: u8) {
        self.pad_to_byte();
        self.out.push(0xFF);
        self.out.push(marker);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pad_to_byte();
        self.out
    }

    fn push(&mut self, byte: u8) {
        self.out.push(byte);
        if byte == 0xFF {
            self.out.push(0x00);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let data = [0b1011_0010];
        let mut r = BitReader::new(&data, 0);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bits(5).unwrap(), 0b10010);
    }

    #[test]
    fn unstuffs_ff00() {
        let data = [0xFF, 0x00, 0x0F];
        let mut r = BitReader::new(&data, 0);
        assert_eq!(r.read_bits(12).unwrap(), 0xFF0);
    }

    #[test]
    fn marker_yields_zero_bits() {
        let data = [0xAA, 0xFF, 0xD9];
        let mut r = BitReader::new(&data, 0);
        assert_eq!(r.read_bits(8).unwrap(), 0xAA);
        assert_eq!(r.read_bits(8).unwrap(), 0);
        assert_eq!(r.pending_marker(), Some(0xD9));
        assert_eq!(r.read_bits(4).unwrap(), 0);
    }

    #[test]
    fn restart_skips_rst_marker() {
        let data = [0b1000_0000, 0xFF, 0xD3, 0b0100_0000];
        let mut r = BitReader::new(&data, 0);
        assert_eq!(r.read_bit().unwrap(), 1);
        r.restart();
        assert_eq!(r.read_bits(2).unwrap(), 0b01);
    }

    #[test]
    fn writer_stuffs_and_pads() {
        let mut w = BitWriter::new();
        w.write_bits(0xFF, 8);
        w.write_bits(0b01, 2);
        assert_eq!(w.finish(), vec![0xFF, 0x00, 0b0111_1111]);
    }

    #[test]
    fn writer_emits_markers_between_segments() {
        let mut w = BitWriter::new();
        w.write_bits(0b0, 1);
        w.write_marker(0xD0);
        w.write_bits(0xA, 4);
        assert_eq!(w.finish(), vec![0x7F, 0xFF, 0xD0, 0xAF]);
    }
}
