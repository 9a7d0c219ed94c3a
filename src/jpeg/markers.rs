// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Marker segments and the frame/scan headers they carry.

use super::error::{JpegError, Result};

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;
pub const DHT: u8 = 0xC4;
pub const SOF0: u8 = 0xC0;
pub const SOF1: u8 = 0xC1;
pub const SOF2: u8 = 0xC2;
pub const DAC: u8 = 0xCC;

/// A header segment kept verbatim between SOI and SOS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,
    pub body: Vec<u8>,
}

impl Segment {
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        write_segment(out, self.marker, &self.body)
    }
}

/// Append `FF marker len body`, where len counts itself.
pub fn write_segment(out: &mut Vec<u8>, marker: u8, body: &[u8]) -> Result<()> {
    let len = u16::try_from(body.len() + 2)
        .map_err(|_| JpegError::InvalidMarkerData("segment longer than 65535 bytes"))?;
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
    Ok(())
}

/// Header segments in file order plus the SOS body and the offset of the
/// first entropy-coded byte.
pub struct Headers {
    pub segments: Vec<Segment>,
    pub sos_body: Vec<u8>,
    pub scan_start: usize,
}

/// Walk marker segments from SOI up to and including the first SOS.
pub fn read_headers(data: &[u8]) -> Result<Headers> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(JpegError::InvalidSoi);
    }
    let mut pos = 2;
    let mut segments = Vec::new();
    loop {
        // tolerate fill bytes before a marker
        while data.get(pos) == Some(&0xFF) && data.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        if pos >= data.len() {
            return Err(JpegError::UnexpectedEof);
        }
        if data[pos] != 0xFF {
            return Err(JpegError::InvalidMarkerData("expected marker"));
        }
        let marker = *data.get(pos + 1).ok_or(JpegError::UnexpectedEof)?;
        pos += 2;
        match marker {
            EOI => return Err(JpegError::InvalidMarkerData("EOI before SOS")),
            0xD0..=0xD7 | 0x01 => continue,
            _ => {}
        }
        let len_bytes = data.get(pos..pos + 2).ok_or(JpegError::UnexpectedEof)?;
        let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
        if len < 2 {
            return Err(JpegError::InvalidMarkerData("segment length"));
        }
        let body = data.get(pos + 2..pos + len).ok_or(JpegError::UnexpectedEof)?.to_vec();
        pos += len;
        if marker == SOS {
            return Ok(Headers { segments, sos_body: body, scan_start: pos });
        }
        segments.push(Segment { marker, body });
    }
}

/// One component declared in SOF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: u8,
    pub h_sampling: u8,
    pub v_sampling: u8,
    pub quant_table: u8,
}

/// Parsed SOF0/SOF1 header with the derived MCU geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub width: u16,
    pub height: u16,
    pub components: Vec<Component>,
    pub max_h: u8,
    pub max_v: u8,
    pub mcus_wide: usize,
    pub mcus_tall: usize,
}

impl FrameHeader {
    /// Blocks per row for component `idx`, MCU padding included.
    pub fn blocks_wide(&self, idx: usize) -> usize {
        self.mcus_wide * usize::from(self.components[idx].h_sampling)
    }

    pub fn blocks_tall(&self, idx: usize) -> usize {
        self.mcus_tall * usize::from(self.components[idx].v_sampling)
    }

    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}

/// Check a SOFn marker; only the Huffman sequential processes pass.
pub fn check_process(marker: u8) -> Result<()> {
    match marker {
        SOF0 | SOF1 => Ok(()),
        SOF2 => Err(JpegError::Progressive),
        0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => Err(JpegError::UnsupportedProcess(marker)),
        _ => Ok(()),
    }
}

pub fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && marker != DHT && marker != 0xC8 && marker != DAC
}

/// Largest width or height accepted.
pub const MAX_DIMENSION: u16 = 8192;

/// Largest pixel count (width x height) accepted.
pub const MAX_PIXELS: u32 = 16_000_000;

/// Frame size limits, checked before any plane is allocated.
fn check_dimensions(width: u16, height: u16) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(JpegError::InvalidDimensions);
    }
    if u32::from(width) * u32::from(height) > MAX_PIXELS {
        return Err(JpegError::InvalidDimensions);
    }
    Ok(())
}

pub fn parse_sof(body: &[u8]) -> Result<FrameHeader> {
    if body.len() < 6 {
        return Err(JpegError::UnexpectedEof);
    }
    if body[0] != 8 {
        return Err(JpegError::UnsupportedPrecision(body[0]));
    }
    let height = u16::from_be_bytes([body[1], body[2]]);
    let width = u16::from_be_bytes([body[3], body[4]]);
    let count = usize::from(body[5]);
    check_dimensions(width, height)?;
    if count == 0 || count > 4 {
        return Err(JpegError::InvalidDimensions);
    }
    let fields = body.get(6..6 + 3 * count).ok_or(JpegError::UnexpectedEof)?;
    let mut components = Vec::with_capacity(count);
    for chunk in fields.chunks_exact(3) {
        let h = chunk[1] >> 4;
        let v = chunk[1] & 0x0F;
        if !(1..=4).contains(&h) || !(1..=4).contains(&v) {
            return Err(JpegError::InvalidDimensions);
        }
        if chunk[2] > 3 {
            return Err(JpegError::InvalidTableId(chunk[2]));
        }
        components.push(Component { id: chunk[0], h_sampling: h, v_sampling: v, quant_table: chunk[2] });
    }
    // A lone component is coded non-interleaved: one block per MCU.
    if let [only] = components.as_mut_slice() {
        only.h_sampling = 1;
        only.v_sampling = 1;
    }
    let max_h = components.iter().map(|c| c.h_sampling).max().unwrap_or(1);
    let max_v = components.iter().map(|c| c.v_sampling).max().unwrap_or(1);
    let mcu_w = 8 * usize::from(max_h);
    let mcu_h = 8 * usize::from(max_v);
    Ok(FrameHeader {
        width,
        height,
        max_h,
        max_v,
        mcus_wide: usize::from(width).div_ceil(mcu_w),
        mcus_tall: usize::from(height).div_ceil(mcu_h),
        components,
    })
}

/// Scan component selector resolved against the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    pub component: usize,
    pub dc_table: u8,
    pub ac_table: u8,
}

pub fn parse_sos(body: &[u8], frame: &FrameHeader) -> Result<Vec<ScanComponent>> {
    let count = usize::from(*body.first().ok_or(JpegError::UnexpectedEof)?);
    let fields = body.get(1..1 + 2 * count).ok_or(JpegError::UnexpectedEof)?;
    let spectral = body.get(1 + 2 * count..4 + 2 * count).ok_or(JpegError::UnexpectedEof)?;
    if spectral != [0, 63, 0] {
        return Err(JpegError::InvalidMarkerData("non-sequential spectral selection"));
    }
    let mut selected = Vec::with_capacity(count);
    for pair in fields.chunks_exact(2) {
        let component = frame.component_index(pair[0]).ok_or(JpegError::UnknownComponent(pair[0]))?;
        let (dc_table, ac_table) = (pair[1] >> 4, pair[1] & 0x0F);
        if dc_table > 3 || ac_table > 3 {
            return Err(JpegError::InvalidTableId(dc_table.max(ac_table)));
        }
        selected.push(ScanComponent { component, dc_table, ac_table });
    }
    Ok(selected)
}

pub fn parse_dri(body: &[u8]) -> Result<u16> {
    match body {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(JpegError::UnexpectedEof),
    }
}
