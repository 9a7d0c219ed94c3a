// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Quantization tables: DQT segment parsing/writing and IJG quality scaling.

use super::block::{BLOCK_LEN, ZIGZAG_TO_NATURAL};
use super::error::{JpegError, Result};

/// A 64-entry quantization matrix in natural (row-major) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    pub values: [u16; BLOCK_LEN],
}

impl QuantTable {
    pub fn new(values: [u16; BLOCK_LEN]) -> Self {
        Self { values }
    }

    /// True when every step is 1, which is what maximum-quality encoders emit.
    pub fn is_unity(&self) -> bool {
        self.values.iter().all(|&v| v == 1)
    }
}

/// Which Annex K base table a quality scale starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Luminance,
    Chrominance,
}

/// T.81 Table K.1, natural order.
const STD_LUMINANCE: [u16; BLOCK_LEN] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// T.81 Table K.2, natural order.
const STD_CHROMINANCE: [u16; BLOCK_LEN] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// The Annex K table scaled the way libjpeg's `jpeg_quality_scaling` does,
/// clamped to baseline range 1..=255.
pub fn scaled_standard_table(kind: TableKind, quality: u8) -> QuantTable {
    let quality = u32::from(quality.clamp(1, 100));
    let scale = if quality < 50 { 5000 / quality } else { 200 - quality * 2 };
    let base = match kind {
        TableKind::Luminance => &STD_LUMINANCE,
        TableKind::Chrominance => &STD_CHROMINANCE,
    };
    let mut values = [0u16; BLOCK_LEN];
    for (out, &b) in values.iter_mut().zip(base.iter()) {
        let v = (u32::from(b) * scale + 50) / 100;
        *out = v.clamp(1, 255) as u16;
    }
    QuantTable::new(values)
}

/// Parse a DQT body (after the length field). One segment may define
/// several tables.
pub fn parse_dqt(body: &[u8]) -> Result<Vec<(u8, QuantTable)>> {
    let mut tables = Vec::new();
    let mut rest = body;
    while let Some((&pq_tq, tail)) = rest.split_first() {
        let precision = pq_tq >> 4;
        let id = pq_tq & 0x0F;
        if id > 3 {
            return Err(JpegError::InvalidTableId(id));
        }
        let width = match precision {
            0 => 1,
            1 => 2,
            _ => return Err(JpegError::InvalidMarkerData("DQT precision")),
        };
        let need = BLOCK_LEN * width;
        if tail.len() < need {
            return Err(JpegError::UnexpectedEof);
        }
        let mut values = [0u16; BLOCK_LEN];
        for (zz, &natural) in ZIGZAG_TO_NATURAL.iter().enumerate() {
            values[natural] = if width == 1 {
                u16::from(tail[zz])
            } else {
                u16::from_be_bytes([tail[2 * zz], tail[2 * zz + 1]])
            };
        }
        if values.contains(&0) {
            return Err(JpegError::InvalidMarkerData("zero quantization step"));
        }
        tables.push((id, QuantTable::new(values)));
        rest = &tail[need..];
    }
    Ok(tables)
}

/// Serialize tables into one DQT body, choosing 8-bit precision where the
/// values allow it.
pub fn write_dqt(tables: &[Option<QuantTable>; 4]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, table) in tables.iter().enumerate() {
        let Some(table) = table else { continue };
        let wide = table.values.iter().any(|&v| v > 255);
        body.push(((wide as u8) << 4) | id as u8);
        for &natural in ZIGZAG_TO_NATURAL.iter() {
            let v = table.values[natural];
            if wide {
                body.extend_from_slice(&v.to_be_bytes());
            } else {
                body.push(v as u8);
            }
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_50_is_the_base_table() {
        let t = scaled_standard_table(TableKind::Luminance, 50);
        assert_eq!(t.values, STD_LUMINANCE);
    }

    #[test]
    fn quality_100_is_unity() {
        assert!(scaled_standard_table(TableKind::Luminance, 100).is_unity());
        assert!(scaled_standard_table(TableKind::Chrominance, 100).is_unity());
    }

    #[test]
    fn quality_95_is_not_unity() {
        let t = scaled_standard_table(TableKind::Luminance, 95);
        assert!(!t.is_unity());
        // 16 * 10 / 100 rounded
        assert_eq!(t.values[0], 2);
        assert_eq!(*t.values.iter().max().unwrap(), 12);
    }

    #[test]
    fn dqt_write_then_parse() {
        let mut tables = [None; 4];
        tables[0] = Some(scaled_standard_table(TableKind::Luminance, 75));
        tables[1] = Some(scaled_standard_table(TableKind::Chrominance, 75));
        let body = write_dqt(&tables);
        assert_eq!(body.len(), 2 * 65);
        let parsed = parse_dqt(&body).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(Some(parsed[0].1), tables[0]);
        assert_eq!(parsed[1].0, 1);
    }

    #[test]
    fn sixteen_bit_tables() {
        let mut values = [300u16; BLOCK_LEN];
        values[0] = 1;
        let mut tables = [None; 4];
        tables[2] = Some(QuantTable::new(values));
        let body = write_dqt(&tables);
        assert_eq!(body[0], 0x12);
        assert_eq!(body.len(), 1 + 128);
        let parsed = parse_dqt(&body).unwrap();
        assert_eq!(parsed[0], (2, QuantTable::new(values)));
    }

    #[test]
    fn rejects_bad_table_id() {
        let mut body = vec![0x05];
        body.extend_from_slice(&[1u8; 64]);
        assert_eq!(parse_dqt(&body), Err(JpegError::InvalidTableId(5)));
    }
}
