// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Pure-Rust JPEG coefficient codec (std only).
//!
//! Reads baseline JPEG files into quantized DCT coefficients and writes them
//! back without ever touching the pixel domain, so coefficient edits survive
//! a save exactly.
//!
//! Supports:
//! - Baseline and extended sequential Huffman DCT (SOF0/SOF1), 8-bit
//! - Grayscale, YCbCr and other component counts up to 4
//! - 4:4:4, 4:2:2 and 4:2:0 chroma subsampling
//! - Restart intervals (DRI/RSTn)
//! - Optimal Huffman table rebuild and in-place requantization
//!
//! Progressive, lossless, hierarchical and arithmetic-coded streams are
//! rejected at parse time, as are files whose first scan does not carry
//! every component (`PartialScan`, e.g. a baseline file written as one
//! non-interleaved scan per component). Frames above
//! [`markers::MAX_DIMENSION`] per side or [`markers::MAX_PIXELS`] in total
//! are `InvalidDimensions`.

pub mod block;
pub mod entropy;
pub mod error;
pub mod huffman;
pub mod markers;
pub mod quant;
pub mod scan;

use block::CoefficientPlane;
use error::{JpegError, Result};
use huffman::{optimal_spec, parse_dht, write_dht, HuffmanSpec, TableClass};
use markers::{FrameHeader, ScanComponent, Segment};
use quant::{parse_dqt, write_dqt, QuantTable};
use scan::FrequencyCounter;

/// A baseline JPEG held as quantized DCT coefficients.
///
/// Parse with [`JpegCoefficients::from_bytes`], edit planes through
/// [`plane_mut`](Self::plane_mut), then write with
/// [`to_bytes`](Self::to_bytes). When edits introduce symbols the stored
/// Huffman tables lack, `to_bytes` fails with
/// [`JpegError::MissingHuffmanCode`]; call
/// [`rebuild_huffman_tables`](Self::rebuild_huffman_tables) and retry.
#[derive(Debug, Clone)]
pub struct JpegCoefficients {
    frame: FrameHeader,
    /// One plane per frame component, frame order.
    planes: Vec<CoefficientPlane>,
    quant: [Option<QuantTable>; 4],
    dc_specs: [Option<HuffmanSpec>; 4],
    ac_specs: [Option<HuffmanSpec>; 4],
    scan: Vec<ScanComponent>,
    restart_interval: u16,
    /// Header segments between SOI and SOS, file order.
    segments: Vec<Segment>,
    sos_body: Vec<u8>,
}

impl JpegCoefficients {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let headers = markers::read_headers(data)?;

        let mut frame = None;
        let mut quant: [Option<QuantTable>; 4] = [None; 4];
        let mut dc_specs: [Option<HuffmanSpec>; 4] = Default::default();
        let mut ac_specs: [Option<HuffmanSpec>; 4] = Default::default();
        let mut restart_interval = 0;

        for seg in &headers.segments {
            match seg.marker {
                markers::DQT => {
                    for (id, table) in parse_dqt(&seg.body)? {
                        quant[usize::from(id)] = Some(table);
                    }
                }
                markers::DHT => {
                    for spec in parse_dht(&seg.body)? {
                        let id = usize::from(spec.id);
                        match spec.class {
                            TableClass::Dc => dc_specs[id] = Some(spec),
                            TableClass::Ac => ac_specs[id] = Some(spec),
                        }
                    }
                }
                markers::DAC => return Err(JpegError::UnsupportedProcess(markers::DAC)),
                markers::DRI => restart_interval = markers::parse_dri(&seg.body)?,
                m if markers::is_sof(m) => {
                    markers::check_process(m)?;
                    frame = Some(markers::parse_sof(&seg.body)?);
                }
                _ => {}
            }
        }

        let frame = frame.ok_or(JpegError::InvalidMarkerData("no SOF before SOS"))?;
        for c in &frame.components {
            if quant[usize::from(c.quant_table)].is_none() {
                return Err(JpegError::MissingTable { kind: "quantization", id: c.quant_table });
            }
        }

        let scan = markers::parse_sos(&headers.sos_body, &frame)?;
        let mut covered: Vec<usize> = scan.iter().map(|s| s.component).collect();
        covered.sort_unstable();
        covered.dedup();
        if covered.len() != frame.components.len() || scan.len() != covered.len() {
            return Err(JpegError::PartialScan { found: covered.len(), expected: frame.components.len() });
        }

        let planes = scan::decode_scan(
            data,
            headers.scan_start,
            &frame,
            &scan,
            &dc_specs,
            &ac_specs,
            restart_interval,
        )?;

        Ok(Self {
            frame,
            planes,
            quant,
            dc_specs,
            ac_specs,
            scan,
            restart_interval,
            segments: headers.segments,
            sos_body: headers.sos_body,
        })
    }

    /// Serialize: preserved headers, SOS, freshly coded scan, EOI.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let scan_data = scan::encode_scan(
            &self.frame,
            &self.scan,
            &self.planes,
            &self.dc_specs,
            &self.ac_specs,
            self.restart_interval,
        )?;
        let mut out = Vec::with_capacity(scan_data.len() + 1024);
        out.extend_from_slice(&[0xFF, markers::SOI]);
        for seg in &self.segments {
            seg.write_to(&mut out)?;
        }
        markers::write_segment(&mut out, markers::SOS, &self.sos_body)?;
        out.extend_from_slice(&scan_data);
        out.extend_from_slice(&[0xFF, markers::EOI]);
        Ok(out)
    }

    pub fn frame(&self) -> &FrameHeader {
        &self.frame
    }

    pub fn component_count(&self) -> usize {
        self.planes.len()
    }

    /// Plane of frame component `index` (0 = Y for YCbCr).
    pub fn plane(&self, index: usize) -> &CoefficientPlane {
        &self.planes[index]
    }

    pub fn plane_mut(&mut self, index: usize) -> &mut CoefficientPlane {
        &mut self.planes[index]
    }

    pub fn quant_table(&self, id: u8) -> Option<&QuantTable> {
        self.quant.get(usize::from(id))?.as_ref()
    }

    /// Quantization table of frame component `index`.
    pub fn component_quant_table(&self, index: usize) -> Option<&QuantTable> {
        self.quant_table(self.frame.components[index].quant_table)
    }

    /// Table IDs referenced by frame components, first-use order, no repeats.
    pub fn used_quant_ids(&self) -> Vec<u8> {
        let mut ids = Vec::new();
        for c in &self.frame.components {
            if !ids.contains(&c.quant_table) {
                ids.push(c.quant_table);
            }
        }
        ids
    }

    /// Replace table `id` and rewrite the DQT segments. Coefficients are
    /// left untouched.
    pub fn set_quant_table(&mut self, id: u8, table: QuantTable) -> Result<()> {
        let slot = self.quant.get_mut(usize::from(id)).ok_or(JpegError::InvalidTableId(id))?;
        *slot = Some(table);
        let body = write_dqt(&self.quant);
        self.replace_segments(markers::DQT, body);
        Ok(())
    }

    /// Move every component quantized with table `id` onto `table`,
    /// rescaling coefficients to `round(c * q_old / q_new)`.
    pub fn requantize(&mut self, id: u8, table: QuantTable) -> Result<()> {
        let old = *self
            .quant_table(id)
            .ok_or(JpegError::MissingTable { kind: "quantization", id })?;
        for (idx, comp) in self.frame.components.iter().enumerate() {
            if comp.quant_table != id {
                continue;
            }
            for (i, c) in self.planes[idx].coefficients_mut().iter_mut().enumerate() {
                let k = i % block::BLOCK_LEN;
                *c = rescale(*c, old.values[k], table.values[k], k == 0);
            }
        }
        self.set_quant_table(id, table)
    }

    /// Replace every Huffman table used by the scan with an optimal one for
    /// the current coefficients.
    pub fn rebuild_huffman_tables(&mut self) -> Result<()> {
        let mut counter = FrequencyCounter::new(&self.scan);
        scan::walk_scan(&self.frame, &self.scan, &self.planes, self.restart_interval, &mut counter)?;

        for (id, freq) in counter.dc.iter().enumerate() {
            if let Some(freq) = freq {
                self.dc_specs[id] = Some(optimal_spec(TableClass::Dc, id as u8, freq));
            }
        }
        for (id, freq) in counter.ac.iter().enumerate() {
            if let Some(freq) = freq {
                self.ac_specs[id] = Some(optimal_spec(TableClass::Ac, id as u8, freq));
            }
        }
        let body = write_dht(self.dc_specs.iter().chain(self.ac_specs.iter()).flatten());
        self.replace_segments(markers::DHT, body);
        Ok(())
    }

    /// Drop all segments with `marker` and insert one with `body` ahead of
    /// the frame header.
    fn replace_segments(&mut self, marker: u8, body: Vec<u8>) {
        self.segments.retain(|s| s.marker != marker);
        let at = self
            .segments
            .iter()
            .position(|s| markers::is_sof(s.marker))
            .unwrap_or(self.segments.len());
        self.segments.insert(at, Segment { marker, body });
    }
}

/// Baseline range for DC is +-2047 and for AC +-1023 at 8-bit precision.
fn rescale(c: i16, q_old: u16, q_new: u16, dc: bool) -> i16 {
    let v = i32::from(c) * i32::from(q_old);
    let q = i32::from(q_new);
    let r = if v >= 0 { (v + q / 2) / q } else { -((-v + q / 2) / q) };
    let limit = if dc { 2047 } else { 1023 };
    r.clamp(-limit, limit) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_rounds_half_away_from_zero() {
        assert_eq!(rescale(5, 1, 2, false), 3);
        assert_eq!(rescale(-5, 1, 2, false), -3);
        assert_eq!(rescale(4, 1, 3, false), 1);
        assert_eq!(rescale(0, 1, 7, false), 0);
        assert_eq!(rescale(9, 4, 4, false), 9);
    }

    #[test]
    fn rescale_clamps_to_baseline_range() {
        assert_eq!(rescale(1000, 4, 1, false), 1023);
        assert_eq!(rescale(-1000, 4, 1, true), -2047);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(JpegCoefficients::from_bytes(b"nope").unwrap_err(), JpegError::InvalidSoi);
        assert_eq!(JpegCoefficients::from_bytes(&[0xFF, 0xD8]).unwrap_err(), JpegError::UnexpectedEof);
    }
}
