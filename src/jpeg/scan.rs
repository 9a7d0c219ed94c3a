// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Baseline scan decoding and encoding.
//!
//! Encoding walks the MCUs once and hands every Huffman symbol to a
//! [`SymbolSink`]. The same walk drives the real writer and the frequency
//! counter used to rebuild optimal tables, so both always agree on DC
//! prediction and restart boundaries.

use super::block::{CoefficientPlane, BLOCK_LEN, NATURAL_TO_ZIGZAG, ZIGZAG_TO_NATURAL};
use super::entropy::{BitReader, BitWriter};
use super::error::{JpegError, Result};
use super::huffman::{extend, magnitude_category, DecodeTable, EncodeTable, HuffmanSpec, TableClass};
use super::markers::{FrameHeader, ScanComponent};

type Specs = [Option<HuffmanSpec>; 4];

fn lookup<'a>(specs: &'a Specs, id: u8, kind: &'static str) -> Result<&'a HuffmanSpec> {
    specs[usize::from(id)]
        .as_ref()
        .ok_or(JpegError::MissingTable { kind, id })
}

/// Block coordinates visited by MCU `(row, col)` for one scan component.
fn mcu_blocks(frame: &FrameHeader, comp: usize, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let h = usize::from(frame.components[comp].h_sampling);
    let v = usize::from(frame.components[comp].v_sampling);
    (0..v).flat_map(move |dv| (0..h).map(move |dh| (row * v + dv, col * h + dh)))
}

/// Decode a single interleaved baseline scan into one plane per frame
/// component.
pub fn decode_scan(
    data: &[u8],
    scan_start: usize,
    frame: &FrameHeader,
    scan: &[ScanComponent],
    dc_specs: &Specs,
    ac_specs: &Specs,
    restart_interval: u16,
) -> Result<Vec<CoefficientPlane>> {
    let mut tables = Vec::with_capacity(scan.len());
    for sc in scan {
        tables.push((
            DecodeTable::new(lookup(dc_specs, sc.dc_table, "DC Huffman")?)?,
            DecodeTable::new(lookup(ac_specs, sc.ac_table, "AC Huffman")?)?,
        ));
    }

    let mut planes: Vec<CoefficientPlane> = (0..frame.components.len())
        .map(|i| CoefficientPlane::new(frame.blocks_wide(i), frame.blocks_tall(i)))
        .collect();
    let mut pred = vec![0i32; scan.len()];
    let mut reader = BitReader::new(data, scan_start);
    let interval = usize::from(restart_interval);
    let mut mcu = 0usize;

    for row in 0..frame.mcus_tall {
        for col in 0..frame.mcus_wide {
            if interval > 0 && mcu > 0 && mcu % interval == 0 {
                reader.restart();
                pred.iter_mut().for_each(|p| *p = 0);
            }
            for (slot, sc) in scan.iter().enumerate() {
                let (dc, ac) = &tables[slot];
                for (br, bc) in mcu_blocks(frame, sc.component, row, col) {
                    let zz = decode_block(&mut reader, dc, ac, &mut pred[slot])?;
                    let block = planes[sc.component].block_at_mut(br, bc);
                    for (k, &natural) in ZIGZAG_TO_NATURAL.iter().enumerate() {
                        block[natural] = zz[k];
                    }
                }
            }
            mcu += 1;
        }
    }
    Ok(planes)
}

fn decode_block(
    reader: &mut BitReader<'_>,
    dc: &DecodeTable,
    ac: &DecodeTable,
    pred: &mut i32,
) -> Result<[i16; BLOCK_LEN]> {
    let mut zz = [0i16; BLOCK_LEN];
    let size = dc.decode(reader)?;
    if size > 11 {
        return Err(JpegError::HuffmanDecode);
    }
    let diff = extend(reader.read_bits(size)?, size);
    *pred += i32::from(diff);
    zz[0] = (*pred).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;

    let mut k = 1;
    while k < BLOCK_LEN {
        let rs = ac.decode(reader)?;
        let (run, size) = (usize::from(rs >> 4), rs & 0x0F);
        if size == 0 {
            if run == 15 {
                k += 16;
                continue;
            }
            break;
        }
        k += run;
        if k >= BLOCK_LEN {
            return Err(JpegError::HuffmanDecode);
        }
        zz[k] = extend(reader.read_bits(size)?, size);
        k += 1;
    }
    Ok(zz)
}

/// Receiver of the symbols produced by [`walk_scan`].
pub trait SymbolSink {
    /// Huffman symbol plus the magnitude bits that follow it.
    fn symbol(&mut self, slot: usize, class: TableClass, symbol: u8, bits: u16, size: u8) -> Result<()>;
    /// Called between restart intervals with the RST index (0..=7).
    fn restart(&mut self, index: u8);
}

/// Walk every block in scan order, emitting DC/AC symbols to `sink`.
pub fn walk_scan(
    frame: &FrameHeader,
    scan: &[ScanComponent],
    planes: &[CoefficientPlane],
    restart_interval: u16,
    sink: &mut impl SymbolSink,
) -> Result<()> {
    let mut pred = vec![0i32; scan.len()];
    let interval = usize::from(restart_interval);
    let mut mcu = 0usize;
    let mut rst = 0u8;

    for row in 0..frame.mcus_tall {
        for col in 0..frame.mcus_wide {
            if interval > 0 && mcu > 0 && mcu % interval == 0 {
                sink.restart(rst);
                rst = (rst + 1) & 7;
                pred.iter_mut().for_each(|p| *p = 0);
            }
            for (slot, sc) in scan.iter().enumerate() {
                for (br, bc) in mcu_blocks(frame, sc.component, row, col) {
                    let block = planes[sc.component].block_at(br, bc);
                    let mut zz = [0i16; BLOCK_LEN];
                    for (natural, &c) in block.iter().enumerate() {
                        zz[NATURAL_TO_ZIGZAG[natural]] = c;
                    }
                    emit_block(&zz, &mut pred[slot], slot, sink)?;
                }
            }
            mcu += 1;
        }
    }
    Ok(())
}

fn emit_block(zz: &[i16; BLOCK_LEN], pred: &mut i32, slot: usize, sink: &mut impl SymbolSink) -> Result<()> {
    let diff = i32::from(zz[0]) - *pred;
    *pred = i32::from(zz[0]);
    let diff = i16::try_from(diff).map_err(|_| JpegError::InvalidMarkerData("DC difference out of range"))?;
    let (size, bits) = magnitude_category(diff);
    sink.symbol(slot, TableClass::Dc, size, bits, size)?;

    let mut run = 0u8;
    for &c in &zz[1..] {
        if c == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            sink.symbol(slot, TableClass::Ac, 0xF0, 0, 0)?;
            run -= 16;
        }
        let (size, bits) = magnitude_category(c);
        sink.symbol(slot, TableClass::Ac, (run << 4) | size, bits, size)?;
        run = 0;
    }
    if run > 0 {
        sink.symbol(slot, TableClass::Ac, 0x00, 0, 0)?;
    }
    Ok(())
}

/// Writes symbols with fixed Huffman tables.
struct ScanWriter {
    tables: Vec<(EncodeTable, EncodeTable)>,
    out: BitWriter,
}

impl SymbolSink for ScanWriter {
    fn symbol(&mut self, slot: usize, class: TableClass, symbol: u8, bits: u16, size: u8) -> Result<()> {
        let (dc, ac) = &self.tables[slot];
        let table = match class {
            TableClass::Dc => dc,
            TableClass::Ac => ac,
        };
        let (code, len) = table.code(symbol)?;
        self.out.write_bits(code, len);
        self.out.write_bits(bits, size);
        Ok(())
    }

    fn restart(&mut self, index: u8) {
        self.out.write_marker(0xD0 + index);
    }
}

/// Entropy-code the planes with the given tables. Output excludes the SOS
/// header and EOI.
pub fn encode_scan(
    frame: &FrameHeader,
    scan: &[ScanComponent],
    planes: &[CoefficientPlane],
    dc_specs: &Specs,
    ac_specs: &Specs,
    restart_interval: u16,
) -> Result<Vec<u8>> {
    let mut tables = Vec::with_capacity(scan.len());
    for sc in scan {
        tables.push((
            EncodeTable::new(lookup(dc_specs, sc.dc_table, "DC Huffman")?),
            EncodeTable::new(lookup(ac_specs, sc.ac_table, "AC Huffman")?),
        ));
    }
    let mut writer = ScanWriter { tables, out: BitWriter::new() };
    walk_scan(frame, scan, planes, restart_interval, &mut writer)?;
    Ok(writer.out.finish())
}

/// Symbol frequencies per (class, table id).
pub struct FrequencyCounter {
    pub dc: [Option<Box<[u64; 256]>>; 4],
    pub ac: [Option<Box<[u64; 256]>>; 4],
    slots: Vec<(u8, u8)>,
}

impl FrequencyCounter {
    pub fn new(scan: &[ScanComponent]) -> Self {
        let mut dc: [Option<Box<[u64; 256]>>; 4] = Default::default();
        let mut ac: [Option<Box<[u64; 256]>>; 4] = Default::default();
        for sc in scan {
            dc[usize::from(sc.dc_table)].get_or_insert_with(|| Box::new([0; 256]));
            ac[usize::from(sc.ac_table)].get_or_insert_with(|| Box::new([0; 256]));
        }
        Self {
            dc,
            ac,
            slots: scan.iter().map(|sc| (sc.dc_table, sc.ac_table)).collect(),
        }
    }
}

impl SymbolSink for FrequencyCounter {
    fn symbol(&mut self, slot: usize, class: TableClass, symbol: u8, _bits: u16, _size: u8) -> Result<()> {
        let (dc_id, ac_id) = self.slots[slot];
        let table = match class {
            TableClass::Dc => &mut self.dc[usize::from(dc_id)],
            TableClass::Ac => &mut self.ac[usize::from(ac_id)],
        };
        if let Some(freq) = table {
            freq[usize::from(symbol)] += 1;
        }
        Ok(())
    }

    fn restart(&mut self, _index: u8) {}
}
