// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Huffman tables: DHT segments, canonical code construction and the
//! optimal-table builder used after coefficients change.

use super::entropy::BitReader;
use super::error::{JpegError, Result};

/// Table class as written in DHT (`Tc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

/// A table as carried in a DHT segment: code counts per length and the
/// symbols in code order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanSpec {
    pub class: TableClass,
    pub id: u8,
    pub counts: [u8; 16],
    pub symbols: Vec<u8>,
}

/// Parse a DHT body into its tables.
pub fn parse_dht(body: &[u8]) -> Result<Vec<HuffmanSpec>> {
    let mut specs = Vec::new();
    let mut rest = body;
    while let Some((&tc_th, tail)) = rest.split_first() {
        let class = match tc_th >> 4 {
            0 => TableClass::Dc,
            1 => TableClass::Ac,
            _ => return Err(JpegError::InvalidMarkerData("DHT class")),
        };
        let id = tc_th & 0x0F;
        if id > 3 {
            return Err(JpegError::InvalidTableId(id));
        }
        if tail.len() < 16 {
            return Err(JpegError::UnexpectedEof);
        }
        let mut counts = [0u8; 16];
        counts.copy_from_slice(&tail[..16]);
        let total: usize = counts.iter().map(|&c| usize::from(c)).sum();
        if total > 256 {
            return Err(JpegError::InvalidMarkerData("DHT symbol count"));
        }
        let symbols = tail
            .get(16..16 + total)
            .ok_or(JpegError::UnexpectedEof)?
            .to_vec();
        specs.push(HuffmanSpec { class, id, counts, symbols });
        rest = &tail[16 + total..];
    }
    Ok(specs)
}

/// Serialize tables into one DHT body.
pub fn write_dht<'a>(specs: impl IntoIterator<Item = &'a HuffmanSpec>) -> Vec<u8> {
    let mut body = Vec::new();
    for spec in specs {
        body.push(((spec.class as u8) << 4) | (spec.id & 0x0F));
        body.extend_from_slice(&spec.counts);
        body.extend_from_slice(&spec.symbols);
    }
    body
}

/// Canonical decoder using the T.81 F.2.2.3 MAXCODE/VALPTR procedure.
pub struct DecodeTable {
    max_code: [i32; 17],
    min_code: [u32; 17],
    val_ptr: [usize; 17],
    symbols: Vec<u8>,
}

impl DecodeTable {
    pub fn new(spec: &HuffmanSpec) -> Result<Self> {
        let mut max_code = [-1i32; 17];
        let mut min_code = [0u32; 17];
        let mut val_ptr = [0usize; 17];
        let mut code = 0u32;
        let mut k = 0usize;
        for len in 1..=16 {
            let n = usize::from(spec.counts[len - 1]);
            if n > 0 {
                val_ptr[len] = k;
                min_code[len] = code;
                code += n as u32;
                k += n;
                if code > (1u32 << len) {
                    return Err(JpegError::InvalidMarkerData("oversubscribed Huffman table"));
                }
                max_code[len] = code as i32 - 1;
            }
            code <<= 1;
        }
        if k > spec.symbols.len() {
            return Err(JpegError::InvalidMarkerData("DHT symbol count"));
        }
        Ok(Self {
            max_code,
            min_code,
            val_ptr,
            symbols: spec.symbols.clone(),
        })
    }

    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let mut code = 0u32;
        for len in 1..=16 {
            code = (code << 1) | u32::from(reader.read_bit()?);
            if code as i32 <= self.max_code[len] {
                let idx = self.val_ptr[len] + (code - self.min_code[len]) as usize;
                return Ok(self.symbols[idx]);
            }
        }
        Err(JpegError::HuffmanDecode)
    }
}

/// Symbol to `(code, length)` lookup; length 0 marks an absent symbol.
pub struct EncodeTable {
    codes: [(u16, u8); 256],
}

impl EncodeTable {
    pub fn new(spec: &HuffmanSpec) -> Self {
        let mut codes = [(0u16, 0u8); 256];
        let mut code = 0u32;
        let mut symbols = spec.symbols.iter();
        for len in 1..=16u8 {
            for _ in 0..spec.counts[usize::from(len - 1)] {
                if let Some(&sym) = symbols.next() {
                    codes[usize::from(sym)] = (code as u16, len);
                }
                code += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    pub fn code(&self, symbol: u8) -> Result<(u16, u8)> {
        match self.codes[usize::from(symbol)] {
            (_, 0) => Err(JpegError::MissingHuffmanCode(symbol)),
            found => Ok(found),
        }
    }
}

/// Size category and magnitude bits of a coefficient (T.81 F.1.2.1).
pub fn magnitude_category(value: i16) -> (u8, u16) {
    if value == 0 {
        return (0, 0);
    }
    let size = 16 - value.unsigned_abs().leading_zeros() as u8;
    let raw = if value < 0 { value as i32 - 1 } else { value as i32 };
    let mask = (1u32 << size) - 1;
    (size, (raw as u32 & mask) as u16)
}

/// Inverse of [`magnitude_category`] (T.81 F.2.2.1 EXTEND).
pub fn extend(bits: u16, size: u8) -> i16 {
    if size == 0 {
        return 0;
    }
    let v = i32::from(bits);
    if v < (1 << (size - 1)) {
        (v - (1 << size) + 1) as i16
    } else {
        v as i16
    }
}

// a code tree over 257 leaves is at most 256 deep
const MAX_CODE_LEN: usize = 256;

/// Optimal table for the given symbol frequencies (T.81 K.2, libjpeg's
/// `jpeg_gen_optimal_table`). A reserved symbol with frequency 1 keeps every
/// real code from being all ones; lengths are then limited to 16 bits.
pub fn optimal_spec(class: TableClass, id: u8, freq: &[u64; 256]) -> HuffmanSpec {
    let mut freq_ext = [0u64; 257];
    freq_ext[..256].copy_from_slice(freq);
    if freq_ext[..256].iter().all(|&f| f == 0) {
        freq_ext[0] = 1;
    }
    freq_ext[256] = 1;

    let mut code_size = [0usize; 257];
    let mut others = [usize::MAX; 257];

    loop {
        // smallest nonzero frequency, highest index on ties
        let mut c1 = None;
        let mut best = u64::MAX;
        for (i, &f) in freq_ext.iter().enumerate() {
            if f != 0 && f <= best {
                best = f;
                c1 = Some(i);
            }
        }
        let mut c2 = None;
        best = u64::MAX;
        for (i, &f) in freq_ext.iter().enumerate() {
            if f != 0 && f <= best && Some(i) != c1 {
                best = f;
                c2 = Some(i);
            }
        }
        let (Some(mut a), Some(mut b)) = (c1, c2) else { break };

        freq_ext[a] += freq_ext[b];
        freq_ext[b] = 0;

        code_size[a] += 1;
        while others[a] != usize::MAX {
            a = others[a];
            code_size[a] += 1;
        }
        others[a] = b;

        code_size[b] += 1;
        while others[b] != usize::MAX {
            b = others[b];
            code_size[b] += 1;
        }
    }

    let mut bits = [0usize; MAX_CODE_LEN + 1];
    for &size in code_size.iter().filter(|&&s| s > 0) {
        bits[size] += 1;
    }

    for i in (17..=MAX_CODE_LEN).rev() {
        while bits[i] > 0 {
            let mut j = i - 2;
            while bits[j] == 0 {
                j -= 1;
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
    }

    // drop the reserved symbol from the longest length in use
    let mut longest = 16;
    while longest > 1 && bits[longest] == 0 {
        longest -= 1;
    }
    bits[longest] -= 1;

    let mut counts = [0u8; 16];
    for (len, count) in counts.iter_mut().enumerate() {
        *count = bits[len + 1] as u8;
    }

    let mut symbols = Vec::new();
    for size in 1..=MAX_CODE_LEN {
        for (sym, &s) in code_size[..256].iter().enumerate() {
            if s == size {
                symbols.push(sym as u8);
            }
        }
    }

    HuffmanSpec { class, id, counts, symbols }
}

/// The standard luminance DC table (T.81 Table K.3).
#[cfg(test)]
pub(crate) fn std_luma_dc() -> HuffmanSpec {
    HuffmanSpec {
        class: TableClass::Dc,
        id: 0,
        counts: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
        symbols: (0..12).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::entropy::BitWriter;

    #[test]
    fn category_and_extend_agree() {
        for v in -2047i16..=2047 {
            let (size, bits) = magnitude_category(v);
            assert_eq!(extend(bits, size), v, "value {v}");
        }
        assert_eq!(magnitude_category(-1), (1, 0));
        assert_eq!(magnitude_category(5), (3, 0b101));
        assert_eq!(magnitude_category(-5), (3, 0b010));
    }

    #[test]
    fn encode_then_decode_every_symbol() {
        let spec = std_luma_dc();
        let enc = EncodeTable::new(&spec);
        let dec = DecodeTable::new(&spec).unwrap();
        let mut w = BitWriter::new();
        for &sym in &spec.symbols {
            let (code, len) = enc.code(sym).unwrap();
            w.write_bits(code, len);
        }
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes, 0);
        for &sym in &spec.symbols {
            assert_eq!(dec.decode(&mut r).unwrap(), sym);
        }
    }

    #[test]
    fn absent_symbol_is_an_error() {
        let enc = EncodeTable::new(&std_luma_dc());
        assert_eq!(enc.code(0x42), Err(JpegError::MissingHuffmanCode(0x42)));
    }

    #[test]
    fn dht_write_then_parse() {
        let spec = std_luma_dc();
        let body = write_dht([&spec]);
        assert_eq!(parse_dht(&body).unwrap(), vec![spec]);
    }

    #[test]
    fn optimal_table_is_decodable_and_complete() {
        let mut freq = [0u64; 256];
        for (i, f) in freq.iter_mut().enumerate().take(200) {
            // skewed distribution forces long codes
            *f = 1 + (1u64 << (i % 24));
        }
        let spec = optimal_spec(TableClass::Ac, 1, &freq);
        assert_eq!(spec.symbols.len(), 200);
        assert_eq!(spec.counts.iter().map(|&c| c as usize).sum::<usize>(), 200);
        let enc = EncodeTable::new(&spec);
        for sym in 0..200u8 {
            let (code, len) = enc.code(sym).unwrap();
            assert!(len <= 16);
            assert_ne!(u32::from(code), (1u32 << len) - 1, "all-ones code for {sym}");
        }
        DecodeTable::new(&spec).unwrap();
    }

    #[test]
    fn optimal_table_with_one_symbol() {
        let mut freq = [0u64; 256];
        freq[0x00] = 10;
        let spec = optimal_spec(TableClass::Ac, 0, &freq);
        assert_eq!(spec.symbols, vec![0x00]);
        assert_eq!(spec.counts[0], 1);
    }

    #[test]
    fn optimal_table_with_no_symbols() {
        let spec = optimal_spec(TableClass::Dc, 0, &[0u64; 256]);
        assert_eq!(spec.symbols, vec![0]);
    }
}
