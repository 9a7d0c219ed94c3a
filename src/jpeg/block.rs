// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! 8x8 coefficient blocks and the zigzag ordering used on the wire.
//!
//! A [`CoefficientPlane`] holds every quantized block of one frame component,
//! block-raster order, each block stored in natural (row-major) order.

/// Coefficients per 8x8 block.
pub const BLOCK_LEN: usize = 64;

/// Zigzag scan index to natural `row * 8 + col` index (T.81 Figure A.6).
pub const ZIGZAG_TO_NATURAL: [usize; BLOCK_LEN] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Inverse of [`ZIGZAG_TO_NATURAL`].
pub const NATURAL_TO_ZIGZAG: [usize; BLOCK_LEN] = {
    let mut out = [0usize; BLOCK_LEN];
    let mut zz = 0;
    while zz < BLOCK_LEN {
        out[ZIGZAG_TO_NATURAL[zz]] = zz;
        zz += 1;
    }
    out
};

/// All quantized DCT blocks of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientPlane {
    blocks_wide: usize,
    blocks_tall: usize,
    coeffs: Vec<i16>,
}

impl CoefficientPlane {
    /// A zero-filled plane of `blocks_wide x blocks_tall` blocks.
    pub fn new(blocks_wide: usize, blocks_tall: usize) -> Self {
        Self {
            blocks_wide,
            blocks_tall,
            coeffs: vec![0; blocks_wide * blocks_tall * BLOCK_LEN],
        }
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    pub fn block_count(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Block at raster index `index` (natural order).
    pub fn block(&self, index: usize) -> &[i16] {
        let start = index * BLOCK_LEN;
        &self.coeffs[start..start + BLOCK_LEN]
    }

    pub fn block_mut(&mut self, index: usize) -> &mut [i16] {
        let start = index * BLOCK_LEN;
        &mut self.coeffs[start..start + BLOCK_LEN]
    }

    /// Block at block row `row`, block column `col`.
    pub fn block_at(&self, row: usize, col: usize) -> &[i16] {
        self.block(row * self.blocks_wide + col)
    }

    pub fn block_at_mut(&mut self, row: usize, col: usize) -> &mut [i16] {
        let index = row * self.blocks_wide + col;
        self.block_mut(index)
    }

    /// Every coefficient of the plane, block after block.
    pub fn coefficients(&self) -> &[i16] {
        &self.coeffs
    }

    pub fn coefficients_mut(&mut self) -> &mut [i16] {
        &mut self.coeffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_tables_are_inverse() {
        for zz in 0..BLOCK_LEN {
            assert_eq!(NATURAL_TO_ZIGZAG[ZIGZAG_TO_NATURAL[zz]], zz);
        }
        assert_eq!(ZIGZAG_TO_NATURAL[2], 8);
        assert_eq!(ZIGZAG_TO_NATURAL[63], 63);
    }

    #[test]
    fn block_addressing() {
        let mut plane = CoefficientPlane::new(3, 2);
        assert_eq!(plane.block_count(), 6);
        plane.block_at_mut(1, 2)[5] = -7;
        assert_eq!(plane.block(5)[5], -7);
        assert_eq!(plane.coefficients()[5 * BLOCK_LEN + 5], -7);
        assert!(plane.block(0).iter().all(|&c| c == 0));
    }
}
