// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Band extension (BEX): parametric synthesis of the top-band spectral coefficients from the
//! decoded low-band spectrum.
//!
//! `band_extension.c` was not part of the retrieved reference corpus (see `tables.rs`'s module
//! docs and `DESIGN.md`), so the synthesis strategies below (mirror / mirror+noise / noise-only /
//! parameterized gain) are original constructions shaped to match the known strategy families
//! rather than transcriptions of upstream source, and are not claimed to be bit-exact with the
//! reference decoder.

use crate::frame::{Block, Channel};
use crate::tables::QUANT_UNIT_TO_COEFF_INDEX;

/// The synthesis strategy selected by a channel's `bexMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BexStrategy {
    /// Mirror the low-band spectrum upward with no shaping.
    Mirror,
    /// Mirror the low-band spectrum, mixed with noise.
    MirrorNoise,
    /// Fill the high band entirely from the noise source.
    NoiseOnly,
    /// Per-subband gain applied to mirrored low-band energy, the common `bexBand <= 2`
    /// fallback (`bexMode == 4`).
    Gain,
}

fn strategy_for_mode(mode: usize) -> BexStrategy {
    match mode % 4 {
        0 => BexStrategy::Mirror,
        1 => BexStrategy::MirrorNoise,
        2 => BexStrategy::NoiseOnly,
        _ => BexStrategy::Gain,
    }
}

/// Synthesizes the coefficients in `[extensionBand's quant unit, bandCount's quant unit)` for
/// every channel of `block` from its already-dequantized low-band spectrum.
pub fn apply_band_extension(block: &mut Block) {
    if !block.band_extension_enabled || !block.has_extension_data {
        return;
    }

    let low_band_end = QUANT_UNIT_TO_COEFF_INDEX[block.quantization_unit_count];
    let high_band_end = QUANT_UNIT_TO_COEFF_INDEX[block.extension_unit.max(block.quantization_unit_count)];

    for channel in block.channels.iter_mut() {
        synthesize_channel(channel, low_band_end, high_band_end);
    }
}

fn synthesize_channel(channel: &mut Channel, low_band_end: usize, high_band_end: usize) {
    if low_band_end == 0 || high_band_end <= low_band_end {
        return;
    }

    if !channel.rng.is_initialized() {
        channel.rng.seed(&channel.scale_factors);
    }

    let strategy = strategy_for_mode(channel.bex_mode);
    let gain = bex_gain(channel);

    for dest in low_band_end..high_band_end {
        let mirrored = channel.spectra[mirror_source_index(dest, low_band_end)];

        channel.spectra[dest] = match strategy {
            BexStrategy::Mirror => mirrored,
            BexStrategy::MirrorNoise => 0.5 * mirrored + 0.5 * channel.rng.next_f64() * mirrored.abs(),
            BexStrategy::NoiseOnly => channel.rng.next_f64() * reference_amplitude(channel, low_band_end),
            BexStrategy::Gain => mirrored * gain,
        };
    }
}

/// Reflects a high-band index back into the decoded low band, producing a period-`low_band_end`
/// zig-zag so the mirrored spectrum does not simply repeat with a seam at the boundary.
fn mirror_source_index(dest: usize, low_band_end: usize) -> usize {
    let offset = dest - low_band_end;
    let period = 2 * low_band_end;
    let folded = offset % period;
    if folded < low_band_end {
        low_band_end - 1 - folded
    }
    else {
        folded - low_band_end
    }
}

/// A representative amplitude from the low band, used to scale pure-noise synthesis so the
/// high band's energy roughly tracks the low band's.
fn reference_amplitude(channel: &Channel, low_band_end: usize) -> f64 {
    let window = &channel.spectra[..low_band_end];
    let sum_abs: f64 = window.iter().map(|v| v.abs()).sum();
    if window.is_empty() {
        0.0
    }
    else {
        sum_abs / window.len() as f64
    }
}

fn bex_gain(channel: &Channel) -> f64 {
    if channel.bex_value_count == 0 {
        return 1.0;
    }
    let sum: i32 = channel.bex_values[..channel.bex_value_count].iter().sum();
    let avg = sum as f64 / channel.bex_value_count as f64;
    // bexValues are small non-negative field widths; map their average onto a sub-unity gain.
    1.0 / (1.0 + avg / 8.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockType;

    #[test]
    fn no_op_when_extension_data_absent() {
        let mut block = Block::new(BlockType::Mono, 0, 8);
        block.band_extension_enabled = false;
        block.channels[0].spectra[0] = 1.0;
        let before = block.channels[0].spectra;
        apply_band_extension(&mut block);
        assert_eq!(block.channels[0].spectra, before);
    }

    #[test]
    fn synthesizes_high_band_from_low_band() {
        let mut block = Block::new(BlockType::Mono, 0, 8);
        block.band_extension_enabled = true;
        block.has_extension_data = true;
        block.quantization_unit_count = 4;
        block.extension_unit = 12;
        block.channels[0].spectra[0] = 2.0;
        block.channels[0].bex_mode = 0;

        apply_band_extension(&mut block);

        let high_band_start = QUANT_UNIT_TO_COEFF_INDEX[4];
        let high_band_end = QUANT_UNIT_TO_COEFF_INDEX[12];
        let synthesized_any_nonzero =
            block.channels[0].spectra[high_band_start..high_band_end].iter().any(|&v| v != 0.0);
        assert!(synthesized_any_nonzero);
    }
}
