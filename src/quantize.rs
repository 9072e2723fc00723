// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dequantization and scale-factor scaling of a block's coded spectra. Mirrors
//! `quantization.c` in the reference decoder.

use crate::frame::{Block, Channel};
use crate::tables::{QUANTIZER_FINE_STEP_SIZE, QUANTIZER_STEP_SIZE, QUANT_UNIT_TO_COEFF_INDEX, SPECTRUM_SCALE};

/// Reconstructs `channel.spectra` from `quantizedSpectra`/`quantizedSpectraFine` for every
/// channel of `block`, combining each quantization unit's coarse and fine step sizes.
pub fn dequantize_spectra(block: &mut Block) {
    for channel in block.channels.iter_mut() {
        channel.spectra = [0.0; 256];
        for band in 0..channel.coded_quant_units {
            dequantize_quant_unit(channel, band);
        }
    }
}

fn dequantize_quant_unit(channel: &mut Channel, band: usize) {
    let sub_band_index = QUANT_UNIT_TO_COEFF_INDEX[band];
    let sub_band_count = QUANT_UNIT_TO_COEFF_INDEX[band + 1] - sub_band_index;
    let step_size = QUANTIZER_STEP_SIZE[channel.precisions[band] as usize];
    let step_size_fine = QUANTIZER_FINE_STEP_SIZE[channel.precisions_fine[band] as usize];

    for sb in 0..sub_band_count {
        let coarse = channel.quantized_spectra[sub_band_index + sb] as f64 * step_size;
        let fine = channel.quantized_spectra_fine[sub_band_index + sb] as f64 * step_size_fine;
        channel.spectra[sub_band_index + sb] = coarse + fine;
    }
}

/// Applies each channel's per-quantization-unit scale factor to its already-dequantized
/// spectrum.
pub fn scale_spectrum_block(block: &mut Block) {
    let quant_unit_count = block.quantization_unit_count;
    for channel in block.channels.iter_mut() {
        scale_spectrum_channel(channel, quant_unit_count);
    }
}

fn scale_spectrum_channel(channel: &mut Channel, quant_unit_count: usize) {
    for i in 0..quant_unit_count {
        let scale = SPECTRUM_SCALE[channel.scale_factors[i] as usize];
        for sb in QUANT_UNIT_TO_COEFF_INDEX[i]..QUANT_UNIT_TO_COEFF_INDEX[i + 1] {
            channel.spectra[sb] *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockType;

    #[test]
    fn dequantize_is_zero_when_no_coded_units() {
        let mut block = Block::new(BlockType::Mono, 0, 8);
        block.channels[0].coded_quant_units = 0;
        dequantize_spectra(&mut block);
        assert!(block.channels[0].spectra.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn dequantize_combines_coarse_and_fine_components() {
        let mut block = Block::new(BlockType::Mono, 0, 8);
        block.channels[0].coded_quant_units = 1;
        block.channels[0].precisions[0] = 15;
        block.channels[0].precisions_fine[0] = 0;
        block.channels[0].quantized_spectra[0] = 4;

        dequantize_spectra(&mut block);

        assert_eq!(block.channels[0].spectra[0], 4.0 * QUANTIZER_STEP_SIZE[15]);
    }

    #[test]
    fn scale_spectrum_applies_scale_factor_per_unit() {
        let mut block = Block::new(BlockType::Mono, 0, 8);
        block.quantization_unit_count = 1;
        block.channels[0].scale_factors[0] = 20;
        block.channels[0].spectra[0] = 1.0;

        scale_spectrum_block(&mut block);

        assert_eq!(block.channels[0].spectra[0], SPECTRUM_SCALE[20]);
    }
}
