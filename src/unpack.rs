// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-block bitstream parsing: header flags, band/gradient/stereo/extension parameters, scale
//! factors, and coarse/fine spectral coefficients. Mirrors `unpack.c` in the reference decoder.

use log::{trace, warn};

use crate::bitalloc::{calculate_mask, calculate_precisions, create_gradient};
use crate::bitreader::BitReader;
use crate::config::{BlockType, ConfigData, MAX_QUANT_UNITS};
use crate::error::{decode_error, Atrac9Error, Result};
use crate::frame::{Block, Frame};
use crate::huffman::{decode_huffman_values, HUFFMAN_SPECTRUM};
use crate::scalefactors::read_scale_factors;
use crate::tables::{
    BAND_TO_QUANT_UNIT_COUNT, BEX_DATA_LENGTHS, BEX_ENCODED_VALUE_COUNTS, BEX_GROUP_INFO,
    MAX_BAND_COUNT, MAX_EXTENSION_BAND, MAX_HUFF_PRECISION, MIN_BAND_COUNT,
    QUANT_UNIT_TO_CODEBOOK_INDEX, QUANT_UNIT_TO_COEFF_INDEX,
};

/// Parses every block of `frame` from `br`, then advances `frame.index_in_superframe`.
pub fn unpack_frame(frame: &mut Frame, br: &mut BitReader<'_>, config: &ConfigData) -> Result<()> {
    for block in frame.blocks.iter_mut() {
        unpack_block(block, br, config)?;

        if block.first_in_superframe && frame.index_in_superframe != 0 {
            return decode_error(Atrac9Error::UnpackSuperframeFlagInvalid);
        }
    }

    frame.index_in_superframe += 1;
    if frame.index_in_superframe == config.frames_per_superframe {
        frame.index_in_superframe = 0;
    }

    Ok(())
}

fn unpack_block(block: &mut Block, br: &mut BitReader<'_>, config: &ConfigData) -> Result<()> {
    read_block_header(block, br)?;

    if block.block_type == BlockType::Lfe {
        unpack_lfe_block(block, br);
    }
    else {
        unpack_standard_block(block, br, config)?;
    }

    br.align_position(8);
    Ok(())
}

fn read_block_header(block: &mut Block, br: &mut BitReader<'_>) -> Result<()> {
    block.first_in_superframe = br.read_int(1) == 0;
    block.reuse_band_params = br.read_int(1) != 0;

    trace!(
        "atrac9: block {} ({:?}), first_in_superframe={}, reuse_band_params={}",
        block.block_index,
        block.block_type,
        block.first_in_superframe,
        block.reuse_band_params
    );

    if block.first_in_superframe && block.reuse_band_params && block.block_type != BlockType::Lfe {
        return decode_error(Atrac9Error::UnpackReuseBandParamsInvalid);
    }
    Ok(())
}

fn unpack_standard_block(block: &mut Block, br: &mut BitReader<'_>, config: &ConfigData) -> Result<()> {
    if !block.reuse_band_params {
        read_band_params(block, br, config)?;
    }

    read_gradient_params(block, br)?;
    create_gradient(block);
    read_stereo_params(block, br);
    read_extension_params(block, br)?;

    for i in 0..block.channels.len() {
        let codebook_set_high_sample_rate = config.high_sample_rate;
        let quant_unit_count = block.quantization_unit_count;
        let stereo_quant_unit = block.stereo_quantization_unit;
        let primary_channel_index = block.primary_channel_index;
        let gradient = block.gradient;
        let gradient_mode = block.gradient_mode;
        let gradient_boundary = block.gradient_boundary;

        let coded_quant_units =
            if primary_channel_index == i { quant_unit_count } else { stereo_quant_unit };
        block.channels[i].coded_quant_units = coded_quant_units;

        let extension_unit = block.extension_unit;
        let first_in_superframe = block.first_in_superframe;
        let quantization_units_prev = block.quantization_units_prev;

        let (scale_factors_prev, primary_scale_factors, primary_extension_unit) = if i == 0 {
            (block.channels[0].scale_factors_prev, block.channels[0].scale_factors_prev, 0)
        }
        else {
            let prev = block.channels[i].scale_factors_prev;
            let primary_sf = block.channels[0].scale_factors;
            (prev, primary_sf, extension_unit)
        };

        let (mode, sf) = read_scale_factors(
            br,
            i,
            extension_unit,
            first_in_superframe,
            &scale_factors_prev,
            quantization_units_prev,
            &primary_scale_factors,
            primary_extension_unit,
        )?;

        {
            let channel = &mut block.channels[i];
            channel.scale_factor_coding_mode = mode;
            channel.scale_factors = sf;
            channel.scale_factors_prev = sf;
        }

        {
            let channel = &mut block.channels[i];
            calculate_mask(channel, quant_unit_count);
        }
        {
            let channel = &mut block.channels[i];
            calculate_precisions(channel, quant_unit_count, gradient_mode, &gradient, gradient_boundary);
        }

        block.channels[i].codebook_set = calculate_spectrum_codebook_index(
            &block.channels[i].scale_factors,
            coded_quant_units,
            codebook_set_high_sample_rate,
        );

        read_spectra(&mut block.channels[i], br, config.high_sample_rate);
        read_spectra_fine(&mut block.channels[i], br);
    }

    block.quantization_units_prev =
        if block.band_extension_enabled { block.extension_unit } else { block.quantization_unit_count };

    Ok(())
}

fn read_band_params(block: &mut Block, br: &mut BitReader<'_>, config: &ConfigData) -> Result<()> {
    let min_band_count = MIN_BAND_COUNT[config.high_sample_rate as usize];
    let max_extension_band = MAX_EXTENSION_BAND[config.high_sample_rate as usize];

    block.band_count = br.read_int(4) as usize + min_band_count;
    block.quantization_unit_count = BAND_TO_QUANT_UNIT_COUNT[block.band_count];

    if block.band_count > MAX_BAND_COUNT[config.sample_rate_index] {
        return decode_error(Atrac9Error::UnpackBandParamsInvalid);
    }

    if block.block_type == BlockType::Stereo {
        block.stereo_band = br.read_int(4) as usize + min_band_count;
        block.stereo_quantization_unit = BAND_TO_QUANT_UNIT_COUNT[block.stereo_band];
    }
    else {
        block.stereo_band = block.band_count;
    }

    if block.stereo_band > block.band_count {
        return decode_error(Atrac9Error::UnpackBandParamsInvalid);
    }

    block.band_extension_enabled = br.read_int(1) != 0;
    if block.band_extension_enabled {
        block.extension_band = br.read_int(4) as usize + min_band_count;

        if block.extension_band < block.band_count || block.extension_band > max_extension_band {
            return decode_error(Atrac9Error::UnpackBandParamsInvalid);
        }
        block.extension_unit = BAND_TO_QUANT_UNIT_COUNT[block.extension_band];
    }
    else {
        block.extension_band = block.band_count;
        block.extension_unit = block.quantization_unit_count;
    }

    Ok(())
}

fn read_gradient_params(block: &mut Block, br: &mut BitReader<'_>) -> Result<()> {
    block.gradient_mode = br.read_int(2);
    if block.gradient_mode > 0 {
        block.gradient_end_unit = 31;
        block.gradient_end_value = 31;
        block.gradient_start_unit = br.read_int(5) as usize;
        block.gradient_start_value = br.read_int(5) as i32;
    }
    else {
        block.gradient_start_unit = br.read_int(6) as usize;
        block.gradient_end_unit = br.read_int(6) as usize + 1;
        block.gradient_start_value = br.read_int(5) as i32;
        block.gradient_end_value = br.read_int(5) as i32;
    }
    block.gradient_boundary = br.read_int(4) as usize;

    if block.gradient_boundary > block.quantization_unit_count {
        return decode_error(Atrac9Error::UnpackGradBoundaryInvalid);
    }
    if block.gradient_start_unit >= 48 {
        return decode_error(Atrac9Error::GradStartUnitOob);
    }
    if block.gradient_end_unit >= 48 {
        return decode_error(Atrac9Error::GradEndUnitOob);
    }
    if block.gradient_start_unit > block.gradient_end_unit {
        return decode_error(Atrac9Error::GradEndUnitInvalid);
    }
    if !(0..32).contains(&block.gradient_start_value) {
        return decode_error(Atrac9Error::GradStartValueOob);
    }
    if !(0..32).contains(&block.gradient_end_value) {
        return decode_error(Atrac9Error::GradEndValueOob);
    }

    Ok(())
}

fn read_stereo_params(block: &mut Block, br: &mut BitReader<'_>) {
    if block.block_type != BlockType::Stereo {
        return;
    }

    block.primary_channel_index = br.read_int(1) as usize;
    block.has_joint_stereo_signs = br.read_int(1) != 0;

    block.joint_stereo_signs = [0; MAX_QUANT_UNITS];
    if block.has_joint_stereo_signs {
        for i in block.stereo_quantization_unit..block.quantization_unit_count {
            block.joint_stereo_signs[i] = br.read_int(1) as i32;
        }
    }
}

fn bex_read_header(br: &mut BitReader<'_>, bex_band: usize) -> (usize, usize) {
    let mode = br.read_int(2) as usize;
    let mode = if bex_band > 2 { mode } else { 4 };
    let value_count = BEX_ENCODED_VALUE_COUNTS[mode.min(4)][bex_band.min(6)];
    (mode, value_count)
}

fn bex_read_data(
    br: &mut BitReader<'_>,
    mode: usize,
    bex_band: usize,
    value_count: usize,
) -> (usize, [i32; 4]) {
    let mut values = [0i32; 4];
    for (i, slot) in values.iter_mut().enumerate().take(value_count) {
        let data_length = BEX_DATA_LENGTHS[mode.min(4)][bex_band.min(6)][i];
        *slot = br.read_int(data_length) as i32;
    }
    (value_count, values)
}

fn read_extension_params(block: &mut Block, br: &mut BitReader<'_>) -> Result<()> {
    let mut bex_band = 0usize;

    if block.band_extension_enabled {
        if block.quantization_unit_count < 13 {
            return decode_error(Atrac9Error::UnpackBandParamsInvalid);
        }
        bex_band = BEX_GROUP_INFO[block.quantization_unit_count - 13].band_count;

        if block.block_type == BlockType::Stereo {
            let (mode, value_count) = bex_read_header(br, bex_band);
            block.channels[1].bex_mode = mode;
            block.channels[1].bex_value_count = value_count;
        }
        else {
            br.set_position(br.position() + 1);
        }
    }

    block.has_extension_data = br.read_int(1) != 0;
    if !block.has_extension_data {
        return Ok(());
    }

    if !block.band_extension_enabled {
        block.bex_mode = br.read_int(2) as usize;
        block.bex_data_length = br.read_int(5) as usize;
        br.set_position(br.position() + block.bex_data_length);
        return Ok(());
    }

    let (mode0, value_count0) = bex_read_header(br, bex_band);
    block.channels[0].bex_mode = mode0;
    block.channels[0].bex_value_count = value_count0;
    block.bex_mode = mode0;

    block.bex_data_length = br.read_int(5) as usize;
    if block.bex_data_length == 0 {
        return Ok(());
    }
    let bex_data_end = br.position() + block.bex_data_length;

    let (count0, values0) = bex_read_data(br, mode0, bex_band, value_count0);
    block.channels[0].bex_value_count = count0;
    block.channels[0].bex_values = values0;

    if block.block_type == BlockType::Stereo {
        let mode1 = block.channels[1].bex_mode;
        let value_count1 = block.channels[1].bex_value_count;
        let (count1, values1) = bex_read_data(br, mode1, bex_band, value_count1);
        block.channels[1].bex_value_count = count1;
        block.channels[1].bex_values = values1;
    }

    if br.position() > bex_data_end {
        return decode_error(Atrac9Error::UnpackExtensionDataInvalid);
    }

    Ok(())
}

fn calculate_spectrum_codebook_index(
    scale_factors: &[i32; 31],
    quant_units: usize,
    high_sample_rate: bool,
) -> [usize; MAX_QUANT_UNITS] {
    let mut codebook_set = [0usize; MAX_QUANT_UNITS];
    if quant_units <= 1 || high_sample_rate {
        return codebook_set;
    }

    // The reference decoder briefly overwrites `scaleFactors[quantUnits]` with
    // `scaleFactors[quantUnits - 1]` so the loop below need not special-case the last unit.
    // This reads the same effective value without exposing a temporary mutation.
    let next_sf = |i: usize| -> i32 {
        if i == quant_units {
            scale_factors[quant_units - 1]
        }
        else {
            scale_factors[i]
        }
    };

    let mut avg = 0i32;
    if quant_units > 12 {
        for sf in scale_factors[..12].iter() {
            avg += sf;
        }
        avg = (avg + 6) / 12;
    }

    for i in 8..quant_units {
        let prev_sf = scale_factors[i - 1];
        let next = next_sf(i + 1);
        let min_sf = prev_sf.min(next);
        if scale_factors[i] - min_sf >= 3 || scale_factors[i] - prev_sf + scale_factors[i] - next >= 3 {
            codebook_set[i] = 1;
        }
    }

    for i in 12..quant_units {
        if codebook_set[i] == 0 {
            let prev_sf = scale_factors[i - 1];
            let next = next_sf(i + 1);
            let min_sf = prev_sf.min(next);
            let width16_bias = if QUANT_UNIT_TO_COEFF_INDEX[i + 1] - QUANT_UNIT_TO_COEFF_INDEX[i] == 16 { 1 } else { 0 };
            if scale_factors[i] - min_sf >= 2 && scale_factors[i] >= avg - width16_bias {
                codebook_set[i] = 1;
            }
        }
    }

    codebook_set
}

fn read_spectra(channel: &mut crate::frame::Channel, br: &mut BitReader<'_>, high_sample_rate: bool) {
    channel.quantized_spectra = [0; 256];
    let max_huff_precision = MAX_HUFF_PRECISION[high_sample_rate as usize];

    for i in 0..channel.coded_quant_units {
        let subband_count = QUANT_UNIT_TO_COEFF_INDEX[i + 1] - QUANT_UNIT_TO_COEFF_INDEX[i];
        let precision = channel.precisions[i] + 1;
        let base_index = QUANT_UNIT_TO_COEFF_INDEX[i];

        if precision <= max_huff_precision as i32 {
            let codebook = &HUFFMAN_SPECTRUM[channel.codebook_set[i]][precision as usize]
                [QUANT_UNIT_TO_CODEBOOK_INDEX[i]];

            if subband_count % (1usize << codebook.value_count_power) != 0 {
                warn!(
                    "atrac9: channel {} quant unit {} has {} coefficients, not a multiple of \
                     the codebook's {}-coefficient group size; trailing coefficients are left \
                     as zero",
                    channel.channel_index,
                    i,
                    subband_count,
                    1usize << codebook.value_count_power
                );
            }

            decode_huffman_values(&mut channel.quantized_spectra, base_index, subband_count, codebook, br);
        }
        else {
            for j in base_index..QUANT_UNIT_TO_COEFF_INDEX[i + 1] {
                channel.quantized_spectra[j] = br.read_signed_int(precision as u32);
            }
        }
    }
}

fn read_spectra_fine(channel: &mut crate::frame::Channel, br: &mut BitReader<'_>) {
    channel.quantized_spectra_fine = [0; 256];

    for i in 0..channel.coded_quant_units {
        if channel.precisions_fine[i] > 0 {
            let overflow_bits = channel.precisions_fine[i] as u32 + 1;
            for j in QUANT_UNIT_TO_COEFF_INDEX[i]..QUANT_UNIT_TO_COEFF_INDEX[i + 1] {
                channel.quantized_spectra_fine[j] = br.read_signed_int(overflow_bits);
            }
        }
    }
}

fn unpack_lfe_block(block: &mut Block, br: &mut BitReader<'_>) {
    block.quantization_unit_count = 2;
    let precision = if block.reuse_band_params { 8 } else { 4 };

    {
        let channel = &mut block.channels[0];
        channel.scale_factors = [0; 31];
        for sf in channel.scale_factors[..block.quantization_unit_count].iter_mut() {
            *sf = br.read_int(5) as i32;
        }
        for i in 0..block.quantization_unit_count {
            channel.precisions[i] = precision;
            channel.precisions_fine[i] = 0;
        }
        channel.coded_quant_units = block.quantization_unit_count;

        channel.quantized_spectra = [0; 256];
        for i in 0..channel.coded_quant_units {
            let p = channel.precisions[i];
            if p <= 0 {
                continue;
            }
            for j in QUANT_UNIT_TO_COEFF_INDEX[i]..QUANT_UNIT_TO_COEFF_INDEX[i + 1] {
                channel.quantized_spectra[j] = br.read_signed_int(p as u32 + 1);
            }
        }
    }

    block.quantization_units_prev = block.quantization_unit_count;
}
