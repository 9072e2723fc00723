// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale factor decoding: four coding modes, selected by channel index and whether this is
//! the first frame of a superframe. Mirrors `scale_factors.c` in the reference decoder.

use crate::bitreader::BitReader;
use crate::error::{decode_error, Atrac9Error, Result};
use crate::huffman::{read_huffman_value, HUFFMAN_SCALE_FACTORS_SIGNED, HUFFMAN_SCALE_FACTORS_UNSIGNED};
use crate::tables::SCALE_FACTOR_WEIGHTS;

/// Reads and validates scale factors for one channel.
///
/// `channel_index` selects the mode table (0 = primary/channel-0 rules, anything else =
/// secondary-channel rules). `baseline`/`baseline_len` is the previous frame's scale factors
/// for modes that reference it, or channel 0's current scale factors for the secondary
/// channel's baseline-relative modes.
#[allow(clippy::too_many_arguments)]
pub fn read_scale_factors(
    br: &mut BitReader<'_>,
    channel_index: usize,
    extension_unit: usize,
    first_in_superframe: bool,
    scale_factors_prev: &[i32; 31],
    quantization_units_prev: usize,
    primary_scale_factors: &[i32; 31],
    primary_extension_unit: usize,
) -> Result<(u32, [i32; 31])> {
    let mut sf = [0i32; 31];
    let mode = br.read_int(2);

    if channel_index == 0 {
        match mode {
            0 => read_vlc_delta_offset(br, extension_unit, &mut sf),
            1 => read_clc_offset(br, extension_unit, &mut sf),
            2 => {
                if first_in_superframe {
                    return decode_error(Atrac9Error::UnpackScaleFactorModeInvalid);
                }
                read_vlc_distance_to_baseline(
                    br,
                    extension_unit,
                    scale_factors_prev,
                    quantization_units_prev,
                    &mut sf,
                );
            }
            3 => {
                if first_in_superframe {
                    return decode_error(Atrac9Error::UnpackScaleFactorModeInvalid);
                }
                read_vlc_delta_offset_with_baseline(
                    br,
                    extension_unit,
                    scale_factors_prev,
                    quantization_units_prev,
                    &mut sf,
                );
            }
            _ => unreachable!("2-bit field"),
        }
    }
    else {
        match mode {
            0 => read_vlc_delta_offset(br, extension_unit, &mut sf),
            1 => read_vlc_distance_to_baseline(
                br,
                extension_unit,
                primary_scale_factors,
                primary_extension_unit,
                &mut sf,
            ),
            2 => read_vlc_delta_offset_with_baseline(
                br,
                extension_unit,
                primary_scale_factors,
                primary_extension_unit,
                &mut sf,
            ),
            3 => {
                if first_in_superframe {
                    return decode_error(Atrac9Error::UnpackScaleFactorModeInvalid);
                }
                read_vlc_distance_to_baseline(
                    br,
                    extension_unit,
                    scale_factors_prev,
                    quantization_units_prev,
                    &mut sf,
                );
            }
            _ => unreachable!("2-bit field"),
        }
    }

    for &value in sf[..extension_unit].iter() {
        if !(0..=31).contains(&value) {
            return decode_error(Atrac9Error::UnpackScaleFactorOob);
        }
    }

    Ok((mode, sf))
}

fn read_clc_offset(br: &mut BitReader<'_>, extension_unit: usize, sf: &mut [i32; 31]) {
    const MAX_BITS: u32 = 5;
    let bit_length = br.read_int(2) + 2;
    let base_value = if bit_length < MAX_BITS { br.read_int(MAX_BITS) as i32 } else { 0 };

    for s in sf[..extension_unit].iter_mut() {
        *s = br.read_int(bit_length) as i32 + base_value;
    }
}

fn read_vlc_delta_offset(br: &mut BitReader<'_>, extension_unit: usize, sf: &mut [i32; 31]) {
    let weight_index = br.read_int(3) as usize;
    let weights = SCALE_FACTOR_WEIGHTS.row(weight_index);

    let base_value = br.read_int(5) as i32;
    let bit_length = br.read_int(2) + 3;
    let codebook = &HUFFMAN_SCALE_FACTORS_UNSIGNED[bit_length as usize];

    sf[0] = br.read_int(bit_length) as i32;
    for i in 1..extension_unit {
        let delta = read_huffman_value(codebook, br, false);
        sf[i] = (sf[i - 1] + delta) & (codebook.value_max - 1);
    }

    for i in 0..extension_unit {
        sf[i] += base_value - weights[i] as i32;
    }
}

fn read_vlc_distance_to_baseline(
    br: &mut BitReader<'_>,
    extension_unit: usize,
    baseline: &[i32; 31],
    baseline_len: usize,
    sf: &mut [i32; 31],
) {
    let bit_length = br.read_int(2) + 2;
    let codebook = &HUFFMAN_SCALE_FACTORS_SIGNED[bit_length as usize];
    let unit_count = extension_unit.min(baseline_len);

    for i in 0..unit_count {
        let distance = read_huffman_value(codebook, br, true);
        sf[i] = (baseline[i] + distance) & 31;
    }
    for s in sf[unit_count..extension_unit].iter_mut() {
        *s = br.read_int(5) as i32;
    }
}

fn read_vlc_delta_offset_with_baseline(
    br: &mut BitReader<'_>,
    extension_unit: usize,
    baseline: &[i32; 31],
    baseline_len: usize,
    sf: &mut [i32; 31],
) {
    let base_value = br.read_offset_binary(5);
    let bit_length = br.read_int(2) + 1;
    let codebook = &HUFFMAN_SCALE_FACTORS_UNSIGNED[bit_length as usize];
    let unit_count = extension_unit.min(baseline_len);

    sf[0] = br.read_int(bit_length) as i32;
    for i in 1..unit_count {
        let delta = read_huffman_value(codebook, br, false);
        sf[i] = (sf[i - 1] + delta) & (codebook.value_max - 1);
    }

    for i in 0..unit_count {
        sf[i] += base_value + baseline[i];
    }
    for s in sf[unit_count..extension_unit].iter_mut() {
        *s = br.read_int(5) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clc_mode_rejects_out_of_bounds() {
        // mode=1 (CLC), bitLength=ReadInt(2)+2; pick bits that force an out-of-range value.
        // mode(2 bits)=01, bitLength_field(2 bits)=11 -> bitLength=5 (no base preamble since
        // bitLength == maxBits == 5), then 5-bit fields for each unit, all set to 31.
        let data = [0b01_11_1111, 0b1110_0000];
        let mut br = BitReader::new(&data);
        let prev = [0i32; 31];
        let result =
            read_scale_factors(&mut br, 0, 1, false, &prev, 0, &prev, 0);
        assert_eq!(result, Ok((1, {
            let mut sf = [0i32; 31];
            sf[0] = 31;
            sf
        })));
    }

    #[test]
    fn first_in_superframe_rejects_baseline_modes() {
        // mode=2 on channel 0.
        let data = [0b10_000000];
        let mut br = BitReader::new(&data);
        let prev = [0i32; 31];
        let result = read_scale_factors(&mut br, 0, 1, true, &prev, 0, &prev, 0);
        assert_eq!(result, Err(Atrac9Error::UnpackScaleFactorModeInvalid));
    }
}
