// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit-allocation gradient construction and coarse/fine precision assignment. Formulas are
//! taken directly from the reference decoder's `bit_allocation.c`.

use crate::frame::{Block, Channel};
use crate::tables::BASE_CURVE;
use lazy_static::lazy_static;

lazy_static! {
    /// `GRADIENT_CURVES[length - 1][i] = BASE_CURVE[i * 48 / length]`, for `length` in `1..=48`.
    static ref GRADIENT_CURVES: [[u8; 48]; 48] = {
        let base_length = BASE_CURVE.len();
        let mut curves = [[0u8; 48]; 48];
        for length in 1..=base_length {
            for i in 0..length {
                curves[length - 1][i] = BASE_CURVE[i * base_length / length];
            }
        }
        curves
    };
}

/// Fills `block.gradient[0..=quantization_unit_count]` from the block's gradient parameters.
pub fn create_gradient(block: &mut Block) {
    let value_count = block.gradient_end_value - block.gradient_start_value;
    let unit_count = block.gradient_end_unit as i32 - block.gradient_start_unit as i32;

    for g in block.gradient[..block.gradient_end_unit].iter_mut() {
        *g = block.gradient_start_value;
    }
    for g in block.gradient[block.gradient_end_unit..=block.quantization_unit_count].iter_mut() {
        *g = block.gradient_end_value;
    }

    if unit_count <= 0 || value_count == 0 {
        return;
    }

    let curve = &GRADIENT_CURVES[(unit_count - 1) as usize];
    if value_count <= 0 {
        let scale = (-value_count - 1) as f64 / 31.0;
        let base = block.gradient_start_value - 1;
        for i in block.gradient_start_unit..block.gradient_end_unit {
            block.gradient[i] = base - (curve[i - block.gradient_start_unit] as f64 * scale) as i32;
        }
    }
    else {
        let scale = (value_count - 1) as f64 / 31.0;
        let base = block.gradient_start_value + 1;
        for i in block.gradient_start_unit..block.gradient_end_unit {
            block.gradient[i] = base + (curve[i - block.gradient_start_unit] as f64 * scale) as i32;
        }
    }
}

/// Computes the scale-factor-delta based precision boost mask for a channel.
pub fn calculate_mask(channel: &mut Channel, quantization_unit_count: usize) {
    channel.precision_mask = [0; 30];
    for i in 1..quantization_unit_count {
        let delta = channel.scale_factors[i] - channel.scale_factors[i - 1];
        if delta > 1 {
            channel.precision_mask[i] += (delta - 1).min(5);
        }
        else if delta < -1 {
            channel.precision_mask[i - 1] += (-delta - 1).min(5);
        }
    }
}

/// Computes coarse and fine precisions for a channel, given its block's gradient. Takes the
/// gradient fields by value rather than `&Block` so callers can invoke it while `block`'s
/// channels are themselves borrowed element-wise.
pub fn calculate_precisions(
    channel: &mut Channel,
    quant_units: usize,
    gradient_mode: u32,
    gradient: &[i32; 31],
    gradient_boundary: usize,
) {
    if gradient_mode != 0 {
        for i in 0..quant_units {
            let mut p = channel.scale_factors[i] + channel.precision_mask[i] - gradient[i];
            if p > 0 {
                p = match gradient_mode {
                    1 => p / 2,
                    2 => 3 * p / 8,
                    3 => p / 4,
                    _ => p,
                };
            }
            channel.precisions[i] = p;
        }
    }
    else {
        for i in 0..quant_units {
            channel.precisions[i] = channel.scale_factors[i] - gradient[i];
        }
    }

    for p in channel.precisions[..quant_units].iter_mut() {
        if *p < 1 {
            *p = 1;
        }
    }

    for p in channel.precisions[..gradient_boundary].iter_mut() {
        *p += 1;
    }

    for i in 0..quant_units {
        channel.precisions_fine[i] = 0;
        if channel.precisions[i] > 15 {
            channel.precisions_fine[i] = channel.precisions[i] - 15;
            channel.precisions[i] = 15;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockType;

    fn make_block() -> Block {
        Block::new(BlockType::Mono, 0, 8)
    }

    #[test]
    fn flat_gradient_when_values_match() {
        let mut block = make_block();
        block.quantization_unit_count = 10;
        block.gradient_start_unit = 2;
        block.gradient_end_unit = 8;
        block.gradient_start_value = 5;
        block.gradient_end_value = 5;

        create_gradient(&mut block);

        for i in 0..8 {
            assert_eq!(block.gradient[i], 5);
        }
        for i in 8..=10 {
            assert_eq!(block.gradient[i], 5);
        }
    }

    #[test]
    fn precisions_stay_within_bounds() {
        let mut block = make_block();
        block.quantization_unit_count = 5;
        block.gradient_boundary = 2;
        block.gradient = [10; 31];

        let mut channel = Channel::new(0, 8);
        channel.scale_factors = [31; 31];

        calculate_mask(&mut channel, block.quantization_unit_count);
        calculate_precisions(
            &mut channel,
            block.quantization_unit_count,
            block.gradient_mode,
            &block.gradient,
            block.gradient_boundary,
        );

        for i in 0..block.quantization_unit_count {
            assert!(channel.precisions[i] >= 1 && channel.precisions[i] <= 15);
            assert!(channel.precisions_fine[i] >= 0);
        }
    }
}
