// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-frame, per-block and per-channel working state threaded through unpack and
//! synthesis.

use crate::config::{BlockType, ConfigData, MAX_BEX_VALUES, MAX_FRAME_SAMPLES, MAX_QUANT_UNITS};
use crate::mdct::Mdct;
use crate::rng::BexRng;

/// Per-channel decode state: scale factors, precisions, quantized and dequantized spectra,
/// the IMDCT engine, and band-extension parameters.
pub struct Channel {
    pub channel_index: usize,

    pub mdct: Mdct,

    pub pcm: [f64; MAX_FRAME_SAMPLES],
    pub spectra: [f64; MAX_FRAME_SAMPLES],

    pub coded_quant_units: usize,
    pub scale_factor_coding_mode: u32,

    pub scale_factors: [i32; 31],
    pub scale_factors_prev: [i32; 31],

    pub precisions: [i32; MAX_QUANT_UNITS],
    pub precisions_fine: [i32; MAX_QUANT_UNITS],
    pub precision_mask: [i32; MAX_QUANT_UNITS],

    pub codebook_set: [usize; MAX_QUANT_UNITS],

    pub quantized_spectra: [i32; MAX_FRAME_SAMPLES],
    pub quantized_spectra_fine: [i32; MAX_FRAME_SAMPLES],

    pub bex_mode: usize,
    pub bex_value_count: usize,
    pub bex_values: [i32; MAX_BEX_VALUES],

    pub rng: BexRng,
}

impl Channel {
    pub fn new(channel_index: usize, frame_samples_power: u32) -> Channel {
        Channel {
            channel_index,
            mdct: Mdct::new(frame_samples_power),
            pcm: [0.0; MAX_FRAME_SAMPLES],
            spectra: [0.0; MAX_FRAME_SAMPLES],
            coded_quant_units: 0,
            scale_factor_coding_mode: 0,
            scale_factors: [0; 31],
            scale_factors_prev: [0; 31],
            precisions: [0; MAX_QUANT_UNITS],
            precisions_fine: [0; MAX_QUANT_UNITS],
            precision_mask: [0; MAX_QUANT_UNITS],
            codebook_set: [0; MAX_QUANT_UNITS],
            quantized_spectra: [0; MAX_FRAME_SAMPLES],
            quantized_spectra_fine: [0; MAX_FRAME_SAMPLES],
            bex_mode: 0,
            bex_value_count: 0,
            bex_values: [0; MAX_BEX_VALUES],
            rng: BexRng::new(),
        }
    }
}

/// Per-block decode state: band layout, gradient, stereo and band-extension parameters, and
/// the block's 1 or 2 channels.
pub struct Block {
    pub block_type: BlockType,
    pub block_index: usize,
    pub channels: Vec<Channel>,

    pub first_in_superframe: bool,
    pub reuse_band_params: bool,

    pub band_count: usize,
    pub stereo_band: usize,
    pub extension_band: usize,
    pub quantization_unit_count: usize,
    pub stereo_quantization_unit: usize,
    pub extension_unit: usize,
    pub quantization_units_prev: usize,

    pub gradient: [i32; 31],
    pub gradient_mode: u32,
    pub gradient_start_unit: usize,
    pub gradient_start_value: i32,
    pub gradient_end_unit: usize,
    pub gradient_end_value: i32,
    pub gradient_boundary: usize,

    pub primary_channel_index: usize,
    pub has_joint_stereo_signs: bool,
    pub joint_stereo_signs: [i32; MAX_QUANT_UNITS],

    pub band_extension_enabled: bool,
    pub has_extension_data: bool,
    pub bex_data_length: usize,
    pub bex_mode: usize,
}

impl Block {
    pub fn new(block_type: BlockType, block_index: usize, frame_samples_power: u32) -> Block {
        let channel_count = block_type.channel_count();
        let channels = (0..channel_count)
            .map(|i| Channel::new(i, frame_samples_power))
            .collect();

        Block {
            block_type,
            block_index,
            channels,
            first_in_superframe: true,
            reuse_band_params: false,
            band_count: 0,
            stereo_band: 0,
            extension_band: 0,
            quantization_unit_count: 0,
            stereo_quantization_unit: 0,
            extension_unit: 0,
            quantization_units_prev: 0,
            gradient: [0; 31],
            gradient_mode: 0,
            gradient_start_unit: 0,
            gradient_start_value: 0,
            gradient_end_unit: 0,
            gradient_end_value: 0,
            gradient_boundary: 0,
            primary_channel_index: 0,
            has_joint_stereo_signs: false,
            joint_stereo_signs: [0; MAX_QUANT_UNITS],
            band_extension_enabled: false,
            has_extension_data: false,
            bex_data_length: 0,
            bex_mode: 0,
        }
    }
}

/// A single compressed frame's worth of decode state for every block in the channel
/// configuration.
pub struct Frame {
    pub index_in_superframe: usize,
    pub blocks: Vec<Block>,
}

impl Frame {
    pub fn new(config: &ConfigData) -> Frame {
        let blocks = config.channel_config.types[..config.channel_config.block_count]
            .iter()
            .enumerate()
            .map(|(i, &block_type)| Block::new(block_type, i, config.frame_samples_power))
            .collect();

        Frame { index_in_superframe: 0, blocks }
    }
}
