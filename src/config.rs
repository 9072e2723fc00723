// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing and validation of the 4-byte `configData` blob that seeds a decoder instance.

use crate::bitreader::BitReader;
use crate::error::{decode_error, Atrac9Error, Result};
use crate::tables;

pub const CONFIG_DATA_SIZE: usize = 4;
pub const MAX_CHANNEL_COUNT: usize = 8;
pub const MAX_BLOCK_COUNT: usize = 5;
pub const MAX_BLOCK_CHANNEL_COUNT: usize = 2;
pub const MAX_FRAME_SAMPLES: usize = 256;
pub const MAX_BEX_VALUES: usize = 4;
pub const MAX_QUANT_UNITS: usize = 30;

/// The three kinds of block a channel configuration can be made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Mono,
    Stereo,
    Lfe,
}

impl BlockType {
    pub fn channel_count(self) -> usize {
        match self {
            BlockType::Mono => 1,
            BlockType::Stereo => 2,
            BlockType::Lfe => 1,
        }
    }
}

/// Describes how a `channelConfigIndex` maps onto a sequence of blocks.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub block_count: usize,
    pub channel_count: usize,
    pub types: [BlockType; MAX_BLOCK_COUNT],
}

/// Fully resolved, immutable decoder configuration derived from `configData`.
#[derive(Debug, Clone, Copy)]
pub struct ConfigData {
    pub config_data: [u8; CONFIG_DATA_SIZE],
    pub sample_rate_index: usize,
    pub channel_config_index: usize,
    pub frame_bytes: usize,
    pub superframe_index: usize,

    pub channel_config: ChannelConfig,
    pub channel_count: usize,
    pub sample_rate: u32,
    pub high_sample_rate: bool,
    pub frames_per_superframe: usize,
    pub frame_samples_power: u32,
    pub frame_samples: usize,
    pub superframe_bytes: usize,
    pub superframe_samples: usize,
}

impl ConfigData {
    /// Parses and validates a 4-byte `configData` blob, as read from an AT9/RIFF container's
    /// codec-private data. Returns [`Atrac9Error::BadConfigData`] if the fixed header byte or
    /// reserved bit do not match.
    pub fn parse(config_data: &[u8; CONFIG_DATA_SIZE]) -> Result<ConfigData> {
        let mut br = BitReader::new(config_data);

        let header = br.read_int(8);
        let sample_rate_index = br.read_int(4) as usize;
        let channel_config_index = br.read_int(3) as usize;
        let validation_bit = br.read_int(1);
        let frame_bytes = br.read_int(11) as usize + 1;
        let superframe_index = br.read_int(2) as usize;

        if header != 0xFE || validation_bit != 0 {
            return decode_error(Atrac9Error::BadConfigData);
        }

        let channel_config = tables::CHANNEL_CONFIGS[channel_config_index];
        let sample_rate = tables::SAMPLE_RATES[sample_rate_index];
        let high_sample_rate = sample_rate_index > 7;
        let frame_samples_power = tables::SAMPLE_RATE_INDEX_TO_FRAME_SAMPLES_POWER[sample_rate_index];
        let frame_samples = 1usize << frame_samples_power;
        let frames_per_superframe = 1usize << superframe_index;
        let superframe_bytes = frame_bytes << superframe_index;
        let superframe_samples = frame_samples * frames_per_superframe;

        Ok(ConfigData {
            config_data: *config_data,
            sample_rate_index,
            channel_config_index,
            frame_bytes,
            superframe_index,
            channel_config,
            channel_count: channel_config.channel_count,
            sample_rate,
            high_sample_rate,
            frames_per_superframe,
            frame_samples_power,
            frame_samples,
            superframe_bytes,
            superframe_samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_header() {
        let bad = [0x00, 0x00, 0x80, 0x08];
        assert_eq!(ConfigData::parse(&bad), Err(Atrac9Error::BadConfigData));
    }

    #[test]
    fn rejects_reserved_bit() {
        // header=0xFE, sampleRateIndex=0, channelConfigIndex=0, reserved=1, ...
        let bad = [0xFE, 0x01, 0x00, 0x00];
        assert_eq!(ConfigData::parse(&bad), Err(Atrac9Error::BadConfigData));
    }

    #[test]
    fn parses_mono_config() {
        // header=0xFE, sampleRateIndex=0, channelConfigIndex=0 (mono), reserved=0,
        // frameBytes-1=0, superframeIndex=0.
        let data = [0xFE, 0x00, 0x00, 0x00];
        let config = ConfigData::parse(&data).unwrap();
        assert_eq!(config.sample_rate_index, 0);
        assert_eq!(config.channel_config_index, 0);
        assert_eq!(config.frame_bytes, 1);
        assert_eq!(config.superframe_index, 0);
        assert_eq!(config.frames_per_superframe, 1);
        assert_eq!(config.channel_count, 1);
    }
}
