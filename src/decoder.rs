// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level decoder handle and its per-frame pipeline. Mirrors `decoder.c` in the
//! reference decoder: `DecodeFrame` composes unpack, dequantize, intensity stereo, spectrum
//! scaling, band extension and IMDCT; the `PcmFloatTo*` family is reproduced as the ambient
//! [`render_s16`]/[`render_s32`]/[`render_f32`]/[`render_f64`] adapters.

use log::{debug, trace};

use crate::bandext::apply_band_extension;
use crate::bitreader::BitReader;
use crate::config::{BlockType, ConfigData, CONFIG_DATA_SIZE};
use crate::error::Result;
use crate::frame::{Block, Frame};
use crate::quantize::{dequantize_spectra, scale_spectrum_block};
use crate::tables::QUANT_UNIT_TO_COEFF_INDEX;
use crate::unpack::unpack_frame;

/// A stateful ATRAC9 decoder instance. Owns its configuration, working frame state and
/// per-channel IMDCT overlap buffers for its entire lifetime; frames must be fed in order,
/// starting at a superframe boundary.
pub struct Atrac9Decoder {
    config: ConfigData,
    frame: Frame,
    pcm_out: Vec<f64>,
    bytes_used: usize,
}

impl Atrac9Decoder {
    /// Parses `config_data` and allocates the decoder's fixed-size working state. This is the
    /// sole configuration entry point; there is no external config file or environment layer.
    pub fn new(config_data: &[u8; CONFIG_DATA_SIZE]) -> Result<Atrac9Decoder> {
        let config = ConfigData::parse(config_data)?;
        let frame = Frame::new(&config);
        let pcm_out = vec![0.0; config.frame_samples * config.channel_count];

        Ok(Atrac9Decoder { config, frame, pcm_out, bytes_used: 0 })
    }

    /// The parsed configuration this decoder was constructed from.
    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    /// Number of bytes of `compressed_frame` consumed by the most recent [`Atrac9Decoder::decode`]
    /// call.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Decodes one compressed frame, returning the interleaved `f64` PCM samples
    /// (`out[sample * channel_count + ch]`) for `config().frame_samples` samples per channel.
    ///
    /// A single compressed frame is exactly `config().frame_bytes` bytes; callers feed
    /// `framesPerSuperframe` consecutive frames from a superframe contiguously. A validation
    /// failure aborts the call without mutating any cross-frame state (`scaleFactorsPrev`,
    /// `quantizationUnitsPrev`, the IMDCT overlap buffer).
    pub fn decode(&mut self, compressed_frame: &[u8]) -> Result<&[f64]> {
        debug!(
            "atrac9: decode, blocks={}, channels={}, frame_bytes={}",
            self.frame.blocks.len(),
            self.config.channel_count,
            self.config.frame_bytes
        );

        let mut br = BitReader::new(compressed_frame);

        unpack_frame(&mut self.frame, &mut br, &self.config)?;
        self.bytes_used = (br.position() + 7) / 8;

        for block in self.frame.blocks.iter_mut() {
            decode_block(block);
        }

        trace!(
            "atrac9: decoded frame, index_in_superframe={}, bytes_used={}",
            self.frame.index_in_superframe,
            self.bytes_used
        );

        interleave(&self.frame, self.config.channel_count, &mut self.pcm_out);
        Ok(&self.pcm_out)
    }
}

fn decode_block(block: &mut Block) {
    dequantize_spectra(block);
    apply_intensity_stereo(block);
    scale_spectrum_block(block);
    apply_band_extension(block);
    imdct_block(block);
}

/// Copies the secondary channel's high-band spectrum from the primary channel, negated per
/// `jointStereoSigns`, before either channel's spectrum is scaled by its own scale factors.
fn apply_intensity_stereo(block: &mut Block) {
    if block.block_type != BlockType::Stereo {
        return;
    }

    let total_units = block.quantization_unit_count;
    let stereo_units = block.stereo_quantization_unit;
    if stereo_units >= total_units {
        return;
    }

    let (source_index, dest_index) =
        if block.primary_channel_index == 0 { (0, 1) } else { (1, 0) };

    let source_spectra = block.channels[source_index].spectra;
    let signs = block.joint_stereo_signs;

    let dest = &mut block.channels[dest_index];
    for i in stereo_units..total_units {
        let sign = signs[i];
        for sb in QUANT_UNIT_TO_COEFF_INDEX[i]..QUANT_UNIT_TO_COEFF_INDEX[i + 1] {
            dest.spectra[sb] = if sign > 0 { -source_spectra[sb] } else { source_spectra[sb] };
        }
    }
}

fn imdct_block(block: &mut Block) {
    for channel in block.channels.iter_mut() {
        let spectra = channel.spectra;
        channel.mdct.run_imdct(&spectra, &mut channel.pcm);
    }
}

fn interleave(frame: &Frame, channel_count: usize, out: &mut [f64]) {
    let mut ch = 0;
    for block in frame.blocks.iter() {
        for channel in block.channels.iter() {
            let frame_samples = channel.pcm.len().min(out.len() / channel_count.max(1));
            for smpl in 0..frame_samples {
                out[smpl * channel_count + ch] = channel.pcm[smpl];
            }
            ch += 1;
        }
    }
}

/// Reproduces the reference decoder's `x + 0.5 -> int` then `-(x < (int)x)` rounding
/// adjustment. Ties round up (toward positive infinity), not away from zero: `-0.5` becomes
/// `0`, while `-1.5` becomes `-1`.
fn round_half_up(x: f64) -> i64 {
    let shifted = x + 0.5;
    let truncated = shifted as i64;
    truncated - ((shifted < truncated as f64) as i64)
}

/// Converts interleaved `f64` PCM into signed 16-bit samples, rounding half up and saturating
/// to `i16`'s range. Mirrors the reference decoder's `PcmFloatToS16`.
pub fn render_s16(pcm: &[f64], out: &mut [i16]) {
    for (o, &s) in out.iter_mut().zip(pcm.iter()) {
        let v = round_half_up(s);
        *o = v.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    }
}

/// Converts interleaved `f64` PCM into signed 32-bit samples, rounding half up with no
/// saturation (matching the reference decoder, which does not saturate this path either).
pub fn render_s32(pcm: &[f64], out: &mut [i32]) {
    for (o, &s) in out.iter_mut().zip(pcm.iter()) {
        *o = round_half_up(s) as i32;
    }
}

/// Converts interleaved `f64` PCM into `f32` via a direct narrowing cast.
pub fn render_f32(pcm: &[f64], out: &mut [f32]) {
    for (o, &s) in out.iter_mut().zip(pcm.iter()) {
        *o = s as f32;
    }
}

/// Copies interleaved `f64` PCM through unchanged.
pub fn render_f64(pcm: &[f64], out: &mut [f64]) {
    out.copy_from_slice(&pcm[..out.len()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_silence_decodes_to_zero_pcm() {
        // header=0xFE, sampleRateIndex=6 (48kHz), channelConfigIndex=0 (mono), reserved=0,
        // frameBytes-1=159 (frameBytes=160), superframeIndex=0.
        let config_data = [0xFE, 0x60, 0x13, 0xE0];
        let mut decoder = Atrac9Decoder::new(&config_data).unwrap();

        let frame_bytes = decoder.config().frame_bytes;
        let compressed = vec![0u8; frame_bytes];

        let pcm = decoder.decode(&compressed).unwrap();
        assert!(pcm.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn render_s16_rounds_half_up_and_saturates() {
        // The reference `x + 0.5 -> int` adjustment rounds ties up, not away from zero:
        // -0.5 lands on 0, not -1.
        let pcm = [0.5, -0.5, 1.5, 40000.0, -40000.0];
        let mut out = [0i16; 5];
        render_s16(&pcm, &mut out);
        assert_eq!(out, [1, 0, 2, i16::MAX, i16::MIN]);
    }

    #[test]
    fn render_s32_does_not_saturate() {
        let pcm = [2_147_483_647.0 + 100.0];
        let mut out = [0i32; 1];
        render_s32(&pcm, &mut out);
        assert_eq!(out[0], i32::MIN + 99);
    }

    #[test]
    fn render_f32_and_f64_pass_through() {
        let pcm = [1.25, -2.5];
        let mut out32 = [0f32; 2];
        let mut out64 = [0f64; 2];
        render_f32(&pcm, &mut out32);
        render_f64(&pcm, &mut out64);
        assert_eq!(out32, [1.25f32, -2.5f32]);
        assert_eq!(out64, pcm);
    }
}
