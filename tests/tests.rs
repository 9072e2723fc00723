// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crate-level integration scenarios exercising the public `Atrac9Decoder` API end to end,
//! rather than a single module's internals.

use symphonia_codec_atrac9::{Atrac9Decoder, Atrac9Error};

/// header=0xFE, sampleRateIndex=6 (48kHz), channelConfigIndex=0 (mono), reserved=0,
/// frameBytes-1=159 (frameBytes=160), superframeIndex=0.
const MONO_CONFIG_DATA: [u8; 4] = [0xFE, 0x60, 0x13, 0xE0];

#[test]
fn mono_single_frame_superframe_decodes_silence() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    let compressed = vec![0u8; frame_bytes];
    let pcm = decoder.decode(&compressed).unwrap();

    assert_eq!(pcm.len(), decoder.config().frame_samples * decoder.config().channel_count);
    assert!(pcm.iter().all(|&v| v == 0.0));
}

#[test]
fn reuse_band_params_on_first_block_of_superframe_is_rejected() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    // firstInSuperframe=0, reuseBandParams=1 on a non-LFE block.
    let mut compressed = vec![0u8; frame_bytes];
    compressed[0] = 0x40;

    let err = decoder.decode(&compressed).unwrap_err();
    assert_eq!(err, Atrac9Error::UnpackReuseBandParamsInvalid);
}

#[test]
fn scale_factor_mode_2_on_first_frame_of_superframe_is_rejected() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    // bandCount=1, no band extension, flat gradient, then scale factor mode=2 (VLC
    // distance-to-baseline) on channel 0 while firstInSuperframe is still true.
    let mut compressed = vec![0u8; frame_bytes];
    compressed[4] = 0x08;

    let err = decoder.decode(&compressed).unwrap_err();
    assert_eq!(err, Atrac9Error::UnpackScaleFactorModeInvalid);
}

#[test]
fn gradient_start_unit_past_end_unit_is_rejected() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    // bandCount=1, gradientMode=0 (explicit endpoints), gradientStartUnit=5 > gradientEndUnit=1.
    let mut compressed = vec![0u8; frame_bytes];
    compressed[1] = 0x0A;

    let err = decoder.decode(&compressed).unwrap_err();
    assert_eq!(err, Atrac9Error::GradEndUnitInvalid);
}

#[test]
fn band_extension_enabled_below_the_minimum_quantization_unit_count_is_rejected() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    // bandCount=1 (quantizationUnitCount=1) with bandExtensionEnabled=1 and extensionBand=1:
    // every other field stays at its all-zero default and passes validation, but
    // quantizationUnitCount is below BEX_GROUP_INFO's lowest valid index (13).
    let mut compressed = vec![0u8; frame_bytes];
    compressed[0] = 0x02;

    let err = decoder.decode(&compressed).unwrap_err();
    assert_eq!(err, Atrac9Error::UnpackBandParamsInvalid);
}

#[test]
fn extension_data_overrunning_its_declared_length_is_rejected() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;

    // bandCount=16 with band extension to 16, a flat gradient, then a 1-bit bexDataLength that
    // the subsequent BEX parameter reads overrun.
    let mut compressed = vec![0u8; frame_bytes];
    compressed[0] = 0x3F;
    compressed[1] = 0xE8;
    compressed[3] = 0x08;
    compressed[4] = 0x10;

    let err = decoder.decode(&compressed).unwrap_err();
    assert_eq!(err, Atrac9Error::UnpackExtensionDataInvalid);
}

#[test]
fn render_adapters_agree_with_core_f64_pcm_for_silence() {
    let mut decoder = Atrac9Decoder::new(&MONO_CONFIG_DATA).unwrap();
    let frame_bytes = decoder.config().frame_bytes;
    let compressed = vec![0u8; frame_bytes];

    let frame_samples = decoder.config().frame_samples;
    let pcm = decoder.decode(&compressed).unwrap().to_vec();

    let mut s16 = vec![0i16; frame_samples];
    let mut s32 = vec![0i32; frame_samples];
    let mut f32 = vec![0f32; frame_samples];
    let mut f64_out = vec![0f64; frame_samples];

    symphonia_codec_atrac9::render_s16(&pcm, &mut s16);
    symphonia_codec_atrac9::render_s32(&pcm, &mut s32);
    symphonia_codec_atrac9::render_f32(&pcm, &mut f32);
    symphonia_codec_atrac9::render_f64(&pcm, &mut f64_out);

    assert!(s16.iter().all(|&v| v == 0));
    assert!(s32.iter().all(|&v| v == 0));
    assert!(f32.iter().all(|&v| v == 0.0));
    assert!(f64_out.iter().all(|&v| v == 0.0));
}
