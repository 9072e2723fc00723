// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Symphonia crates. Please see clippy.toml for their
// justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]
// Disable to better express the bit-layout formulas this decoder mirrors.
#![allow(clippy::collapsible_else_if)]

mod bandext;
mod bitalloc;
mod bitreader;
mod config;
mod decoder;
mod error;
mod frame;
mod huffman;
mod mdct;
mod quantize;
mod rng;
mod scalefactors;
mod tables;
mod unpack;

pub use config::{BlockType, ChannelConfig, ConfigData, CONFIG_DATA_SIZE, MAX_CHANNEL_COUNT};
pub use decoder::{render_f32, render_f64, render_s16, render_s32, Atrac9Decoder};
pub use error::{Atrac9Error, Result};
