// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `Atrac9Error` enumerates every way a configuration blob or compressed frame can be
/// rejected by the decoder. Each variant carries the stable numeric code a C ABI boundary
/// would surface to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atrac9Error {
    /// The 4-byte `configData` header or reserved bit did not match the expected pattern.
    BadConfigData,
    /// `reuseBandParams` was set on the first block of a superframe for a non-LFE block.
    UnpackReuseBandParamsInvalid,
    /// A decoded band count or stereo band fell outside the bounds implied by the sample rate.
    UnpackBandParamsInvalid,
    /// `gradientBoundary` exceeded the quantization unit count.
    UnpackGradBoundaryInvalid,
    /// `gradientStartUnit` was outside `[0, 48)`.
    GradStartUnitOob,
    /// `gradientEndUnit` was outside `[0, 48)`.
    GradEndUnitOob,
    /// `gradientStartUnit` was greater than `gradientEndUnit`.
    GradEndUnitInvalid,
    /// `gradientStartValue` was outside `[0, 32)`.
    GradStartValueOob,
    /// `gradientEndValue` was outside `[0, 32)`.
    GradEndValueOob,
    /// A scale factor coding mode referenced the previous frame on the first frame of a
    /// superframe, where no previous frame exists.
    UnpackScaleFactorModeInvalid,
    /// A decoded scale factor fell outside `[0, 31]`.
    UnpackScaleFactorOob,
    /// Band extension side data ran past its declared length.
    UnpackExtensionDataInvalid,
    /// A block was flagged as the first block of a superframe outside of superframe index 0.
    UnpackSuperframeFlagInvalid,
    /// Catch-all for conditions that have no more specific variant.
    Other(&'static str),
}

impl Atrac9Error {
    /// The stable numeric error code a C ABI boundary would report for this error.
    pub fn code(self) -> u32 {
        match self {
            Atrac9Error::BadConfigData => 1,
            Atrac9Error::UnpackReuseBandParamsInvalid => 2,
            Atrac9Error::UnpackBandParamsInvalid => 3,
            Atrac9Error::UnpackGradBoundaryInvalid => 4,
            Atrac9Error::GradStartUnitOob => 5,
            Atrac9Error::GradEndUnitOob => 6,
            Atrac9Error::GradEndUnitInvalid => 7,
            Atrac9Error::GradStartValueOob => 8,
            Atrac9Error::GradEndValueOob => 9,
            Atrac9Error::UnpackScaleFactorModeInvalid => 10,
            Atrac9Error::UnpackScaleFactorOob => 11,
            Atrac9Error::UnpackExtensionDataInvalid => 12,
            Atrac9Error::UnpackSuperframeFlagInvalid => 13,
            Atrac9Error::Other(_) => 0xffff,
        }
    }
}

impl fmt::Display for Atrac9Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Atrac9Error::BadConfigData => write!(f, "malformed configData header"),
            Atrac9Error::UnpackReuseBandParamsInvalid => {
                write!(f, "reuseBandParams set on first block of superframe")
            }
            Atrac9Error::UnpackBandParamsInvalid => write!(f, "band count out of range"),
            Atrac9Error::UnpackGradBoundaryInvalid => write!(f, "gradient boundary out of range"),
            Atrac9Error::GradStartUnitOob => write!(f, "gradient start unit out of bounds"),
            Atrac9Error::GradEndUnitOob => write!(f, "gradient end unit out of bounds"),
            Atrac9Error::GradEndUnitInvalid => write!(f, "gradient start unit exceeds end unit"),
            Atrac9Error::GradStartValueOob => write!(f, "gradient start value out of bounds"),
            Atrac9Error::GradEndValueOob => write!(f, "gradient end value out of bounds"),
            Atrac9Error::UnpackScaleFactorModeInvalid => {
                write!(f, "scale factor coding mode invalid for first frame of superframe")
            }
            Atrac9Error::UnpackScaleFactorOob => write!(f, "decoded scale factor out of bounds"),
            Atrac9Error::UnpackExtensionDataInvalid => {
                write!(f, "band extension data overran its declared length")
            }
            Atrac9Error::UnpackSuperframeFlagInvalid => {
                write!(f, "first-in-superframe block seen outside superframe index 0")
            }
            Atrac9Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for Atrac9Error {}

pub type Result<T> = result::Result<T, Atrac9Error>;

/// Convenience function for returning a typed decode failure from a `?`-heavy call chain.
pub fn decode_error<T>(err: Atrac9Error) -> Result<T> {
    Err(err)
}
