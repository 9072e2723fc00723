// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inverse MDCT with windowed overlap-add, for frame sizes of 64, 128 and 256 samples.

use crate::config::MAX_FRAME_SAMPLES;
use lazy_static::lazy_static;
use std::f64::consts::PI;

/// Per-size-bits (0..=8) sine/cosine twiddle tables and bit-reversed shuffle tables, shared by
/// every [`Mdct`] instance.
struct TrigTables {
    sin: [Vec<f64>; 9],
    cos: [Vec<f64>; 9],
    shuffle: [Vec<usize>; 9],
}

fn bit_reverse(value: usize, bits: u32) -> usize {
    let mut v = value;
    let mut r = 0usize;
    for _ in 0..bits {
        r = (r << 1) | (v & 1);
        v >>= 1;
    }
    r
}

fn generate_trig_tables() -> TrigTables {
    let mut sin: [Vec<f64>; 9] = Default::default();
    let mut cos: [Vec<f64>; 9] = Default::default();
    let mut shuffle: [Vec<usize>; 9] = Default::default();

    for size_bits in 0..9u32 {
        let size = 1usize << size_bits;
        let mut sin_tab = Vec::with_capacity(size);
        let mut cos_tab = Vec::with_capacity(size);
        for i in 0..size {
            let value = PI * (4 * i + 1) as f64 / (4 * size) as f64;
            sin_tab.push(value.sin());
            cos_tab.push(value.cos());
        }
        sin[size_bits as usize] = sin_tab;
        cos[size_bits as usize] = cos_tab;

        let mut shuffle_tab = Vec::with_capacity(size);
        for i in 0..size {
            shuffle_tab.push(bit_reverse(i ^ (i / 2), size_bits));
        }
        shuffle[size_bits as usize] = shuffle_tab;
    }

    TrigTables { sin, cos, shuffle }
}

/// Per-frame-size (64, 128, 256) MDCT analysis window and its derived IMDCT window.
struct WindowTables {
    /// Indexed by `frameSizePower - 6` (0..=2).
    mdct: [Vec<f64>; 3],
    imdct: [Vec<f64>; 3],
}

fn generate_window_tables() -> WindowTables {
    let mut mdct: [Vec<f64>; 3] = Default::default();
    let mut imdct: [Vec<f64>; 3] = Default::default();

    for frame_size_power in 6..=8u32 {
        let frame_size = 1usize << frame_size_power;
        let mut window = Vec::with_capacity(frame_size);
        for i in 0..frame_size {
            let value = (((i as f64 + 0.5) / frame_size as f64 - 0.5) * PI).sin();
            window.push((value + 1.0) * 0.5);
        }

        let mut iwindow = Vec::with_capacity(frame_size);
        for i in 0..frame_size {
            let a = window[frame_size - 1 - i];
            let b = window[i];
            iwindow.push(b / (a * a + b * b));
        }

        let idx = (frame_size_power - 6) as usize;
        mdct[idx] = window;
        imdct[idx] = iwindow;
    }

    WindowTables { mdct, imdct }
}

lazy_static! {
    static ref TRIG_TABLES: TrigTables = generate_trig_tables();
    static ref WINDOW_TABLES: WindowTables = generate_window_tables();
}

/// Per-channel inverse MDCT state: transform size plus the overlap-add carry buffer.
pub struct Mdct {
    bits: u32,
    size: usize,
    scale: f64,
    imdct_previous: Vec<f64>,
}

impl Mdct {
    /// Creates IMDCT state for a transform of `2^frame_samples_power` samples.
    pub fn new(frame_samples_power: u32) -> Mdct {
        let size = 1usize << frame_samples_power;
        Mdct {
            bits: frame_samples_power,
            size,
            scale: 2.0 * (1.0 / size as f64).sqrt(),
            imdct_previous: vec![0.0; MAX_FRAME_SAMPLES],
        }
    }

    /// Runs the inverse MDCT over `spectra[0..size]`, writing `size` time-domain samples (the
    /// overlap-added combination of this frame and the carried-over tail of the previous one)
    /// into `pcm[0..size]`.
    pub fn run_imdct(&mut self, spectra: &[f64], pcm: &mut [f64]) {
        let size = self.size;
        let half = size / 2;
        let sin_tab = &TRIG_TABLES.sin[self.bits as usize];
        let cos_tab = &TRIG_TABLES.cos[self.bits as usize];
        let shuffle = &TRIG_TABLES.shuffle[self.bits as usize];

        // Pre-twiddle the real input spectrum into a half-length complex buffer.
        let mut real = vec![0.0f64; half];
        let mut imag = vec![0.0f64; half];
        for i in 0..half {
            let re = spectra[2 * i];
            let im = spectra[size - 1 - 2 * i];
            real[i] = re * cos_tab[i] + im * sin_tab[i];
            imag[i] = re * sin_tab[i] - im * cos_tab[i];
        }

        // In-place radix-2 FFT via the bit-reversed shuffle table.
        let mut shuffled_re = vec![0.0f64; half];
        let mut shuffled_im = vec![0.0f64; half];
        for i in 0..half {
            shuffled_re[shuffle[i] % half] = real[i];
            shuffled_im[shuffle[i] % half] = imag[i];
        }

        let bits = self.bits - 1;
        fft_in_place(&mut shuffled_re, &mut shuffled_im, bits);

        // Post-twiddle back into a real, full-length time-domain frame, windowed and
        // overlap-added with the previous frame's tail.
        let window = &WINDOW_TABLES.imdct[(self.bits - 6) as usize];
        let mut current = vec![0.0f64; size];
        for i in 0..half {
            let re = shuffled_re[i] * cos_tab[i] + shuffled_im[i] * sin_tab[i];
            let im = shuffled_re[i] * sin_tab[i] - shuffled_im[i] * cos_tab[i];
            current[2 * i] = re * self.scale;
            current[size - 1 - 2 * i] = -im * self.scale;
        }

        for i in 0..half {
            let a = current[i] * window[i];
            pcm[i] = self.imdct_previous[i] + a;
        }
        for i in half..size {
            pcm[i] = current[i] * window[i];
        }

        for i in 0..size {
            self.imdct_previous[i] = current[size - 1 - i] * window[size - 1 - i];
        }
    }
}

/// An in-place iterative Cooley-Tukey radix-2 DIT FFT of length `1 << bits`, operating on
/// already bit-reversed input.
fn fft_in_place(re: &mut [f64], im: &mut [f64], bits: u32) {
    let n = 1usize << bits;
    let mut size = 2usize;
    while size <= n {
        let half = size / 2;
        let angle_step = -PI / half as f64;
        for start in (0..n).step_by(size) {
            for k in 0..half {
                let angle = angle_step * k as f64;
                let (wr, wi) = (angle.cos(), angle.sin());
                let a_re = re[start + k];
                let a_im = im[start + k];
                let b_re = re[start + k + half] * wr - im[start + k + half] * wi;
                let b_im = re[start + k + half] * wi + im[start + k + half] * wr;
                re[start + k] = a_re + b_re;
                im[start + k] = a_im + b_im;
                re[start + k + half] = a_re - b_re;
                im[start + k + half] = a_im - b_im;
            }
        }
        size <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_silence_out() {
        let mut mdct = Mdct::new(6);
        let spectra = [0.0f64; 64];
        let mut pcm = [0.0f64; 64];
        mdct.run_imdct(&spectra, &mut pcm);
        for sample in pcm.iter() {
            assert!(sample.abs() < 1e-10);
        }
    }

    #[test]
    fn steady_state_is_bounded() {
        // A constant non-zero spectrum should not blow up across repeated overlap-add frames.
        let mut mdct = Mdct::new(7);
        let spectra = [0.01f64; 128];
        let mut pcm = [0.0f64; 128];
        for _ in 0..8 {
            mdct.run_imdct(&spectra, &mut pcm);
        }
        for sample in pcm.iter() {
            assert!(sample.is_finite());
            assert!(sample.abs() < 10.0);
        }
    }
}
