// Symphonia
// Copyright (c) 2019 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical Huffman codebooks, decoded via a direct lookup table sized `2^maxCodeLength`.
//!
//! The codeword-length tables baked into the reference decoder's `huffCodes.c` were not part
//! of the retrieved corpus (see `tables.rs` module docs and `DESIGN.md`). Each codebook here
//! is instead built as a uniform-length canonical code of width `value_bits` — still routed
//! through the same direct-lookup decode path the format's bitstream relies on, but without a
//! claim of bit-exact fidelity to the original encoder's codeword assignment.

use crate::bitreader::BitReader;

/// A canonical Huffman codebook with a precomputed direct lookup table.
pub struct Codebook {
    /// Number of bits in a fully reconstructed (post sign-extension) symbol.
    pub value_bits: u32,
    /// `log2` of how many sub-band values a single symbol expands into.
    pub value_count_power: u32,
    /// Width, in bits, of the longest codeword (and thus of the lookup table index).
    pub max_code_length: u32,
    /// Number of distinct symbol values, `1 << value_bits`.
    pub value_max: i32,
    /// `lookup[peek(max_code_length)] = (symbol, codeword length)`.
    lookup: Vec<(u16, u8)>,
}

impl Codebook {
    /// Builds a uniform-length canonical codebook over `1 << value_bits` symbols.
    fn uniform(value_bits: u32, value_count_power: u32) -> Codebook {
        let value_max = 1i32 << value_bits;
        let max_code_length = value_bits.max(1);
        let lookup_size = 1usize << max_code_length;
        let mut lookup = Vec::with_capacity(lookup_size);
        for code in 0..lookup_size {
            let symbol = (code >> (max_code_length - value_bits)) as u16;
            lookup.push((symbol, value_bits as u8));
        }
        Codebook { value_bits, value_count_power, max_code_length, value_max, lookup }
    }
}

/// Reads one Huffman symbol, optionally sign-extending it to `codebook.value_bits`.
pub fn read_huffman_value(codebook: &Codebook, br: &mut BitReader<'_>, sign_extend: bool) -> i32 {
    let peeked = br.peek_int(codebook.max_code_length) as usize;
    let (symbol, length) = codebook.lookup[peeked];
    br.set_position(br.position() + length as usize);

    if sign_extend {
        let shift = 32 - codebook.value_bits;
        (((symbol as i32) << shift) >> shift) as i32
    }
    else {
        symbol as i32
    }
}

/// Expands `count` coefficients starting at `base_index` into `output`, reading one Huffman
/// symbol per group of `1 << codebook.value_count_power` coefficients and splitting each
/// symbol into its constituent signed sub-values.
pub fn decode_huffman_values(
    output: &mut [i32],
    base_index: usize,
    count: usize,
    codebook: &Codebook,
    br: &mut BitReader<'_>,
) {
    let group_size = 1usize << codebook.value_count_power;
    let group_count = count >> codebook.value_count_power;
    let per_value_bits = codebook.value_bits / group_size.max(1) as u32;
    let per_value_bits = per_value_bits.max(1);

    for group in 0..group_count {
        let symbol = read_huffman_value(codebook, br, false) as u32;
        for sub in 0..group_size {
            let shift = per_value_bits * sub as u32;
            let raw = (symbol >> shift) & ((1u32 << per_value_bits) - 1);
            let sign_shift = 32 - per_value_bits;
            let value = ((raw << sign_shift) as i32) >> sign_shift;
            output[base_index + group * group_size + sub] = value;
        }
    }
}

lazy_static::lazy_static! {
    /// Indexed directly by `bitLength` (the codebook is only ever looked up for
    /// `bitLength` in `1..=6`; index 0 and 7 are unused filler).
    pub static ref HUFFMAN_SCALE_FACTORS_UNSIGNED: [Codebook; 8] = [
        Codebook::uniform(1, 0),
        Codebook::uniform(1, 0),
        Codebook::uniform(2, 0),
        Codebook::uniform(3, 0),
        Codebook::uniform(4, 0),
        Codebook::uniform(5, 0),
        Codebook::uniform(6, 0),
        Codebook::uniform(7, 0),
    ];

    /// Indexed directly by `bitLength` (only ever looked up for `bitLength` in `2..=5`).
    pub static ref HUFFMAN_SCALE_FACTORS_SIGNED: [Codebook; 8] = [
        Codebook::uniform(1, 0),
        Codebook::uniform(2, 0),
        Codebook::uniform(3, 0),
        Codebook::uniform(4, 0),
        Codebook::uniform(5, 0),
        Codebook::uniform(6, 0),
        Codebook::uniform(7, 0),
        Codebook::uniform(8, 0),
    ];

    /// `[codebookSet][precision][coefficient-count class]`. `precision` is looked up only for
    /// values `<= MAX_HUFF_PRECISION[highSampleRate]`; the array is sized to cover the full
    /// `0..=7` range regardless.
    pub static ref HUFFMAN_SPECTRUM: [[[Codebook; 4]; 8]; 2] = [
        [
            [Codebook::uniform(1, 0), Codebook::uniform(1, 0), Codebook::uniform(1, 0), Codebook::uniform(1, 0)],
            [Codebook::uniform(2, 0), Codebook::uniform(2, 0), Codebook::uniform(2, 0), Codebook::uniform(2, 0)],
            [Codebook::uniform(3, 0), Codebook::uniform(3, 0), Codebook::uniform(3, 0), Codebook::uniform(3, 0)],
            [Codebook::uniform(4, 0), Codebook::uniform(4, 0), Codebook::uniform(4, 0), Codebook::uniform(4, 0)],
            [Codebook::uniform(5, 0), Codebook::uniform(5, 0), Codebook::uniform(5, 0), Codebook::uniform(5, 0)],
            [Codebook::uniform(6, 0), Codebook::uniform(6, 0), Codebook::uniform(6, 0), Codebook::uniform(6, 0)],
            [Codebook::uniform(7, 0), Codebook::uniform(7, 0), Codebook::uniform(7, 0), Codebook::uniform(7, 0)],
            [Codebook::uniform(8, 0), Codebook::uniform(8, 0), Codebook::uniform(8, 0), Codebook::uniform(8, 0)],
        ],
        [
            [Codebook::uniform(1, 0), Codebook::uniform(1, 0), Codebook::uniform(1, 0), Codebook::uniform(1, 0)],
            [Codebook::uniform(2, 0), Codebook::uniform(2, 0), Codebook::uniform(2, 0), Codebook::uniform(2, 0)],
            [Codebook::uniform(3, 0), Codebook::uniform(3, 0), Codebook::uniform(3, 0), Codebook::uniform(3, 0)],
            [Codebook::uniform(4, 0), Codebook::uniform(4, 0), Codebook::uniform(4, 0), Codebook::uniform(4, 0)],
            [Codebook::uniform(5, 0), Codebook::uniform(5, 0), Codebook::uniform(5, 0), Codebook::uniform(5, 0)],
            [Codebook::uniform(6, 0), Codebook::uniform(6, 0), Codebook::uniform(6, 0), Codebook::uniform(6, 0)],
            [Codebook::uniform(7, 0), Codebook::uniform(7, 0), Codebook::uniform(7, 0), Codebook::uniform(7, 0)],
            [Codebook::uniform(8, 0), Codebook::uniform(8, 0), Codebook::uniform(8, 0), Codebook::uniform(8, 0)],
        ],
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_symbol() {
        let codebook = Codebook::uniform(4, 0);
        let symbol_count = codebook.value_max as usize;

        let total_bits = symbol_count * codebook.value_bits as usize;
        let mut bytes = vec![0u8; (total_bits + 7) / 8 + 1];
        {
            let mut bit_pos = 0usize;
            for symbol in 0..symbol_count {
                for b in (0..codebook.value_bits).rev() {
                    let bit = (symbol >> b) & 1;
                    if bit != 0 {
                        bytes[bit_pos / 8] |= 1 << (7 - (bit_pos % 8));
                    }
                    bit_pos += 1;
                }
            }
        }

        let mut br = BitReader::new(&bytes);
        for expected in 0..symbol_count {
            let got = read_huffman_value(&codebook, &mut br, false);
            assert_eq!(got as usize, expected);
        }
    }
}
