// Copyright 2017 Adam Greig
// Licensed under the MIT license, see LICENSE for details.

//! Systematic encoders.
//!
//! Both encoders copy the data bits straight through as the first `k`
//! bits of the codeword, then compute each parity bit as the XOR of a
//! fixed subset of data bits named by the generator. They differ only
//! in where that generator comes from: [`LDPCCode::encode_small`] reads
//! the compact table directly, [`LDPCCode::encode_fast`] reads a
//! pre-expanded one. Given the same input, they produce the same
//! codeword.

use crate::codes::{get_bit, set_bit, LDPCCode};

impl LDPCCode {
    /// Encodes `data` (`k/8` bytes) into `codeword` (`output_len()`
    /// bytes), using the compact generator table directly. No RAM
    /// beyond the two buffers is required.
    pub fn encode_small(&self, data: &[u8], codeword: &mut [u8]) {
        if *self == LDPCCode::None {
            return;
        }
        let par = self.params();
        let k_bytes = par.k / 8;
        codeword[..k_bytes].copy_from_slice(&data[..k_bytes]);
        for j in 0..par.m {
            let mut parity = false;
            for i in 0..par.k {
                if get_bit(data, i) && self.generator_bit(i, j) {
                    parity ^= true;
                }
            }
            set_bit(codeword, par.k + j, parity);
        }
    }

    /// Encodes `data` into `codeword` using a generator matrix already
    /// expanded by [`LDPCCode::init_generator`] into `g`
    /// (`generator_len()` words). Faster than `encode_small` once the
    /// expansion cost is paid, since there is no per-bit rotation left
    /// to do.
    pub fn encode_fast(&self, g: &[u32], data: &[u8], codeword: &mut [u8]) {
        if *self == LDPCCode::None {
            return;
        }
        let par = self.params();
        let k_bytes = par.k / 8;
        let w = par.m / 32;
        codeword[..k_bytes].copy_from_slice(&data[..k_bytes]);
        for j in 0..par.m {
            let word_idx = j / 32;
            let bit_idx = j % 32;
            let mut parity = false;
            for i in 0..par.k {
                if get_bit(data, i) {
                    let word = g[i * w + word_idx];
                    if (word >> (31 - bit_idx)) & 1 == 1 {
                        parity ^= true;
                    }
                }
            }
            set_bit(codeword, par.k + j, parity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_and_fast_agree() {
        for code in [
            LDPCCode::N128K64,
            LDPCCode::N256K128,
            LDPCCode::N512K256,
            LDPCCode::N1280K1024,
        ] {
            let data: std::vec::Vec<u8> =
                (0..code.k() / 8).map(|i| (i * 37 + 11) as u8).collect();
            let mut g = vec![0u32; code.generator_len()];
            code.init_generator(&mut g);

            let mut small = vec![0u8; code.output_len()];
            let mut fast = vec![0u8; code.output_len()];
            code.encode_small(&data, &mut small);
            code.encode_fast(&g, &data, &mut fast);

            assert_eq!(small, fast);
        }
    }

    #[test]
    fn systematic_prefix_is_data() {
        let code = LDPCCode::N256K128;
        let data: std::vec::Vec<u8> = (0..code.k() / 8).map(|i| i as u8).collect();
        let mut codeword = vec![0u8; code.output_len()];
        code.encode_small(&data, &mut codeword);
        assert_eq!(&codeword[..code.k() / 8], &data[..]);
    }

    #[test]
    fn zero_data_gives_zero_parity() {
        let code = LDPCCode::N512K256;
        let data = vec![0u8; code.k() / 8];
        let mut codeword = vec![0u8; code.output_len()];
        code.encode_small(&data, &mut codeword);
        assert!(codeword.iter().all(|&b| b == 0));
    }

    #[test]
    fn none_is_a_no_op() {
        let mut codeword = vec![0xAAu8; 4];
        let before = codeword.clone();
        LDPCCode::None.encode_small(&[], &mut codeword);
        assert_eq!(codeword, before);
    }
}
