// Copyright 2017 Adam Greig
// Licensed under the MIT license, see LICENSE for details.

//! Decoders and LLR helpers.

use crate::codes::{get_bit, set_bit, LDPCCode};

/// Upper bound on punctured bits across the code family, used to size
/// the erasure pre-decoder's stack-local erasure-flag array. The
/// largest code (`N2048K1024`) punctures 512 bits.
const MAX_P: usize = 512;

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Locates the position of `var` within check `check`'s row in `ci`,
/// i.e. the edge `(check, var)` indexed the row-major way.
fn find_in_row(ci: &[u16], cs: &[u16], check: usize, var: usize) -> usize {
    let start = cs[check] as usize;
    let end = cs[check + 1] as usize;
    start + ci[start..end].iter().position(|&x| x as usize == var).unwrap()
}

/// Locates the position of `check` within variable `var`'s column in
/// `vi`, i.e. the same edge indexed the column-major way.
fn find_in_col(vi: &[u16], vs: &[u16], var: usize, check: usize) -> usize {
    let start = vs[var] as usize;
    let end = vs[var + 1] as usize;
    start + vi[start..end].iter().position(|&x| x as usize == check).unwrap()
}

impl LDPCCode {
    /// Bit-flipping decoder. Reads a received hard-bit codeword from
    /// `input` (`output_len()` bytes), writes the best guess to
    /// `output` (same size), and reports the number of iterations run
    /// in `iters_run`. Returns `true` if every parity check was
    /// eventually satisfied, `false` if the 20-iteration cap was hit
    /// first.
    ///
    /// `vi`/`vs` are only needed for punctured codes, to run the
    /// erasure pre-decoder that recovers the punctured bits before
    /// bit-flipping starts; pass `None` for unpunctured codes.
    pub fn decode_bf(
        &self,
        ci: &[u16],
        cs: &[u16],
        vi: Option<&[u16]>,
        vs: Option<&[u16]>,
        input: &[u8],
        output: &mut [u8],
        working: &mut [u8],
        iters_run: &mut usize,
    ) -> bool {
        if *self == LDPCCode::None {
            *iters_run = 0;
            return false;
        }
        let par = self.params();
        let n_bytes = par.n / 8;
        output[..n_bytes].copy_from_slice(&input[..n_bytes]);
        for b in output[n_bytes..].iter_mut() {
            *b = 0;
        }

        let mut erasure_iters = 0usize;
        if par.p > 0 {
            let vi = vi.expect("vi required to decode a punctured code");
            let vs = vs.expect("vs required to decode a punctured code");
            erasure_iters = self.erasure_predecode(ci, cs, vi, vs, output);
        }

        for iter in 0..20 {
            for v in working.iter_mut() {
                *v = 0;
            }
            for i in 0..par.m {
                let row = &ci[cs[i] as usize..cs[i + 1] as usize];
                let mut parity = false;
                for &a in row {
                    if get_bit(output, a as usize) {
                        parity ^= true;
                    }
                }
                if parity {
                    for &a in row {
                        working[a as usize] = working[a as usize].saturating_add(1);
                    }
                }
            }

            let max_v = *working.iter().max().unwrap();
            *iters_run = erasure_iters + iter + 1;
            if max_v == 0 {
                return true;
            }
            for a in 0..(par.n + par.p) {
                if working[a] == max_v {
                    let cur = get_bit(output, a);
                    set_bit(output, a, !cur);
                }
            }
        }
        false
    }

    /// Recovers the punctured bits of `output[n..n+p]` (already zeroed
    /// by the caller) by majority vote: a punctured bit can be resolved
    /// as soon as one of its checks has every *other* variable
    /// resolved, by taking the parity of those other bits. Runs until
    /// every punctured bit resolves or 16 rounds pass, and returns the
    /// number of rounds run.
    fn erasure_predecode(
        &self,
        ci: &[u16],
        cs: &[u16],
        vi: &[u16],
        vs: &[u16],
        output: &mut [u8],
    ) -> usize {
        let par = self.params();
        let n = par.n;
        let pcount = par.p;
        debug_assert!(pcount <= MAX_P);

        let mut erased = [false; MAX_P];
        for e in erased.iter_mut().take(pcount) {
            *e = true;
        }

        let mut resolved = 0usize;
        let mut iters = 0usize;
        while resolved < pcount && iters < 16 {
            iters += 1;
            for idx in 0..pcount {
                if !erased[idx] {
                    continue;
                }
                let a = n + idx;
                let mut tally: i32 = 0;
                for &check in &vi[vs[a] as usize..vs[a + 1] as usize] {
                    let i = check as usize;
                    let row = &ci[cs[i] as usize..cs[i + 1] as usize];
                    let mut blocked = false;
                    let mut parity = false;
                    for &b in row {
                        let b = b as usize;
                        if b == a {
                            continue;
                        }
                        if b >= n && erased[b - n] {
                            blocked = true;
                            break;
                        }
                        if get_bit(output, b) {
                            parity ^= true;
                        }
                    }
                    if blocked {
                        continue;
                    }
                    tally += if parity { 1 } else { -1 };
                }
                if tally != 0 {
                    set_bit(output, a, tally > 0);
                    erased[idx] = false;
                    resolved += 1;
                }
            }
        }
        iters
    }

    /// Log-domain min-sum message-passing decoder. Reads LLRs for the
    /// `n` transmitted bits from `llrs` (punctured bits start with zero
    /// intrinsic information and need no separate bootstrap), and
    /// writes hard decisions for all `n+p` bits to `output`. `working`
    /// holds the edge-indexed `u` (check-to-variable) and `v`
    /// (variable-to-check) messages, each of length `s`. Returns `true`
    /// if every check is satisfied within 20 iterations.
    pub fn decode_mp(
        &self,
        ci: &[u16],
        cs: &[u16],
        vi: &[u16],
        vs: &[u16],
        llrs: &[f32],
        output: &mut [u8],
        working: &mut [f32],
        iters_run: &mut usize,
    ) -> bool {
        if *self == LDPCCode::None {
            *iters_run = 0;
            return false;
        }
        let par = self.params();
        let s = par.s;
        let n = par.n;
        let total_vars = par.n + par.p;
        let (u, v) = working.split_at_mut(s);
        for x in u.iter_mut() {
            *x = 0.0;
        }
        for x in v.iter_mut() {
            *x = 0.0;
        }

        for iter in 0..20 {
            for b in output.iter_mut() {
                *b = 0;
            }

            // Variable update. For each incident check i, the extrinsic
            // message v[a_i] is rebuilt from the intrinsic LLR plus the
            // incoming u from every other incident check j; llr_a picks
            // up that same inner j-sum once per outer i, so it ends up
            // as intrinsic plus degree(a) times the total incoming sum.
            for a in 0..total_vars {
                let intrinsic = if a < n { llrs[a] } else { 0.0 };
                let start = vs[a] as usize;
                let end = vs[a + 1] as usize;
                let mut llr_a = intrinsic;
                for a_i in start..end {
                    let i = vi[a_i] as usize;
                    let prev = v[a_i];
                    let mut new_v = intrinsic;
                    for a_j in start..end {
                        let j = vi[a_j] as usize;
                        let edge = find_in_row(ci, cs, j, a);
                        llr_a += u[edge];
                        if j != i {
                            new_v += u[edge];
                        }
                    }
                    if prev != 0.0 && sign(new_v) != sign(prev) {
                        new_v = 0.0;
                    }
                    v[a_i] = new_v;
                }
                if llr_a <= 0.0 {
                    set_bit(output, a, true);
                }
            }

            // Check update: min-sum with a three-valued sign to match
            // the variable update's sign-flip correction (Savin,
            // arXiv:0803.1090).
            let mut all_satisfied = true;
            for i in 0..par.m {
                let start = cs[i] as usize;
                let end = cs[i + 1] as usize;
                let mut parity = false;
                for i_a in start..end {
                    let a = ci[i_a] as usize;
                    let mut sign_prod = 1.0f32;
                    let mut min_abs = f32::INFINITY;
                    for i_b in start..end {
                        if i_b == i_a {
                            continue;
                        }
                        let b = ci[i_b] as usize;
                        let edge = find_in_col(vi, vs, b, i);
                        sign_prod *= sign(v[edge]);
                        let abs_v = v[edge].abs();
                        if abs_v < min_abs {
                            min_abs = abs_v;
                        }
                    }
                    u[i_a] = sign_prod * min_abs;
                    if get_bit(output, a) {
                        parity ^= true;
                    }
                }
                if parity {
                    all_satisfied = false;
                }
            }

            *iters_run = iter + 1;
            if all_satisfied {
                return true;
            }
        }
        false
    }

    /// Converts a hard-bit buffer into LLRs assuming a bit error rate
    /// of `ber`, writing `n` values to `llrs`. Each bit becomes
    /// `+-ln(ber)`, sign chosen so that a positive LLR favours bit 0,
    /// matching the convention the decoders expect.
    pub fn hard_to_llrs_ber(&self, input: &[u8], llrs: &mut [f32], ber: f32) {
        if *self == LDPCCode::None {
            return;
        }
        let par = self.params();
        let magnitude = libm::logf(ber);
        for i in 0..par.n {
            llrs[i] = if get_bit(input, i) { magnitude } else { -magnitude };
        }
    }

    /// As [`LDPCCode::hard_to_llrs_ber`], assuming a 5% bit error rate.
    pub fn hard_to_llrs(&self, input: &[u8], llrs: &mut [f32]) {
        self.hard_to_llrs_ber(input, llrs, 0.05);
    }

    /// Converts `n` LLRs back to a hard-bit buffer: non-positive LLRs
    /// (bit 1 favoured or unknown) set their bit, positive LLRs leave
    /// it clear.
    pub fn llrs_to_hard(&self, llrs: &[f32], output: &mut [u8]) {
        if *self == LDPCCode::None {
            return;
        }
        let par = self.params();
        for b in output[..par.n / 8].iter_mut() {
            *b = 0;
        }
        for i in 0..par.n {
            if llrs[i] <= 0.0 {
                set_bit(output, i, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_bit(buf: &mut [u8], i: usize) {
        buf[i / 8] ^= 1 << (7 - i % 8);
    }

    #[test]
    fn bf_corrects_one_bit_unpunctured() {
        let code = LDPCCode::N256K128;
        let data: std::vec::Vec<u8> = (0..code.k() / 8).map(|i| (i * 53 + 7) as u8).collect();
        let mut tx = vec![0u8; code.output_len()];
        code.encode_small(&data, &mut tx);

        let mut ci = vec![0u16; code.sparse_paritycheck_ci_len()];
        let mut cs = vec![0u16; code.sparse_paritycheck_cs_len()];
        code.init_sparse_paritycheck_rows(&mut ci, &mut cs);

        let mut rx = tx.clone();
        flip_bit(&mut rx, 3);

        let mut working = vec![0u8; code.decode_bf_working_len()];
        let mut out = vec![0u8; code.output_len()];
        let mut iters = 0;
        let ok = code.decode_bf(&ci, &cs, None, None, &rx, &mut out, &mut working, &mut iters);

        assert!(ok);
        assert_eq!(&out[..code.k() / 8], &data[..]);
        assert!(iters > 0);
    }

    #[test]
    fn bf_zero_data_converges_immediately() {
        let code = LDPCCode::N512K256;
        let data = vec![0u8; code.k() / 8];
        let mut tx = vec![0u8; code.output_len()];
        code.encode_small(&data, &mut tx);

        let mut ci = vec![0u16; code.sparse_paritycheck_ci_len()];
        let mut cs = vec![0u16; code.sparse_paritycheck_cs_len()];
        code.init_sparse_paritycheck_rows(&mut ci, &mut cs);

        let mut working = vec![0u8; code.decode_bf_working_len()];
        let mut out = vec![0u8; code.output_len()];
        let mut iters = 0;
        let ok = code.decode_bf(&ci, &cs, None, None, &tx, &mut out, &mut working, &mut iters);

        assert!(ok);
        assert_eq!(iters, 1);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn mp_corrects_punctured_code() {
        let code = LDPCCode::N1280K1024;
        let data: std::vec::Vec<u8> = (0..code.k() / 8).map(|i| (i * 91 + 3) as u8).collect();
        let mut tx = vec![0u8; code.output_len()];
        code.encode_small(&data, &mut tx);

        let mut ci = vec![0u16; code.sparse_paritycheck_ci_len()];
        let mut cs = vec![0u16; code.sparse_paritycheck_cs_len()];
        let mut vi = vec![0u16; code.sparse_paritycheck_vi_len()];
        let mut vs = vec![0u16; code.sparse_paritycheck_vs_len()];
        code.init_sparse_paritycheck(&mut ci, &mut cs, &mut vi, &mut vs);

        let mut llrs = vec![0f32; code.decode_llrs_len()];
        code.hard_to_llrs(&tx, &mut llrs);
        // Flip the sign on a couple of LLRs, simulating bit errors.
        llrs[10] = -llrs[10];
        llrs[200] = -llrs[200];

        let mut working = vec![0f32; code.decode_mp_working_len()];
        let mut out = vec![0u8; code.output_len()];
        let mut iters = 0;
        let ok = code.decode_mp(&ci, &cs, &vi, &vs, &llrs, &mut out, &mut working, &mut iters);

        assert!(ok);
        assert_eq!(&out[..code.k() / 8], &data[..]);
    }

    #[test]
    fn llr_round_trip() {
        let code = LDPCCode::N128K64;
        let input: std::vec::Vec<u8> = (0..code.n() / 8).map(|i| (i * 17 + 1) as u8).collect();
        let mut llrs = vec![0f32; code.decode_llrs_len()];
        code.hard_to_llrs(&input, &mut llrs);
        let mut output = vec![0u8; code.n() / 8];
        code.llrs_to_hard(&llrs, &mut output);
        assert_eq!(input, output);
    }

    #[test]
    fn none_decoders_return_false() {
        let mut out = [0u8; 1];
        let mut working_u8 = [0u8; 1];
        let mut working_f32 = [0f32; 1];
        let mut iters = 1;
        assert!(!LDPCCode::None.decode_bf(&[], &[0], None, None, &[0], &mut out, &mut working_u8, &mut iters));
        assert_eq!(iters, 0);
        iters = 1;
        assert!(!LDPCCode::None.decode_mp(&[], &[0], &[], &[0], &[], &mut out, &mut working_f32, &mut iters));
        assert_eq!(iters, 0);
    }
}
