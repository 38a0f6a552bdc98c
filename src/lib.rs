// Copyright 2017 Adam Greig
// Licensed under the MIT license, see LICENSE for details.

#![no_std]
#![deny(missing_docs)]

//! telegraph-ldpc implements a small family of LDPC error correcting codes,
//! including encoders and decoders, aimed at constrained telemetry and
//! packet links such as small-satellite downlinks.
//!
//! It has no dependencies on `std` and performs no heap allocation, so it
//! may be used on embedded targets. Most methods require you to pass in a
//! block of memory for them to fill, and then require you to pass that
//! memory back in when it must be read. Check individual method
//! documentation for buffer sizing requirements; the corresponding
//! `size_*`/`*_len` methods on [`LDPCCode`] compute the exact byte counts.
//!
//! ## Example
//!
//! ```
//! extern crate telegraph_ldpc;
//! use telegraph_ldpc::LDPCCode;
//!
//! fn main() {
//!     // Pick the smallest code, n=128 k=64.
//!     let code = LDPCCode::N128K64;
//!
//!     // Generate some data to encode.
//!     let txdata: Vec<u8> = (0..8).collect();
//!
//!     // Allocate memory for the encoded data and encode it.
//!     let mut txcode = vec![0u8; code.output_len()];
//!     code.encode_small(&txdata, &mut txcode);
//!
//!     // Corrupt a bit in transit.
//!     let mut rxcode = txcode.clone();
//!     rxcode[0] ^= 0x80;
//!
//!     // Initialise the row-side sparse parity check data (enough for bf).
//!     let mut ci = vec![0; code.sparse_paritycheck_ci_len()];
//!     let mut cs = vec![0; code.sparse_paritycheck_cs_len()];
//!     code.init_sparse_paritycheck_rows(&mut ci, &mut cs);
//!
//!     // Allocate the decoder's working area and output, then decode.
//!     let mut working = vec![0u8; code.decode_bf_working_len()];
//!     let mut rxdata = vec![0u8; code.output_len()];
//!     let mut iters = 0;
//!     code.decode_bf(&ci, &cs, None, None, &rxcode, &mut rxdata, &mut working, &mut iters);
//!
//!     assert_eq!(&rxdata[..8], &txdata[..8]);
//! }
//! ```
//!
//! ## Codes
//!
//! *Nomenclature:* `n` is the code length (bits transmitted per codeword),
//! `k` is the code dimension (useful information bits per codeword), and
//! `p` is the number of punctured parity bits: logically part of the
//! codeword but never transmitted, and reconstructed by the decoder.
//!
//! Six codes are available, three unpunctured and three punctured:
//!
//! | code          | n    | k    | p   | rate k/n |
//! |---------------|------|------|-----|----------|
//! | `N128K64`     | 128  | 64   | 0   | 1/2      |
//! | `N256K128`    | 256  | 128  | 0   | 1/2      |
//! | `N512K256`    | 512  | 256  | 0   | 1/2      |
//! | `N1280K1024`  | 1280 | 1024 | 128 | 4/5      |
//! | `N1536K1024`  | 1536 | 1024 | 256 | 2/3      |
//! | `N2048K1024`  | 2048 | 1024 | 512 | 1/2      |
//!
//! The short unpunctured codes suit small, highly-reliable messages and are
//! cheap to decode even without floating point hardware. The longer
//! punctured codes trade a more expensive decode (they need soft
//! information to resolve the punctured bits efficiently) for better rates
//! at longer block lengths.
//!
//! The available codes are the variants of the [`LDPCCode`] enum, and
//! everything else (encoders, decoders, utility methods) is implemented as
//! methods on this enum.
//!
//! ### Generator matrices
//!
//! To encode a codeword we need a generator matrix: a binary matrix of
//! shape k rows by n-k+p columns giving the parity bits as a linear
//! function of the data bits. Because all codes here are *systematic*,
//! the first k bits of a codeword are exactly the input data, so only the
//! parity-generating columns need to be stored or computed.
//!
//! These columns are stored in a compact circulant form: only `k/b` of the
//! `k` rows are stored, and the rest are produced at runtime by rotating
//! the stored row. This keeps the constant tables small at the cost of
//! slower encoding, so a second encoder is available that first expands
//! the full generator matrix into RAM. See [`LDPCCode::init_generator`]
//! and the encoder methods below.
//!
//! The compact tables live in the `codes` module, with names like
//! `N128_K64_G`.
//!
//! ### Parity check matrices
//!
//! The parity check matrix H is the counterpart used by the decoders to
//! work out which bits are wrong. Fully expanded it has `n-k+p` rows (one
//! per parity check) and `n+p` columns (one per variable node, including
//! punctured bits). Because H is sparse, decoders work with lists of the
//! non-zero positions instead: for each check (row) the variable indices
//! are stored in `ci`, with row boundaries in `cs`; the same information
//! is stored the other way around in `vi`/`vs`, indexed by variable node.
//! These are initialised by [`LDPCCode::init_sparse_paritycheck`], or just
//! the row side by [`LDPCCode::init_sparse_paritycheck_rows`] (sufficient
//! for bit-flipping decoding of the unpunctured codes).
//!
//! The dense form can also be materialised with
//! [`LDPCCode::init_paritycheck`], though the decoders never need it.
//!
//! ## Encoders
//!
//! Both encoders take a `&[u8]` of input data and write a `&mut [u8]`
//! codeword.
//!
//! * [`LDPCCode::encode_small`] computes parity bits directly from the
//!   compact generator table. It is slower but needs no expanded matrix
//!   in RAM, so has the smallest memory footprint.
//! * [`LDPCCode::encode_fast`] reads from a generator matrix expanded in
//!   advance with `init_generator`. Much quicker, at the cost of the RAM
//!   needed to hold the expanded matrix ([`LDPCCode::generator_len`]
//!   words).
//!
//! Both encoders are required to produce bit-identical output for the
//! same input.
//!
//! ## Decoders
//!
//! * [`LDPCCode::decode_bf`] is a bit-flipping decoder using hard
//!   decisions. It is fast and needs little memory, but is roughly 1-2dB
//!   from optimal. On punctured codes it first recovers the punctured
//!   bits with an erasure pre-decoder based on Archonta, Kanistras and
//!   Paliouras, doi:10.1109/MOCAST.2016.7495161.
//! * [`LDPCCode::decode_mp`] is a log-domain min-sum message-passing
//!   decoder that performs close to optimal decoding at higher memory
//!   cost, operating on LLRs (so it covers punctured codes without a
//!   separate bootstrap step: the punctured bits simply start with zero
//!   intrinsic information). The sign-flip correction is from Savin,
//!   arXiv:0803.1090.
//!
//! A fixed-point version of `decode_mp` would suit embedded DSPs better
//! than floats, and an edge-twin lookup table (see
//! [`LDPCCode::init_sparse_paritycheck`]) would speed up the inner loop
//! at the cost of extra memory; neither is implemented here.

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod codes;
pub mod encoder;
pub mod decoder;
pub use codes::LDPCCode;
