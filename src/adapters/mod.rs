//! Infrastructure Adapters
//!
//! Raw decoder implementations of the [`RawErasureDecoder`] port, plus the
//! registry that resolves configured implementation names.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │              RawErasureDecoder (Port Trait)                 │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │  RsRawDecoder │ XorRawDecoder │ RawDecoderRegistry         │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`RawErasureDecoder`]: crate::domain::ports::RawErasureDecoder

mod reed_solomon;
mod registry;
mod xor;

pub use reed_solomon::RsRawDecoder;
pub use registry::{RawDecoderFactory, RawDecoderRegistry, RS_DEFAULT, XOR};
pub use xor::XorRawDecoder;

use crate::error::{Error, Result};

/// Checks shared by every raw decoder: erased indexes strictly ascending and
/// in range, one output buffer per erased index.
fn validate_decode_args(
    decoder: &'static str,
    num_inputs: usize,
    erased_indexes: &[usize],
    num_outputs: usize,
) -> Result<()> {
    if erased_indexes.is_empty() {
        return Err(Error::ShapeMismatch {
            decoder,
            reason: "no erased indexes given".to_string(),
        });
    }
    if num_outputs != erased_indexes.len() {
        return Err(Error::ShapeMismatch {
            decoder,
            reason: format!(
                "{} erased indexes but {} output buffers",
                erased_indexes.len(),
                num_outputs
            ),
        });
    }
    if erased_indexes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::ShapeMismatch {
            decoder,
            reason: format!("erased indexes not strictly ascending: {:?}", erased_indexes),
        });
    }
    if let Some(&last) = erased_indexes.last() {
        if last >= num_inputs {
            return Err(Error::ShapeMismatch {
                decoder,
                reason: format!("erased index {} out of range 0..{}", last, num_inputs),
            });
        }
    }
    Ok(())
}

/// Length shared by all surviving chunks; must be non-zero and fit the shape.
fn common_chunk_len<'a>(
    decoder: &'static str,
    mut chunks: impl Iterator<Item = &'a [u8]>,
    chunk_size: usize,
) -> Result<usize> {
    let first = chunks.next().map(<[u8]>::len).unwrap_or(0);
    if first == 0 || first > chunk_size {
        return Err(Error::ShapeMismatch {
            decoder,
            reason: format!("chunk length {} not in 1..={}", first, chunk_size),
        });
    }
    if let Some(other) = chunks.map(<[u8]>::len).find(|len| *len != first) {
        return Err(Error::ShapeMismatch {
            decoder,
            reason: format!("chunk lengths differ: {} vs {}", first, other),
        });
    }
    Ok(first)
}
