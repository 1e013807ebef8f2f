//! ecstep - Erasure Coding Decode-Step Coordinator
//!
//! Given a block group with some units marked erased, decides whether the
//! generic Reed-Solomon raw decoder or the single-erasure XOR raw decoder
//! should rebuild it, and produces a decoding plan an executor can run.
//!
//! # Architecture
//!
//! ```text
//! EcBlockGroup → Analyzer → Coordinator (select + lazy backend) → DecodingPlan → executor
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - Built-in raw decoders and the pluggable-decoder registry
//! - [`domain`] - Ports (`RawErasureDecoder`, `ErasureCodingStep`) and value objects
//! - [`ec`] - Blocks, analyzer, configuration, coordinator and plan
//! - [`error`] - Error types

pub mod adapters;
pub mod domain;
pub mod ec;
pub mod error;

// Re-export commonly used types
pub use domain::{DecoderKind, ErasureCodingStep, RawErasureDecoder, UnitShape};
pub use ec::{CoderConf, DecodingPlan, EcBlock, EcBlockGroup, RsErasureDecoder};
pub use error::{Error, Result};
