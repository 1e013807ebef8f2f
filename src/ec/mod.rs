//! Erasure Coding Module
//!
//! Decode-step planning for Reed-Solomon coded block groups.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Erasure Coding Module                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                          │
//! │  ┌──────────────┐    ┌──────────────┐    ┌───────────────────────────┐  │
//! │  │ Block Group  │───▶│   Decode     │───▶│     Decoding Plan         │  │
//! │  │  Analyzer    │    │ Coordinator  │    │  (ErasureCodingStep)      │  │
//! │  └──────────────┘    └──────┬───────┘    └─────────────┬─────────────┘  │
//! │                             │ lazy, once each          │ perform_coding  │
//! │                   ┌─────────┴─────────┐                ▼                 │
//! │                   │  RS raw │ XOR raw │◀───────── raw decoder handle     │
//! │                   └───────────────────┘                                  │
//! │                                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **Blocks** (`block.rs`): `EcBlock` / `EcBlockGroup`, data units first,
//!   then parity units.
//!
//! - **Analyzer** (`analyzer.rs`): input blocks, erased output blocks and
//!   erased indexes of a group.
//!
//! - **Config** (`config.rs`): `CoderConf` key/value map and the typed
//!   `DecoderOptions` read from it.
//!
//! - **Coordinator** (`coordinator.rs`): `RsErasureDecoder`, which selects the
//!   XOR decoder for single erasures (when enabled) and RS otherwise.
//!
//! - **Plan** (`plan.rs`): `DecodingPlan`, the immutable step handed to an
//!   executor.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ecstep::domain::{ErasureCodingStep, UnitShape};
//! use ecstep::ec::{EcBlockGroup, RsErasureDecoder};
//!
//! let shape = UnitShape::new(6, 3, 1 << 20)?;
//! let coordinator = RsErasureDecoder::new(shape)?;
//!
//! let group = EcBlockGroup::with_erasures(&shape, &[2, 7]);
//! let plan = coordinator.prepare_decoding_step(&group)?;
//! plan.perform_coding(&chunks, &mut outputs)?;
//!
//! coordinator.release();
//! ```

pub mod analyzer;
pub mod block;
pub mod config;
pub mod coordinator;
pub mod plan;

#[cfg(test)]
mod proptest;

pub use analyzer::BlockGroupAnalyzer;
pub use block::{BlockId, EcBlock, EcBlockGroup, UnitRole};
pub use config::{CoderConf, DecoderOptions, ReleasePolicy};
pub use coordinator::RsErasureDecoder;
pub use plan::DecodingPlan;
