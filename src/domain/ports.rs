//! Domain Ports (DDD Port/Adapter Pattern)
//!
//! This module defines the abstractions the coordinator depends on. Raw
//! decoders live behind [`RawErasureDecoder`]; the plan handed to an
//! executor is driven through [`ErasureCodingStep`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                    Ports (Traits)                    │    │
//! │  │     RawErasureDecoder   │   ErasureCodingStep        │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │   RsRawDecoder   │   XorRawDecoder   │   (plugged)   │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Largest `k + m` the GF(2^8) codecs can address.
pub const MAX_TOTAL_UNITS: usize = 256;

// =============================================================================
// Value Objects
// =============================================================================

/// Fixed (data units, parity units, chunk size) triple a coder is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UnitShape {
    pub num_data_units: usize,
    pub num_parity_units: usize,
    /// Chunk size in bytes
    pub chunk_size: usize,
}

impl UnitShape {
    /// Create a validated shape.
    pub fn new(num_data_units: usize, num_parity_units: usize, chunk_size: usize) -> Result<Self> {
        let shape = Self {
            num_data_units,
            num_parity_units,
            chunk_size,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Validate the shape.
    pub fn validate(&self) -> Result<()> {
        if self.num_data_units == 0 {
            return Err(Error::InvalidEcConfig(
                "num_data_units must be greater than 0".to_string(),
            ));
        }
        if self.num_parity_units == 0 {
            return Err(Error::InvalidEcConfig(
                "num_parity_units must be greater than 0".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidEcConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        let total = self
            .num_data_units
            .checked_add(self.num_parity_units)
            .ok_or_else(|| {
                Error::InvalidEcConfig(format!(
                    "total units {}+{} overflows",
                    self.num_data_units, self.num_parity_units
                ))
            })?;
        if total > MAX_TOTAL_UNITS {
            return Err(Error::InvalidEcConfig(format!(
                "total units {} exceeds {}",
                total, MAX_TOTAL_UNITS
            )));
        }
        Ok(())
    }

    /// Total number of units (k + m).
    #[inline]
    pub fn total_units(&self) -> usize {
        self.num_data_units + self.num_parity_units
    }

    /// The same shape with a different parity count.
    pub fn with_parity_units(&self, num_parity_units: usize) -> Self {
        Self {
            num_parity_units,
            ..*self
        }
    }
}

impl std::fmt::Display for UnitShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}+{}@{}",
            self.num_data_units, self.num_parity_units, self.chunk_size
        )
    }
}

/// Raw decoder variant the coordinator can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderKind {
    /// Generic Reed-Solomon reconstruction
    ReedSolomon,
    /// Single-erasure XOR reconstruction
    Xor,
}

impl std::fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderKind::ReedSolomon => write!(f, "reed-solomon"),
            DecoderKind::Xor => write!(f, "xor"),
        }
    }
}

// =============================================================================
// Raw Decoder Port
// =============================================================================

/// Port for the stateful engine that performs the field arithmetic.
///
/// Lifecycle: `initialize` exactly once, any number of `decode` calls, then
/// `release` exactly once. Calling `release` twice, or `decode` after
/// `release`, is a misuse.
///
/// # Example
///
/// ```ignore
/// let mut rs = RsRawDecoder::new();
/// rs.initialize(UnitShape::new(6, 3, 1024)?)?;
/// rs.decode(&inputs, &[2, 7], &mut outputs)?;
/// rs.release()?;
/// ```
pub trait RawErasureDecoder: Send {
    /// Variant implemented by this decoder.
    fn kind(&self) -> DecoderKind;

    /// Implementation name, for logs and plan summaries.
    fn name(&self) -> &'static str;

    /// Allocate shape-specific state (coding tables).
    fn initialize(&mut self, shape: UnitShape) -> Result<()>;

    /// Shape passed to `initialize`, if any.
    fn shape(&self) -> Option<UnitShape>;

    /// Reconstruct the erased units.
    ///
    /// # Arguments
    /// * `inputs` - One entry per unit in canonical order, `None` when erased
    /// * `erased_indexes` - Ascending positions within `inputs` to rebuild
    /// * `outputs` - One buffer per erased index, same order
    fn decode(
        &mut self,
        inputs: &[Option<Bytes>],
        erased_indexes: &[usize],
        outputs: &mut [Vec<u8>],
    ) -> Result<()>;

    /// Free shape-specific state.
    fn release(&mut self) -> Result<()>;
}

/// Handle shared between a coordinator and the plans it builds.
///
/// The mutex keeps a single decode in flight per instance.
pub type SharedRawDecoder = Arc<Mutex<Box<dyn RawErasureDecoder>>>;

/// Wrap a raw decoder into a shared handle.
pub fn share(decoder: Box<dyn RawErasureDecoder>) -> SharedRawDecoder {
    Arc::new(Mutex::new(decoder))
}

// =============================================================================
// Coding Step Port
// =============================================================================

/// A ready-to-run coding step, executed by whoever owns the chunk buffers.
pub trait ErasureCodingStep {
    /// Run the step over the given chunks.
    fn perform_coding(&self, inputs: &[Option<Bytes>], outputs: &mut [Vec<u8>]) -> Result<()>;

    /// Called once the executor is done with the step.
    fn finish(&self) {}
}

// =============================================================================
// Tests
// =============================================================================
