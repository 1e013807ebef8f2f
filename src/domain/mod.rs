//! Domain Layer
//!
//! Ports and value objects shared by the coordinator and its adapters.
//!
//! - **Ports** (`ports.rs`) - [`RawErasureDecoder`] and [`ErasureCodingStep`]
//!
//! # Usage
//!
//! ```ignore
//! use ecstep::domain::{RawErasureDecoder, UnitShape};
//!
//! fn warm_up<D: RawErasureDecoder>(decoder: &mut D) -> Result<()> {
//!     decoder.initialize(UnitShape::new(6, 3, 1 << 20)?)
//! }
//! ```

pub mod ports;

pub use ports::{
    share, DecoderKind, ErasureCodingStep, RawErasureDecoder, SharedRawDecoder, UnitShape,
    MAX_TOTAL_UNITS,
};
