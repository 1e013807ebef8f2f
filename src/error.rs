//! Error types for the decode-step coordinator

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or executing a decoding step
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid EC configuration (shape or block group layout)
    #[error("Invalid EC configuration: {0}")]
    InvalidEcConfig(String),

    /// Neither the configured nor the built-in raw decoder could be brought up
    #[error("No usable {kind} raw decoder: {reason}")]
    DecoderUnavailable { kind: String, reason: String },

    // =========================================================================
    // Raw Decoder Errors
    // =========================================================================
    /// Insufficient shards for reconstruction
    #[error("Insufficient shards for reconstruction: have {available}, need {required}")]
    InsufficientShards { available: usize, required: usize },

    /// Inputs handed to a raw decoder disagree with its initialized shape
    #[error("Shape mismatch in {decoder}: {reason}")]
    ShapeMismatch {
        decoder: &'static str,
        reason: String,
    },

    /// Raw decoder used before `initialize`
    #[error("Raw decoder {0} used before initialization")]
    DecoderNotInitialized(&'static str),

    /// Raw decoder initialized twice
    #[error("Raw decoder {0} is already initialized")]
    DecoderAlreadyInitialized(&'static str),

    /// Raw decoder used or released after `release`
    #[error("Raw decoder {0} has already been released")]
    DecoderReleased(&'static str),

    /// EC reconstruction failed inside the codec library
    #[error("EC reconstruction failed: {0}")]
    EcReconstructionFailed(String),
}
