//! Reed-Solomon Decode Coordinator
//!
//! Chooses between the generic Reed-Solomon raw decoder and the cheaper XOR
//! raw decoder for each block group, creates each backend lazily, and builds
//! the [`DecodingPlan`] an executor runs.
//!
//! # Selection
//!
//! ```text
//!   erased outputs == 1 && use_xor_when_possible ──▶ XOR  (k, 1, chunk)
//!   otherwise                                      ──▶ RS   (k, m, chunk)
//! ```
//!
//! # Ownership
//!
//! A coordinator belongs to one thread or pipeline stage at a time. Its lazy
//! slots are `unsync::OnceCell`, so it is `Send` but not `Sync`; run one
//! coordinator per worker when decoding concurrently.
//!
//! The unit shape is fixed at construction. Feeding block groups of another
//! shape is a misuse: the plan is still built, and the mismatch surfaces from
//! the raw decoder at execution time.

use once_cell::unsync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::analyzer::BlockGroupAnalyzer;
use super::block::EcBlockGroup;
use super::config::{CoderConf, DecoderOptions, ReleasePolicy};
use super::plan::DecodingPlan;
use crate::adapters::{RawDecoderRegistry, RsRawDecoder, XorRawDecoder};
use crate::domain::ports::{share, DecoderKind, RawErasureDecoder, SharedRawDecoder, UnitShape};
use crate::error::{Error, Result};

/// Decode-step coordinator for Reed-Solomon coded block groups.
pub struct RsErasureDecoder {
    shape: UnitShape,
    options: DecoderOptions,
    registry: RawDecoderRegistry,
    analyzer: BlockGroupAnalyzer,
    rs_raw_decoder: OnceCell<SharedRawDecoder>,
    xor_raw_decoder: OnceCell<SharedRawDecoder>,
}

impl std::fmt::Debug for RsErasureDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsErasureDecoder")
            .field("shape", &self.shape)
            .field("options", &self.options)
            .field("rs_initialized", &self.rs_raw_decoder.get().is_some())
            .field("xor_initialized", &self.xor_raw_decoder.get().is_some())
            .finish()
    }
}

impl RsErasureDecoder {
    /// Create a coordinator for `shape` with default options and the
    /// built-in raw decoders.
    pub fn new(shape: UnitShape) -> Result<Self> {
        Self::with_registry(shape, RawDecoderRegistry::default())
    }

    /// Create a coordinator resolving pluggable RS decoders from `registry`.
    pub fn with_registry(shape: UnitShape, registry: RawDecoderRegistry) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            shape,
            options: DecoderOptions::default(),
            registry,
            analyzer: BlockGroupAnalyzer,
            rs_raw_decoder: OnceCell::new(),
            xor_raw_decoder: OnceCell::new(),
        })
    }

    /// Apply configuration. Never fails; see [`DecoderOptions::from_conf`].
    ///
    /// Backends already created are kept as they are.
    pub fn configure(&mut self, conf: &CoderConf) {
        self.options = DecoderOptions::from_conf(conf);
        debug!(options = ?self.options, "Configured decoder");
    }

    /// Replace the options directly.
    pub fn set_options(&mut self, options: DecoderOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn shape(&self) -> UnitShape {
        self.shape
    }

    pub fn num_data_units(&self) -> usize {
        self.shape.num_data_units
    }

    pub fn num_parity_units(&self) -> usize {
        self.shape.num_parity_units
    }

    pub fn chunk_size(&self) -> usize {
        self.shape.chunk_size
    }

    pub fn use_xor_when_possible(&self) -> bool {
        self.options.use_xor_when_possible
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.options.release_policy
    }

    /// Whether the backend for `kind` has been created.
    pub fn is_initialized(&self, kind: DecoderKind) -> bool {
        self.slot(kind).get().is_some()
    }

    /// Decoder variant a group with `erased_outputs` erased units gets.
    pub fn select(&self, erased_outputs: usize) -> DecoderKind {
        if erased_outputs == 1 && self.options.use_xor_when_possible {
            DecoderKind::Xor
        } else {
            DecoderKind::ReedSolomon
        }
    }

    /// Build the decoding step for `group`.
    ///
    /// Only fails when no raw decoder for the selected variant can be
    /// brought up.
    #[instrument(skip(self, group), fields(shape = %self.shape))]
    pub fn prepare_decoding_step(&self, group: &EcBlockGroup) -> Result<DecodingPlan> {
        let input_blocks = self.analyzer.input_blocks(group);
        let output_blocks = self.analyzer.erased_output_blocks(group);
        let erased_indexes = self.analyzer.erased_indexes(&input_blocks);

        let kind = self.select(output_blocks.len());
        let decoder = match kind {
            DecoderKind::Xor => self.check_create_xor_raw_decoder()?,
            DecoderKind::ReedSolomon => self.check_create_rs_raw_decoder()?,
        };

        debug!(
            %kind,
            erased = ?erased_indexes,
            inputs = input_blocks.len(),
            "Prepared decoding step"
        );

        Ok(DecodingPlan::new(
            input_blocks,
            erased_indexes,
            output_blocks,
            decoder,
            kind,
        ))
    }

    /// Same as [`prepare_decoding_step`](Self::prepare_decoding_step).
    pub fn calculate_coding(&self, group: &EcBlockGroup) -> Result<DecodingPlan> {
        self.prepare_decoding_step(group)
    }

    /// Tear down backends according to the release policy.
    ///
    /// Returns the variants that were released, in release order. Raw
    /// decoder errors are logged and do not stop the remaining releases.
    pub fn release(self) -> Vec<DecoderKind> {
        let policy = self.options.release_policy;
        let xor = self.xor_raw_decoder.into_inner().map(|d| (DecoderKind::Xor, d));
        let rs = self
            .rs_raw_decoder
            .into_inner()
            .map(|d| (DecoderKind::ReedSolomon, d));

        let targets: Vec<(DecoderKind, SharedRawDecoder)> = match policy {
            ReleasePolicy::PreferXor => xor.or(rs).into_iter().collect(),
            ReleasePolicy::All => xor.into_iter().chain(rs).collect(),
        };

        let mut released = Vec::with_capacity(targets.len());
        for (kind, handle) in targets {
            let mut decoder = handle.lock();
            match decoder.release() {
                Ok(()) => {
                    info!(%kind, name = decoder.name(), %policy, "Released raw decoder");
                    released.push(kind);
                }
                Err(e) => warn!(%kind, "Failed to release raw decoder: {}", e),
            }
        }
        released
    }

    fn slot(&self, kind: DecoderKind) -> &OnceCell<SharedRawDecoder> {
        match kind {
            DecoderKind::ReedSolomon => &self.rs_raw_decoder,
            DecoderKind::Xor => &self.xor_raw_decoder,
        }
    }

    fn check_create_rs_raw_decoder(&self) -> Result<SharedRawDecoder> {
        self.rs_raw_decoder
            .get_or_try_init(|| self.create_rs_raw_decoder())
            .cloned()
    }

    fn check_create_xor_raw_decoder(&self) -> Result<SharedRawDecoder> {
        self.xor_raw_decoder
            .get_or_try_init(|| {
                let shape = self.shape.with_parity_units(1);
                let mut decoder = XorRawDecoder::boxed();
                decoder
                    .initialize(shape)
                    .map_err(|e| unavailable(DecoderKind::Xor, e))?;
                info!(%shape, name = decoder.name(), "Initialized XOR raw decoder");
                Ok(share(decoder))
            })
            .cloned()
    }

    /// The configured RS decoder if it resolves and initializes, else the
    /// built-in one.
    fn create_rs_raw_decoder(&self) -> Result<SharedRawDecoder> {
        let shape = self.shape;

        if let Some(name) = self.options.rs_raw_coder.as_deref() {
            match self.create_plugged(name, shape) {
                Ok(decoder) => {
                    info!(%shape, name, "Initialized configured RS raw decoder");
                    return Ok(share(decoder));
                }
                Err(e) => warn!(name, "Falling back to built-in RS raw decoder: {}", e),
            }
        }

        let mut decoder = RsRawDecoder::boxed();
        decoder
            .initialize(shape)
            .map_err(|e| unavailable(DecoderKind::ReedSolomon, e))?;
        info!(%shape, name = decoder.name(), "Initialized RS raw decoder");
        Ok(share(decoder))
    }

    fn create_plugged(&self, name: &str, shape: UnitShape) -> Result<Box<dyn RawErasureDecoder>> {
        let mut decoder = self
            .registry
            .create(name)
            .ok_or_else(|| Error::InvalidEcConfig(format!("unknown raw decoder '{}'", name)))?;
        if decoder.kind() != DecoderKind::ReedSolomon {
            return Err(Error::InvalidEcConfig(format!(
                "raw decoder '{}' is {}, not reed-solomon",
                name,
                decoder.kind()
            )));
        }
        decoder.initialize(shape)?;
        Ok(decoder)
    }
}

fn unavailable(kind: DecoderKind, e: Error) -> Error {
    Error::DecoderUnavailable {
        kind: kind.to_string(),
        reason: e.to_string(),
    }
}
