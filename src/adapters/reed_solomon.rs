//! Reed-Solomon Raw Decoder Adapter
//!
//! Implements the `RawErasureDecoder` port using the `reed-solomon-erasure`
//! crate over GF(2^8).

use bytes::Bytes;
use reed_solomon_erasure::galois_8::ReedSolomon;
use tracing::{debug, instrument};

use super::{common_chunk_len, validate_decode_args};
use crate::domain::ports::{DecoderKind, RawErasureDecoder, UnitShape};
use crate::error::{Error, Result};

const NAME: &str = "rs-default";

/// Built-in Reed-Solomon raw decoder.
///
/// The coding matrix is constructed in [`initialize`](RawErasureDecoder::initialize)
/// and reused for every decode until [`release`](RawErasureDecoder::release).
#[derive(Default)]
pub struct RsRawDecoder {
    rs: Option<ReedSolomon>,
    shape: Option<UnitShape>,
    released: bool,
}

impl std::fmt::Debug for RsRawDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsRawDecoder")
            .field("shape", &self.shape)
            .field("released", &self.released)
            .finish()
    }
}

impl RsRawDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed constructor, usable as a registry factory.
    pub fn boxed() -> Box<dyn RawErasureDecoder> {
        Box::new(Self::new())
    }

    fn ready(&self) -> Result<(&ReedSolomon, UnitShape)> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        match (&self.rs, self.shape) {
            (Some(rs), Some(shape)) => Ok((rs, shape)),
            _ => Err(Error::DecoderNotInitialized(NAME)),
        }
    }
}

impl RawErasureDecoder for RsRawDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::ReedSolomon
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self, shape: UnitShape) -> Result<()> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        if self.rs.is_some() {
            return Err(Error::DecoderAlreadyInitialized(NAME));
        }
        shape.validate()?;

        let rs = ReedSolomon::new(shape.num_data_units, shape.num_parity_units).map_err(|e| {
            Error::InvalidEcConfig(format!("Failed to create Reed-Solomon codec: {}", e))
        })?;

        self.rs = Some(rs);
        self.shape = Some(shape);
        Ok(())
    }

    fn shape(&self) -> Option<UnitShape> {
        self.shape
    }

    #[instrument(skip(self, inputs, outputs), fields(erased = ?erased_indexes))]
    fn decode(
        &mut self,
        inputs: &[Option<Bytes>],
        erased_indexes: &[usize],
        outputs: &mut [Vec<u8>],
    ) -> Result<()> {
        let (rs, shape) = self.ready()?;

        if inputs.len() != shape.total_units() {
            return Err(Error::ShapeMismatch {
                decoder: NAME,
                reason: format!(
                    "expected {} inputs, got {}",
                    shape.total_units(),
                    inputs.len()
                ),
            });
        }
        validate_decode_args(NAME, inputs.len(), erased_indexes, outputs.len())?;

        // Erased positions are treated as missing even if the caller passed bytes
        let mut shards: Vec<Option<Vec<u8>>> = inputs
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                if erased_indexes.binary_search(&i).is_ok() {
                    None
                } else {
                    chunk.as_ref().map(|b| b.to_vec())
                }
            })
            .collect();

        let available = shards.iter().filter(|s| s.is_some()).count();
        if available < shape.num_data_units {
            return Err(Error::InsufficientShards {
                available,
                required: shape.num_data_units,
            });
        }
        let chunk_len = common_chunk_len(
            NAME,
            shards.iter().filter_map(|s| s.as_deref()),
            shape.chunk_size,
        )?;

        rs.reconstruct(&mut shards).map_err(|e| {
            Error::EcReconstructionFailed(format!("Reed-Solomon reconstruction failed: {}", e))
        })?;

        for (output, &index) in outputs.iter_mut().zip(erased_indexes) {
            let shard = shards[index].as_deref().ok_or_else(|| {
                Error::EcReconstructionFailed(format!("unit {} was not reconstructed", index))
            })?;
            output.clear();
            output.extend_from_slice(shard);
        }

        debug!(
            "Reconstructed {} units of {} bytes from {}/{} available",
            erased_indexes.len(),
            chunk_len,
            available,
            shape.total_units()
        );

        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        self.rs = None;
        self.released = true;
        Ok(())
    }
}
