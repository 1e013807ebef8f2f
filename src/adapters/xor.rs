//! XOR Raw Decoder Adapter
//!
//! Single-parity reconstruction: the lost unit is the XOR of every other
//! unit in the coding window.

use bytes::Bytes;
use tracing::{debug, instrument};

use super::{common_chunk_len, validate_decode_args};
use crate::domain::ports::{DecoderKind, RawErasureDecoder, UnitShape};
use crate::error::{Error, Result};

const NAME: &str = "xor";

/// Built-in XOR raw decoder.
///
/// Initialized with `(k, 1, chunk_size)`, its window is units `0..=k`.
/// A group carrying more units than the window is not single-parity coded
/// and is rejected.
#[derive(Debug, Default)]
pub struct XorRawDecoder {
    shape: Option<UnitShape>,
    released: bool,
}

impl XorRawDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed constructor, usable as a registry factory.
    pub fn boxed() -> Box<dyn RawErasureDecoder> {
        Box::new(Self::new())
    }

    fn ready(&self) -> Result<UnitShape> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        self.shape.ok_or(Error::DecoderNotInitialized(NAME))
    }
}

impl RawErasureDecoder for XorRawDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Xor
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self, shape: UnitShape) -> Result<()> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        if self.shape.is_some() {
            return Err(Error::DecoderAlreadyInitialized(NAME));
        }
        shape.validate()?;
        if shape.num_parity_units != 1 {
            return Err(Error::InvalidEcConfig(format!(
                "XOR coding supports exactly 1 parity unit, got {}",
                shape.num_parity_units
            )));
        }
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
        let shape = self.ready()?;
        let window = shape.total_units();

        if inputs.len() != window {
            return Err(Error::ShapeMismatch {
                decoder: NAME,
                reason: format!(
                    "expected {} inputs for single parity, got {}",
                    window,
                    inputs.len()
                ),
            });
        }
        validate_decode_args(NAME, inputs.len(), erased_indexes, outputs.len())?;

        let erased = match erased_indexes {
            [index] => *index,
            _ => {
                return Err(Error::ShapeMismatch {
                    decoder: NAME,
                    reason: format!(
                        "exactly one erasure can be decoded, got {}",
                        erased_indexes.len()
                    ),
                })
            }
        };

        let survivors: Vec<&[u8]> = inputs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != erased)
            .filter_map(|(_, chunk)| chunk.as_deref())
            .collect();
        if survivors.len() < shape.num_data_units {
            return Err(Error::InsufficientShards {
                available: survivors.len(),
                required: shape.num_data_units,
            });
        }
        let chunk_len = common_chunk_len(NAME, survivors.iter().copied(), shape.chunk_size)?;

        let output = &mut outputs[0];
        output.clear();
        output.resize(chunk_len, 0);
        for chunk in &survivors {
            for (out, byte) in output.iter_mut().zip(chunk.iter()) {
                *out ^= byte;
            }
        }

        debug!(
            "XOR-reconstructed unit {} from {} survivors",
            erased,
            survivors.len()
        );

        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(Error::DecoderReleased(NAME));
        }
        self.released = true;
        Ok(())
    }
}
