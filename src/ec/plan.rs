//! Decoding Plan
//!
//! The immutable bundle handed to an executor: which units go in, which
//! positions are missing, which blocks receive the rebuilt content, and the
//! raw decoder that does the work.

use bytes::Bytes;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, instrument};

use super::block::EcBlock;
use crate::domain::ports::{DecoderKind, ErasureCodingStep, RawErasureDecoder, SharedRawDecoder};
use crate::error::Result;

/// A ready-to-execute decoding step.
///
/// Invariants, upheld by the coordinator that builds it:
/// `erased_indexes` is strictly ascending and has one entry per output block.
#[derive(Clone)]
pub struct DecodingPlan {
    input_blocks: Vec<EcBlock>,
    erased_indexes: Vec<usize>,
    output_blocks: Vec<EcBlock>,
    decoder: SharedRawDecoder,
    decoder_kind: DecoderKind,
}

impl std::fmt::Debug for DecodingPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodingPlan")
            .field("inputs", &self.input_blocks.len())
            .field("erased_indexes", &self.erased_indexes)
            .field("outputs", &self.output_blocks.len())
            .field("decoder_kind", &self.decoder_kind)
            .finish()
    }
}

impl DecodingPlan {
    pub(crate) fn new(
        input_blocks: Vec<EcBlock>,
        erased_indexes: Vec<usize>,
        output_blocks: Vec<EcBlock>,
        decoder: SharedRawDecoder,
        decoder_kind: DecoderKind,
    ) -> Self {
        debug_assert_eq!(erased_indexes.len(), output_blocks.len());
        debug_assert!(erased_indexes.windows(2).all(|w| w[0] < w[1]));
        Self {
            input_blocks,
            erased_indexes,
            output_blocks,
            decoder,
            decoder_kind,
        }
    }

    /// All units in canonical order, erased or not.
    pub fn input_blocks(&self) -> &[EcBlock] {
        &self.input_blocks
    }

    /// Positions within `input_blocks` to reconstruct.
    pub fn erased_indexes(&self) -> &[usize] {
        &self.erased_indexes
    }

    /// Erased blocks, in the same order as `erased_indexes`.
    pub fn output_blocks(&self) -> &[EcBlock] {
        &self.output_blocks
    }

    /// Handle to the selected raw decoder.
    pub fn decoder(&self) -> &SharedRawDecoder {
        &self.decoder
    }

    pub fn decoder_kind(&self) -> DecoderKind {
        self.decoder_kind
    }

    /// True when nothing needs to be reconstructed.
    pub fn is_noop(&self) -> bool {
        self.erased_indexes.is_empty()
    }
}

impl ErasureCodingStep for DecodingPlan {
    /// Run the selected raw decoder. Decoder errors are returned as-is.
    #[instrument(skip(self, inputs, outputs), fields(kind = %self.decoder_kind, erased = ?self.erased_indexes))]
    fn perform_coding(&self, inputs: &[Option<Bytes>], outputs: &mut [Vec<u8>]) -> Result<()> {
        if self.is_noop() {
            debug!("No erased units, skipping decode");
            return Ok(());
        }
        self.decoder
            .lock()
            .decode(inputs, &self.erased_indexes, outputs)
    }
}

impl Serialize for DecodingPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let decoder = self.decoder.lock();
        let mut state = serializer.serialize_struct("DecodingPlan", 6)?;
        state.serialize_field("input_blocks", &self.input_blocks)?;
        state.serialize_field("erased_indexes", &self.erased_indexes)?;
        state.serialize_field("output_blocks", &self.output_blocks)?;
        state.serialize_field("decoder_kind", &self.decoder_kind)?;
        state.serialize_field("decoder_name", decoder.name())?;
        state.serialize_field("decoder_shape", &decoder.shape())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::XorRawDecoder;
    use crate::domain::ports::{share, UnitShape};
    use crate::ec::analyzer::BlockGroupAnalyzer;
    use crate::ec::block::EcBlockGroup;

    fn xor_plan(erased: &[usize]) -> DecodingPlan {
        let shape = UnitShape::new(3, 1, 16).unwrap();
        let group = EcBlockGroup::with_erasures(&shape, erased);
        let inputs = BlockGroupAnalyzer.input_blocks(&group);
        let indexes = BlockGroupAnalyzer.erased_indexes(&inputs);
        let outputs = BlockGroupAnalyzer.erased_output_blocks(&group);

        let mut decoder = XorRawDecoder::new();
        decoder.initialize(shape).unwrap();
        DecodingPlan::new(inputs, indexes, outputs, share(Box::new(decoder)), DecoderKind::Xor)
    }

    #[test]
    fn test_perform_coding_runs_decoder() {
        let plan = xor_plan(&[1]);
        let inputs = vec![
            Some(Bytes::from_static(&[1u8; 16])),
            None,
            Some(Bytes::from_static(&[4u8; 16])),
            Some(Bytes::from_static(&[7u8; 16])),
        ];
        let mut outputs = vec![Vec::new()];
        plan.perform_coding(&inputs, &mut outputs).unwrap();
        assert_eq!(outputs[0], vec![1u8 ^ 4 ^ 7; 16]);
        plan.finish();
    }

    #[test]
    fn test_noop_plan_skips_decoder() {
        let plan = xor_plan(&[]);
        assert!(plan.is_noop());
        plan.perform_coding(&[], &mut []).unwrap();
    }

    #[test]
    fn test_serialize_summary() {
        let plan = xor_plan(&[2]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["erased_indexes"], serde_json::json!([2]));
        assert_eq!(json["decoder_kind"], "xor");
        assert_eq!(json["decoder_name"], "xor");
        assert_eq!(json["decoder_shape"]["num_parity_units"], 1);
        assert_eq!(json["input_blocks"].as_array().unwrap().len(), 4);
        assert_eq!(json["output_blocks"][0]["role"], "data");
    }
}
