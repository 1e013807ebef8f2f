//! Property-Based Tests for Decode-Step Planning
//!
//! # Test Properties
//!
//! 1. **Selection**: the decoder variant depends only on the erasure count
//!    and the XOR option
//! 2. **Plan Shape**: erased indexes strictly ascending, one per output block
//! 3. **Reuse**: a variant's backend is created once per coordinator
//! 4. **Reconstruction**: RS plans rebuild any loss pattern of up to m units
//! 5. **Single Loss**: a single-loss plan on a multi-parity RS group either
//!    rebuilds the unit or fails; it never returns wrong bytes

#![cfg(test)]

use std::sync::Arc;

use bytes::Bytes;
use proptest::prelude::*;
use reed_solomon_erasure::galois_8::ReedSolomon;

use super::block::EcBlockGroup;
use super::config::{CoderConf, RS_USE_XOR_KEY};
use super::coordinator::RsErasureDecoder;
use crate::domain::ports::{DecoderKind, ErasureCodingStep, UnitShape};

// =============================================================================
// Property Strategies
// =============================================================================

/// k: 2-8 data units, m: 1-4 parity units
fn shape_strategy() -> impl Strategy<Value = UnitShape> {
    (2usize..=8, 1usize..=4, 1usize..=256).prop_map(|(k, m, chunk)| UnitShape {
        num_data_units: k,
        num_parity_units: m,
        chunk_size: chunk,
    })
}

/// Shape plus a deduplicated set of erased units.
fn erasure_strategy() -> impl Strategy<Value = (UnitShape, Vec<usize>)> {
    shape_strategy().prop_flat_map(|shape| {
        let total = shape.total_units();
        (
            Just(shape),
            prop::collection::vec(0..total, 0..=total).prop_map(|mut v| {
                v.sort();
                v.dedup();
                v
            }),
        )
    })
}

/// Shape plus at most m erased units, and chunk content.
fn recoverable_strategy() -> impl Strategy<Value = (UnitShape, Vec<usize>, Vec<Vec<u8>>)> {
    shape_strategy().prop_flat_map(|shape| {
        let total = shape.total_units();
        let m = shape.num_parity_units;
        (
            Just(shape),
            prop::sample::subsequence((0..total).collect::<Vec<_>>(), 2..=m.max(2).min(total)),
            prop::collection::vec(
                prop::collection::vec(any::<u8>(), shape.chunk_size),
                shape.num_data_units,
            ),
        )
    })
}

/// Multi-parity shape, one lost unit, and chunk content.
fn single_loss_strategy() -> impl Strategy<Value = (UnitShape, usize, Vec<Vec<u8>>)> {
    (2usize..=8, 2usize..=4, 1usize..=128).prop_flat_map(|(k, m, chunk)| {
        let shape = UnitShape {
            num_data_units: k,
            num_parity_units: m,
            chunk_size: chunk,
        };
        (
            Just(shape),
            0..shape.total_units(),
            prop::collection::vec(prop::collection::vec(any::<u8>(), chunk), k),
        )
    })
}

fn rs_encode(shape: UnitShape, data: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let rs = ReedSolomon::new(shape.num_data_units, shape.num_parity_units).unwrap();
    let mut units = data;
    units.extend((0..shape.num_parity_units).map(|_| vec![0u8; shape.chunk_size]));
    rs.encode(&mut units).unwrap();
    units
}

fn with_loss(units: &[Vec<u8>], lost: &[usize]) -> Vec<Option<Bytes>> {
    units
        .iter()
        .enumerate()
        .map(|(i, u)| (!lost.contains(&i)).then(|| Bytes::copy_from_slice(u)))
        .collect()
}

fn coordinator(shape: UnitShape, use_xor: bool) -> RsErasureDecoder {
    let mut coordinator = RsErasureDecoder::new(shape).unwrap();
    coordinator.configure(&CoderConf::new().with(RS_USE_XOR_KEY, use_xor.to_string()));
    coordinator
}

// =============================================================================
// Planning Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: exactly one erasure with XOR enabled selects XOR (k, 1);
    /// everything else selects RS (k, m).
    #[test]
    fn prop_selection_rule(
        (shape, erased) in erasure_strategy(),
        use_xor in any::<bool>(),
    ) {
        let coordinator = coordinator(shape, use_xor);
        let plan = coordinator.prepare_decoding_step(&EcBlockGroup::with_erasures(&shape, &erased))?;

        let decoder_shape = plan.decoder().lock().shape().unwrap();
        if erased.len() == 1 && use_xor {
            prop_assert_eq!(plan.decoder_kind(), DecoderKind::Xor);
            prop_assert_eq!(decoder_shape, shape.with_parity_units(1));
        } else {
            prop_assert_eq!(plan.decoder_kind(), DecoderKind::ReedSolomon);
            prop_assert_eq!(decoder_shape, shape);
        }
    }

    /// Property: the plan's erased indexes match the group and line up with
    /// the output blocks.
    #[test]
    fn prop_plan_shape((shape, erased) in erasure_strategy()) {
        let coordinator = coordinator(shape, true);
        let plan = coordinator.prepare_decoding_step(&EcBlockGroup::with_erasures(&shape, &erased))?;

        prop_assert_eq!(plan.input_blocks().len(), shape.total_units());
        prop_assert_eq!(plan.erased_indexes(), erased.as_slice());
        prop_assert_eq!(plan.erased_indexes().len(), plan.output_blocks().len());
        prop_assert!(plan.erased_indexes().windows(2).all(|w| w[0] < w[1]));
        for (index, block) in plan.erased_indexes().iter().zip(plan.output_blocks()) {
            prop_assert_eq!(&plan.input_blocks()[*index], block);
            prop_assert!(block.erased);
        }
    }

    /// Property: every plan of the same variant shares one backend.
    #[test]
    fn prop_backend_reuse(
        shape in shape_strategy(),
        patterns in prop::collection::vec(prop::collection::vec(0usize..4, 0..4), 2..6),
    ) {
        let coordinator = coordinator(shape, true);
        let mut seen: Vec<(DecoderKind, _)> = Vec::new();

        for pattern in patterns {
            let group = EcBlockGroup::with_erasures(&shape, &pattern);
            let plan = coordinator.prepare_decoding_step(&group)?;
            let kind = plan.decoder_kind();
            match seen.iter().find(|(k, _)| *k == kind) {
                Some((_, first)) => prop_assert!(Arc::ptr_eq(first, plan.decoder())),
                None => seen.push((kind, plan.decoder().clone())),
            }
        }
    }
}

// =============================================================================
// Reconstruction Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: an RS plan rebuilds every lost unit byte for byte.
    #[test]
    fn prop_rs_plan_reconstructs(
        (shape, lost, data) in recoverable_strategy(),
    ) {
        prop_assume!(lost.len() <= shape.num_parity_units);

        let units = rs_encode(shape, data);

        let coordinator = coordinator(shape, true);
        let plan = coordinator.prepare_decoding_step(&EcBlockGroup::with_erasures(&shape, &lost))?;
        prop_assert_eq!(plan.decoder_kind(), DecoderKind::ReedSolomon);

        let mut outputs = vec![Vec::new(); lost.len()];
        plan.perform_coding(&with_loss(&units, &lost), &mut outputs)?;

        for (output, index) in outputs.iter().zip(&lost) {
            prop_assert_eq!(output, &units[*index]);
        }
    }

    /// Property: with or without XOR, a single-loss plan on an RS group with
    /// m > 1 never reports success with wrong content.
    #[test]
    fn prop_single_loss_correct_or_rejected(
        (shape, lost, data) in single_loss_strategy(),
        use_xor in any::<bool>(),
    ) {
        let units = rs_encode(shape, data);

        let coordinator = coordinator(shape, use_xor);
        let plan = coordinator.prepare_decoding_step(&EcBlockGroup::with_erasures(&shape, &[lost]))?;

        let mut outputs = vec![Vec::new()];
        let result = plan.perform_coding(&with_loss(&units, &[lost]), &mut outputs);
        match plan.decoder_kind() {
            DecoderKind::Xor => prop_assert!(result.is_err()),
            DecoderKind::ReedSolomon => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(&outputs[0], &units[lost]);
            }
        }
    }
}
