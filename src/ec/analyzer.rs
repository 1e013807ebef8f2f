//! Block-Group Analyzer
//!
//! Input/output/erased-index extraction shared by decoding coordinators.

use super::block::{EcBlock, EcBlockGroup};

/// Derives the arrays a decoding step is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockGroupAnalyzer;

impl BlockGroupAnalyzer {
    /// Every unit in canonical order, erased or not.
    pub fn input_blocks(&self, group: &EcBlockGroup) -> Vec<EcBlock> {
        group
            .data_blocks()
            .iter()
            .chain(group.parity_blocks())
            .cloned()
            .collect()
    }

    /// The requested blocks that are actually erased, order preserved.
    pub fn output_blocks(&self, _group: &EcBlockGroup, requested: &[EcBlock]) -> Vec<EcBlock> {
        requested.iter().filter(|b| b.erased).cloned().collect()
    }

    /// Every erased unit of the group, in canonical order.
    pub fn erased_output_blocks(&self, group: &EcBlockGroup) -> Vec<EcBlock> {
        self.output_blocks(group, &self.input_blocks(group))
    }

    /// Ascending positions of the erased units within `inputs`.
    pub fn erased_indexes(&self, inputs: &[EcBlock]) -> Vec<usize> {
        inputs
            .iter()
            .enumerate()
            .filter(|(_, b)| b.erased)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UnitShape;
    use crate::ec::block::BlockId;

    fn group(erased: &[usize]) -> EcBlockGroup {
        EcBlockGroup::with_erasures(&UnitShape::new(6, 3, 1024).unwrap(), erased)
    }

    #[test]
    fn test_input_blocks_canonical_order() {
        let inputs = BlockGroupAnalyzer.input_blocks(&group(&[]));
        assert_eq!(inputs.len(), 9);
        for (i, block) in inputs.iter().enumerate() {
            assert_eq!(block.id, BlockId(i as u64));
            assert_eq!(block.is_parity(), i >= 6);
        }
    }

    #[test]
    fn test_input_blocks_include_erased() {
        let inputs = BlockGroupAnalyzer.input_blocks(&group(&[0, 8]));
        assert_eq!(inputs.len(), 9);
        assert!(inputs[0].erased);
        assert!(inputs[8].erased);
    }

    #[test]
    fn test_output_blocks_filters_requested() {
        let g = group(&[1, 4, 7]);
        let inputs = BlockGroupAnalyzer.input_blocks(&g);
        let requested = vec![inputs[0].clone(), inputs[7].clone(), inputs[1].clone()];

        let outputs = BlockGroupAnalyzer.output_blocks(&g, &requested);
        let ids: Vec<BlockId> = outputs.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BlockId(7), BlockId(1)]);
    }

    #[test]
    fn test_erased_indexes_ascending() {
        let g = group(&[7, 2, 5]);
        let inputs = BlockGroupAnalyzer.input_blocks(&g);
        assert_eq!(BlockGroupAnalyzer.erased_indexes(&inputs), vec![2, 5, 7]);
        assert_eq!(BlockGroupAnalyzer.erased_output_blocks(&g).len(), 3);
    }

    #[test]
    fn test_no_erasures() {
        let g = group(&[]);
        let inputs = BlockGroupAnalyzer.input_blocks(&g);
        assert!(BlockGroupAnalyzer.erased_indexes(&inputs).is_empty());
        assert!(BlockGroupAnalyzer.erased_output_blocks(&g).is_empty());
    }
}
