//! Block Group Model
//!
//! Logical erasure-coding units and the group layout the coordinator reads.
//! Canonical order is data units first, then parity units; a unit's position
//! in that order is its index everywhere else.

use serde::Serialize;

use crate::domain::ports::UnitShape;
use crate::error::{Error, Result};

/// Opaque reference to the storage behind a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockId(pub u64);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blk-{}", self.0)
    }
}

/// Positional role of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitRole {
    Data,
    Parity,
}

/// A logical erasure-coding unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcBlock {
    pub id: BlockId,
    pub role: UnitRole,
    pub erased: bool,
}

impl EcBlock {
    pub fn data(id: BlockId, erased: bool) -> Self {
        Self {
            id,
            role: UnitRole::Data,
            erased,
        }
    }

    pub fn parity(id: BlockId, erased: bool) -> Self {
        Self {
            id,
            role: UnitRole::Parity,
            erased,
        }
    }

    pub fn is_parity(&self) -> bool {
        self.role == UnitRole::Parity
    }

    pub fn is_erased(&self) -> bool {
        self.erased
    }
}

/// Data blocks followed by parity blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcBlockGroup {
    data_blocks: Vec<EcBlock>,
    parity_blocks: Vec<EcBlock>,
}

impl EcBlockGroup {
    /// Build a group from its data and parity blocks.
    ///
    /// Fails if a block's role disagrees with the list it was placed in.
    pub fn new(data_blocks: Vec<EcBlock>, parity_blocks: Vec<EcBlock>) -> Result<Self> {
        if let Some(block) = data_blocks.iter().find(|b| b.is_parity()) {
            return Err(Error::InvalidEcConfig(format!(
                "parity block {} placed among data blocks",
                block.id
            )));
        }
        if let Some(block) = parity_blocks.iter().find(|b| !b.is_parity()) {
            return Err(Error::InvalidEcConfig(format!(
                "data block {} placed among parity blocks",
                block.id
            )));
        }
        Ok(Self {
            data_blocks,
            parity_blocks,
        })
    }

    /// Build a group for `shape` with ids `0..k+m` and the given units erased.
    ///
    /// Indexes outside the group are ignored.
    pub fn with_erasures(shape: &UnitShape, erased: &[usize]) -> Self {
        let k = shape.num_data_units;
        let data_blocks = (0..k)
            .map(|i| EcBlock::data(BlockId(i as u64), erased.contains(&i)))
            .collect();
        let parity_blocks = (k..shape.total_units())
            .map(|i| EcBlock::parity(BlockId(i as u64), erased.contains(&i)))
            .collect();
        Self {
            data_blocks,
            parity_blocks,
        }
    }

    pub fn data_blocks(&self) -> &[EcBlock] {
        &self.data_blocks
    }

    pub fn parity_blocks(&self) -> &[EcBlock] {
        &self.parity_blocks
    }

    pub fn num_data_blocks(&self) -> usize {
        self.data_blocks.len()
    }

    pub fn num_parity_blocks(&self) -> usize {
        self.parity_blocks.len()
    }

    /// Number of units marked erased.
    pub fn erased_count(&self) -> usize {
        self.data_blocks
            .iter()
            .chain(&self.parity_blocks)
            .filter(|b| b.erased)
            .count()
    }

    /// True when the group's unit counts fit `shape`.
    pub fn shape_matches(&self, shape: &UnitShape) -> bool {
        self.data_blocks.len() == shape.num_data_units
            && self.parity_blocks.len() == shape.num_parity_units
    }
}
