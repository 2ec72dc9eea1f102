//! Compact mapping between a gappy external ID space and a contiguous index
//! space.
//!
//! Mesh libraries hand out IDs however they please (including importer
//! artifacts that leave gaps). The accelerator scenes underneath
//! [`RayTracer`](crate::RayTracer) want a dense `0..n` index range to use as
//! primitive indices, so every external ID set is first run through a
//! [`BlockMapping`] that groups it into sorted contiguous runs ("blocks")
//! and answers `id_to_index`/`index_to_id` with a binary search over the
//! (usually tiny) block list rather than a full hash map.

use crate::MeshID;

#[derive(Debug, Clone, Copy)]
struct Block {
    id_start: MeshID,
    idx_start: i64,
    count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BlockMapping {
    blocks: Vec<Block>,
}

impl BlockMapping {
    pub const fn invalid_index() -> i64 {
        -1
    }

    pub const fn invalid_id() -> MeshID {
        -1
    }

    /// Builds a mapping from a list of IDs, which need not be sorted but
    /// must be unique. Iteration order of `ids` fixes the contiguous index
    /// each ID receives within its block.
    pub fn new(mut ids: Vec<MeshID>) -> Self {
        if ids.is_empty() {
            return BlockMapping { blocks: Vec::new() };
        }

        ids.sort_unstable();

        let mut blocks = Vec::new();
        let n = ids.len();
        let mut block_start = 0usize;
        let mut current_idx: i64 = 0;

        for i in 1..=n {
            if i == n || ids[i] != ids[i - 1] + 1 {
                let count = (i - block_start) as i64;
                blocks.push(Block {
                    id_start: ids[block_start],
                    idx_start: current_idx,
                    count,
                });
                current_idx += count;
                block_start = i;
            }
        }

        BlockMapping { blocks }
    }

    /// Maps an external ID to a contiguous index, or [`BlockMapping::invalid_index`]
    /// if `id` falls in a gap between blocks or outside the mapped range.
    pub fn id_to_index(&self, id: MeshID) -> i64 {
        let Some(block) = self.block_for_id(id) else {
            return Self::invalid_index();
        };

        let diff = id - block.id_start;
        if diff >= block.count {
            return Self::invalid_index();
        }
        block.idx_start + diff
    }

    /// Maps a contiguous index back to its external ID, or
    /// [`BlockMapping::invalid_id`] if `idx` is out of range.
    pub fn index_to_id(&self, idx: i64) -> MeshID {
        let Some(block) = self.block_for_idx(idx) else {
            return Self::invalid_id();
        };
        block.id_start + (idx - block.idx_start)
    }

    fn block_for_id(&self, id: MeshID) -> Option<&Block> {
        if self.blocks.is_empty() {
            return None;
        }
        let pos = self.blocks.partition_point(|b| b.id_start <= id);
        if pos == 0 {
            return None;
        }
        Some(&self.blocks[pos - 1])
    }

    fn block_for_idx(&self, idx: i64) -> Option<&Block> {
        if self.blocks.is_empty() {
            return None;
        }
        let pos = self.blocks.partition_point(|b| b.idx_start <= idx);
        if pos == 0 {
            return None;
        }
        Some(&self.blocks[pos - 1])
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
