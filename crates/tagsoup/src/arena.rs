//! Block-based bump allocator for tree nodes.
//!
//! Nodes are carved out of fixed-capacity blocks. A block is reserved at full
//! size when it is opened and never grows, so node storage never moves and a
//! tree with `n` nodes is released as `n / BLOCK_SIZE` allocations. Slots are
//! never reused or freed individually.

use crate::dom::{Node, NodeData};

/// Nodes per block.
pub const BLOCK_SIZE: usize = 64;

/// Handle to a node slot.
///
/// Only meaningful for the arena (and so the [`Dom`](crate::Dom)) that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    fn new(block: usize, slot: usize) -> Self {
        NodeId(block * BLOCK_SIZE + slot)
    }

    /// Allocation order of the node within its arena.
    pub fn index(self) -> usize {
        self.0
    }

    fn block(self) -> usize {
        self.0 / BLOCK_SIZE
    }

    fn slot(self) -> usize {
        self.0 % BLOCK_SIZE
    }
}

#[derive(Debug, Default)]
pub struct NodeArena {
    blocks: Vec<Vec<Node>>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Allocate a detached node holding `data`.
    pub fn new_node(&mut self, data: NodeData) -> (NodeId, &mut Node) {
        if self.blocks.last().is_none_or(|block| block.len() == BLOCK_SIZE) {
            log::trace!(
                target: "tagsoup.arena",
                "open block {} ({} nodes allocated)",
                self.blocks.len(),
                self.len()
            );
            self.blocks.push(Vec::with_capacity(BLOCK_SIZE));
        }

        let block_index = self.blocks.len() - 1;
        let block = &mut self.blocks[block_index];
        let slot = block.len();
        block.push(Node::new(data));
        (NodeId::new(block_index, slot), &mut block[slot])
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.blocks.get(id.block())?.get(id.slot())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.blocks.get_mut(id.block())?.get_mut(id.slot())
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        match self.blocks.last() {
            Some(last) => (self.blocks.len() - 1) * BLOCK_SIZE + last.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Every allocated node in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.blocks.iter().enumerate().flat_map(|(b, block)| {
            block
                .iter()
                .enumerate()
                .map(move |(s, node)| (NodeId::new(b, s), node))
        })
    }
}
