use crate::reference::NodeId;
use crate::utils::{pairing2, MyHash};

/// Highest level a node may have.
///
/// Levels are written as the letters `'A'..='Z'` by the codec, so 26 is the
/// deepest diagram that can be serialized (a `2^13 x 2^13` covering square).
pub const MAX_LEVEL: u32 = 26;

/// A diagram node: a `(level, left, right)` triple.
///
/// Level 0 marks both terminal slots and unused slots. Even levels split
/// rows, odd levels split columns.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub level: u32,
    pub left: NodeId,
    pub right: NodeId,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            level: 0,
            left: NodeId::BLACK,
            right: NodeId::BLACK,
        }
    }
}

impl Node {
    pub fn new(level: u32, left: NodeId, right: NodeId) -> Self {
        Self { level, left, right }
    }

    /// Check whether this node has the given triple.
    pub fn matches(&self, level: u32, left: NodeId, right: NodeId) -> bool {
        self.level == level && self.left == left && self.right == right
    }
}

impl MyHash for Node {
    /// The hash ignores the level: the unique table is probed by children only.
    fn hash(&self) -> u64 {
        pairing2(self.left.raw() as u64, self.right.raw() as u64)
    }
}
