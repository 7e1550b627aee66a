//! Point queries on a diagram.

use crate::bdd::{even_ceil, Bdd};
use crate::reference::{NodeId, Side};

/// The bit of `(row, col)` tested at a given (non-zero) level.
///
/// Even levels consume row bits, odd levels column bits, most significant
/// first when walking down from the top of the diagram.
pub fn level_bit(level: u32, row: u32, col: u32) -> u32 {
    debug_assert!(level > 0);
    if level % 2 == 0 {
        (row >> (level / 2 - 1)) & 1
    } else {
        (col >> (level / 2)) & 1
    }
}

impl Bdd {
    /// The color of pixel `(row, col)` of the diagram rooted at `root`.
    ///
    /// The walk starts at the root level rounded up to even, `2d`, and takes
    /// exactly `2d` steps, alternating a row bit and a column bit. Levels that
    /// were elided by reduction are stepped over by [`Bdd::child`], which
    /// keeps the node in place while its bit is consumed. Coordinates outside
    /// the `2^d x 2^d` square wrap around.
    pub fn evaluate(&self, root: NodeId, row: u32, col: u32) -> u8 {
        let mut current = root;
        let mut level = even_ceil(self.level(root));

        while !current.is_terminal() {
            let side = Side::from_bit(level_bit(level, row, col));
            current = self.child(current, side, level);
            level -= 1;
        }

        current.raw() as u8
    }
}
