//! Structural transforms: recoloring, rotation and zoom.
//!
//! Each transform is a single postorder rewrite of the source diagram whose
//! new nodes go through [`Bdd::lookup_or_insert`], so the result shares every
//! subtree that already exists in the arena (including subtrees of the source
//! itself). Intermediate results are memoized per call in a [`Cache`].

use log::debug;

use crate::bdd::{even_ceil, Bdd};
use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::node::MAX_LEVEL;
use crate::reference::NodeId;

/// Photographic negative.
pub fn negate(color: u8) -> u8 {
    255 - color
}

/// Black and white threshold: colors at or above `t` become white.
pub fn threshold(t: u8) -> impl Fn(u8) -> u8 {
    move |color| if color >= t { 255 } else { 0 }
}

impl Bdd {
    /// Replace every terminal color `c` by `f(c)`.
    pub fn map(&self, root: NodeId, f: impl Fn(u8) -> u8) -> Result<NodeId> {
        debug!("map(root = {})", root);
        let colors: Vec<NodeId> = (0..=255u8).map(|c| NodeId::terminal(f(c))).collect();
        let mut cache = Cache::new(self.config().cache_bits);
        let res = self.map_(root, &colors, &mut cache)?;
        debug!(
            "map: {} -> {} (cache hits = {}, misses = {})",
            root,
            res,
            cache.hits(),
            cache.misses()
        );
        Ok(res)
    }

    fn map_(
        &self,
        id: NodeId,
        colors: &[NodeId],
        cache: &mut Cache<NodeId, NodeId>,
    ) -> Result<NodeId> {
        if let Some(c) = id.color() {
            return Ok(colors[c as usize]);
        }
        if let Some(res) = cache.get(id) {
            return Ok(res);
        }

        let node = self.node(id);
        let left = self.map_(node.left, colors, cache)?;
        let right = self.map_(node.right, colors, cache)?;
        let res = self.lookup_or_insert(node.level, left, right)?;

        cache.insert(id, res);
        Ok(res)
    }

    /// Rotate the covering square by 90 degrees counter-clockwise.
    ///
    /// Pixel `(r, c)` moves to `(S - 1 - c, r)`, where `S` is the side of the
    /// square covered by the root level rounded up to even.
    pub fn rotate(&self, root: NodeId) -> Result<NodeId> {
        debug!("rotate(root = {})", root);
        let level = even_ceil(self.level(root));
        let mut cache = Cache::new(self.config().cache_bits);
        let res = self.rotate_(root, level, &mut cache)?;
        debug!(
            "rotate: {} -> {} (cache hits = {}, misses = {})",
            root,
            res,
            cache.hits(),
            cache.misses()
        );
        Ok(res)
    }

    /// Rotate the 2-level block rooted at `id`, seen from the even `level`.
    fn rotate_(
        &self,
        id: NodeId,
        level: u32,
        cache: &mut Cache<(NodeId, u32), NodeId>,
    ) -> Result<NodeId> {
        if id.is_terminal() {
            return Ok(id);
        }
        if let Some(res) = cache.get((id, level)) {
            return Ok(res);
        }

        // Row split first, then column split:
        //   A B
        //   C D
        let (top, bottom) = self.children(id, level);
        let (a, b) = self.children(top, level - 1);
        let (c, d) = self.children(bottom, level - 1);

        let a = self.rotate_(a, level - 2, cache)?;
        let b = self.rotate_(b, level - 2, cache)?;
        let c = self.rotate_(c, level - 2, cache)?;
        let d = self.rotate_(d, level - 2, cache)?;

        // Rotated block:
        //   B D
        //   A C
        let new_top = self.lookup_or_insert(level - 1, b, d)?;
        let new_bottom = self.lookup_or_insert(level - 1, a, c)?;
        let res = self.lookup_or_insert(level, new_top, new_bottom)?;

        cache.insert((id, level), res);
        Ok(res)
    }

    /// Scale the diagram by `2^factor`.
    ///
    /// A positive factor magnifies: every level moves up by `2 * factor` and
    /// the new low levels are implicit. A negative factor shrinks: every block
    /// at or below level `2 * |factor|` becomes a single pixel, white if the
    /// block holds any non-black pixel and black otherwise.
    pub fn zoom(&self, root: NodeId, factor: i32) -> Result<NodeId> {
        debug!("zoom(root = {}, factor = {})", root, factor);

        // Number of levels added or removed.
        let shift = 2 * factor.unsigned_abs() as u64;
        if shift > MAX_LEVEL as u64 {
            return Err(Error::OutOfRangeLevel(shift as i64));
        }
        let shift = shift as u32;
        if factor > 0 {
            let top = even_ceil(self.level(root)) + shift;
            if top > MAX_LEVEL {
                return Err(Error::OutOfRangeLevel(top as i64));
            }
        }

        let res = match factor {
            0 => root,
            f if f > 0 => {
                let mut cache = Cache::new(self.config().cache_bits);
                self.zoom_in_(root, shift, &mut cache)?
            }
            _ => {
                let mut cache = Cache::new(self.config().cache_bits);
                let mut white = Cache::new(self.config().cache_bits);
                self.zoom_out_(root, shift, &mut cache, &mut white)?
            }
        };

        debug!("zoom: {} -> {}", root, res);
        Ok(res)
    }

    fn zoom_in_(
        &self,
        id: NodeId,
        shift: u32,
        cache: &mut Cache<NodeId, NodeId>,
    ) -> Result<NodeId> {
        if id.is_terminal() {
            return Ok(id);
        }
        if let Some(res) = cache.get(id) {
            return Ok(res);
        }

        let node = self.node(id);
        let left = self.zoom_in_(node.left, shift, cache)?;
        let right = self.zoom_in_(node.right, shift, cache)?;
        let res = self.lookup_or_insert(node.level + shift, left, right)?;

        cache.insert(id, res);
        Ok(res)
    }

    fn zoom_out_(
        &self,
        id: NodeId,
        cutoff: u32,
        cache: &mut Cache<NodeId, NodeId>,
        white: &mut Cache<NodeId, bool>,
    ) -> Result<NodeId> {
        let node = self.node(id);
        if node.level <= cutoff {
            return Ok(if self.any_white(id, white) {
                NodeId::WHITE
            } else {
                NodeId::BLACK
            });
        }
        if let Some(res) = cache.get(id) {
            return Ok(res);
        }

        let left = self.zoom_out_(node.left, cutoff, cache, white)?;
        let right = self.zoom_out_(node.right, cutoff, cache, white)?;
        let res = self.lookup_or_insert(node.level - cutoff, left, right)?;

        cache.insert(id, res);
        Ok(res)
    }

    /// Whether the diagram rooted at `id` reaches any non-black terminal.
    fn any_white(&self, id: NodeId, cache: &mut Cache<NodeId, bool>) -> bool {
        if let Some(c) = id.color() {
            return c != 0;
        }
        if let Some(res) = cache.get(id) {
            return res;
        }

        let node = self.node(id);
        let res = self.any_white(node.left, cache) || self.any_white(node.right, cache);

        cache.insert(id, res);
        res
    }
}
