//! The diagram manager.
//!
//! A [`Bdd`] owns one node arena (see [`Table`]) and is the entry point for
//! every operation: building diagrams from rasters, evaluating pixels,
//! transforming diagrams and (de)serializing them. All diagrams created
//! through one manager share the same arena, so structurally equal diagrams
//! always have equal root references.
//!
//! # Levels
//!
//! Level 0 holds the 256 terminal (color) nodes. Above that, even levels split
//! rows and odd levels split columns: level `2k` tests row bit `k-1` and level
//! `2k+1` tests column bit `k`. A node whose two children would be equal is
//! never created, so a node at level `l` also stands for itself at every level
//! above `l` (see [`Bdd::child`]).
//!
//! # Examples
//!
//! ```
//! use birp_rs::bdd::Bdd;
//!
//! let bdd = Bdd::default();
//! let root = bdd.from_raster(2, 2, &[0, 255, 255, 0]).unwrap();
//! assert_eq!(bdd.evaluate(root, 0, 1), 255);
//! assert_eq!(bdd.evaluate(root, 1, 1), 0);
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Debug;

use log::debug;

use crate::error::Result;
use crate::node::Node;
use crate::reference::{NodeId, Side};
use crate::table::Table;

/// Configuration of a [`Bdd`] manager.
#[derive(Debug, Clone)]
pub struct BddConfig {
    /// Number of node slots, the 256 terminals included.
    pub capacity: usize,
    /// Number of buckets of the unique hash index.
    pub hash_size: usize,
    /// Size (as a power of two) of the per-transform memo caches.
    pub cache_bits: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            capacity: 1 << 20,
            // Prime, roughly twice the node capacity.
            hash_size: 2_097_169,
            cache_bits: 16,
        }
    }
}

impl BddConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_hash_size(mut self, hash_size: usize) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_cache_bits(mut self, cache_bits: usize) -> Self {
        self.cache_bits = cache_bits;
        self
    }
}

pub struct Bdd {
    table: RefCell<Table>,
    config: BddConfig,
}

impl Bdd {
    pub fn new(config: BddConfig) -> Self {
        assert!(
            config.cache_bits <= 31,
            "Cache bits should be in the range 0..=31"
        );
        let table = Table::new(config.capacity, config.hash_size);
        Self {
            table: RefCell::new(table),
            config,
        }
    }

    pub fn config(&self) -> &BddConfig {
        &self.config
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &table.capacity())
            .field("hash_size", &table.hash_size())
            .field("size", &table.size())
            .finish()
    }
}

impl Bdd {
    /// Get a copy of the node at the given slot.
    pub fn node(&self, id: NodeId) -> Node {
        *self.table.borrow().node(id)
    }
    pub fn level(&self, id: NodeId) -> u32 {
        self.table.borrow().node(id).level
    }
    pub fn left(&self, id: NodeId) -> NodeId {
        self.table.borrow().node(id).left
    }
    pub fn right(&self, id: NodeId) -> NodeId {
        self.table.borrow().node(id).right
    }

    /// Number of live internal nodes in the arena.
    pub fn num_nodes(&self) -> usize {
        self.table.borrow().size()
    }

    /// The child of `id` on the given side, seen from a node position at `level`.
    ///
    /// If `level` is above the node's own level, the node stands for an elided
    /// node at `level` whose children are both the node itself.
    pub fn child(&self, id: NodeId, side: Side, level: u32) -> NodeId {
        let node = self.node(id);
        if level > node.level {
            return id;
        }
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    /// Both children of `id` seen from `level`, as `(left, right)`.
    pub fn children(&self, id: NodeId, level: u32) -> (NodeId, NodeId) {
        (self.child(id, Side::Left, level), self.child(id, Side::Right, level))
    }

    /// Reset the arena: drop every internal node. Previously returned
    /// references to internal nodes become invalid.
    pub fn clear(&self) {
        debug!("clear()");
        self.table.borrow_mut().clear();
    }

    /// Find the first free slot of the arena.
    pub fn alloc_free_slot(&self) -> Result<NodeId> {
        self.table.borrow_mut().alloc_free_slot()
    }

    /// Return the canonical node `(level, left, right)`, creating it if needed.
    pub fn lookup_or_insert(&self, level: u32, left: NodeId, right: NodeId) -> Result<NodeId> {
        debug!("lookup_or_insert(level = {}, left = {}, right = {})", level, left, right);
        self.table.borrow_mut().lookup_or_insert(level, left, right)
    }

    /// All internal nodes reachable from the given roots.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = NodeId>) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = nodes.into_iter().collect();

        while let Some(id) = stack.pop() {
            if id.is_terminal() || !visited.insert(id) {
                continue;
            }
            let node = self.node(id);
            stack.push(node.left);
            stack.push(node.right);
        }

        visited
    }

    /// Number of internal nodes of the diagram rooted at `root`.
    pub fn size(&self, root: NodeId) -> usize {
        self.descendants([root]).len()
    }
}

/// The level at which a walk starting from `root` begins: the root level
/// rounded up to a full row/column pair.
pub(crate) fn even_ceil(level: u32) -> u32 {
    level + level % 2
}
