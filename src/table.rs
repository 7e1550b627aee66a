//! Node arena with a canonical (hash-consing) index.
//!
//! The arena is a fixed-capacity `Vec<Node>` whose first 256 slots are the
//! terminal nodes. Internal nodes are appended by [`Table::alloc_free_slot`]
//! and never freed within one arena lifetime.
//!
//! The unique index is a separate open-addressing hash table of slot ids,
//! probed linearly. Since nodes are never deleted, no tombstones are needed:
//! an empty bucket always terminates a probe sequence.

use std::ops::Index;

use log::debug;

use crate::error::{Error, Result};
use crate::node::{Node, MAX_LEVEL};
use crate::reference::NodeId;
use crate::utils::MyHash;

/// Marker for an empty hash bucket. Slot 0 is a terminal, which is never
/// stored in the index.
const EMPTY: u32 = 0;

pub struct Table {
    nodes: Vec<Node>,
    buckets: Vec<u32>,

    /// Index of the first *possibly* free slot.
    min_free: usize,
    /// Number of live internal nodes.
    real_size: usize,
}

impl Table {
    /// Create a table holding `capacity` slots (terminals included) and a
    /// hash index of `hash_size` buckets.
    pub fn new(capacity: usize, hash_size: usize) -> Self {
        assert!(
            capacity > NodeId::TERMINALS as usize,
            "Capacity must leave room for internal nodes"
        );
        assert!(capacity <= 1 << 31, "Capacity should be at most 2^31");
        assert!(hash_size > 0, "Hash index must not be empty");

        let mut nodes: Vec<Node> = Vec::with_capacity(capacity);
        nodes.resize_with(capacity, Node::default);
        for c in 0..NodeId::TERMINALS {
            let t = NodeId::new(c);
            nodes[c as usize] = Node::new(0, t, t);
        }

        Self {
            nodes,
            buckets: vec![EMPTY; hash_size],
            min_free: NodeId::TERMINALS as usize,
            real_size: 0,
        }
    }

    /// Total number of slots, terminals included.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }
    /// Number of buckets in the hash index.
    pub fn hash_size(&self) -> usize {
        self.buckets.len()
    }
    /// Number of live internal nodes.
    pub fn size(&self) -> usize {
        self.real_size
    }

    /// Check whether `id` refers to a terminal or to an allocated internal node.
    pub fn is_live(&self, id: NodeId) -> bool {
        id.is_terminal() || self.nodes.get(id.index()).is_some_and(|n| n.level != 0)
    }

    /// Get the node at the given slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not live.
    pub fn node(&self, id: NodeId) -> &Node {
        assert!(self.is_live(id), "Node {} is not live", id);
        &self.nodes[id.index()]
    }

    /// Reset the table to its empty state: terminals only, empty index.
    pub fn clear(&mut self) {
        for node in &mut self.nodes[NodeId::TERMINALS as usize..] {
            *node = Node::default();
        }
        self.buckets.fill(EMPTY);
        self.min_free = NodeId::TERMINALS as usize;
        self.real_size = 0;
    }

    /// Find the first unused slot at or after the terminal reservation.
    pub fn alloc_free_slot(&mut self) -> Result<NodeId> {
        let index = (self.min_free..self.capacity())
            .find(|&i| self.nodes[i].level == 0)
            .ok_or(Error::CapacityExceeded {
                resource: "node table",
                capacity: self.capacity(),
            })?;
        // The slot stays free until a node is written into it.
        self.min_free = index;
        Ok(NodeId::new(index as u32))
    }

    fn check_child(&self, child: NodeId, level: u32) -> Result<()> {
        if !self.is_live(child) || self.nodes[child.index()].level >= level {
            return Err(Error::InvalidNode { child, level });
        }
        Ok(())
    }

    /// Look up the node `(level, left, right)`, inserting it if absent.
    ///
    /// Equal children reduce to the child itself and allocate nothing.
    pub fn lookup_or_insert(&mut self, level: u32, left: NodeId, right: NodeId) -> Result<NodeId> {
        if level == 0 || level > MAX_LEVEL {
            return Err(Error::OutOfRangeLevel(level as i64));
        }
        self.check_child(left, level)?;
        self.check_child(right, level)?;

        if left == right {
            return Ok(left);
        }

        let size = self.hash_size();
        let start = (Node::new(level, left, right).hash() % size as u64) as usize;

        // Probe forward from the home bucket, wrapping around once.
        let mut open = None;
        for i in (start..size).chain(0..start) {
            let slot = self.buckets[i];
            if slot == EMPTY {
                open = Some(i);
                break;
            }
            if self.nodes[slot as usize].matches(level, left, right) {
                return Ok(NodeId::new(slot));
            }
        }

        let bucket = open.ok_or(Error::CapacityExceeded {
            resource: "hash index",
            capacity: size,
        })?;

        let id = self.alloc_free_slot()?;
        self.nodes[id.index()] = Node::new(level, left, right);
        self.buckets[bucket] = id.raw();
        self.real_size += 1;
        debug!("insert {} = ({}, {}, {}) at bucket {}", id, level, left, right, bucket);

        Ok(id)
    }
}

impl Index<NodeId> for Table {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.node(id)
    }
}
