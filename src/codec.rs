//! Binary encoding of a single diagram.
//!
//! The stream is a postorder listing of the diagram's nodes. Each node is
//! numbered by the order in which it is written, starting from 1, and
//! internal nodes refer to their children by those numbers:
//!
//! ```text
//! terminal:  '@' color
//! internal:  ('A' + level - 1) left:u32le right:u32le
//! ```
//!
//! Every node is written exactly once, after all of its descendants, so the
//! last node of the stream is the root. There is no header, node count or
//! terminator.

use std::collections::HashMap;
use std::io::Write;

use log::debug;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::node::MAX_LEVEL;
use crate::reference::NodeId;

const TERMINAL_TAG: u8 = b'@';
const LEVEL_BASE: u8 = b'A';

impl Bdd {
    /// Encode the diagram rooted at `root`.
    pub fn serialize(&self, root: NodeId) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_nodes(root, &mut HashMap::new(), &mut out);
        debug!("serialize(root = {}): {} bytes", root, out.len());
        out
    }

    /// Encode the diagram rooted at `root` into a writer.
    pub fn serialize_into<W: Write>(&self, root: NodeId, writer: &mut W) -> Result<()> {
        writer.write_all(&self.serialize(root))?;
        Ok(())
    }

    /// Write the nodes under `id` that have no serial yet, then `id` itself.
    /// Returns the serial of `id`.
    fn write_nodes(
        &self,
        id: NodeId,
        serials: &mut HashMap<NodeId, u32>,
        out: &mut Vec<u8>,
    ) -> u32 {
        if let Some(&serial) = serials.get(&id) {
            return serial;
        }

        if let Some(color) = id.color() {
            out.push(TERMINAL_TAG);
            out.push(color);
        } else {
            let node = self.node(id);
            let left = self.write_nodes(node.left, serials, out);
            let right = self.write_nodes(node.right, serials, out);
            out.push(LEVEL_BASE + (node.level - 1) as u8);
            out.extend_from_slice(&left.to_le_bytes());
            out.extend_from_slice(&right.to_le_bytes());
        }

        let serial = serials.len() as u32 + 1;
        serials.insert(id, serial);
        serial
    }

    /// Decode a stream produced by [`Bdd::serialize`] into this manager.
    ///
    /// Nodes are hash-consed into the arena, so decoding a diagram that is
    /// already present returns its existing root.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<NodeId> {
        debug!("deserialize({} bytes)", bytes.len());

        let mut reader = Reader { bytes, pos: 0 };
        // Slot of each serial, serials being 1-based.
        let mut slots: Vec<NodeId> = Vec::new();
        let mut seen_colors = [false; 256];
        // The last internal node read. Terminals only count until then.
        let mut root = None;
        let mut built = false;

        while !reader.is_empty() {
            let offset = reader.pos;
            let tag = reader.byte("truncated stream")?;

            match tag {
                TERMINAL_TAG => {
                    let color = reader.byte("truncated terminal")?;
                    if !seen_colors[color as usize] {
                        seen_colors[color as usize] = true;
                        slots.push(NodeId::terminal(color));
                    }
                    if !built {
                        root = Some(NodeId::terminal(color));
                    }
                }
                t if (LEVEL_BASE..LEVEL_BASE + MAX_LEVEL as u8).contains(&t) => {
                    let level = (t - LEVEL_BASE) as u32 + 1;
                    let left = reader.serial(&slots)?;
                    let right = reader.serial(&slots)?;
                    let id = self.lookup_or_insert(level, left, right)?;
                    slots.push(id);
                    root = Some(id);
                    built = true;
                }
                _ => {
                    return Err(Error::MalformedStream {
                        offset,
                        reason: "unrecognized node tag",
                    })
                }
            }
        }

        let root = root.ok_or(Error::MalformedStream {
            offset: 0,
            reason: "empty stream",
        })?;
        debug!("deserialize: root = {}, {} serials", root, slots.len());
        Ok(root)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn byte(&mut self, reason: &'static str) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(Error::MalformedStream {
            offset: self.pos,
            reason,
        })?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a child serial and resolve it to a slot.
    fn serial(&mut self, slots: &[NodeId]) -> Result<NodeId> {
        let offset = self.pos;
        let raw = self
            .bytes
            .get(offset..offset + 4)
            .ok_or(Error::MalformedStream {
                offset,
                reason: "truncated child reference",
            })?;
        let serial = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        self.pos += 4;

        let slot = match serial {
            0 => None,
            s => slots.get(s as usize - 1).copied(),
        };
        slot.ok_or(Error::UnresolvedReference { serial, offset })
    }
}
