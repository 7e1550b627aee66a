use std::fmt::{Display, Formatter};

/// A reference to a node in the [`Bdd`][crate::bdd::Bdd] node table.
///
/// The reference is the node's physical slot index. Slots `0..=255` are
/// reserved for the terminal (color) nodes: the terminal for color `c` lives
/// at slot `c`. Internal nodes always live at slots `>= 256`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Number of reserved terminal slots.
    pub const TERMINALS: u32 = 256;

    /// Black terminal.
    pub const BLACK: NodeId = NodeId(0);

    /// White terminal.
    pub const WHITE: NodeId = NodeId(255);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The terminal node of the given color.
    pub const fn terminal(color: u8) -> Self {
        Self(color as u32)
    }

    /// Return the internal representation of the reference.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Return the slot index of the reference.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_terminal(self) -> bool {
        self.0 < Self::TERMINALS
    }

    /// The color of a terminal reference, `None` for internal nodes.
    pub const fn color(self) -> Option<u8> {
        if self.is_terminal() {
            Some(self.0 as u8)
        } else {
            None
        }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.color() {
            Some(c) => write!(f, "#{}", c),
            None => write!(f, "@{}", self.0),
        }
    }
}

impl From<u8> for NodeId {
    fn from(color: u8) -> Self {
        NodeId::terminal(color)
    }
}

/// Which child of a node to follow.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Side {
    /// Taken when the tested bit is 0 (top half for rows, left half for columns).
    Left,
    /// Taken when the tested bit is 1.
    Right,
}

impl Side {
    pub fn from_bit(bit: u32) -> Self {
        if bit == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}
