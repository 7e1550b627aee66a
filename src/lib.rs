//! # birp-rs: grayscale images as Binary Decision Diagrams
//!
//! **`birp-rs`** stores 8-bit grayscale rasters as reduced, hash-consed
//! **Binary Decision Diagrams** and transforms them without ever expanding
//! them back into pixels.
//!
//! ## How an image becomes a BDD
//!
//! A `2^d x 2^d` raster is split in halves, alternately by rows and by
//! columns, until single pixels remain. Each split is a decision node: level
//! `2k` selects on row bit `k-1`, level `2k+1` on column bit `k`, and the 256
//! terminal nodes at level 0 are the gray values themselves. Two blocks with
//! the same content are the same node, and a split whose halves are equal is
//! never stored, so uniform and repetitive images collapse to a handful of
//! nodes. Rasters that are not a power-of-two square are padded with black.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: every operation goes through the
//!   [`Bdd`][crate::bdd::Bdd] manager, which owns the node arena and keeps
//!   every diagram canonical.
//! - **Lightweight handles**: diagrams are referred to by
//!   [`NodeId`][crate::reference::NodeId], a plain slot index.
//! - **Structural transforms**: recoloring, rotation and zoom rewrite the
//!   diagram directly, with memoization.
//! - **Compact encoding**: a postorder binary format and the `B5` container,
//!   next to plain binary PGM (`P5`).
//!
//! ## Basic Usage
//!
//! ```rust
//! use birp_rs::bdd::Bdd;
//! use birp_rs::transform::negate;
//!
//! let bdd = Bdd::default();
//!
//! // A 2x2 checkerboard.
//! let root = bdd.from_raster(2, 2, &[0, 255, 255, 0]).unwrap();
//! assert_eq!(bdd.evaluate(root, 0, 1), 255);
//!
//! // Negating twice gives back the very same node.
//! let neg = bdd.map(root, negate).unwrap();
//! assert_eq!(bdd.evaluate(neg, 0, 1), 0);
//! assert_eq!(bdd.map(neg, negate).unwrap(), root);
//!
//! // Round-trip through the binary encoding.
//! let bytes = bdd.serialize(root);
//! assert_eq!(bdd.deserialize(&bytes).unwrap(), root);
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the [`Bdd`][crate::bdd::Bdd] manager and its configuration.
//! - **[`raster`]** and **[`eval`]**: building diagrams from pixels and back.
//! - **[`transform`]**: map, rotate and zoom.
//! - **[`codec`]** and **[`image`]**: the binary encoding and file containers.

pub mod bdd;
pub mod cache;
pub mod codec;
pub mod error;
pub mod eval;
pub mod image;
pub mod node;
pub mod raster;
pub mod reference;
pub mod table;
pub mod transform;
pub mod utils;
