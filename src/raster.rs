//! Conversion between rasters and diagrams.

use log::debug;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::node::MAX_LEVEL;
use crate::reference::NodeId;

/// A decoded 8-bit grayscale raster, row-major.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize,
            "Raster data does not match its dimensions"
        );
        Self { width, height, data }
    }

    /// Pixel at `(row, col)`.
    pub fn get(&self, row: u32, col: u32) -> u8 {
        self.data[row as usize * self.width as usize + col as usize]
    }
}

/// Largest width or height a diagram can cover.
pub const MAX_SIDE: u32 = 1 << (MAX_LEVEL / 2);

/// The least even level `l` such that a `2^(l/2)` square covers `width x height`.
pub fn min_level(width: u32, height: u32) -> u32 {
    let side = width.max(height).max(1);
    // ceil(log2(side))
    let bits = u32::BITS - (side - 1).leading_zeros();
    2 * bits
}

impl Bdd {
    /// Build the canonical diagram of a `width x height` raster.
    ///
    /// The raster is padded with black up to the covering power-of-two square.
    pub fn from_raster(&self, width: u32, height: u32, raster: &[u8]) -> Result<NodeId> {
        debug!("from_raster(width = {}, height = {})", width, height);

        let invalid = |reason| Error::InvalidDimensions {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(invalid("dimensions must be positive"));
        }
        if raster.len() != width as usize * height as usize {
            return Err(invalid("raster length does not match dimensions"));
        }
        let levels = min_level(width, height);
        if levels > MAX_LEVEL {
            return Err(invalid("raster is too large"));
        }

        let side = 1u32 << (levels / 2);
        let builder = Builder {
            bdd: self,
            width,
            height,
            pixel: |row: u32, col: u32| raster[row as usize * width as usize + col as usize],
        };
        let root = builder.build(levels, 0, 0, side, side)?;
        debug!("from_raster: root = {}, levels = {}, size = {}", root, levels, self.size(root));
        Ok(root)
    }

    /// Build the diagram of the `width x height` window of `root` whose
    /// top-left corner is `(row, col)`.
    ///
    /// Window coordinates wrap around the square covered by `root`, like
    /// [`Bdd::evaluate`]. The window is padded with black like any raster.
    pub fn crop(
        &self,
        root: NodeId,
        row: u32,
        col: u32,
        width: u32,
        height: u32,
    ) -> Result<NodeId> {
        debug!(
            "crop(root = {}, row = {}, col = {}, width = {}, height = {})",
            root, row, col, width, height
        );

        let invalid = |reason| Error::InvalidDimensions {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(invalid("dimensions must be positive"));
        }
        let levels = min_level(width, height);
        if levels > MAX_LEVEL {
            return Err(invalid("window is too large"));
        }

        let side = 1u32 << (levels / 2);
        let builder = Builder {
            bdd: self,
            width,
            height,
            pixel: |r: u32, c: u32| {
                self.evaluate(root, row.wrapping_add(r), col.wrapping_add(c))
            },
        };
        builder.build(levels, 0, 0, side, side)
    }

    /// Materialize the top-left `width x height` window of a diagram.
    pub fn to_raster(&self, root: NodeId, width: u32, height: u32) -> Raster {
        debug!("to_raster(root = {}, width = {}, height = {})", root, width, height);
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for col in 0..width {
                data.push(self.evaluate(root, row, col));
            }
        }
        Raster::new(width, height, data)
    }

    /// Build directly from a [`Raster`].
    pub fn from_image(&self, raster: &Raster) -> Result<NodeId> {
        self.from_raster(raster.width, raster.height, &raster.data)
    }
}

struct Builder<'a, F> {
    bdd: &'a Bdd,
    width: u32,
    height: u32,
    pixel: F,
}

impl<F: Fn(u32, u32) -> u8> Builder<'_, F> {
    /// Build the block of `rows x cols` pixels whose top-left corner is `(row, col)`.
    fn build(&self, level: u32, row: u32, col: u32, rows: u32, cols: u32) -> Result<NodeId> {
        if level == 0 {
            if row >= self.height || col >= self.width {
                return Ok(NodeId::BLACK);
            }
            return Ok(NodeId::terminal((self.pixel)(row, col)));
        }

        let (left, right) = if level % 2 == 0 {
            let half = rows / 2;
            (
                self.build(level - 1, row, col, half, cols)?,
                self.build(level - 1, row + half, col, half, cols)?,
            )
        } else {
            let half = cols / 2;
            (
                self.build(level - 1, row, col, rows, half)?,
                self.build(level - 1, row, col + half, rows, half)?,
            )
        };

        self.bdd.lookup_or_insert(level, left, right)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bdd::BddConfig;

    #[test]
    fn test_min_level() {
        assert_eq!(min_level(1, 1), 0);
        assert_eq!(min_level(2, 1), 2);
        assert_eq!(min_level(2, 2), 2);
        assert_eq!(min_level(3, 2), 4);
        assert_eq!(min_level(4, 4), 4);
        assert_eq!(min_level(5, 1), 6);
        assert_eq!(min_level(1, 8), 6);
        assert_eq!(min_level(640, 480), 20);
        assert_eq!(min_level(MAX_SIDE, MAX_SIDE), MAX_LEVEL);
    }

    #[test]
    fn test_checkerboard() {
        let bdd = Bdd::default();
        let root = bdd.from_raster(2, 2, &[0, 255, 255, 0]).unwrap();
        assert_eq!(bdd.evaluate(root, 0, 0), 0);
        assert_eq!(bdd.evaluate(root, 0, 1), 255);
        assert_eq!(bdd.evaluate(root, 1, 0), 255);
        assert_eq!(bdd.evaluate(root, 1, 1), 0);
        // Two distinct column nodes under one row node.
        assert_eq!(bdd.level(root), 2);
        assert_eq!(bdd.size(root), 3);
    }

    #[test]
    fn test_uniform_raster_is_terminal() {
        let bdd = Bdd::default();
        let root = bdd.from_raster(3, 5, &[77; 15]).unwrap();
        // Padding is black, so only a power-of-two raster reduces completely.
        assert!(!root.is_terminal());
        let root = bdd.from_raster(4, 4, &[77; 16]).unwrap();
        assert_eq!(root, NodeId::terminal(77));
        assert_eq!(bdd.num_nodes(), bdd.size(bdd.from_raster(3, 5, &[77; 15]).unwrap()));
    }

    #[test]
    fn test_identical_rows_reduce_root() {
        let bdd = Bdd::default();
        // Both rows are equal, so the row split at level 2 is elided.
        let root = bdd.from_raster(2, 2, &[0, 255, 0, 255]).unwrap();
        assert_eq!(bdd.level(root), 1);
        assert_eq!(bdd.to_raster(root, 2, 2).data, vec![0, 255, 0, 255]);
    }

    #[test]
    fn test_padding_and_round_trip() {
        let bdd = Bdd::default();
        let data: Vec<u8> = (0..15).map(|i| (i * 17) as u8).collect();
        let root = bdd.from_raster(5, 3, &data).unwrap();
        let raster = bdd.to_raster(root, 5, 3);
        assert_eq!(raster.data, data);
        assert_eq!(raster.get(2, 4), data[14]);
        // Outside the raster, inside the covering square: padding.
        assert_eq!(bdd.evaluate(root, 7, 7), 0);
        assert_eq!(bdd.evaluate(root, 0, 5), 0);
    }

    #[test]
    fn test_same_raster_same_root() {
        let bdd = Bdd::default();
        let data: Vec<u8> = (0..64).map(|i| if i % 3 == 0 { 255 } else { 0 }).collect();
        let a = bdd.from_raster(8, 8, &data).unwrap();
        let n = bdd.num_nodes();
        let b = bdd.from_image(&Raster::new(8, 8, data)).unwrap();
        assert_eq!(a, b);
        assert_eq!(bdd.num_nodes(), n);
    }

    #[test]
    fn test_invalid_dimensions() {
        let bdd = Bdd::default();
        assert!(matches!(
            bdd.from_raster(0, 3, &[]),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            bdd.from_raster(2, 2, &[1, 2, 3]),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            bdd.from_raster(8193, 1, &vec![0; 8193]),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_crop() {
        let bdd = Bdd::default();
        let data: Vec<u8> = (1..=16).collect();
        let root = bdd.from_raster(4, 4, &data).unwrap();

        let window = bdd.crop(root, 1, 2, 2, 3).unwrap();
        assert_eq!(bdd.to_raster(window, 2, 3).data, vec![7, 8, 11, 12, 15, 16]);
        // Padding of the 4x4 covering square of the window.
        assert_eq!(bdd.evaluate(window, 0, 2), 0);
        assert_eq!(bdd.evaluate(window, 3, 0), 0);

        // The full window is the diagram itself.
        assert_eq!(bdd.crop(root, 0, 0, 4, 4).unwrap(), root);
        // Coordinates wrap around the covering square.
        let wrapped = bdd.crop(root, 3, 3, 2, 2).unwrap();
        assert_eq!(bdd.to_raster(wrapped, 2, 2).data, vec![16, 13, 4, 1]);

        assert!(matches!(
            bdd.crop(root, 0, 0, 0, 1),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_capacity_exceeded() {
        let bdd = Bdd::new(BddConfig::default().with_capacity(256 + 8).with_hash_size(64));
        let data: Vec<u8> = (0..=255).collect();
        let err = bdd.from_raster(16, 16, &data).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { .. }));
    }
}
