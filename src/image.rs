//! Image containers: binary PGM, BIRP and an ASCII preview.
//!
//! PGM (`P5`) and BIRP (`B5`) share the same netpbm-style header:
//!
//! ```text
//! <magic> <width> <height> <max>
//! ```
//!
//! where fields are separated by whitespace and `#` comments running to the
//! end of the line, and exactly one whitespace byte separates the header
//! from the payload. A PGM payload is the raw row-major raster, a BIRP
//! payload is a [codec](crate::codec) stream.

use std::io::Write;

use log::debug;

use crate::bdd::Bdd;
use crate::error::{Error, Result};
use crate::raster::{Raster, MAX_SIDE};
use crate::reference::NodeId;

pub const PGM_MAGIC: &[u8; 2] = b"P5";
pub const BIRP_MAGIC: &[u8; 2] = b"B5";

/// A diagram together with the dimensions of the image it represents.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BirpImage {
    pub root: NodeId,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Header {
    width: u32,
    height: u32,
    /// Offset of the first payload byte.
    payload: usize,
}

struct HeaderParser<'a> {
    format: &'static str,
    bytes: &'a [u8],
    pos: usize,
}

impl HeaderParser<'_> {
    fn error(&self, reason: impl Into<String>) -> Error {
        Error::InvalidImage {
            format: self.format,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'#') {
                return;
            }
            while self.peek().is_some_and(|b| b != b'\n') {
                self.pos += 1;
            }
        }
    }

    fn magic(&mut self, magic: &[u8; 2]) -> Result<()> {
        self.skip_whitespace();
        match self.bytes.get(self.pos..self.pos + 2) {
            Some(m) if m == magic => {
                self.pos += 2;
                Ok(())
            }
            _ => Err(self.error("bad magic number")),
        }
    }

    fn number(&mut self, name: &str) -> Result<u32> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(format!("missing {}", name)));
        }
        // Only ASCII digits were consumed.
        let digits = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default();
        digits
            .parse()
            .map_err(|_| self.error(format!("{} is out of range", name)))
    }

    fn parse(mut self, magic: &[u8; 2]) -> Result<Header> {
        self.magic(magic)?;
        let width = self.number("width")?;
        let height = self.number("height")?;
        let max = self.number("maximum value")?;
        if max > 255 {
            return Err(self.error(format!("maximum value {} exceeds 255", max)));
        }
        match self.peek() {
            Some(b) if b.is_ascii_whitespace() => self.pos += 1,
            _ => return Err(self.error("bad header")),
        }
        Ok(Header {
            width,
            height,
            payload: self.pos,
        })
    }
}

fn parse_header(format: &'static str, magic: &[u8; 2], bytes: &[u8]) -> Result<Header> {
    let header = HeaderParser { format, bytes, pos: 0 }.parse(magic)?;
    debug!("{} header: {:?}", format, header);
    Ok(header)
}

/// Decode a binary (`P5`) PGM image.
pub fn read_pgm(bytes: &[u8]) -> Result<Raster> {
    let header = parse_header("PGM", PGM_MAGIC, bytes)?;
    let len = header.width as usize * header.height as usize;
    let data = bytes
        .get(header.payload..header.payload + len)
        .ok_or_else(|| Error::InvalidImage {
            format: "PGM",
            reason: format!("expected {} bytes of pixel data", len),
        })?;
    Ok(Raster::new(header.width, header.height, data.to_vec()))
}

/// Encode a raster as a binary PGM image.
pub fn write_pgm<W: Write>(raster: &Raster, writer: &mut W) -> Result<()> {
    writeln!(writer, "P5 {} {} 255", raster.width, raster.height)?;
    writer.write_all(&raster.data)?;
    Ok(())
}

/// Decode a BIRP image into `bdd`.
pub fn read_birp(bdd: &Bdd, bytes: &[u8]) -> Result<BirpImage> {
    let header = parse_header("BIRP", BIRP_MAGIC, bytes)?;
    if !(1..=MAX_SIDE).contains(&header.width) || !(1..=MAX_SIDE).contains(&header.height) {
        return Err(Error::InvalidImage {
            format: "BIRP",
            reason: format!("dimensions {}x{} out of range", header.width, header.height),
        });
    }
    let root = bdd.deserialize(&bytes[header.payload..])?;
    Ok(BirpImage {
        root,
        width: header.width,
        height: header.height,
    })
}

/// Encode a diagram as a BIRP image.
pub fn write_birp<W: Write>(bdd: &Bdd, image: &BirpImage, writer: &mut W) -> Result<()> {
    writeln!(writer, "B5 {} {} 255", image.width, image.height)?;
    bdd.serialize_into(image.root, writer)
}

/// Render a raster as ASCII art, one character per pixel.
pub fn write_ascii<W: Write>(raster: &Raster, writer: &mut W) -> Result<()> {
    let mut out = Vec::with_capacity((raster.width as usize + 1) * raster.height as usize);
    for row in raster.data.chunks(raster.width.max(1) as usize) {
        out.extend(row.iter().map(|&p| ascii_shade(p)));
        out.push(b'\n');
    }
    writer.write_all(&out)?;
    Ok(())
}

fn ascii_shade(pixel: u8) -> u8 {
    match pixel {
        0..=63 => b' ',
        64..=127 => b'.',
        128..=191 => b'*',
        _ => b'@',
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_read_pgm() {
        let mut bytes = b"P5\n# created by hand\n3 2\n255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let raster = read_pgm(&bytes).unwrap();
        assert_eq!(raster, Raster::new(3, 2, vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_header_comments_and_whitespace() {
        let mut bytes = b"  \nP5 #c1\n # c2\n 2\t#w\n1 # max follows\n15 ".to_vec();
        bytes.extend_from_slice(&[9, 10]);
        let raster = read_pgm(&bytes).unwrap();
        assert_eq!(raster.data, vec![9, 10]);
    }

    #[test]
    fn test_payload_starts_after_one_whitespace_byte() {
        // The payload itself begins with a byte that looks like whitespace.
        let mut bytes = b"P5 2 1 255\n".to_vec();
        bytes.extend_from_slice(&[b'\n', b' ']);
        let raster = read_pgm(&bytes).unwrap();
        assert_eq!(raster.data, vec![b'\n', b' ']);
    }

    #[test]
    fn test_pgm_errors() {
        fn err(bytes: &[u8]) -> String {
            match read_pgm(bytes) {
                Err(Error::InvalidImage { reason, .. }) => reason,
                other => panic!("unexpected result: {:?}", other),
            }
        }
        assert_eq!(err(b"P6 1 1 255\n\0"), "bad magic number");
        assert_eq!(err(b""), "bad magic number");
        assert_eq!(err(b"P5 1 255\n"), "missing maximum value");
        assert_eq!(err(b"P5 x 1 255\n\0"), "missing width");
        assert_eq!(err(b"P5 1 1 256\n\0"), "maximum value 256 exceeds 255");
        assert_eq!(err(b"P5 1 1 255"), "bad header");
        assert_eq!(err(b"P5 99999999999 1 255\n"), "width is out of range");
        assert_eq!(err(b"P5 2 2 255\n\0\0\0"), "expected 4 bytes of pixel data");
    }

    #[test]
    fn test_write_pgm() {
        let mut out = Vec::new();
        write_pgm(&Raster::new(2, 1, vec![7, 8]), &mut out).unwrap();
        assert_eq!(out, b"P5 2 1 255\n\x07\x08");
        assert_eq!(read_pgm(&out).unwrap().data, vec![7, 8]);
    }

    #[test]
    fn test_birp_round_trip() {
        let bdd = Bdd::default();
        let data: Vec<u8> = (0..12).map(|i| i * 20).collect();
        let root = bdd.from_raster(4, 3, &data).unwrap();
        let image = BirpImage {
            root,
            width: 4,
            height: 3,
        };

        let mut out = Vec::new();
        write_birp(&bdd, &image, &mut out).unwrap();
        assert!(out.starts_with(b"B5 4 3 255\n"));

        let fresh = Bdd::default();
        let copy = read_birp(&fresh, &out).unwrap();
        assert_eq!((copy.width, copy.height), (4, 3));
        assert_eq!(fresh.to_raster(copy.root, 4, 3).data, data);
    }

    #[test]
    fn test_birp_errors() {
        let bdd = Bdd::default();
        assert!(matches!(
            read_birp(&bdd, b"P5 1 1 255\n@\x00"),
            Err(Error::InvalidImage { format: "BIRP", .. })
        ));
        assert!(matches!(
            read_birp(&bdd, b"B5 1 1 255\n"),
            Err(Error::MalformedStream { .. })
        ));
        assert!(matches!(
            read_birp(&bdd, b"B5 0 1 255\n@\x00"),
            Err(Error::InvalidImage { .. })
        ));
        assert!(matches!(
            read_birp(&bdd, b"B5 8193 1 255\n@\x00"),
            Err(Error::InvalidImage { .. })
        ));
    }

    #[test]
    fn test_write_ascii() {
        let raster = Raster::new(4, 2, vec![0, 64, 128, 192, 63, 127, 191, 255]);
        let mut out = Vec::new();
        write_ascii(&raster, &mut out).unwrap();
        assert_eq!(out, b" .*@\n .*@\n");
    }
}
