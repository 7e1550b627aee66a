//! `birp`: convert and transform images stored as Binary Decision Diagrams.
//!
//! Reads an image from stdin and writes the result to stdout:
//!
//! ```bash
//! birp -i pgm -o birp < photo.pgm > photo.birp
//! birp -r < photo.birp > rotated.birp
//! birp -o ascii < rotated.birp
//! ```

use std::io::{self, Read, Write};

use birp_rs::bdd::{Bdd, BddConfig};
use birp_rs::image::{self, BirpImage};
use birp_rs::raster::min_level;
use birp_rs::transform::{negate, threshold};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use color_eyre::eyre::eyre;
use log::{debug, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Format {
    Pgm,
    Birp,
    Ascii,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Image transformations on Binary Decision Diagrams")]
struct Cli {
    /// Input format
    #[arg(short = 'i', value_enum, default_value = "birp")]
    input: Format,

    /// Output format
    #[arg(short = 'o', value_enum, default_value = "birp")]
    output: Format,

    /// Photographic negative
    #[arg(short = 'n', group = "transform")]
    negate: bool,

    /// Rotate 90 degrees counter-clockwise
    #[arg(short = 'r', group = "transform")]
    rotate: bool,

    /// Black and white threshold
    #[arg(short = 't', value_name = "T", group = "transform")]
    threshold: Option<u8>,

    /// Zoom out by 2^F
    #[arg(
        short = 'z',
        value_name = "F",
        group = "transform",
        value_parser = clap::value_parser!(u8).range(0..=16)
    )]
    zoom_out: Option<u8>,

    /// Zoom in by 2^F
    #[arg(
        short = 'Z',
        value_name = "F",
        group = "transform",
        value_parser = clap::value_parser!(u8).range(0..=16)
    )]
    zoom_in: Option<u8>,

    /// Node table capacity, the 256 color terminals included
    #[arg(
        long,
        default_value_t = 1 << 20,
        value_parser = clap::value_parser!(u64).range(257..=1 << 31)
    )]
    max_nodes: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn has_transform(&self) -> bool {
        self.negate
            || self.rotate
            || self.threshold.is_some()
            || self.zoom_out.is_some()
            || self.zoom_in.is_some()
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    if cli.input == Format::Ascii {
        Cli::command()
            .error(ErrorKind::InvalidValue, "ascii is an output-only format")
            .exit();
    }
    if cli.input == Format::Pgm && cli.output == Format::Pgm {
        Cli::command()
            .error(ErrorKind::ArgumentConflict, "converting pgm to pgm is not supported")
            .exit();
    }
    if cli.has_transform() && !(cli.input == Format::Birp && cli.output == Format::Birp) {
        Cli::command()
            .error(ErrorKind::ArgumentConflict, "transformations require birp input and output")
            .exit();
    }

    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;
    info!("Read {} bytes of {:?} input", input.len(), cli.input);

    let max_nodes = cli.max_nodes as usize;
    let config = BddConfig::default().with_capacity(max_nodes);
    let hash_size = config.hash_size.max(2 * max_nodes + 1);
    let bdd = Bdd::new(config.with_hash_size(hash_size));
    debug!("bdd = {:?}", bdd);

    let output = run(&cli, &bdd, &input)?;
    info!(
        "Writing {} bytes of {:?} output, {} nodes in the table",
        output.len(),
        cli.output,
        bdd.num_nodes()
    );

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}

/// Convert (and possibly transform) `input`, producing the complete output.
fn run(cli: &Cli, bdd: &Bdd, input: &[u8]) -> color_eyre::Result<Vec<u8>> {
    let mut out = Vec::new();

    match cli.input {
        Format::Pgm => {
            let raster = image::read_pgm(input)?;
            match cli.output {
                Format::Birp => {
                    let root = bdd.from_image(&raster)?;
                    info!("Built diagram with {} nodes", bdd.size(root));
                    let image = BirpImage {
                        root,
                        width: raster.width,
                        height: raster.height,
                    };
                    image::write_birp(bdd, &image, &mut out)?;
                }
                Format::Ascii => image::write_ascii(&raster, &mut out)?,
                Format::Pgm => return Err(eyre!("converting pgm to pgm is not supported")),
            }
        }
        Format::Birp => {
            let image = image::read_birp(bdd, input)?;
            let size = bdd.size(image.root);
            info!("Read {}x{} diagram with {} nodes", image.width, image.height, size);
            match cli.output {
                Format::Birp => {
                    let image = transform(cli, bdd, image)?;
                    image::write_birp(bdd, &image, &mut out)?;
                }
                Format::Pgm => {
                    let raster = bdd.to_raster(image.root, image.width, image.height);
                    image::write_pgm(&raster, &mut out)?;
                }
                Format::Ascii => {
                    let raster = bdd.to_raster(image.root, image.width, image.height);
                    image::write_ascii(&raster, &mut out)?;
                }
            }
        }
        Format::Ascii => return Err(eyre!("ascii is an output-only format")),
    }

    Ok(out)
}

/// Apply the requested transformation, updating the image dimensions.
fn transform(cli: &Cli, bdd: &Bdd, image: BirpImage) -> color_eyre::Result<BirpImage> {
    let BirpImage { root, width, height } = image;

    let image = if cli.negate {
        BirpImage {
            root: bdd.map(root, negate)?,
            ..image
        }
    } else if let Some(t) = cli.threshold {
        BirpImage {
            root: bdd.map(root, threshold(t))?,
            ..image
        }
    } else if cli.rotate {
        // Source column c lands on row S-1-c of the rotated covering square,
        // so the image now starts S-width rows down.
        let level = bdd.level(root);
        let side = 1u32 << (min_level(width, height).max(level + level % 2) / 2);
        let rotated = bdd.rotate(root)?;
        let root = if side == width {
            rotated
        } else {
            bdd.crop(rotated, side - width, 0, height, width)?
        };
        BirpImage {
            root,
            width: height,
            height: width,
        }
    } else if let Some(f) = cli.zoom_in {
        let scale = 1u32 << f;
        let too_large = || eyre!("zoomed image of {}x{} by 2^{} is too large", width, height, f);
        BirpImage {
            root: bdd.zoom(root, f as i32)?,
            width: width.checked_mul(scale).ok_or_else(too_large)?,
            height: height.checked_mul(scale).ok_or_else(too_large)?,
        }
    } else if let Some(f) = cli.zoom_out {
        let scale = 1u32 << f;
        BirpImage {
            root: bdd.zoom(root, -(f as i32))?,
            width: width.div_ceil(scale),
            height: height.div_ceil(scale),
        }
    } else {
        image
    };

    debug!("transform: {:?} -> {:?}", (root, width, height), image);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use birp_rs::raster::Raster;
    use test_log::test;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("birp").chain(args.iter().copied())).unwrap()
    }

    fn pgm(raster: &Raster) -> Vec<u8> {
        let mut out = Vec::new();
        image::write_pgm(raster, &mut out).unwrap();
        out
    }

    fn to_birp(bdd: &Bdd, raster: &Raster) -> Vec<u8> {
        run(&cli(&["-i", "pgm", "-o", "birp"]), bdd, &pgm(raster)).unwrap()
    }

    #[test]
    fn test_transforms_are_exclusive() {
        assert!(Cli::try_parse_from(["birp", "-n", "-r"]).is_err());
        assert!(Cli::try_parse_from(["birp", "-t", "10", "-z", "1"]).is_err());
        assert!(Cli::try_parse_from(["birp", "-Z", "17"]).is_err());
        assert!(Cli::try_parse_from(["birp", "-i", "gif"]).is_err());
        assert!(cli(&["-Z", "16"]).has_transform());
        assert!(!cli(&["-i", "pgm", "-o", "ascii"]).has_transform());
    }

    #[test]
    fn test_pgm_to_birp_to_pgm() {
        let raster = Raster::new(3, 2, vec![0, 10, 20, 30, 40, 50]);
        let bdd = Bdd::default();
        let birp = to_birp(&bdd, &raster);
        assert!(birp.starts_with(b"B5 3 2 255\n"));

        let fresh = Bdd::default();
        let back = run(&cli(&["-i", "birp", "-o", "pgm"]), &fresh, &birp).unwrap();
        assert_eq!(back, pgm(&raster));
    }

    #[test]
    fn test_pgm_to_ascii() {
        let raster = Raster::new(2, 2, vec![0, 255, 100, 150]);
        let out = run(&cli(&["-i", "pgm", "-o", "ascii"]), &Bdd::default(), &pgm(&raster)).unwrap();
        assert_eq!(out, b" @\n.*\n");
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let bdd = Bdd::default();
        let birp = to_birp(&bdd, &Raster::new(4, 2, vec![0; 8]));
        let out = run(&cli(&["-r"]), &bdd, &birp).unwrap();
        assert!(out.starts_with(b"B5 2 4 255\n"));
    }

    #[test]
    fn test_node_capacity_is_validated() {
        assert!(Cli::try_parse_from(["birp", "--max-nodes", "100"]).is_err());
        assert!(Cli::try_parse_from(["birp", "--max-nodes", "256"]).is_err());
        assert!(Cli::try_parse_from(["birp", "--max-nodes", "4294967296"]).is_err());
        assert_eq!(cli(&["--max-nodes", "257"]).max_nodes, 257);
    }

    fn rotate_pgm(raster: &Raster) -> Vec<u8> {
        let bdd = Bdd::default();
        let birp = to_birp(&bdd, raster);
        let rotated = run(&cli(&["-r"]), &bdd, &birp).unwrap();
        run(&cli(&["-o", "pgm"]), &bdd, &rotated).unwrap()
    }

    #[test]
    fn test_rotate_odd_square() {
        let raster = Raster::new(3, 3, (1..=9).collect());
        let expected = Raster::new(3, 3, vec![3, 6, 9, 2, 5, 8, 1, 4, 7]);
        assert_eq!(rotate_pgm(&raster), pgm(&expected));
    }

    #[test]
    fn test_rotate_non_square() {
        // 1 2 3 4      4 8
        // 5 6 7 8  ->  3 7
        //              2 6
        //              1 5
        let wide = Raster::new(4, 2, (1..=8).collect());
        let expected = Raster::new(2, 4, vec![4, 8, 3, 7, 2, 6, 1, 5]);
        assert_eq!(rotate_pgm(&wide), pgm(&expected));

        // 1 2
        // 3 4      2 4 6 8
        // 5 6  ->  1 3 5 7
        // 7 8
        let tall = Raster::new(2, 4, (1..=8).collect());
        let expected = Raster::new(4, 2, vec![2, 4, 6, 8, 1, 3, 5, 7]);
        assert_eq!(rotate_pgm(&tall), pgm(&expected));
    }

    #[test]
    fn test_zoom_dimensions() {
        let bdd = Bdd::default();
        let birp = to_birp(&bdd, &Raster::new(3, 2, vec![255; 6]));
        let out = run(&cli(&["-Z", "2"]), &bdd, &birp).unwrap();
        assert!(out.starts_with(b"B5 12 8 255\n"));
        let out = run(&cli(&["-z", "1"]), &bdd, &birp).unwrap();
        assert!(out.starts_with(b"B5 2 1 255\n"));
    }

    #[test]
    fn test_negate_then_pgm() {
        let raster = Raster::new(2, 2, vec![0, 255, 255, 0]);
        let bdd = Bdd::default();
        let birp = to_birp(&bdd, &raster);
        let neg = run(&cli(&["-n"]), &bdd, &birp).unwrap();
        let back = run(&cli(&["-o", "pgm"]), &bdd, &neg).unwrap();
        assert_eq!(back, pgm(&Raster::new(2, 2, vec![255, 0, 0, 255])));
    }

    #[test]
    fn test_bad_input_is_an_error() {
        let bdd = Bdd::default();
        assert!(run(&cli(&[]), &bdd, b"B5 2 2 255\nQ").is_err());
        assert!(run(&cli(&["-i", "pgm", "-o", "birp"]), &bdd, b"P5 2 2 255\n\0").is_err());
    }
}
