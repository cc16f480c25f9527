//! `glyphmask` CLI — rasterize one TrueType glyph into a PNG alpha mask.

use std::env;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::process;

use glyphmask_fonts::Font;
use glyphmask_geom::{PathSink, Point, Transform};
use glyphmask_raster::{fixed, floating, packed, simd};

/// Which numeric formulation of the rasterizer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Float,
    Fixed,
    Packed,
}

struct Config {
    font_path: Option<String>,
    glyph_id: u16,
    ppem: f32,
    variant: Variant,
    dump: bool,
    output: String,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    let Some(font_path) = config.font_path.as_deref() else {
        eprintln!("No font file specified; see glyphmask --help");
        process::exit(1);
    };
    let bytes = match fs::read(font_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {font_path}: {e}");
            process::exit(1);
        }
    };
    let font = match Font::parse(&bytes) {
        Ok(font) => font,
        Err(e) => {
            eprintln!("Error parsing {font_path}: {e}");
            process::exit(1);
        }
    };

    let scale = font.scale(config.ppem);
    let Some(data) = font.glyph_data(config.glyph_id) else {
        eprintln!("Glyph {} has no outline data", config.glyph_id);
        process::exit(1);
    };
    let (width, height, transform) = data.size_and_transform(scale);

    if config.dump {
        let mut dumper = SegmentDumper::default();
        font.outline_glyph(config.glyph_id, &transform, &mut dumper);
        return;
    }

    if width == 0 || height == 0 {
        eprintln!("Glyph {} has an empty bounding box", config.glyph_id);
        process::exit(1);
    }

    let pix = rasterize(&font, config.glyph_id, &transform, width, height, config.variant);
    write_png(&config.output, width, height, &pix);
}

/// Run the selected rasterizer variant over the glyph and return the
/// accumulated alpha bytes.
fn rasterize(
    font: &Font<'_>,
    glyph_id: u16,
    transform: &Transform,
    width: usize,
    height: usize,
    variant: Variant,
) -> Vec<u8> {
    let mut pix = vec![0u8; width * height];
    match variant {
        Variant::Float => {
            let mut z = floating::Rasterizer::new(width, height);
            font.outline_glyph(glyph_id, transform, &mut z);
            simd::accumulate_floating(&mut pix, z.coverage());
        }
        Variant::Fixed => {
            let mut z = fixed::Rasterizer::new(width, height);
            font.outline_glyph(glyph_id, transform, &mut z);
            fixed::accumulate(&mut pix, z.coverage());
        }
        Variant::Packed => {
            let mut z = packed::Rasterizer::new(width, height);
            font.outline_glyph(glyph_id, transform, &mut z);
            simd::accumulate_packed(&mut pix, z.coverage());
        }
    }
    pix
}

fn write_png(output: &str, width: usize, height: usize, pix: &[u8]) {
    let file = match fs::File::create(Path::new(output)) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error creating {output}: {e}");
            process::exit(1);
        }
    };
    #[expect(
        clippy::cast_possible_truncation,
        reason = "glyph images are far smaller than 2^32 pixels per side"
    )]
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let result = encoder
        .write_header()
        .and_then(|mut writer| writer.write_image_data(pix));
    match result {
        Ok(()) => eprintln!("Wrote {output}"),
        Err(e) => {
            eprintln!("Error writing {output}: {e}");
            process::exit(1);
        }
    }
}

/// Sink for `--dump`: prints the transformed segment stream, one line
/// per segment, with a separator at each contour start.
#[derive(Default)]
struct SegmentDumper;

impl PathSink for SegmentDumper {
    fn move_to(&mut self, p: Point) {
        println!("---");
        println!("move\t({}, {})", p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        println!("line\t({}, {})", p.x, p.y);
    }

    fn quad_to(&mut self, p: Point, q: Point) {
        println!("quad\t({}, {})\t({}, {})", p.x, p.y, q.x, q.y);
    }
}

fn parse_args(args: &[String]) -> Config {
    let mut config = Config {
        font_path: None,
        glyph_id: 76,
        ppem: 42.0,
        variant: Variant::Float,
        dump: false,
        output: String::from("out.png"),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--font" => {
                i += 1;
                if i < args.len() {
                    config.font_path = Some(args[i].clone());
                }
            }
            "--glyphid" => {
                i += 1;
                config.glyph_id = parse_value(args.get(i), "--glyphid");
            }
            "--ppem" => {
                i += 1;
                config.ppem = parse_value(args.get(i), "--ppem");
            }
            "--variant" => {
                i += 1;
                config.variant = match args.get(i).map(String::as_str) {
                    Some("float") => Variant::Float,
                    Some("fixed") => Variant::Fixed,
                    Some("packed") => Variant::Packed,
                    other => {
                        eprintln!(
                            "--variant must be float, fixed or packed (got {})",
                            other.unwrap_or("nothing")
                        );
                        process::exit(1);
                    }
                };
            }
            "--dump" => {
                config.dump = true;
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    config.output.clone_from(&args[i]);
                }
            }
            "--help" | "-h" => {
                println!("glyphmask — rasterize a TrueType glyph to a PNG coverage mask");
                println!();
                println!("Usage:");
                println!("  glyphmask --font <path> [options]");
                println!();
                println!("Options:");
                println!("  --glyphid <int>      glyph to rasterize (default 76)");
                println!("  --ppem <number>      pixels per em (default 42)");
                println!("  --variant <name>     float, fixed or packed (default float)");
                println!("  --dump               print the segment stream instead of rasterizing");
                println!("  -o, --output <path>  output file (default out.png)");
                process::exit(0);
            }
            other => {
                // A bare path is accepted as the font file.
                config.font_path = Some(other.to_owned());
            }
        }
        i += 1;
    }
    config
}

/// Parse a flag's value, exiting with a usage error when it is missing
/// or malformed.
fn parse_value<T: std::str::FromStr>(arg: Option<&String>, flag: &str) -> T {
    match arg.map(|s| s.parse()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("{flag} needs a numeric value");
            process::exit(1);
        }
    }
}
