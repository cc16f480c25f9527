//! Parser and outline-walker tests over synthetic in-memory fonts.

#![expect(clippy::expect_used, reason = "tests may panic")]

use glyphmask_fonts::{Font, FontError, Outline};
use glyphmask_geom::{PathSink, Point, Transform};

// ---------------------------------------------------------------------------
// Synthetic font construction
// ---------------------------------------------------------------------------

fn push_u16(b: &mut Vec<u8>, v: u16) {
    b.extend_from_slice(&v.to_be_bytes());
}

fn push_i16(b: &mut Vec<u8>, v: i16) {
    b.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(b: &mut Vec<u8>, v: u32) {
    b.extend_from_slice(&v.to_be_bytes());
}

/// Encode a simple glyph. Contours are lists of (x, y, on_curve) points
/// in absolute design units; deltas are always written as full words.
fn simple_glyph(contours: &[&[(i16, i16, bool)]], bbox: (i16, i16, i16, i16)) -> Vec<u8> {
    let mut b = Vec::new();
    push_i16(&mut b, i16::try_from(contours.len()).expect("contour count"));
    push_i16(&mut b, bbox.0);
    push_i16(&mut b, bbox.1);
    push_i16(&mut b, bbox.2);
    push_i16(&mut b, bbox.3);
    let mut end = -1i32;
    for contour in contours {
        end += i32::try_from(contour.len()).expect("point count");
        push_u16(&mut b, u16::try_from(end).expect("end index"));
    }
    push_u16(&mut b, 0); // no hinting instructions

    let points: Vec<&(i16, i16, bool)> = contours.iter().flat_map(|c| c.iter()).collect();
    for &&(_, _, on) in &points {
        b.push(u8::from(on)); // on-curve bit only: both deltas are words
    }
    let (mut px, mut py) = (0i16, 0i16);
    for &&(x, _, _) in &points {
        push_i16(&mut b, x.wrapping_sub(px));
        px = x;
    }
    for &&(_, y, _) in &points {
        push_i16(&mut b, y.wrapping_sub(py));
        py = y;
    }
    b
}

/// Encode a compound glyph with word xy offsets and no scale.
fn compound_glyph(components: &[(u16, i16, i16)], bbox: (i16, i16, i16, i16)) -> Vec<u8> {
    let mut b = Vec::new();
    push_i16(&mut b, -1);
    push_i16(&mut b, bbox.0);
    push_i16(&mut b, bbox.1);
    push_i16(&mut b, bbox.2);
    push_i16(&mut b, bbox.3);
    for (i, &(glyph_id, dx, dy)) in components.iter().enumerate() {
        let mut flags = 0x0001 | 0x0002; // words, xy values
        if i + 1 < components.len() {
            flags |= 0x0020; // more components
        }
        push_u16(&mut b, flags);
        push_u16(&mut b, glyph_id);
        push_i16(&mut b, dx);
        push_i16(&mut b, dy);
    }
    b
}

/// Assemble a font with the standard table directory and a short-form
/// `loca`. Glyph entries are padded to even lengths so the halved
/// offsets are exact.
fn build_font(glyphs: &[Vec<u8>], units_per_em: u16) -> Vec<u8> {
    let mut glyf = Vec::new();
    let mut offsets = vec![0u16];
    for g in glyphs {
        glyf.extend_from_slice(g);
        if glyf.len() % 2 != 0 {
            glyf.push(0);
        }
        offsets.push(u16::try_from(glyf.len() / 2).expect("glyf offset"));
    }
    let mut loca = Vec::new();
    for &o in &offsets {
        push_u16(&mut loca, o);
    }

    let mut head = vec![0u8; 52];
    head[18..20].copy_from_slice(&units_per_em.to_be_bytes());
    // indexToLocFormat at 50 stays 0: short loca.

    let mut maxp = vec![0u8; 6];
    maxp[4..6].copy_from_slice(&u16::try_from(glyphs.len()).expect("glyph count").to_be_bytes());

    let tables: [(&[u8; 4], &[u8]); 4] = [
        (b"glyf", &glyf),
        (b"head", &head),
        (b"loca", &loca),
        (b"maxp", &maxp),
    ];
    let mut font = Vec::new();
    push_u32(&mut font, 0x0001_0000);
    push_u16(&mut font, 4);
    // searchRange, entrySelector, rangeShift: unused by the parser.
    push_u16(&mut font, 0);
    push_u16(&mut font, 0);
    push_u16(&mut font, 0);
    let mut offset = u32::try_from(12 + 16 * tables.len()).expect("directory size");
    for (tag, data) in tables {
        font.extend_from_slice(tag);
        push_u32(&mut font, 0); // checksum: unused by the parser
        push_u32(&mut font, offset);
        let len = u32::try_from(data.len()).expect("table length");
        push_u32(&mut font, len);
        offset += len;
    }
    for (_, data) in tables {
        font.extend_from_slice(data);
    }
    font
}

fn triangle() -> Vec<u8> {
    simple_glyph(
        &[&[(0, 0, true), (500, 0, true), (250, 600, true)]],
        (0, 0, 500, 600),
    )
}

// ---------------------------------------------------------------------------
// A sink that records what it is fed
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Op {
    Move(Point),
    Line(Point),
    Quad(Point, Point),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl PathSink for Recorder {
    fn move_to(&mut self, p: Point) {
        self.ops.push(Op::Move(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(Op::Line(p));
    }

    fn quad_to(&mut self, p: Point, q: Point) {
        self.ops.push(Op::Quad(p, q));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn parses_directory_and_fixed_fields() {
    let bytes = build_font(&[triangle()], 1000);
    let font = Font::parse(&bytes).expect("parse");
    assert_eq!(font.units_per_em(), 1000);
    assert_eq!(font.num_glyphs(), 1);
    assert!((font.scale(100.0) - 0.1).abs() < 1e-6);
}

#[test]
fn rejects_truncated_and_inconsistent_fonts() {
    assert_eq!(Font::parse(&[]).err(), Some(FontError::Invalid));
    assert_eq!(Font::parse(&[0; 11]).err(), Some(FontError::Invalid));

    // Directory declares more tables than fit in the file.
    let mut bytes = build_font(&[triangle()], 1000);
    bytes[4..6].copy_from_slice(&100u16.to_be_bytes());
    assert_eq!(Font::parse(&bytes).err(), Some(FontError::Invalid));

    // A table that extends past the end of the file.
    let mut bytes = build_font(&[triangle()], 1000);
    let huge = u32::MAX.to_be_bytes();
    bytes[12 + 12..12 + 16].copy_from_slice(&huge);
    assert_eq!(Font::parse(&bytes).err(), Some(FontError::Invalid));
}

#[test]
fn triangle_walks_as_closed_contour() {
    let bytes = build_font(&[triangle()], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(0, &Transform::IDENTITY, &mut rec);
    assert_eq!(
        rec.ops,
        vec![
            Op::Move(Point::new(0.0, 0.0)),
            Op::Line(Point::new(500.0, 0.0)),
            Op::Line(Point::new(250.0, 600.0)),
            Op::Line(Point::new(0.0, 0.0)),
        ]
    );
}

#[test]
fn off_curve_points_become_quads() {
    let glyph = simple_glyph(
        &[&[(100, 0, true), (300, 400, false), (500, 0, true)]],
        (100, 0, 500, 400),
    );
    let bytes = build_font(&[glyph], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(0, &Transform::IDENTITY, &mut rec);
    assert_eq!(
        rec.ops,
        vec![
            Op::Move(Point::new(100.0, 0.0)),
            Op::Quad(Point::new(300.0, 400.0), Point::new(500.0, 0.0)),
            Op::Line(Point::new(100.0, 0.0)),
        ]
    );
}

#[test]
fn contour_starting_off_curve_closes_with_a_quad() {
    let glyph = simple_glyph(
        &[&[(100, 0, false), (300, 0, true), (200, 200, true)]],
        (100, 0, 300, 200),
    );
    let bytes = build_font(&[glyph], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(0, &Transform::IDENTITY, &mut rec);
    assert_eq!(
        rec.ops,
        vec![
            Op::Move(Point::new(300.0, 0.0)),
            Op::Line(Point::new(200.0, 200.0)),
            Op::Quad(Point::new(100.0, 0.0), Point::new(300.0, 0.0)),
        ]
    );
}

#[test]
fn consecutive_off_curve_points_insert_midpoints() {
    let glyph = simple_glyph(
        &[&[
            (0, 0, true),
            (100, 200, false),
            (300, 200, false),
            (400, 0, true),
        ]],
        (0, 0, 400, 200),
    );
    let bytes = build_font(&[glyph], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(0, &Transform::IDENTITY, &mut rec);
    assert_eq!(
        rec.ops,
        vec![
            Op::Move(Point::new(0.0, 0.0)),
            Op::Quad(Point::new(100.0, 200.0), Point::new(200.0, 200.0)),
            Op::Quad(Point::new(300.0, 200.0), Point::new(400.0, 0.0)),
            Op::Line(Point::new(0.0, 0.0)),
        ]
    );
}

#[test]
fn compound_glyph_composes_offsets() {
    let glyphs = vec![
        triangle(),
        compound_glyph(&[(0, 100, 100)], (100, 100, 600, 700)),
    ];
    let bytes = build_font(&glyphs, 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(1, &Transform::IDENTITY, &mut rec);
    assert_eq!(
        rec.ops,
        vec![
            Op::Move(Point::new(100.0, 100.0)),
            Op::Line(Point::new(600.0, 100.0)),
            Op::Line(Point::new(350.0, 700.0)),
            Op::Line(Point::new(100.0, 100.0)),
        ]
    );
}

#[test]
fn self_referential_compound_terminates() {
    // A compound glyph whose only component is itself: the walker must
    // stop at its depth cap instead of recursing forever.
    let glyphs = vec![compound_glyph(&[(0, 10, 10)], (0, 0, 100, 100))];
    let bytes = build_font(&glyphs, 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut rec = Recorder::default();
    font.outline_glyph(0, &Transform::IDENTITY, &mut rec);
    assert_eq!(rec.ops, vec![]);
}

#[test]
fn missing_and_malformed_glyphs_walk_as_empty() {
    let bytes = build_font(&[triangle()], 1000);
    let font = Font::parse(&bytes).expect("parse");

    // Out-of-range glyph id.
    assert!(font.glyph_data(7).is_none());
    let mut rec = Recorder::default();
    font.outline_glyph(7, &Transform::IDENTITY, &mut rec);
    assert_eq!(rec.ops, vec![]);

    // An inverted loca range: lo > hi.
    let mut bytes = build_font(&[triangle()], 1000);
    let loca_offset = bytes.len() - 6 - 4; // maxp(6) + loca(4) at the tail
    bytes[loca_offset..loca_offset + 2].copy_from_slice(&0x7fffu16.to_be_bytes());
    let font = Font::parse(&bytes).expect("parse");
    assert!(font.glyph_data(0).is_none());
}

#[test]
fn missing_glyph_rasterizes_to_a_blank_image() {
    let bytes = build_font(&[triangle()], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let mut z = glyphmask_raster::Rasterizer::new(8, 8);
    font.outline_glyph(7, &Transform::IDENTITY, &mut z);
    let mut dst = [0xaau8; 64];
    glyphmask_raster::floating::accumulate(&mut dst, z.coverage());
    assert!(dst.iter().all(|&b| b == 0), "expected a blank image");
}

#[test]
fn negative_contour_counts_other_than_minus_one_are_empty() {
    let mut glyph = triangle();
    glyph[0..2].copy_from_slice(&(-2i16).to_be_bytes());
    let bytes = build_font(&[glyph], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let data = font.glyph_data(0).expect("glyph data");
    assert!(matches!(data.outline(), Outline::Empty));
}

#[test]
fn size_and_transform_flip_y_to_the_top_left() {
    let bytes = build_font(&[triangle()], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let data = font.glyph_data(0).expect("glyph data");
    let (w, h, transform) = data.size_and_transform(font.scale(100.0));
    assert_eq!((w, h), (50, 60));
    // The glyph's top (design y = 600) maps to image y = 0; its
    // baseline (y = 0) maps to the bottom.
    let top = transform.apply(Point::new(250.0, 600.0));
    assert!((top.x - 25.0).abs() < 1e-4);
    assert!(top.y.abs() < 1e-4);
    let origin = transform.apply(Point::new(0.0, 0.0));
    assert!(origin.x.abs() < 1e-4);
    assert!((origin.y - 60.0).abs() < 1e-4);
}

#[test]
fn truncated_point_data_walks_as_empty() {
    // Chop the glyph's delta streams short: the pre-scan must reject it.
    let mut glyph = triangle();
    glyph.truncate(glyph.len() - 3);
    let bytes = build_font(&[glyph], 1000);
    let font = Font::parse(&bytes).expect("parse");
    let data = font.glyph_data(0).expect("glyph data");
    assert!(matches!(data.outline(), Outline::Empty));
}
