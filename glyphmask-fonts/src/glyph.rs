//! Per-glyph outline data: bounding box, raster size, and the
//! simple-glyph segment iterator.

use glyphmask_geom::{Point, Segment, Transform};

use crate::composite::Components;
use crate::data::{read_i16, read_u16};

// Simple-glyph flag bits. 0x10 and 0x20 are overloaded: with the
// corresponding short-vector bit set they give the delta's sign,
// otherwise they mean "same as previous" (a zero delta).
const ON_CURVE: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT: u8 = 0x08;
const POSITIVE_X_SHORT: u8 = 0x10;
const THIS_X_IS_SAME: u8 = 0x10;
const POSITIVE_Y_SHORT: u8 = 0x20;
const THIS_Y_IS_SAME: u8 = 0x20;

/// Offset of the first contour-end index in a simple glyph, and of the
/// first component record in a compound glyph.
const HEADER_LEN: usize = 10;

/// The `glyf` entry of one glyph. Always at least [`HEADER_LEN`] bytes
/// (the lookup in [`Font::glyph_data`](crate::Font::glyph_data) rejects
/// shorter ranges).
#[derive(Debug, Clone, Copy)]
pub struct GlyphData<'a> {
    data: &'a [u8],
}

/// A glyph's outline, classified by its `numberOfContours` field.
pub enum Outline<'a> {
    /// No outline: zero contours, a negative contour count other than
    /// the compound marker −1, or malformed point data.
    Empty,
    /// A simple glyph: iterate its segments.
    Simple(Segments<'a>),
    /// A compound glyph: iterate its components and recurse.
    Compound(Components<'a>),
}

impl<'a> GlyphData<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        debug_assert!(data.len() >= HEADER_LEN);
        Self { data }
    }

    fn x_min(&self) -> i16 {
        read_i16(self.data, 2).unwrap_or(0)
    }

    fn y_min(&self) -> i16 {
        read_i16(self.data, 4).unwrap_or(0)
    }

    fn x_max(&self) -> i16 {
        read_i16(self.data, 6).unwrap_or(0)
    }

    fn y_max(&self) -> i16 {
        read_i16(self.data, 8).unwrap_or(0)
    }

    /// The pixel size of this glyph's bounding box at the given scale,
    /// and the transform that maps its design units into that image:
    /// scale to pixels, flip y (raster rows grow downward), shift the
    /// box's top-left corner to the origin.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "box edges are floored/ceiled to small integers first"
    )]
    #[must_use]
    pub fn size_and_transform(&self, scale: f32) -> (usize, usize, Transform) {
        let s = f64::from(scale);
        let min_x = (s * f64::from(self.x_min())).floor();
        let min_y = (-s * f64::from(self.y_max())).floor();
        let max_x = (s * f64::from(self.x_max())).ceil();
        let max_y = (-s * f64::from(self.y_min())).ceil();
        let width = (max_x - min_x).max(0.0) as usize;
        let height = (max_y - min_y).max(0.0) as usize;
        let transform = Transform::new(scale, 0.0, -min_x as f32, 0.0, -scale, -min_y as f32);
        (width, height, transform)
    }

    /// Classify the glyph and hand out the matching iterator.
    #[must_use]
    pub fn outline(&self) -> Outline<'a> {
        let n_contours = read_i16(self.data, 0).unwrap_or(0);
        if n_contours < 0 {
            // The format reserves negative values below −1; such glyphs
            // are treated as having no outline.
            if n_contours != -1 {
                return Outline::Empty;
            }
            return Outline::Compound(Components::new(self.data, HEADER_LEN));
        }
        if n_contours == 0 {
            return Outline::Empty;
        }
        #[expect(clippy::cast_sign_loss, reason = "checked positive above")]
        let n_contours = n_contours as u16;
        match Segments::new(self.data, n_contours) {
            Some(segments) => Outline::Simple(segments),
            None => Outline::Empty,
        }
    }
}

/// Iterator over a simple glyph's segments, in design units.
///
/// Emits a `Move` at each contour start, then `Line`/`Quad` segments —
/// synthesizing the implicit on-curve midpoint between consecutive
/// off-curve points — and always ends a contour back at its start
/// point, so downstream consumers never close anything.
pub struct Segments<'a> {
    data: &'a [u8],

    // Stream cursors. end_index walks the contour-end array; the flag,
    // x and y cursors run once across the whole glyph.
    end_index: usize,
    flag_index: usize,
    x_index: usize,
    y_index: usize,

    n_contours: u16,
    contour: u16,
    n_points: i32,
    point: i32,
    prev_end: i32,

    // Decoder state for the current explicit point.
    x: i16,
    y: i16,
    flag: u8,
    repeats: u8,

    // Segment state for the current contour.
    first_on_curve: Option<Point>,
    first_off_curve: Option<Point>,
    last_off_curve: Option<Point>,
    in_contour: bool,
    closing: bool,
}

impl<'a> Segments<'a> {
    /// Validate the glyph header and pre-scan the flag stream so the
    /// per-point decoder can never run off the end of the data. Returns
    /// `None` for malformed data.
    fn new(data: &'a [u8], n_contours: u16) -> Option<Self> {
        let mut index = HEADER_LEN + 2 * usize::from(n_contours);
        // The contour-end array is inclusive; the final entry is the
        // glyph's last point index.
        let n_points = 1 + i32::from(read_u16(data, index.checked_sub(2)?)?);

        // Skip the hinting instructions.
        let insn_len = usize::from(read_u16(data, index)?);
        index = index.checked_add(2 + insn_len)?;
        if index > data.len() {
            return None;
        }

        // Walk the flag stream once to find where the x and y delta
        // streams start and end.
        let flag_index = index;
        let mut x_len = 0usize;
        let mut y_len = 0usize;
        let mut i = 0i32;
        loop {
            if i > n_points {
                return None;
            }
            if i == n_points {
                break;
            }
            let flag = *data.get(index)?;
            index += 1;
            let mut repeat = 1i32;
            if flag & REPEAT != 0 {
                repeat += i32::from(*data.get(index)?);
                index += 1;
            }
            let x_size: usize = if flag & X_SHORT_VECTOR != 0 {
                1
            } else if flag & THIS_X_IS_SAME == 0 {
                2
            } else {
                0
            };
            let y_size: usize = if flag & Y_SHORT_VECTOR != 0 {
                1
            } else if flag & THIS_Y_IS_SAME == 0 {
                2
            } else {
                0
            };
            #[expect(clippy::cast_sign_loss, reason = "repeat is 1..=256")]
            {
                x_len += x_size * repeat as usize;
                y_len += y_size * repeat as usize;
            }
            i += repeat;
        }
        if index.checked_add(x_len)?.checked_add(y_len)? > data.len() {
            return None;
        }

        Some(Self {
            data,
            end_index: HEADER_LEN,
            flag_index,
            x_index: index,
            y_index: index + x_len,
            n_contours,
            contour: 0,
            n_points: 0,
            point: 0,
            prev_end: -1,
            x: 0,
            y: 0,
            flag: 0,
            repeats: 0,
            first_on_curve: None,
            first_off_curve: None,
            last_off_curve: None,
            in_contour: false,
            closing: false,
        })
    }

    /// Decode the next explicit point of the current contour. `None`
    /// when the contour's points are exhausted.
    fn next_point(&mut self) -> Option<(Point, bool)> {
        if self.point == self.n_points {
            return None;
        }
        self.point += 1;

        if self.repeats > 0 {
            self.repeats -= 1;
        } else {
            self.flag = *self.data.get(self.flag_index)?;
            self.flag_index += 1;
            if self.flag & REPEAT != 0 {
                self.repeats = *self.data.get(self.flag_index)?;
                self.flag_index += 1;
            }
        }

        if self.flag & X_SHORT_VECTOR != 0 {
            let dx = i16::from(*self.data.get(self.x_index)?);
            self.x = if self.flag & POSITIVE_X_SHORT != 0 {
                self.x.wrapping_add(dx)
            } else {
                self.x.wrapping_sub(dx)
            };
            self.x_index += 1;
        } else if self.flag & THIS_X_IS_SAME == 0 {
            self.x = self.x.wrapping_add(read_i16(self.data, self.x_index)?);
            self.x_index += 2;
        }

        if self.flag & Y_SHORT_VECTOR != 0 {
            let dy = i16::from(*self.data.get(self.y_index)?);
            self.y = if self.flag & POSITIVE_Y_SHORT != 0 {
                self.y.wrapping_add(dy)
            } else {
                self.y.wrapping_sub(dy)
            };
            self.y_index += 1;
        } else if self.flag & THIS_Y_IS_SAME == 0 {
            self.y = self.y.wrapping_add(read_i16(self.data, self.y_index)?);
            self.y_index += 2;
        }

        let p = Point::new(f32::from(self.x), f32::from(self.y));
        Some((p, self.flag & ON_CURVE != 0))
    }

    /// Emit the segments that close the current contour back to its
    /// start, one per call. Clears `in_contour` on the final one.
    fn close_contour(&mut self, first_on: Point) -> Segment {
        match (self.first_off_curve, self.last_off_curve) {
            (None, None) => {
                self.in_contour = false;
                Segment::line_to(first_on)
            }
            (None, Some(last)) => {
                self.in_contour = false;
                Segment::quad_to(last, first_on)
            }
            (Some(first), None) => {
                self.in_contour = false;
                Segment::quad_to(first, first_on)
            }
            (Some(first), Some(last)) => {
                self.last_off_curve = None;
                Segment::quad_to(last, last.mid(first))
            }
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            if !self.in_contour {
                if self.contour == self.n_contours {
                    return None;
                }
                self.contour += 1;
                let end = i32::from(read_u16(self.data, self.end_index)?);
                self.end_index += 2;
                self.n_points = end - self.prev_end;
                self.prev_end = end;
                self.point = 0;
                self.first_on_curve = None;
                self.first_off_curve = None;
                self.last_off_curve = None;
                self.closing = false;
                self.in_contour = true;
                if self.n_points <= 0 {
                    self.in_contour = false;
                    continue;
                }
            }

            if self.closing {
                let Some(first_on) = self.first_on_curve else {
                    // A contour with no on-curve point at all (explicit
                    // or implicit) has nothing to close.
                    self.in_contour = false;
                    continue;
                };
                return Some(self.close_contour(first_on));
            }

            let Some((p, on)) = self.next_point() else {
                self.closing = true;
                continue;
            };

            if self.first_on_curve.is_none() {
                // Still hunting for the contour's starting point.
                if on {
                    self.first_on_curve = Some(p);
                    return Some(Segment::move_to(p));
                }
                if let Some(first_off) = self.first_off_curve {
                    // Two leading off-curve points: the contour starts
                    // at their implicit midpoint.
                    let mid = first_off.mid(p);
                    self.first_on_curve = Some(mid);
                    self.last_off_curve = Some(p);
                    return Some(Segment::move_to(mid));
                }
                self.first_off_curve = Some(p);
                continue;
            }

            match self.last_off_curve {
                None => {
                    if on {
                        return Some(Segment::line_to(p));
                    }
                    self.last_off_curve = Some(p);
                }
                Some(last) => {
                    if on {
                        self.last_off_curve = None;
                        return Some(Segment::quad_to(last, p));
                    }
                    let mid = last.mid(p);
                    self.last_off_curve = Some(p);
                    return Some(Segment::quad_to(last, mid));
                }
            }
        }
    }
}
