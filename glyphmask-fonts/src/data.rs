//! Font table directory and per-glyph data lookup.

use crate::error::FontError;
use crate::glyph::GlyphData;

/// Big-endian `u16` at `i`, or `None` if the slice is too short.
pub(crate) fn read_u16(b: &[u8], i: usize) -> Option<u16> {
    let bytes = b.get(i..i + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Big-endian `i16` at `i`, or `None` if the slice is too short.
pub(crate) fn read_i16(b: &[u8], i: usize) -> Option<i16> {
    read_u16(b, i).map(|v| v.cast_signed())
}

/// Big-endian `u32` at `i`, or `None` if the slice is too short.
pub(crate) fn read_u32(b: &[u8], i: usize) -> Option<u32> {
    let bytes = b.get(i..i + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Minimum length of a `head` table covering the fields read here
/// (`unitsPerEm` at 18, `indexToLocFormat` at 50).
const HEAD_MIN_LEN: usize = 52;
/// Minimum length of a `maxp` table covering `numGlyphs` at 4.
const MAXP_MIN_LEN: usize = 6;

/// A parsed font, borrowing the file bytes read-only.
///
/// Only the outline tables are retained; everything else in the file is
/// ignored. Lookups beyond the initial directory walk are `O(1)` slices
/// into the borrowed data.
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    glyf: &'a [u8],
    loca: &'a [u8],
    units_per_em: u16,
    long_loca: bool,
    num_glyphs: u16,
}

impl<'a> Font<'a> {
    /// Parse the table directory of a TrueType font.
    ///
    /// The directory is the standard 12-byte header followed by 16-byte
    /// entries; every declared table must lie entirely within the file,
    /// and `glyf`, `head`, `loca`, `maxp` must all be present with their
    /// fixed fields in range.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Invalid`] if any of that fails.
    pub fn parse(data: &'a [u8]) -> Result<Self, FontError> {
        let num_tables = usize::from(read_u16(data, 4).ok_or(FontError::Invalid)?);
        if data.len() < 12 + num_tables * 16 {
            return Err(FontError::Invalid);
        }

        let mut glyf = None;
        let mut head = None;
        let mut loca = None;
        let mut maxp = None;
        for i in 0..num_tables {
            let entry = &data[12 + 16 * i..12 + 16 * (i + 1)];
            let offset = read_u32(entry, 8).ok_or(FontError::Invalid)? as usize;
            let length = read_u32(entry, 12).ok_or(FontError::Invalid)? as usize;
            let table = data
                .get(offset..offset.checked_add(length).ok_or(FontError::Invalid)?)
                .ok_or(FontError::Invalid)?;
            match &entry[..4] {
                b"glyf" => glyf = Some(table),
                b"head" => head = Some(table),
                b"loca" => loca = Some(table),
                b"maxp" => maxp = Some(table),
                _ => {}
            }
        }

        let glyf = glyf.ok_or(FontError::Invalid)?;
        let head = head.ok_or(FontError::Invalid)?;
        let loca = loca.ok_or(FontError::Invalid)?;
        let maxp = maxp.ok_or(FontError::Invalid)?;
        if head.len() < HEAD_MIN_LEN || maxp.len() < MAXP_MIN_LEN {
            return Err(FontError::Invalid);
        }

        Ok(Self {
            glyf,
            loca,
            units_per_em: read_u16(head, 18).ok_or(FontError::Invalid)?,
            long_loca: read_u16(head, 50).ok_or(FontError::Invalid)? != 0,
            num_glyphs: read_u16(maxp, 4).ok_or(FontError::Invalid)?,
        })
    }

    /// Font design units per em.
    #[must_use]
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Number of glyphs declared by `maxp`.
    #[must_use]
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// The design-unit-to-pixel scale factor for a given ppem.
    #[must_use]
    pub fn scale(&self, ppem: f32) -> f32 {
        ppem / f32::from(self.units_per_em)
    }

    /// The `glyf` range of a glyph, from the short or long `loca` form.
    fn glyf_range(&self, glyph_id: u16) -> Option<(usize, usize)> {
        let i = usize::from(glyph_id);
        if self.long_loca {
            let lo = read_u32(self.loca, 4 * i)? as usize;
            let hi = read_u32(self.loca, 4 * i + 4)? as usize;
            Some((lo, hi))
        } else {
            let lo = usize::from(read_u16(self.loca, 2 * i)?) * 2;
            let hi = usize::from(read_u16(self.loca, 2 * i + 2)?) * 2;
            Some((lo, hi))
        }
    }

    /// Look up a glyph's outline data.
    ///
    /// Returns `None` — never an error — when the id is out of range or
    /// the `loca` entry is empty, inverted, shorter than a glyph header,
    /// or extends past `glyf`. Callers treat `None` as an empty glyph
    /// and produce a blank image of the declared size.
    #[must_use]
    pub fn glyph_data(&self, glyph_id: u16) -> Option<GlyphData<'a>> {
        if glyph_id >= self.num_glyphs {
            return None;
        }
        let (lo, hi) = self.glyf_range(glyph_id)?;
        if lo >= hi || hi - lo < 10 || hi > self.glyf.len() {
            return None;
        }
        Some(GlyphData::new(&self.glyf[lo..hi]))
    }
}
