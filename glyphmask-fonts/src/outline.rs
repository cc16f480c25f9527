//! The outline walker: glyph data → transformed segment stream.

use glyphmask_geom::{PathSink, SegmentOp, Transform};

use crate::data::Font;
use crate::glyph::{GlyphData, Outline};

/// Compound glyphs may nest, and a malformed font can make the
/// component graph cyclic; recursion stops here instead of overflowing
/// the stack.
const MAX_COMPONENT_DEPTH: u32 = 8;

impl Font<'_> {
    /// Walk a glyph's outline, applying `transform` to every point and
    /// feeding the resulting segments to `sink`.
    ///
    /// Compound glyphs recurse with the component transform composed
    /// under `transform`. A missing or malformed glyph walks as empty:
    /// the sink simply receives nothing.
    pub fn outline_glyph(&self, glyph_id: u16, transform: &Transform, sink: &mut dyn PathSink) {
        self.outline_data(self.glyph_data(glyph_id), transform, sink, 0);
    }

    pub(crate) fn outline_data(
        &self,
        data: Option<GlyphData<'_>>,
        transform: &Transform,
        sink: &mut dyn PathSink,
        depth: u32,
    ) {
        let Some(data) = data else { return };
        match data.outline() {
            Outline::Empty => {}
            Outline::Simple(segments) => {
                for seg in segments {
                    match seg.op {
                        SegmentOp::Move => sink.move_to(transform.apply(seg.p)),
                        SegmentOp::Line => sink.line_to(transform.apply(seg.p)),
                        SegmentOp::Quad => {
                            sink.quad_to(transform.apply(seg.p), transform.apply(seg.q));
                        }
                    }
                }
            }
            Outline::Compound(components) => {
                if depth >= MAX_COMPONENT_DEPTH {
                    return;
                }
                for c in components {
                    self.outline_data(
                        self.glyph_data(c.glyph_id),
                        &c.transform.then(transform),
                        sink,
                        depth + 1,
                    );
                }
            }
        }
    }
}
