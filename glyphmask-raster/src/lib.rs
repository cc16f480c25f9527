//! Accumulator-based analytic area rasterizer.
//!
//! Outlines arrive as a stream of move/line/quadratic-Bézier segments in
//! pixel coordinates and are scan-converted into a per-pixel buffer of
//! *signed coverage deltas*: each edge deposits, for every pixel cell it
//! crosses, the exact change in that row's coverage as x crosses the cell.
//! Clockwise and counterclockwise traversals deposit opposite signs, so a
//! single left-to-right prefix sum per row — the accumulation pass —
//! yields signed coverage under the non-zero winding rule without any
//! active-edge list or edge sorting. The accumulator takes the absolute
//! value, saturates, and encodes each sample as a `[0x00, 0xff]` alpha
//! byte.
//!
//! Three numerically-matched formulations of the same algorithm are
//! provided:
//!
//! - [`floating`] — `f32` cells, the reference formulation;
//! - [`fixed`] — 22.10 fixed-point inputs with 12.20 cells, matching the
//!   floating results to within one byte;
//! - [`packed`] — 26.6 inputs with 20.12 cells, slightly coarser output
//!   in exchange for arithmetic that never leaves 32 bits.
//!
//! [`simd`] holds four-lane accumulators for the floating and packed
//! buffers; they produce output byte-identical to the scalar versions.
//!
//! A rasterizer owns its delta buffer and is reused across glyphs via
//! [`Rasterizer::reset`]; none of the drawing or accumulation paths
//! allocate. A single rasterizer is not meant for concurrent use —
//! rasterize in parallel by giving each thread its own instance.

pub mod fixed;
mod flatten;
pub mod floating;
pub mod packed;
pub mod simd;
#[cfg(test)]
pub(crate) mod testdata;

pub use floating::Rasterizer;
