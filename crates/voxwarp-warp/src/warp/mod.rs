//! Warped patch extraction.
//!
//! [`warp_slice`] is the core entry point: it cuts a geometrically
//! transformed patch out of a large volume by warping read coordinates
//! instead of the volume itself. [`get_tracing_slice`] and
//! [`get_warped_slice`] assemble the forward matrix for the two common
//! sampling schemes (directed continuation, fully random augmentation) and
//! delegate to it.

mod bbox;
mod extract;
mod slice;

pub use bbox::source_bbox;
pub use extract::{get_tracing_slice, get_warped_slice, TracingOpts, WarpParams};
pub use slice::{warp_slice, TargetSpec};
