#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the warping engine.
pub mod error;

/// cached destination coordinate grids.
pub mod grid;

/// resampling kernels.
pub mod interpolation;

/// homogeneous matrix builders.
pub mod matrix;

/// random transform samplers.
pub mod sampling;

/// forward/inverse transform pairs and lab-frame conversions.
pub mod transform;

/// warped patch extraction.
pub mod warp;
