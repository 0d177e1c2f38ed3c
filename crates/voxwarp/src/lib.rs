#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use voxwarp_volume as volume;

#[doc(inline)]
pub use voxwarp_warp as warp;
