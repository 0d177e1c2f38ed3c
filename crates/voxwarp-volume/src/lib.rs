#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the volume module.
pub mod error;

/// random-access volume source abstraction.
pub mod source;

/// dense channel-first volume container.
pub mod volume;

pub use error::VolumeError;
pub use source::VolumeSource;
pub use volume::Volume;
