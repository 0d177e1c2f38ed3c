use crate::error::VolumeError;
use crate::volume::Volume;

/// Random access to a channel-first volume of shape `(C, D, H, W)`.
///
/// The warping engine only ever reads rectangular regions through this
/// trait, so implementations may be backed by storage far larger than
/// memory (chunked files, network stores). Reads may block; the engine is
/// safe to call from many worker threads at once, so callers typically run
/// several extractions in parallel to hide read latency.
///
/// Region values are returned in the engine's working precision (`f32`),
/// whatever the storage type is.
pub trait VolumeSource: Send + Sync {
    /// Number of channels.
    fn channels(&self) -> usize;

    /// Spatial shape `(D, H, W)`, without the channel axis.
    fn spatial_shape(&self) -> [usize; 3];

    /// Read the rectangular region `[lo, hi)` across all channels.
    ///
    /// `lo` is inclusive and `hi` exclusive, per spatial axis.
    ///
    /// # Errors
    ///
    /// If the region does not lie inside the volume.
    fn read_region(&self, lo: [usize; 3], hi: [usize; 3]) -> Result<Volume<f32>, VolumeError>;
}
