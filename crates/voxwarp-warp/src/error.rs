use voxwarp_volume::VolumeError;

/// An error type for the warping engine.
///
/// [`WarpError::OutOfBounds`] is an expected control-flow signal: a randomly
/// sampled transform needed source voxels outside the volume. Callers retry
/// with a different sample. Every other variant is an invalid configuration
/// and indicates a caller bug; retrying cannot fix it.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WarpError {
    /// The source bounding box of a patch exceeds the volume extents.
    #[error("Bounding box [{lo:?}, {hi:?}) is out of bounds for volume shape {shape:?}")]
    OutOfBounds {
        /// inclusive lower corner of the required region.
        lo: [i64; 3],
        /// exclusive upper corner of the required region.
        hi: [i64; 3],
        /// spatial shape of the volume.
        shape: [usize; 3],
    },

    /// Primary and target volumes or patch shapes are not evenly centered.
    #[error("Targets must be centered w.r.t. images, got extent difference {0:?}")]
    NotCentered([i64; 3]),

    /// The target patch must fit inside the primary patch.
    #[error("Target patch shape {0:?} exceeds the primary patch shape {1:?}")]
    TargetExceedsPatch([usize; 3], [usize; 3]),

    /// Patch shapes must have a non-zero extent along every axis.
    #[error("Patch shape {0:?} has a zero extent")]
    EmptyPatchShape([usize; 3]),

    /// An operation that assumes an affine transform got a projective one.
    #[error("This operation requires an affine transform, but the matrix is projective")]
    ProjectiveUnsupported,

    /// A tracing direction was not unit length.
    #[error("Tracing direction must be unit length, got norm {0}")]
    NonUnitDirection(f32),

    /// A direction vector was zero where a direction is required.
    #[error("Direction vector must be non-zero")]
    ZeroDirection,

    /// The transform carries no lab-frame position.
    #[error("Transform has no lab-frame position")]
    MissingPosition,

    /// No valid center position exists for the requested patch shapes.
    #[error("Empty valid-center range: lo {lo:?} must be below hi {hi:?}")]
    EmptyPositionRange {
        /// lower bound of the valid-center range, per axis.
        lo: [f32; 3],
        /// upper bound of the valid-center range, per axis.
        hi: [f32; 3],
    },

    /// A vector-field channel triple points outside the target channels.
    #[error("Vector field channels {0:?} are out of range for {1} channels")]
    BadVectorChannels([usize; 3], usize),

    /// A volume read failed.
    #[error(transparent)]
    Volume(#[from] VolumeError),
}

impl WarpError {
    /// Whether this is the recoverable out-of-bounds condition.
    ///
    /// Samplers catch this and retry with a different random center or
    /// transform; all other variants should propagate.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, WarpError::OutOfBounds { .. })
    }
}
