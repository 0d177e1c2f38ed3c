/// An error type for the volume module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VolumeError {
    /// Error when the data length does not match the volume shape.
    #[error("Data length ({0}) does not match the volume size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when a channel index is out of range.
    #[error("Channel index {0} is out of range for {1} channels")]
    ChannelOutOfRange(usize, usize),

    /// Error when a requested region does not lie inside the volume.
    #[error("Region [{lo:?}, {hi:?}) is not a valid region of a volume with shape {shape:?}")]
    InvalidRegion {
        /// inclusive lower corner of the requested region.
        lo: [usize; 3],
        /// exclusive upper corner of the requested region.
        hi: [usize; 3],
        /// spatial shape of the volume.
        shape: [usize; 3],
    },
}
