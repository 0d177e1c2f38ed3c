use num_traits::AsPrimitive;

use crate::error::VolumeError;
use crate::source::VolumeSource;

/// A dense channel-first volumetric array with shape `(C, D, H, W)`.
///
/// The data is stored as a flat row-major buffer, so each channel is a
/// contiguous `(D, H, W)` block. Volumes are immutable once filled; the
/// warping engine builds new volumes instead of mutating existing ones.
///
/// # Examples
///
/// ```
/// use voxwarp_volume::Volume;
///
/// let vol = Volume::<f32>::from_shape_val(2, [4, 8, 8], 0.0);
///
/// assert_eq!(vol.channels(), 2);
/// assert_eq!(vol.spatial_shape(), [4, 8, 8]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T> {
    channels: usize,
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T> Volume<T> {
    /// Create a new volume from a flat data buffer.
    ///
    /// # Errors
    ///
    /// If the buffer length does not equal `channels * D * H * W`.
    pub fn new(channels: usize, shape: [usize; 3], data: Vec<T>) -> Result<Self, VolumeError> {
        let numel = channels * shape[0] * shape[1] * shape[2];
        if data.len() != numel {
            return Err(VolumeError::InvalidDataLength(data.len(), numel));
        }
        Ok(Self {
            channels,
            shape,
            data,
        })
    }

    /// Create a new volume filled with a constant value.
    pub fn from_shape_val(channels: usize, shape: [usize; 3], val: T) -> Self
    where
        T: Clone,
    {
        let numel = channels * shape[0] * shape[1] * shape[2];
        Self {
            channels,
            shape,
            data: vec![val; numel],
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Spatial shape `(D, H, W)`, without the channel axis.
    pub fn spatial_shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of voxels in one channel.
    pub fn spatial_numel(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    /// The flat data buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The flat data buffer, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// The contiguous `(D, H, W)` block of one channel.
    ///
    /// # Errors
    ///
    /// If `c` is not a valid channel index.
    pub fn channel_slice(&self, c: usize) -> Result<&[T], VolumeError> {
        if c >= self.channels {
            return Err(VolumeError::ChannelOutOfRange(c, self.channels));
        }
        let n = self.spatial_numel();
        Ok(&self.data[c * n..(c + 1) * n])
    }

    /// The contiguous `(D, H, W)` block of one channel, mutable.
    ///
    /// # Errors
    ///
    /// If `c` is not a valid channel index.
    pub fn channel_slice_mut(&mut self, c: usize) -> Result<&mut [T], VolumeError> {
        if c >= self.channels {
            return Err(VolumeError::ChannelOutOfRange(c, self.channels));
        }
        let n = self.spatial_numel();
        Ok(&mut self.data[c * n..(c + 1) * n])
    }

    /// Read a single voxel, or `None` if the index is out of range.
    pub fn get(&self, c: usize, idx: [usize; 3]) -> Option<&T> {
        if c >= self.channels
            || idx[0] >= self.shape[0]
            || idx[1] >= self.shape[1]
            || idx[2] >= self.shape[2]
        {
            return None;
        }
        let i = ((c * self.shape[0] + idx[0]) * self.shape[1] + idx[1]) * self.shape[2] + idx[2];
        self.data.get(i)
    }
}

impl<T> VolumeSource for Volume<T>
where
    T: AsPrimitive<f32> + Send + Sync,
{
    fn channels(&self) -> usize {
        self.channels
    }

    fn spatial_shape(&self) -> [usize; 3] {
        self.shape
    }

    fn read_region(&self, lo: [usize; 3], hi: [usize; 3]) -> Result<Volume<f32>, VolumeError> {
        for a in 0..3 {
            if lo[a] >= hi[a] || hi[a] > self.shape[a] {
                return Err(VolumeError::InvalidRegion {
                    lo,
                    hi,
                    shape: self.shape,
                });
            }
        }
        let rs = [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]];
        let mut data = Vec::with_capacity(self.channels * rs[0] * rs[1] * rs[2]);
        for c in 0..self.channels {
            for d in lo[0]..hi[0] {
                for h in lo[1]..hi[1] {
                    let base =
                        ((c * self.shape[0] + d) * self.shape[1] + h) * self.shape[2] + lo[2];
                    data.extend(self.data[base..base + rs[2]].iter().map(|v| v.as_()));
                }
            }
        }
        Volume::new(self.channels, rs, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_length() {
        let vol = Volume::new(1, [2, 2, 2], vec![0.0f32; 8]);
        assert!(vol.is_ok());

        let bad = Volume::new(2, [2, 2, 2], vec![0.0f32; 8]);
        assert_eq!(bad, Err(VolumeError::InvalidDataLength(8, 16)));
    }

    #[test]
    fn channel_slices_are_contiguous() -> Result<(), VolumeError> {
        let data: Vec<f32> = (0..16).map(|x| x as f32).collect();
        let vol = Volume::new(2, [2, 2, 2], data)?;

        assert_eq!(vol.channel_slice(0)?[0], 0.0);
        assert_eq!(vol.channel_slice(1)?[0], 8.0);
        assert!(vol.channel_slice(2).is_err());
        Ok(())
    }

    #[test]
    fn get_indexes_row_major() -> Result<(), VolumeError> {
        let data: Vec<f32> = (0..24).map(|x| x as f32).collect();
        let vol = Volume::new(1, [2, 3, 4], data)?;

        assert_eq!(vol.get(0, [0, 0, 0]), Some(&0.0));
        assert_eq!(vol.get(0, [1, 2, 3]), Some(&23.0));
        assert_eq!(vol.get(0, [2, 0, 0]), None);
        Ok(())
    }

    #[test]
    fn read_region_cuts_subvolume() -> Result<(), VolumeError> {
        let data: Vec<u8> = (0..27).collect();
        let vol = Volume::new(1, [3, 3, 3], data)?;

        let cut = vol.read_region([1, 1, 1], [3, 3, 3])?;
        assert_eq!(cut.spatial_shape(), [2, 2, 2]);
        // voxel (1,1,1) of the source is (0,0,0) of the cut
        assert_eq!(cut.get(0, [0, 0, 0]), Some(&13.0));
        assert_eq!(cut.get(0, [1, 1, 1]), Some(&26.0));
        Ok(())
    }

    #[test]
    fn read_region_rejects_out_of_range() -> Result<(), VolumeError> {
        let vol = Volume::new(1, [3, 3, 3], vec![0.0f32; 27])?;

        assert!(vol.read_region([0, 0, 0], [4, 3, 3]).is_err());
        assert!(vol.read_region([2, 0, 0], [2, 3, 3]).is_err());
        Ok(())
    }
}
