//! Homogeneous coordinate grids over destination patches.
//!
//! The dense grid for a patch shape is pure in the shape, so it is memoized
//! process-wide. Training pipelines use a handful of distinct patch shapes,
//! which keeps the cache tiny while saving the regeneration on every
//! extraction call. Populating an entry twice is harmless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

type GridCache = Mutex<HashMap<[usize; 3], Arc<[[f32; 4]]>>>;

static DEST_COORDS: OnceLock<GridCache> = OnceLock::new();

/// Dense homogeneous coordinates `(i0, i1, i2, 1)` for every voxel of a
/// destination patch with the given shape, in row-major voxel order.
pub fn dest_coords(shape: [usize; 3]) -> Arc<[[f32; 4]]> {
    let cache = DEST_COORDS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = cache.lock().unwrap_or_else(|e| e.into_inner());
    map.entry(shape)
        .or_insert_with(|| make_dest_coords(shape))
        .clone()
}

fn make_dest_coords(shape: [usize; 3]) -> Arc<[[f32; 4]]> {
    let mut coords = Vec::with_capacity(shape[0] * shape[1] * shape[2]);
    for d in 0..shape[0] {
        for h in 0..shape[1] {
            for w in 0..shape[2] {
                coords.push([d as f32, h as f32, w as f32, 1.0]);
            }
        }
    }
    coords.into()
}

/// The 8 homogeneous corner coordinates `{0, shape_i - 1}` of a destination
/// patch.
///
/// Affine and projective maps preserve convex hulls, so mapping these
/// corners suffices to bound the whole patch in source space.
pub fn dest_corners(shape: [usize; 3]) -> [[f32; 4]; 8] {
    let top = shape.map(|s| (s - 1) as f32);
    let mut corners = [[0.0, 0.0, 0.0, 1.0]; 8];
    for (i, c) in corners.iter_mut().enumerate() {
        if i & 4 != 0 {
            c[0] = top[0];
        }
        if i & 2 != 0 {
            c[1] = top[1];
        }
        if i & 1 != 0 {
            c[2] = top[2];
        }
    }
    corners
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_coords_row_major() {
        let coords = dest_coords([2, 3, 4]);
        assert_eq!(coords.len(), 24);
        assert_eq!(coords[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(coords[1], [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(coords[4], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(coords[23], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn dest_coords_is_cached() {
        let a = dest_coords([3, 5, 7]);
        let b = dest_coords([3, 5, 7]);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn dest_corners_span_the_patch() {
        let corners = dest_corners([4, 8, 16]);
        assert_eq!(corners[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(corners[7], [3.0, 7.0, 15.0, 1.0]);
        for c in corners {
            assert_eq!(c[3], 1.0);
            assert!(c[0] == 0.0 || c[0] == 3.0);
            assert!(c[1] == 0.0 || c[1] == 7.0);
            assert!(c[2] == 0.0 || c[2] == 15.0);
        }
    }
}
