use glam::{Mat4, Vec4};

use crate::error::WarpError;
use crate::grid::dest_corners;

/// Bound the source voxels needed to fill an output patch.
///
/// Maps the 8 output-patch corners through the inverse transform (with a
/// homogeneous divide for projective transforms), then takes
/// `lo = floor(min)` and `hi = ceil(max) + 1` per axis. `hi` is exclusive;
/// the extra unit reserves the upper neighbor that trilinear interpolation
/// reads. A patch that touches the volume boundary exactly is in bounds.
///
/// # Errors
///
/// [`WarpError::OutOfBounds`] when the box exceeds the source extents.
/// This is the recoverable retry signal, not a caller bug.
pub fn source_bbox(
    m_inv: &Mat4,
    projective: bool,
    ps: [usize; 3],
    src_shape: [usize; 3],
) -> Result<([i64; 3], [i64; 3]), WarpError> {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for corner in dest_corners(ps) {
        let mut p = *m_inv * Vec4::from_array(corner);
        if projective {
            p /= p.w;
        }
        for (a, x) in [p.x, p.y, p.z].into_iter().enumerate() {
            min[a] = min[a].min(x);
            max[a] = max[a].max(x);
        }
    }

    let lo = min.map(|x| x.floor() as i64);
    let hi = [0, 1, 2].map(|a| max[a].ceil() as i64 + 1);
    for a in 0..3 {
        if lo[a] < 0 || hi[a] > src_shape[a] as i64 {
            log::trace!(
                "bbox rejected: lo={lo:?} hi={hi:?} against source shape {src_shape:?}"
            );
            return Err(WarpError::OutOfBounds {
                lo,
                hi,
                shape: src_shape,
            });
        }
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{rotate_z, translate};
    use crate::transform::invert_stable;

    #[test]
    fn identity_patch_covering_whole_volume_is_in_bounds() {
        let (lo, hi) = source_bbox(&Mat4::IDENTITY, false, [8, 8, 8], [8, 8, 8])
            .expect("identity at full shape stays in bounds");
        assert_eq!(lo, [0, 0, 0]);
        assert_eq!(hi, [8, 8, 8]);
    }

    #[test]
    fn boundary_inclusive_at_both_ends() {
        // inverse shifts the box flush against the high edge: [4, 8) fits in 8
        let m_inv = translate(4.0, 4.0, 4.0);
        assert!(source_bbox(&m_inv, false, [4, 4, 4], [8, 8, 8]).is_ok());

        // one more voxel tips it over
        let m_inv = translate(5.0, 4.0, 4.0);
        let err = source_bbox(&m_inv, false, [4, 4, 4], [8, 8, 8]);
        assert!(err.is_err_and(|e| e.is_out_of_bounds()));
    }

    #[test]
    fn negative_coordinates_are_out_of_bounds() {
        let m = translate(1.0, 0.0, 0.0); // forward shift; inverse reads below zero
        let err = source_bbox(&invert_stable(&m), false, [4, 4, 4], [8, 8, 8]);
        assert!(err.is_err_and(|e| e.is_out_of_bounds()));
    }

    #[test]
    fn rotated_patch_needs_a_larger_box() {
        // 45 deg in-plane rotation, patch centered at (16, 16): the box must
        // grow to sqrt(2) times the patch extent
        let m = crate::matrix::chain_matrices(&[
            translate(0.0, 8.0, 8.0),
            rotate_z(std::f32::consts::FRAC_PI_4),
            translate(0.0, -16.0, -16.0),
        ]);
        let (lo, hi) = source_bbox(&invert_stable(&m), false, [1, 17, 17], [1, 32, 32])
            .expect("rotation fits in the larger volume");
        assert_eq!((lo[0], hi[0]), (0, 1));
        assert!(lo[1] < 8);
        assert!(hi[1] - lo[1] > 17);
        assert!(hi[2] - lo[2] > 17);
    }

    #[test]
    fn projective_corners_are_divided() {
        let mut rows = Mat4::IDENTITY.transpose().to_cols_array_2d();
        rows[3][2] = 0.01; // w = 1 + 0.01 * x
        let m_inv = Mat4::from_cols_array_2d(&rows).transpose();
        let (lo, hi) = source_bbox(&m_inv, true, [4, 4, 4], [8, 8, 8])
            .expect("mild perspective stays in bounds");
        assert_eq!(lo, [0, 0, 0]);
        // the far corners shrink towards the origin under the divide
        assert!(hi[2] <= 5);
    }
}
