//! Forward/inverse homogeneous transform pairs.

use glam::{Mat3, Mat4, Vec3};

use crate::error::WarpError;

/// Entries of the bottom row below this magnitude count as zero when
/// classifying a matrix as affine vs projective.
const PROJECTIVE_EPS: f32 = 1e-6;

/// Whether the matrix is a proper projective transform, i.e. its bottom
/// row's first three entries are not all numerically zero. Projective
/// transforms need a homogeneous divide after application.
pub fn is_projective(m: &Mat4) -> bool {
    let r = m.row(3);
    r.x.abs() > PROJECTIVE_EPS || r.y.abs() > PROJECTIVE_EPS || r.z.abs() > PROJECTIVE_EPS
}

/// Invert a matrix in double precision and cast back down.
///
/// The working precision is f32 throughout; inverting at f64 keeps the
/// conditioning error of near-singular chains out of the result.
pub fn invert_stable(m: &Mat4) -> Mat4 {
    m.as_dmat4().inverse().as_mat4()
}

/// A forward warping transform together with its cached inverse, the
/// lab-frame position it was sampled at, and the dataset anisotropy factor
/// (voxel size along axis 0 relative to axes 1 and 2).
///
/// Immutable once constructed. The lab/network coordinate conversions
/// assume a pure rotation and therefore reject projective instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Mat4,
    m_inv: Mat4,
    position_l: Option<Vec3>,
    aniso_factor: f32,
    projective: bool,
}

impl Transform {
    /// Wrap a forward matrix, deriving and caching its inverse.
    pub fn new(m: Mat4, position_l: Option<Vec3>, aniso_factor: f32) -> Self {
        Self {
            m,
            m_inv: invert_stable(&m),
            position_l,
            aniso_factor,
            projective: is_projective(&m),
        }
    }

    /// The forward matrix.
    pub fn m(&self) -> Mat4 {
        self.m
    }

    /// The cached inverse of the forward matrix.
    pub fn m_inv(&self) -> Mat4 {
        self.m_inv
    }

    /// The lab-frame position this transform is centered at, if any.
    pub fn position_l(&self) -> Option<Vec3> {
        self.position_l
    }

    /// The anisotropy factor.
    pub fn aniso_factor(&self) -> f32 {
        self.aniso_factor
    }

    /// Whether the forward matrix is projective.
    pub fn is_projective(&self) -> bool {
        self.projective
    }

    /// The linear 3x3 block of the forward matrix.
    ///
    /// # Errors
    ///
    /// For projective transforms, whose action is not captured by the
    /// linear block alone.
    pub fn m_lin(&self) -> Result<Mat3, WarpError> {
        if self.projective {
            return Err(WarpError::ProjectiveUnsupported);
        }
        Ok(Mat3::from_mat4(self.m))
    }

    /// The linear 3x3 block of the inverse matrix.
    ///
    /// # Errors
    ///
    /// For projective transforms.
    pub fn m_lin_inv(&self) -> Result<Mat3, WarpError> {
        if self.projective {
            return Err(WarpError::ProjectiveUnsupported);
        }
        Ok(Mat3::from_mat4(self.m_inv))
    }

    /// Rotate a lab-frame direction into the network frame.
    pub fn lab_coord2cnn_coord(&self, vec_l: Vec3) -> Result<Vec3, WarpError> {
        Ok(self.m_lin()? * vec_l)
    }

    /// Rotate a network-frame direction back into the lab frame,
    /// optionally adding the lab-frame position offset.
    ///
    /// # Errors
    ///
    /// For projective transforms, or when `add_offset_l` is requested on a
    /// transform without a lab-frame position.
    pub fn cnn_coord2lab_coord(&self, vec_c: Vec3, add_offset_l: bool) -> Result<Vec3, WarpError> {
        let mut vec_l = self.m_lin_inv()? * vec_c;
        if add_offset_l {
            vec_l += self.position_l.ok_or(WarpError::MissingPosition)?;
        }
        Ok(vec_l)
    }

    /// Convert a network-frame direction prediction into the next lab-frame
    /// position and the normalised isotropic tracing direction.
    ///
    /// # Errors
    ///
    /// For projective transforms, missing positions, or zero-length
    /// predictions (which carry no direction).
    pub fn cnn_pred2lab_position(&self, prediction_c: Vec3) -> Result<(Vec3, Vec3), WarpError> {
        let tracing_direc_l = self.cnn_coord2lab_coord(prediction_c, false)?;
        let position_l = self.position_l.ok_or(WarpError::MissingPosition)?;
        let new_position_l = tracing_direc_l + position_l;

        let mut direc_il = tracing_direc_l;
        direc_il.x *= self.aniso_factor;
        let norm = direc_il.length();
        if norm <= 0.0 {
            return Err(WarpError::ZeroDirection);
        }
        Ok((new_position_l, direc_il / norm))
    }

    /// Flatten into 20 values: 16 row-major matrix entries, 3 position
    /// components, the anisotropy factor.
    ///
    /// # Errors
    ///
    /// If the transform carries no lab-frame position.
    pub fn to_array(&self) -> Result<[f32; 20], WarpError> {
        let position_l = self.position_l.ok_or(WarpError::MissingPosition)?;
        let mut out = [0.0; 20];
        out[..16].copy_from_slice(&self.m.transpose().to_cols_array());
        out[16..19].copy_from_slice(&position_l.to_array());
        out[19] = self.aniso_factor;
        Ok(out)
    }

    /// Rebuild a transform flattened with [`Transform::to_array`].
    pub fn from_array(a: &[f32; 20]) -> Self {
        let mut cols = [0.0; 16];
        cols.copy_from_slice(&a[..16]);
        let m = Mat4::from_cols_array(&cols).transpose();
        let position_l = Vec3::new(a[16], a[17], a[18]);
        Self::new(m, Some(position_l), a[19])
    }
}
