//! Builders for elementary 4x4 homogeneous transforms.
//!
//! Axis convention: axis 0 is the section (depth) axis, axes 1 and 2 span
//! the in-plane directions. All builders are pure; the same inputs always
//! produce the same matrix.

use glam::{Mat4, Vec4};

/// The 4x4 identity.
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Translation along the three spatial axes.
pub fn translate(d0: f32, d1: f32, d2: f32) -> Mat4 {
    Mat4::from_cols_array_2d(&[
        [1.0, 0.0, 0.0, d0],
        [0.0, 1.0, 0.0, d1],
        [0.0, 0.0, 1.0, d2],
        [0.0, 0.0, 0.0, 1.0],
    ])
    .transpose()
}

/// Right-handed rotation about axis 0 (rotates axes 1 and 2).
pub fn rotate_z(a: f32) -> Mat4 {
    let (s, c) = a.sin_cos();
    Mat4::from_cols_array_2d(&[
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, -s, 0.0],
        [0.0, s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
    .transpose()
}

/// Right-handed rotation about axis 2 (rotates axes 0 and 1).
pub fn rotate_y(a: f32) -> Mat4 {
    let (s, c) = a.sin_cos();
    Mat4::from_cols_array_2d(&[
        [c, -s, 0.0, 0.0],
        [s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
    .transpose()
}

/// Right-handed rotation about axis 1 (rotates axes 0 and 2).
pub fn rotate_x(a: f32) -> Mat4 {
    let (s, c) = a.sin_cos();
    Mat4::from_cols_array_2d(&[
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
    .transpose()
}

/// Anisotropic scaling along the three spatial axes.
pub fn scale(m0: f32, m1: f32, m2: f32) -> Mat4 {
    Mat4::from_diagonal(Vec4::new(m0, m1, m2, 1.0))
}

/// The exact inverse of [`scale`], built from reciprocals rather than a
/// numeric matrix inversion.
pub fn scale_inv(m0: f32, m1: f32, m2: f32) -> Mat4 {
    Mat4::from_diagonal(Vec4::new(1.0 / m0, 1.0 / m1, 1.0 / m2, 1.0))
}

/// Compose a chain of matrices: `chain_matrices(&[A, B, C])` is `A·B·C`.
///
/// Applied to a column vector the last matrix in the list acts first, so
/// call sites list matrices with the innermost transform last.
pub fn chain_matrices(mats: &[Mat4]) -> Mat4 {
    mats.iter().fold(Mat4::IDENTITY, |acc, m| acc * *m)
}
