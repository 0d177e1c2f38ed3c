//! Random transform samplers.
//!
//! Every sampler takes the random source as an explicit argument so that
//! extraction stays reproducible under a seeded generator and safe to run
//! from many workers at once.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3, Vec4};
use rand::Rng;

use crate::error::WarpError;
use crate::matrix::{chain_matrices, rotate_y, rotate_z};

/// Tolerance for the unit-norm check on tracing directions.
const UNIT_NORM_TOL: f32 = 1e-3;

/// In-plane rotation angle for direction-derived rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gamma {
    /// Use this angle, in radians.
    Fixed(f32),
    /// Sample uniformly from `[0, 2π)`.
    Random,
}

/// Rotation matrix aligning axis 0 with a unit tracing direction, with an
/// in-plane rotation `gamma` about the new axis.
///
/// The Euler angles are `phi = atan2(direc[2], direc[1])` and
/// `theta = acos(direc[0])`; the result is
/// `rotate_z(gamma) · rotate_y(-theta) · rotate_z(-phi)`.
///
/// # Errors
///
/// If `direc` is not unit length within `1e-3`. That is a caller bug, not a
/// retryable condition.
pub fn get_rotmat_from_direc(
    direc: Vec3,
    gamma: Gamma,
    rng: &mut impl Rng,
) -> Result<Mat4, WarpError> {
    let norm = direc.length();
    if (norm - 1.0).abs() >= UNIT_NORM_TOL {
        return Err(WarpError::NonUnitDirection(norm));
    }
    let gamma = match gamma {
        Gamma::Fixed(g) => g,
        Gamma::Random => rng.random::<f32>() * TAU,
    };
    let phi = direc.z.atan2(direc.y);
    let theta = direc.x.clamp(-1.0, 1.0).acos();
    Ok(chain_matrices(&[
        rotate_z(gamma),
        rotate_y(-theta),
        rotate_z(-phi),
    ]))
}

/// Random rotation matrix.
///
/// `amount` linearly attenuates the angular range: 0 keeps angles at zero,
/// 1 samples the full range. The tilt angle `theta` is drawn via
/// `asin(uniform)`, biasing samples towards small tilts. With `lock_z` the
/// section axis stays fixed and only the in-plane angle is sampled.
pub fn get_random_rotmat(lock_z: bool, amount: f32, rng: &mut impl Rng) -> Mat4 {
    let gamma = rng.random::<f32>() * TAU * amount;
    if lock_z {
        return rotate_z(gamma);
    }
    let phi = rng.random::<f32>() * TAU * amount;
    let theta = rng.random::<f32>().asin() * amount;
    chain_matrices(&[rotate_z(gamma), rotate_y(-theta), rotate_z(-phi)])
}

/// Random axis-flip matrix: an independent fair coin per spatial axis puts
/// ±1 on the diagonal. The homogeneous entry is never flipped, and
/// `no_x_flip` forces axis 2 to +1.
pub fn get_random_flipmat(no_x_flip: bool, rng: &mut impl Rng) -> Mat4 {
    let mut flips = [0.0f32; 4];
    for f in flips.iter_mut() {
        *f = if rng.random::<bool>() { 1.0 } else { -1.0 };
    }
    flips[3] = 1.0;
    if no_x_flip {
        flips[2] = 1.0;
    }
    Mat4::from_diagonal(Vec4::from_array(flips))
}

const SWAPS: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 2, 1, 3],
    [1, 0, 2, 3],
    [1, 2, 0, 3],
    [2, 0, 1, 3],
    [2, 1, 0, 3],
];

/// Random axis-permutation matrix, drawn uniformly from the 6 permutations
/// of the spatial axes, or from the 2 that keep axis 0 fixed when `lock_z`
/// is set.
pub fn get_random_swapmat(lock_z: bool, rng: &mut impl Rng) -> Mat4 {
    let swaps = if lock_z { &SWAPS[..2] } else { &SWAPS[..] };
    let perm = swaps[rng.random_range(0..swaps.len())];

    let mut rows = [[0.0f32; 4]; 4];
    for (row, &p) in rows.iter_mut().zip(perm.iter()) {
        row[p] = 1.0;
    }
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// Random warp matrix: identity plus a uniform perturbation in
/// `[-0.1·amount, 0.1·amount]` per entry.
///
/// The perturbation's last row and column stay zero unless `perspective` is
/// requested; perspective entries are scaled by 0.05 and clamped to
/// `±3e-3`, since larger values make the homogeneous divide unstable. With
/// `lock_z` the first row and column stay zero, so the locked axis picks up
/// no tilt or scale coupling.
pub fn get_random_warpmat(
    lock_z: bool,
    perspective: bool,
    amount: f32,
    rng: &mut impl Rng,
) -> Mat4 {
    let amount = amount * 0.1;
    let mut perturb = [[0.0f32; 4]; 4];
    for row in perturb.iter_mut() {
        for e in row.iter_mut() {
            *e = rng.random_range(-amount..=amount);
        }
    }
    perturb[3][3] = 0.0;
    if lock_z {
        perturb[0] = [0.0; 4];
        for row in perturb.iter_mut() {
            row[0] = 0.0;
        }
    }
    if !perspective {
        perturb[3] = [0.0; 4];
    }
    for e in perturb[3][..3].iter_mut() {
        *e = (*e * 0.05).clamp(-3e-3, 3e-3);
    }
    Mat4::IDENTITY + Mat4::from_cols_array_2d(&perturb).transpose()
}
