use glam::{Mat4, Vec3};
use rand::Rng;

use voxwarp_volume::{Volume, VolumeSource};

use crate::error::WarpError;
use crate::matrix::{chain_matrices, identity, scale, scale_inv, translate};
use crate::sampling::{
    get_random_flipmat, get_random_rotmat, get_random_swapmat, get_random_warpmat,
    get_rotmat_from_direc, Gamma,
};
use crate::warp::slice::{warp_slice, TargetSpec};

/// Options for tracing-directed patch extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracingOpts {
    /// Shift of the patch center along axis 0; positive values show more
    /// sections in the positive direction relative to the position.
    pub z_shift: f32,
    /// Anisotropy factor of the dataset (axis 0 voxel size over in-plane
    /// voxel size).
    pub aniso_factor: f32,
    /// Scale coordinates by `1 / aniso_factor` while warping, so the
    /// extracted patch is isotropic.
    pub sample_aniso: bool,
    /// In-plane rotation about the tracing direction.
    pub gamma: Gamma,
    /// Zoom factor; values above 1 magnify, below 1 downsample.
    pub scale_factor: f32,
    /// Resample the final channel with the neighborhood-max kernel when
    /// downsampling is strong enough to warrant it.
    pub last_ch_max_interp: bool,
}

impl Default for TracingOpts {
    fn default() -> Self {
        Self {
            z_shift: 0.0,
            aniso_factor: 2.0,
            sample_aniso: true,
            gamma: Gamma::Fixed(0.0),
            scale_factor: 1.0,
            last_ch_max_interp: false,
        }
    }
}

/// Extract a patch centered at a known position, oriented along a unit
/// tracing direction.
///
/// Used for directed/continuation sampling: the caller knows where to look
/// and which way the structure runs, and gets back the forward matrix used
/// so that predictions can be mapped back into the lab frame via
/// [`crate::transform::Transform`].
///
/// # Errors
///
/// [`WarpError::OutOfBounds`] when the patch does not fit (retryable with a
/// different position), [`WarpError::NonUnitDirection`] for a degenerate
/// tracing direction, and configuration errors from [`warp_slice`].
pub fn get_tracing_slice(
    img: &dyn VolumeSource,
    ps: [usize; 3],
    pos: Vec3,
    direction_iso: Vec3,
    opts: &TracingOpts,
    target: Option<&TargetSpec<'_>>,
    rng: &mut impl Rng,
) -> Result<(Volume<f32>, Option<Volume<f32>>, Mat4), WarpError> {
    let mut dest_center = [
        ps[0] as f32 / 2.0,
        ps[1] as f32 / 2.0,
        ps[2] as f32 / 2.0,
    ];
    dest_center[0] -= opts.z_shift;

    let r = get_rotmat_from_direc(direction_iso, opts.gamma, rng)?;
    let t_src = translate(-pos.x, -pos.y, -pos.z);
    let s_src = scale(opts.aniso_factor, 1.0, 1.0);
    let s_zoom = scale(opts.scale_factor, opts.scale_factor, opts.scale_factor);
    let s_dest = if opts.sample_aniso {
        scale_inv(opts.aniso_factor, 1.0, 1.0)
    } else {
        identity()
    };
    let t_dest = translate(dest_center[0], dest_center[1], dest_center[2]);

    let m = chain_matrices(&[t_dest, s_zoom, s_dest, r, s_src, t_src]);

    // when downsampling, one output voxel covers 1/scale_factor source
    // voxels; grow the max kernel accordingly
    let ksize = (0.5 / opts.scale_factor).max(0.5);
    let (inp, target_out) = warp_slice(img, ps, &m, target, opts.last_ch_max_interp, ksize)?;
    Ok((inp, target_out, m))
}

/// Parameters for randomly warped patch extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpParams {
    /// Anisotropy factor of the dataset.
    pub aniso_factor: f32,
    /// Scale coordinates by `1 / aniso_factor` while warping.
    pub sample_aniso: bool,
    /// Strength of the random distortion; 0 disables rotation and warp.
    pub warp_amount: f32,
    /// Exclude axis 0 from rotations, swaps and warp coupling.
    pub lock_z: bool,
    /// Never flip axis 2 (also disables axis swaps).
    pub no_x_flip: bool,
    /// Add a small random perspective component.
    pub perspective: bool,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            aniso_factor: 2.0,
            sample_aniso: true,
            warp_amount: 1.0,
            lock_z: true,
            no_x_flip: false,
            perspective: false,
        }
    }
}

/// Extract a randomly transformed patch centered at a uniformly random
/// valid position.
///
/// Samples flip, axis-swap, rotation and warp matrices, composes them into
/// one forward transform, and runs [`warp_slice`]. A position is valid when
/// the patch half-extents (and the target centering offset, if a target is
/// supplied) keep the untransformed patch inside the volume; the random
/// distortion can still push the bounding box outside, in which case the
/// recoverable out-of-bounds error asks the caller to retry.
///
/// # Errors
///
/// [`WarpError::OutOfBounds`] (retry with a different sample),
/// [`WarpError::EmptyPositionRange`] when no valid center exists, and
/// configuration errors from [`warp_slice`].
///
/// # Examples
///
/// Two-dimensional patches are depth-1 volumes: pass `[1, h, w]` and drop
/// the unit axis afterwards. The section axis stays locked by default, so
/// the random transforms act in plane only.
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use voxwarp_volume::Volume;
/// use voxwarp_warp::warp::{get_warped_slice, WarpParams};
///
/// let vol = Volume::new(1, [24, 48, 48], vec![0.0f32; 24 * 48 * 48]).unwrap();
/// let mut rng = StdRng::seed_from_u64(3);
/// let (patch, _) = loop {
///     match get_warped_slice(&vol, [1, 16, 16], &WarpParams::default(), None, &mut rng) {
///         Ok(ok) => break ok,
///         Err(e) if e.is_out_of_bounds() => continue,
///         Err(e) => panic!("invalid configuration: {e}"),
///     }
/// };
/// assert_eq!(patch.spatial_shape(), [1, 16, 16]);
/// ```
pub fn get_warped_slice(
    inp_src: &dyn VolumeSource,
    ps: [usize; 3],
    params: &WarpParams,
    target: Option<&TargetSpec<'_>>,
    rng: &mut impl Rng,
) -> Result<(Volume<f32>, Option<Volume<f32>>), WarpError> {
    let sh = inp_src.spatial_shape();
    let dest_center = ps.map(|p| p as f32 / 2.0);
    let src_remainder = ps.map(|p| (p % 2) as f32 / 2.0);

    let (lo_pos, hi_pos) = match target {
        Some(t) => {
            let t_sh = t.src.spatial_shape();
            let t_center = t.ps.map(|p| p as f32 / 2.0);
            let off = [0, 1, 2].map(|a| (sh[a] as i64 - t_sh[a] as i64).div_euclid(2) as f32);
            let lo = [0, 1, 2].map(|a| dest_center[a].max(t_center[a] + off[a]));
            let hi = [0, 1, 2].map(|a| {
                (sh[a] as f32 - dest_center[a]).min(t_sh[a] as f32 - t_center[a] + off[a])
            });
            (lo, hi)
        }
        None => (
            dest_center,
            [0, 1, 2].map(|a| sh[a] as f32 - dest_center[a]),
        ),
    };

    let mut pos = [0.0f32; 3];
    for a in 0..3 {
        let (lo_i, hi_i) = (lo_pos[a] as i64, hi_pos[a] as i64);
        if lo_i >= hi_i {
            return Err(WarpError::EmptyPositionRange {
                lo: lo_pos,
                hi: hi_pos,
            });
        }
        pos[a] = rng.random_range(lo_i..hi_i) as f32 + src_remainder[a];
    }

    let f = get_random_flipmat(params.no_x_flip, rng);
    let s = if params.no_x_flip {
        identity()
    } else {
        get_random_swapmat(params.lock_z, rng)
    };
    let (r, w) = if params.warp_amount.abs() < f32::EPSILON {
        (identity(), identity())
    } else {
        (
            get_random_rotmat(params.lock_z, params.warp_amount, rng),
            get_random_warpmat(params.lock_z, params.perspective, params.warp_amount, rng),
        )
    };

    let t_src = translate(-pos[0], -pos[1], -pos[2]);
    let s_src = scale(params.aniso_factor, 1.0, 1.0);
    let s_dest = if params.sample_aniso {
        scale_inv(params.aniso_factor, 1.0, 1.0)
    } else {
        identity()
    };
    let t_dest = translate(dest_center[0], dest_center[1], dest_center[2]);

    let m = chain_matrices(&[t_dest, s_dest, r, w, f, s, s_src, t_src]);

    warp_slice(inp_src, ps, &m, target, false, 0.5)
}
