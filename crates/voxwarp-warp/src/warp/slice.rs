use glam::{Mat3, Mat4, Vec4};
use rayon::prelude::*;

use voxwarp_volume::{Volume, VolumeSource};

use crate::error::WarpError;
use crate::grid::dest_coords;
use crate::interpolation::{map_coordinates, InterpolationMode};
use crate::transform::{invert_stable, is_projective};
use crate::warp::bbox::source_bbox;

/// A secondary volume, spatially centered on the primary one, to extract
/// under the same transform.
///
/// Typical targets hold label or vector-field channels, so resampling is
/// chosen per channel: nearest for discrete channels, trilinear otherwise.
pub struct TargetSpec<'a> {
    /// The target volume source.
    pub src: &'a dyn VolumeSource,
    /// Patch shape to extract from the target.
    pub ps: [usize; 3],
    /// Channels to resample with nearest neighbor lookup. `None` treats
    /// every channel as discrete.
    pub discrete_channels: Option<&'a [usize]>,
    /// Channel triples that jointly encode a direction per voxel. After
    /// spatial interpolation these are re-projected through the transform's
    /// linear block, since directions must not pick up the translation.
    pub vector_channels: &'a [[usize; 3]],
}

/// Cut a warped patch out of a source volume, and optionally out of a
/// spatially aligned target volume.
///
/// Rather than warping the volumes, the coordinates they are read at are
/// warped: every output voxel is mapped through the inverse of the forward
/// matrix `m` into source space and resampled there. Only the bounding box
/// of the mapped coordinates is ever read from the sources, so the cost is
/// proportional to the patch, not the volume.
///
/// Primary channels are interpolated trilinearly; when `last_ch_max_interp`
/// is set and `ksize > 0.5`, the final channel uses the neighborhood-max
/// kernel instead (label masks under heavy downsampling).
///
/// # Errors
///
/// [`WarpError::OutOfBounds`] when the patch needs voxels outside the
/// primary or target volume; callers retry with a different sample. Any
/// other error is an invalid configuration: zero-extent patch shapes,
/// target volumes or patch shapes that are not evenly centered on the
/// primary ones, vector channels on a projective transform, or vector
/// channel indices out of range.
pub fn warp_slice(
    inp_src: &dyn VolumeSource,
    ps: [usize; 3],
    m: &Mat4,
    target: Option<&TargetSpec<'_>>,
    last_ch_max_interp: bool,
    ksize: f32,
) -> Result<(Volume<f32>, Option<Volume<f32>>), WarpError> {
    if ps.contains(&0) {
        return Err(WarpError::EmptyPatchShape(ps));
    }

    let n_f = inp_src.channels();
    let sh = inp_src.spatial_shape();
    let projective = is_projective(m);
    let m_inv = invert_stable(m);

    let (lo, hi) = source_bbox(&m_inv, projective, ps, sh)?;
    log::trace!("primary bbox lo={lo:?} hi={hi:?} for patch {ps:?}");

    // dense source-space coordinate per output voxel
    let dest = dest_coords(ps);
    let src_coords: Vec<[f32; 3]> = dest
        .par_iter()
        .map(|c| {
            let mut p = m_inv * Vec4::from_array(*c);
            if projective {
                p /= p.w;
            }
            [p.x, p.y, p.z]
        })
        .collect();

    let img_cut = inp_src.read_region(
        [lo[0] as usize, lo[1] as usize, lo[2] as usize],
        [hi[0] as usize, hi[1] as usize, hi[2] as usize],
    )?;
    let cut_sh = img_cut.spatial_shape();
    let lo_f = [lo[0] as f32, lo[1] as f32, lo[2] as f32];

    let mut inp = Volume::from_shape_val(n_f, ps, 0.0f32);
    for k in 0..n_f {
        let mode = if last_ch_max_interp && ksize > 0.5 && k == n_f - 1 {
            InterpolationMode::MaxKernel(ksize)
        } else {
            InterpolationMode::Trilinear
        };
        map_coordinates(
            img_cut.channel_slice(k)?,
            cut_sh,
            &src_coords,
            lo_f,
            mode,
            inp.channel_slice_mut(k)?,
        );
    }

    let target_out = match target {
        None => None,
        Some(t) => Some(warp_target(t, m, projective, ps, sh, &src_coords)?),
    };

    Ok((inp, target_out))
}

fn warp_target(
    t: &TargetSpec<'_>,
    m: &Mat4,
    projective: bool,
    ps: [usize; 3],
    sh: [usize; 3],
    src_coords: &[[f32; 3]],
) -> Result<Volume<f32>, WarpError> {
    if t.ps.contains(&0) {
        return Err(WarpError::EmptyPatchShape(t.ps));
    }

    let t_sh = t.src.spatial_shape();
    let n_f_t = t.src.channels();

    // both volumes and both patches must share a center
    let off = centered_offset(sh, t_sh)?;
    let off_ps = centered_offset(ps, t.ps)?;
    if off_ps.iter().any(|&o| o < 0) {
        return Err(WarpError::TargetExceedsPatch(t.ps, ps));
    }

    if projective && !t.vector_channels.is_empty() {
        return Err(WarpError::ProjectiveUnsupported);
    }
    for ix in t.vector_channels {
        if ix.iter().any(|&c| c >= n_f_t) {
            return Err(WarpError::BadVectorChannels(*ix, n_f_t));
        }
    }

    // the centered sub-grid of the primary's coordinates covers the target
    // patch; no second matrix application is needed
    let tp = t.ps;
    let mut t_coords: Vec<[f32; 3]> = Vec::with_capacity(tp[0] * tp[1] * tp[2]);
    for d in 0..tp[0] {
        for h in 0..tp[1] {
            for w in 0..tp[2] {
                let i = ((d + off_ps[0] as usize) * ps[1] + (h + off_ps[1] as usize)) * ps[2]
                    + (w + off_ps[2] as usize);
                t_coords.push(src_coords[i]);
            }
        }
    }

    // bound the sub-grid in the target volume's own frame
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for c in &t_coords {
        for a in 0..3 {
            min[a] = min[a].min(c[a]);
            max[a] = max[a].max(c[a]);
        }
    }
    let lo_t = [0, 1, 2].map(|a| (min[a] - off[a] as f32).floor() as i64);
    let hi_t = [0, 1, 2].map(|a| (max[a] - off[a] as f32).ceil() as i64 + 1);
    for a in 0..3 {
        if lo_t[a] < 0 || hi_t[a] > t_sh[a] as i64 {
            log::trace!("target bbox rejected: lo={lo_t:?} hi={hi_t:?} against {t_sh:?}");
            return Err(WarpError::OutOfBounds {
                lo: lo_t,
                hi: hi_t,
                shape: t_sh,
            });
        }
    }

    let target_cut = t.src.read_region(
        [lo_t[0] as usize, lo_t[1] as usize, lo_t[2] as usize],
        [hi_t[0] as usize, hi_t[1] as usize, hi_t[2] as usize],
    )?;
    let cut_sh = target_cut.spatial_shape();
    // coordinates are in the primary frame; the cut origin in that frame is
    // lo_t + off
    let lo_f = [0, 1, 2].map(|a| (lo_t[a] + off[a]) as f32);

    let mut out = Volume::from_shape_val(n_f_t, tp, 0.0f32);
    for k in 0..n_f_t {
        let discrete = match t.discrete_channels {
            None => true,
            Some(ix) => ix.contains(&k),
        };
        let mode = if discrete {
            InterpolationMode::Nearest
        } else {
            InterpolationMode::Trilinear
        };
        map_coordinates(
            target_cut.channel_slice(k)?,
            cut_sh,
            &t_coords,
            lo_f,
            mode,
            out.channel_slice_mut(k)?,
        );
    }

    // vector-valued channels were interpolated component-wise in the source
    // frame; rotate them into the output frame
    if !t.vector_channels.is_empty() {
        let m_lin = Mat3::from_mat4(*m);
        let n = out.spatial_numel();
        let data = out.as_slice_mut();
        for ix in t.vector_channels {
            for i in 0..n {
                let v = glam::Vec3::new(
                    data[ix[0] * n + i],
                    data[ix[1] * n + i],
                    data[ix[2] * n + i],
                );
                let v = m_lin * v;
                data[ix[0] * n + i] = v.x;
                data[ix[1] * n + i] = v.y;
                data[ix[2] * n + i] = v.z;
            }
        }
    }

    Ok(out)
}

/// Half the extent difference between two centered shapes.
///
/// # Errors
///
/// [`WarpError::NotCentered`] when the difference is odd along any axis,
/// since the shapes could not share a center on the voxel grid.
fn centered_offset(outer: [usize; 3], inner: [usize; 3]) -> Result<[i64; 3], WarpError> {
    let diff = [0, 1, 2].map(|a| outer[a] as i64 - inner[a] as i64);
    if diff.iter().any(|d| d.rem_euclid(2) != 0) {
        return Err(WarpError::NotCentered(diff));
    }
    Ok(diff.map(|d| d / 2))
}
