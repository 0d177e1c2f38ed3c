/// Kernel for anisotropic neighborhood maximum.
///
/// Takes the maximum over a box of half-width `min(0.5, k/2)` along axis 0
/// and `k` along axes 1 and 2, clamped to the sub-array bounds. Intended
/// for the label mask channel when a patch is downsampled: `k` grows with
/// the zoom factor, so thin structures survive where a single lookup would
/// skip over them.
pub(crate) fn max_kernel(src: &[f32], sh: [usize; 3], coord: [f32; 3], lo: [f32; 3], k: f32) -> f32 {
    let kz = (k / 2.0).min(0.5);
    let (u0, u1) = span(coord[0] - lo[0], kz, sh[0]);
    let (v0, v1) = span(coord[1] - lo[1], k, sh[1]);
    let (w0, w1) = span(coord[2] - lo[2], k, sh[2]);

    let mut val = f32::NEG_INFINITY;
    for u in u0..u1 {
        for v in v0..v1 {
            for w in w0..w1 {
                val = val.max(src[(u * sh[1] + v) * sh[2] + w]);
            }
        }
    }
    val
}

/// Half-open voxel index range covering `[x - half, x + half]`, clamped to
/// the axis extent and guaranteed non-empty.
fn span(x: f32, half: f32, dim: usize) -> (usize, usize) {
    let lo = (x - half).clamp(0.0, dim as f32).round_ties_even() as usize;
    let hi = (x + half).clamp(0.0, dim as f32).round_ties_even() as usize;
    let lo = lo.min(dim - 1);
    (lo, hi.clamp(lo + 1, dim))
}
