/// Kernel for trilinear interpolation.
///
/// Blends the 8 voxels around the sub-array-local coordinate with weights
/// that are products of `(1 - frac)` / `frac` per axis. Upper neighbors are
/// clamped at the sub-array edge; at exact integer coordinates the
/// fractional weights vanish, so the clamped neighbor never contributes.
pub(crate) fn trilinear(src: &[f32], sh: [usize; 3], coord: [f32; 3], lo: [f32; 3]) -> f32 {
    let (u0, u1, du) = split(coord[0] - lo[0], sh[0]);
    let (v0, v1, dv) = split(coord[1] - lo[1], sh[1]);
    let (w0, w1, dw) = split(coord[2] - lo[2], sh[2]);

    let at = |u: usize, v: usize, w: usize| src[(u * sh[1] + v) * sh[2] + w];

    at(u0, v0, w0) * (1.0 - du) * (1.0 - dv) * (1.0 - dw)
        + at(u1, v0, w0) * du * (1.0 - dv) * (1.0 - dw)
        + at(u0, v1, w0) * (1.0 - du) * dv * (1.0 - dw)
        + at(u0, v0, w1) * (1.0 - du) * (1.0 - dv) * dw
        + at(u1, v0, w1) * du * (1.0 - dv) * dw
        + at(u0, v1, w1) * (1.0 - du) * dv * dw
        + at(u1, v1, w0) * du * dv * (1.0 - dw)
        + at(u1, v1, w1) * du * dv * dw
}

/// Lower/upper voxel index and fractional offset along one axis.
fn split(x: f32, dim: usize) -> (usize, usize, f32) {
    let i = x.floor();
    let frac = x - i;
    let i0 = (i as i64).clamp(0, dim as i64 - 1) as usize;
    let i1 = (i0 + 1).min(dim - 1);
    (i0, i1, frac)
}
