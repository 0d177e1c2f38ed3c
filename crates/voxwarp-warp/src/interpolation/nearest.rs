/// Kernel for nearest neighbor lookup.
///
/// Rounds the sub-array-local coordinate to the closest voxel per axis and
/// reads it directly, so label values are never blended.
pub(crate) fn nearest(src: &[f32], sh: [usize; 3], coord: [f32; 3], lo: [f32; 3]) -> f32 {
    let u = clamp_round(coord[0] - lo[0], sh[0]);
    let v = clamp_round(coord[1] - lo[1], sh[1]);
    let w = clamp_round(coord[2] - lo[2], sh[2]);
    src[(u * sh[1] + v) * sh[2] + w]
}

fn clamp_round(x: f32, dim: usize) -> usize {
    (x.round_ties_even() as i64).clamp(0, dim as i64 - 1) as usize
}
