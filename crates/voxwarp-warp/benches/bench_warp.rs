use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use glam::Mat4;
use voxwarp_volume::Volume;
use voxwarp_warp::matrix::{chain_matrices, rotate_z, translate};
use voxwarp_warp::warp::warp_slice;

fn bench_warp_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("WarpSlice");

    for side in [32usize, 64, 128].iter() {
        let sh = [*side, *side, *side];
        group.throughput(criterion::Throughput::Elements(
            (side * side * side) as u64,
        ));

        let parameter_string = format!("{0}x{0}x{0}", side);

        let n = side * side * side;
        let vol = Volume::new(1, sh, (0..n).map(|x| x as f32).collect()).unwrap();

        let ps = [side / 2; 3];
        let c_src = *side as f32 / 2.0;
        let c_dst = ps[0] as f32 / 2.0;
        let m = chain_matrices(&[
            translate(c_dst, c_dst, c_dst),
            rotate_z(0.3),
            translate(-c_src, -c_src, -c_src),
        ]);

        group.bench_with_input(
            BenchmarkId::new("rotated", &parameter_string),
            &(&vol, ps, m),
            |b, i| {
                let (src, ps, m) = (i.0, i.1, i.2);
                b.iter(|| warp_slice(black_box(src), black_box(ps), black_box(&m), None, false, 0.5))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("identity", &parameter_string),
            &(&vol, sh),
            |b, i| {
                let (src, ps) = (i.0, i.1);
                b.iter(|| {
                    warp_slice(
                        black_box(src),
                        black_box(ps),
                        black_box(&Mat4::IDENTITY),
                        None,
                        false,
                        0.5,
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_warp_slice);
criterion_main!(benches);
