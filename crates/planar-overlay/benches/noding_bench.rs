//! Criterion benchmarks for the noders on random polygon rings.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use planar_overlay::api::{draw_pair, IndexNoder, Noder, RadialCfg, ReplayToken, SegmentString, SnapRoundingNoder, SnappingNoder, ValidatingNoder, VertexCount};

fn rings(n: usize, seed: u64) -> Vec<SegmentString> {
    let cfg = RadialCfg {
        vertex_count: VertexCount::Fixed(n),
        ..RadialCfg::default()
    };
    let (a, b) = draw_pair(cfg, ReplayToken { seed, index: 0 }, Vector2::new(0.3, -0.2));
    vec![
        SegmentString::new(a.exterior().0.clone(), 0),
        SegmentString::new(b.exterior().0.clone(), 1),
    ]
}

fn bench_noding(c: &mut Criterion) {
    let mut group = c.benchmark_group("noding");
    for &n in &[16usize, 64, 256, 1024] {
        group.bench_with_input(BenchmarkId::new("validated_index", n), &n, |b, &n| {
            b.iter_batched(
                || rings(n, 7),
                |input| {
                    let mut noder = ValidatingNoder::new(Box::new(IndexNoder::new()));
                    let _out = noder.node(input).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("snapping", n), &n, |b, &n| {
            b.iter_batched(
                || rings(n, 8),
                |input| {
                    let _out = SnappingNoder::new(1e-10).node(input).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("snap_rounding", n), &n, |b, &n| {
            b.iter_batched(
                || rings(n, 9),
                |input| {
                    let _out = SnapRoundingNoder::new(1e8).node(input).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_noding);
criterion_main!(benches);
