// Packer benchmarks
// Performance benchmarks for per-depth line packing, the hot loop of every
// compositor pass.

use coupe_display::{Depth, Packer, Palette, SCREEN_WIDTH_HI, SCREEN_WIDTH_LO};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn source_line(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 144) as u8).collect()
}

/// Benchmark one full-width line per depth, high and low density
fn bench_pack_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_line");

    for depth in [Depth::Indexed8, Depth::Rgb565, Depth::Rgb888, Depth::Rgba8888] {
        let palette = Palette::new(depth);
        let packer = Packer::for_depth(depth);
        let bpp = depth.bytes_per_pixel();

        let hi_src = source_line(SCREEN_WIDTH_HI);
        let mut hi_dst = vec![0u8; SCREEN_WIDTH_HI * bpp];
        group.bench_function(format!("hi_{}bpp", depth.bits()), |b| {
            b.iter(|| {
                packer.pack_line(black_box(&hi_src), true, &palette, &mut hi_dst);
                black_box(&hi_dst);
            });
        });

        let lo_src = source_line(SCREEN_WIDTH_LO);
        let mut lo_dst = vec![0u8; SCREEN_WIDTH_HI * bpp];
        group.bench_function(format!("lo_{}bpp", depth.bits()), |b| {
            b.iter(|| {
                packer.pack_line(black_box(&lo_src), false, &palette, &mut lo_dst);
                black_box(&lo_dst);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_line);
criterion_main!(benches);
