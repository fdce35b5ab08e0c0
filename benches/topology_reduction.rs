//! Topology Reduction Benchmarks
//!
//! Measures deduplication and ordering of raw output lists, plus name and
//! fallback resolution against an already reduced list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use display_anchor::display::{
    find_by_name_in, reduce_outputs, resolve_in, OutputIdentity, OutputInfo, PixelRect,
};

/// Outputs in a scrambled grid, each reported `clones` times (clone groups)
fn generate_outputs(count: u32, clones: u32) -> Vec<OutputInfo> {
    let mut outputs = Vec::with_capacity((count * clones) as usize);
    for round in 0..clones {
        for i in 0..count {
            // Reverse-ish order so the sort has work to do
            let slot = (i * 7 + round) % count;
            outputs.push(OutputInfo {
                identity: OutputIdentity::new(0x0001_2A4F, slot),
                gdi_name: format!(r"\\.\DISPLAY{}", slot + 1),
                device_path: String::new(),
                friendly_name: format!("Monitor {}", slot),
                edid_manufacturer: Some("DEL".to_string()),
                edid_product_code: Some(0xA0B1),
                bounds: PixelRect::from_origin_size(
                    (slot % 4) as i32 * 1920 - 1920,
                    (slot / 4) as i32 * 1080,
                    1920,
                    1080,
                ),
                is_primary: slot == 1,
            });
        }
    }
    outputs
}

/// Benchmark dedup + stable sort at typical and extreme output counts
fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology_reduce");

    let shapes = [(2, 1, "laptop_dock"), (6, 2, "workstation_clones"), (64, 3, "video_wall")];

    for (count, clones, name) in shapes {
        let raw = generate_outputs(count, clones);
        group.throughput(Throughput::Elements(raw.len() as u64));

        group.bench_with_input(BenchmarkId::new("reduce", name), &raw, |b, raw| {
            b.iter(|| black_box(reduce_outputs(black_box(raw.clone()))))
        });
    }

    group.finish();
}

/// Benchmark the resolver chain against one enumeration
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology_resolve");
    let outputs = reduce_outputs(generate_outputs(64, 1));

    group.bench_function("by_name_last", |b| {
        b.iter(|| black_box(find_by_name_in(black_box(&outputs), "monitor 63")))
    });

    group.bench_function("fallback", |b| {
        let stale = OutputIdentity::new(0xDEAD, 99);
        b.iter(|| black_box(resolve_in(black_box(&outputs), stale, Some("projector"))))
    });

    group.finish();
}

criterion_group!(benches, bench_reduce, bench_resolve);
criterion_main!(benches);
