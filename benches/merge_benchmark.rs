use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::tempdir;

use wikidex::core::config::Config;
use wikidex::merger;

/// Writes `segment_count` already-sorted segment files, each containing the
/// same `words_per_segment` words (spec.md §4.3 segment format), so the
/// merge actually exercises k-way fan-in per word rather than a no-op
/// concatenation.
fn write_segments(config: &Config, segment_count: usize, words_per_segment: usize) {
    for s in 0..segment_count {
        let mut contents = String::new();
        for i in 0..words_per_segment {
            let doc_id = s * words_per_segment + i + 1;
            contents.push_str(&format!("word{i:06}: [{doc_id}t1b2]\n"));
        }
        std::fs::write(config.segment_path(s), contents).unwrap();
    }
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for &(segment_count, words_per_segment) in &[(4usize, 2_000usize), (16, 2_000), (4, 20_000)] {
        let label = format!("{segment_count}segs_{words_per_segment}words");
        group.bench_with_input(BenchmarkId::from_parameter(label), &(), |b, ()| {
            b.iter_batched(
                || {
                    let dir = tempdir().unwrap();
                    let config = Config::new(dir.path()).with_shard_words(5_000);
                    write_segments(&config, segment_count, words_per_segment);
                    (dir, config)
                },
                |(_dir, config)| merger::merge(&config, segment_count).unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
