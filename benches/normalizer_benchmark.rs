use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use wikidex::analysis::normalizer::Normalizer;
use wikidex::analysis::stemmer::PorterEnglishStemmer;
use wikidex::analysis::stopwords::EnglishStopWords;

/// Builds a page-sized chunk of pseudo-wiki text: plain words, a URL, an
/// HTML entity, and some punctuation — the mix the normalizer's pipeline
/// (spec.md §4.1) actually has to strip.
fn sample_text(words: usize) -> String {
    let mut rng = rand::thread_rng();
    let vocab = [
        "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "wikipedia", "article",
        "history", "science", "culture", "https://example.com/page?a=1&b=2", "&amp;",
    ];
    (0..words)
        .map(|_| vocab[rng.gen_range(0..vocab.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_normalize(c: &mut Criterion) {
    let stemmer = PorterEnglishStemmer::new();
    let stop_words = EnglishStopWords::new();
    let normalizer = Normalizer::new(&stemmer, &stop_words);

    let mut group = c.benchmark_group("normalize");
    for size in [100, 1_000, 10_000].iter() {
        let text = sample_text(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| normalizer.normalize(black_box(text)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
