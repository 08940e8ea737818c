use rust_stemmers::{Algorithm, Stemmer as RustStemmer};

/// External collaborator contract (spec.md §6): `stem(tokens) -> tokens`,
/// pure, English Porter-style. Exposed per-token here since the normalizer
/// streams tokens one at a time.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// Default English Porter stemmer, backed by `rust-stemmers` (already a
/// teacher dependency, used for exactly this job in the teacher's
/// `analysis::analyzer::Analyzer::standard_english`).
pub struct PorterEnglishStemmer(RustStemmer);

impl PorterEnglishStemmer {
    pub fn new() -> Self {
        PorterEnglishStemmer(RustStemmer::create(Algorithm::English))
    }
}

impl Default for PorterEnglishStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for PorterEnglishStemmer {
    fn stem(&self, word: &str) -> String {
        self.0.stem(word).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_common_suffixes() {
        let stemmer = PorterEnglishStemmer::new();
        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("cats"), "cat");
    }
}
