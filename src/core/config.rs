use std::path::PathBuf;

use crate::core::types::Field;

/// Fixed per-field score weights from spec.md §4.7. Not meant to vary in
/// production — the setters exist so tests can reconstruct the worked
/// examples in spec.md §8 without hardcoding field order elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub body: f64,
    pub infobox: f64,
    pub category: f64,
    pub reference: f64,
    pub link: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights {
            title: 1.0,
            body: 0.25,
            infobox: 0.2,
            category: 0.1,
            reference: 0.05,
            link: 0.05,
        }
    }
}

impl FieldWeights {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Body => self.body,
            Field::Infobox => self.infobox,
            Field::Category => self.category,
            Field::Link => self.link,
            Field::Reference => self.reference,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub index_dir: PathBuf,
    /// B: pages per build batch, and rows per title file (spec.md §3).
    pub batch_size: usize,
    /// Unique words per merged shard (spec.md §3).
    pub shard_words: usize,
    pub field_weights: FieldWeights,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_dir: PathBuf::from("./index"),
            batch_size: 20_000,
            shard_words: 100_000,
            field_weights: FieldWeights::default(),
        }
    }
}

impl Config {
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Config {
            index_dir: index_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_shard_words(mut self, shard_words: usize) -> Self {
        self.shard_words = shard_words;
        self
    }

    pub fn segment_path(&self, batch: usize) -> PathBuf {
        self.index_dir.join(format!("index{batch}.txt"))
    }

    pub fn title_path(&self, batch: usize) -> PathBuf {
        self.index_dir.join(format!("title{batch}.txt"))
    }

    pub fn merged_shard_path(&self, shard: usize) -> PathBuf {
        self.index_dir.join(format!("mergedIndex{shard}.txt"))
    }

    pub fn word_offset_path(&self, shard: usize) -> PathBuf {
        self.index_dir.join(format!("wordOffset{shard}.txt"))
    }

    pub fn break_words_path(&self) -> PathBuf {
        self.index_dir.join("breakWords.txt")
    }
}
