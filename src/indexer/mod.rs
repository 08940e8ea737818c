use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::analysis::normalizer::Normalizer;
use crate::core::error::Result;
use crate::core::types::{encode_term_record, DocId, FieldCounts, Page, WORD_ORDER};
use crate::parser::PageParser;

/// In-memory inverted map built by one batch (spec.md §4.3): word -> the
/// per-doc records contributed by this batch's pages, in the order pages
/// were processed (ascending docId, since a batch's docIds are contiguous).
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    pub postings: HashMap<String, Vec<(DocId, FieldCounts)>>,
    pub titles: Vec<(DocId, String)>,
}

impl InMemoryIndex {
    /// Segment file: `word: [rec1,rec2,...]\n`, sorted by word (spec.md §4.3).
    pub fn write_segment(&self, path: &Path) -> Result<()> {
        let mut words: Vec<&String> = self.postings.keys().collect();
        words.sort();

        let mut out = BufWriter::new(File::create(path)?);
        for word in words {
            let records = &self.postings[word];
            let encoded: Vec<String> = records
                .iter()
                .map(|(doc_id, counts)| encode_term_record(*doc_id, counts))
                .collect();
            writeln!(out, "{}: [{}]", word, encoded.join(","))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Title file: `docId: title\n`, sorted by docId (spec.md §4.3).
    pub fn write_titles(&self, path: &Path) -> Result<()> {
        let mut titles = self.titles.clone();
        titles.sort_by_key(|(doc_id, _)| *doc_id);

        let mut out = BufWriter::new(File::create(path)?);
        for (doc_id, title) in titles {
            writeln!(out, "{}: {}", doc_id.value(), title)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Segment Indexer (C3): turns one batch of pages into an in-memory
/// inverted map, ready to flush.
pub struct SegmentIndexer<'a> {
    normalizer: &'a Normalizer<'a>,
}

impl<'a> SegmentIndexer<'a> {
    pub fn new(normalizer: &'a Normalizer<'a>) -> Self {
        SegmentIndexer { normalizer }
    }

    /// Tokenizes every page in the batch (in parallel — independent, pure
    /// per-page work) and folds the results into one inverted map in
    /// docId order, so the per-word posting lists stay ordered without an
    /// extra sort pass.
    pub fn index_batch(&self, pages: &[Page]) -> InMemoryIndex {
        let parser = PageParser::new(self.normalizer);

        let parsed: Vec<(DocId, String, HashMap<String, FieldCounts>)> = pages
            .par_iter()
            .map(|page| {
                let tokens = parser.parse(&page.title, &page.body);
                let mut counts: HashMap<String, FieldCounts> = HashMap::new();
                for field in WORD_ORDER {
                    for word in tokens.get(field) {
                        counts.entry(word.clone()).or_insert_with(FieldCounts::new).increment(field);
                    }
                }
                (page.doc_id, page.title.to_lowercase(), counts)
            })
            .collect();

        let mut index = InMemoryIndex::default();
        for (doc_id, title, counts) in parsed {
            index.titles.push((doc_id, title));
            for (word, field_counts) in counts {
                if !field_counts.is_empty() {
                    index.postings.entry(word).or_default().push((doc_id, field_counts));
                }
            }
        }
        index
    }
}
