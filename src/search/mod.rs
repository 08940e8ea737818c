use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{parse_term_record, DocId, Field, TermRecord, WORD_ORDER};
use crate::query::ParsedQuery;

/// Title lines for one batch (`title{k}.txt`), 1-indexed the way spec.md
/// §4.7 step 5 reads them: line `((docId-1) mod B) + 1`.
type TitleLines = Vec<String>;

/// One query term routed to a shard, carrying the set of field tags it is
/// permitted to score against (all six for a bag query, one for a fielded
/// query — spec.md §4.6/§4.7).
struct RoutedTerm {
    word: String,
    fields: HashSet<Field>,
}

/// Retrieval & Ranker (C7): routes query terms to shards via the
/// break-words table, seeks postings by byte offset, and computes
/// field-weighted TF-IDF scores to return the top 10 titles.
///
/// `total_docs` is N in spec.md §4.7's idf formula — supplied by the
/// caller at open time, matching spec.md §6's "N = total pages (supplied
/// at startup)" external contract (there is no on-disk doc-count artifact
/// in the spec's file layout).
pub struct SearchEngine {
    config: Config,
    total_docs: usize,
    break_words: Vec<String>,
    title_cache: std::cell::RefCell<LruCache<usize, TitleLines>>,
}

const TOP_K: usize = 10;
const TITLE_CACHE_BATCHES: usize = 8;

impl SearchEngine {
    /// Opens the merged index described by `config`. Fails if
    /// `breakWords.txt` is missing — every search needs it to route terms
    /// (spec.md §7 case 4).
    pub fn open(config: Config, total_docs: usize) -> Result<Self> {
        let break_words = load_break_words(&config)?;
        Ok(SearchEngine {
            config,
            total_docs,
            break_words,
            title_cache: std::cell::RefCell::new(LruCache::new(
                NonZeroUsize::new(TITLE_CACHE_BATCHES).unwrap(),
            )),
        })
    }

    /// `bisect_left(breakWords, word)` (spec.md §3): the shard a term
    /// routes to. The last shard has no break-word entry and is the
    /// catch-all upper partition.
    pub fn shard_for(&self, word: &str) -> usize {
        self.break_words.partition_point(|bw| bw.as_str() < word)
    }

    /// Runs one parsed query end to end and returns up to 10 ranked titles.
    pub fn search(&self, query: &ParsedQuery) -> Result<Vec<String>> {
        let routed = route_terms(query);
        if routed.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_shard: HashMap<usize, Vec<&RoutedTerm>> = HashMap::new();
        for term in &routed {
            by_shard.entry(self.shard_for(&term.word)).or_default().push(term);
        }

        let mut doc_scores: HashMap<DocId, f64> = HashMap::new();
        let weights = self.config.field_weights;

        for (shard, terms) in by_shard {
            let fetched = self.fetch_shard_postings(shard, &terms)?;
            for (word, records) in fetched {
                let fields = terms
                    .iter()
                    .find(|t| t.word == word)
                    .map(|t| &t.fields)
                    .expect("fetched word came from this shard's term list");

                let df = records.len();
                if df == 0 {
                    continue;
                }
                let idf = (self.total_docs as f64 / df as f64).ln();

                for record in &records {
                    let mut doc_score = 0.0;
                    for field in WORD_ORDER {
                        if !fields.contains(&field) {
                            continue;
                        }
                        let count = record.counts.get(field);
                        if count > 0 {
                            doc_score += weights.get(field) * (1.0 + (count as f64).ln());
                        }
                    }
                    *doc_scores.entry(record.doc_id).or_insert(0.0) += doc_score * idf;
                }
            }
        }

        let mut ranked: Vec<(DocId, f64)> = doc_scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        ranked.truncate(TOP_K);

        ranked.into_iter().map(|(doc_id, _)| self.title_for(doc_id)).collect()
    }

    /// Opens `wordOffset{shard}.txt` and `mergedIndex{shard}.txt` once and
    /// seeks each requested term's byte offset (spec.md §4.7 step 2). A
    /// term with no entry in the offset map contributes no postings — not
    /// an error (spec.md §7 case 4).
    fn fetch_shard_postings(&self, shard: usize, terms: &[&RoutedTerm]) -> Result<HashMap<String, Vec<TermRecord>>> {
        let offsets_path = self.config.word_offset_path(shard);
        let offsets_raw = std::fs::read_to_string(&offsets_path)
            .map_err(|err| Error::new(ErrorKind::NotFound, format!("missing offset file {}: {err}", offsets_path.display())))?;
        let offsets: HashMap<String, u64> = serde_json::from_str(&offsets_raw)?;

        let shard_path = self.config.merged_shard_path(shard);
        let mut shard_file = File::open(&shard_path)
            .map_err(|err| Error::new(ErrorKind::NotFound, format!("missing shard file {}: {err}", shard_path.display())))?;

        let mut result = HashMap::with_capacity(terms.len());
        for term in terms {
            let Some(&offset) = offsets.get(&term.word) else {
                continue;
            };
            shard_file.seek(SeekFrom::Start(offset))?;
            let mut reader = BufReader::new(&mut shard_file);
            let mut line = String::new();
            reader.read_line(&mut line)?;
            let trimmed = line.trim_end_matches('\n');

            let records = trimmed
                .split(',')
                .map(parse_term_record)
                .collect::<Result<Vec<TermRecord>>>()?;
            result.insert(term.word.clone(), records);
        }
        Ok(result)
    }

    /// Reads the title at `((docId-1) mod B) + 1` of `title{floor((docId-1)/B)}.txt`
    /// (spec.md §4.7 step 5 / §9 — the corrected, non-off-by-one form).
    fn title_for(&self, doc_id: DocId) -> Result<String> {
        let zero_based = doc_id.value() - 1;
        let batch = (zero_based / self.config.batch_size as u64) as usize;
        let line_index = (zero_based % self.config.batch_size as u64) as usize;

        let mut cache = self.title_cache.borrow_mut();
        if !cache.contains(&batch) {
            cache.put(batch, self.load_title_batch(batch)?);
        }
        let lines = cache.get(&batch).expect("just inserted");
        let line = lines
            .get(line_index)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("docId {doc_id} missing from title batch {batch}")))?;
        Ok(line.clone())
    }

    fn load_title_batch(&self, batch: usize) -> Result<TitleLines> {
        let path = self.config.title_path(batch);
        let contents = std::fs::read_to_string(&path)
            .map_err(|err| Error::new(ErrorKind::NotFound, format!("missing title file {}: {err}", path.display())))?;
        contents
            .lines()
            .map(|line| {
                line.split_once(": ")
                    .map(|(_, title)| title.to_string())
                    .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("malformed title line '{line}'")))
            })
            .collect()
    }
}

fn load_break_words(config: &Config) -> Result<Vec<String>> {
    let path = config.break_words_path();
    let contents = std::fs::read_to_string(&path)
        .map_err(|err| Error::new(ErrorKind::NotFound, format!("missing break-words file {}: {err}", path.display())))?;
    Ok(contents.lines().map(|line| line.to_string()).collect())
}

/// Flattens a parsed query into routed terms: a bag query's terms search
/// all six fields; a fielded query's terms search only their declared
/// field. Terms repeated across fields are merged so postings are fetched
/// once per word (spec.md §4.7 step 1).
fn route_terms(query: &ParsedQuery) -> Vec<RoutedTerm> {
    let mut by_word: HashMap<String, HashSet<Field>> = HashMap::new();

    match query {
        ParsedQuery::Bag(terms) => {
            for word in terms {
                by_word.entry(word.clone()).or_default().extend(WORD_ORDER);
            }
        }
        ParsedQuery::Fielded(by_field) => {
            for (&field, terms) in by_field {
                for word in terms {
                    by_word.entry(word.clone()).or_default().insert(field);
                }
            }
        }
    }

    by_word
        .into_iter()
        .map(|(word, fields)| RoutedTerm { word, fields })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{encode_term_record, FieldCounts};
    use std::collections::HashMap as StdHashMap;
    use tempfile::tempdir;

    fn write_single_shard(config: &Config, postings: &[(&str, Vec<(u64, FieldCounts)>)]) {
        let mut lines = Vec::new();
        let mut offsets = StdHashMap::new();
        let mut offset = 0u64;
        for (word, recs) in postings {
            let line = recs
                .iter()
                .map(|(doc, counts)| encode_term_record(DocId(*doc), counts))
                .collect::<Vec<_>>()
                .join(",");
            offsets.insert(word.to_string(), offset);
            offset += line.len() as u64 + 1;
            lines.push(line);
        }
        std::fs::write(config.merged_shard_path(0), lines.join("\n") + "\n").unwrap();
        std::fs::write(config.word_offset_path(0), serde_json::to_string(&offsets).unwrap()).unwrap();
        std::fs::write(config.break_words_path(), "").unwrap();
    }

    fn counts(pairs: &[(Field, u32)]) -> FieldCounts {
        let mut c = FieldCounts::new();
        for &(field, n) in pairs {
            for _ in 0..n {
                c.increment(field);
            }
        }
        c
    }

    #[test]
    fn shard_routing_uses_bisect_left() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        std::fs::write(config.break_words_path(), "m\n").unwrap();
        let engine = SearchEngine::open(config, 10).unwrap();
        assert_eq!(engine.shard_for("apple"), 0);
        assert_eq!(engine.shard_for("m"), 0);
        assert_eq!(engine.shard_for("zoo"), 1);
    }

    #[test]
    fn ranks_by_spec_example_6() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        write_single_shard(
            &config,
            &[(
                "x",
                vec![
                    (1, counts(&[(Field::Title, 1)])),
                    (2, counts(&[(Field::Body, 4)])),
                    (3, counts(&[(Field::Infobox, 1)])),
                ],
            )],
        );
        std::fs::create_dir_all(&config.index_dir).ok();
        for batch in 0..1 {
            std::fs::write(config.title_path(batch), "1: doc one\n2: doc two\n3: doc three\n").unwrap();
        }

        let engine = SearchEngine::open(config, 100).unwrap();
        let query = ParsedQuery::Bag(vec!["x".to_string()]);
        let results = engine.search(&query).unwrap();
        assert_eq!(results, vec!["doc one", "doc two", "doc three"]);
    }

    #[test]
    fn missing_offset_for_term_yields_no_results_not_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        write_single_shard(&config, &[("x", vec![(1, counts(&[(Field::Title, 1)]))])]);
        std::fs::write(config.title_path(0), "1: doc one\n").unwrap();

        let engine = SearchEngine::open(config, 10).unwrap();
        let query = ParsedQuery::Bag(vec!["nonexistent".to_string()]);
        let results = engine.search(&query).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn missing_shard_file_is_an_error() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        std::fs::write(config.break_words_path(), "").unwrap();
        let engine = SearchEngine::open(config, 10).unwrap();
        let query = ParsedQuery::Bag(vec!["x".to_string()]);
        assert!(engine.search(&query).is_err());
    }
}
