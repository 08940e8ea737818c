//! Stage C demo: read queries from stdin, one per line, and print the
//! ranked titles for each (spec.md §4.6, §4.7).
//!
//! `N` (total pages) and the interactive-search CLI shell itself (prompt,
//! SIGINT handling) are external collaborators per spec.md §6 — this shows
//! only the library call sequence a real entry point would make.

use std::io::{self, BufRead, Write};

use wikidex::analysis::normalizer::Normalizer;
use wikidex::analysis::stemmer::PorterEnglishStemmer;
use wikidex::analysis::stopwords::EnglishStopWords;
use wikidex::core::config::Config;
use wikidex::query::parse_query;
use wikidex::search::SearchEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let index_folder = args.next().ok_or("usage: search_cli <indexFolder> <totalDocs>")?;
    let total_docs: usize = args
        .next()
        .ok_or("usage: search_cli <indexFolder> <totalDocs>")?
        .parse()?;

    let config = Config::new(&index_folder);
    let engine = SearchEngine::open(config, total_docs)?;

    let stemmer = PorterEnglishStemmer::new();
    let stop_words = EnglishStopWords::new();
    let normalizer = Normalizer::new(&stemmer, &stop_words);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let query = parse_query(&line, &normalizer);
        let titles = engine.search(&query)?;
        for title in titles {
            writeln!(out, "{title}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}
