//! Stage A+B demo: stream an XML dump, index it in batches, then merge the
//! resulting segments into the final sharded index (spec.md §4.4, §4.5).
//!
//! The CLI surface itself (arg parsing, exit codes) is out of scope per
//! spec.md §1/§6 — this just wires the library calls a real entry point
//! would make.

use std::fs::File;
use std::io::BufReader;

use wikidex::analysis::normalizer::Normalizer;
use wikidex::analysis::stemmer::PorterEnglishStemmer;
use wikidex::analysis::stopwords::EnglishStopWords;
use wikidex::core::config::Config;
use wikidex::indexer::SegmentIndexer;
use wikidex::merger;
use wikidex::streamer::build_index;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let xml_dump_path = args.next().ok_or("usage: build_index <xmlDumpPath> <indexFolder>")?;
    let index_folder = args.next().ok_or("usage: build_index <xmlDumpPath> <indexFolder>")?;

    let config = Config::new(&index_folder);
    std::fs::create_dir_all(&config.index_dir)?;

    let stemmer = PorterEnglishStemmer::new();
    let stop_words = EnglishStopWords::new();
    let normalizer = Normalizer::new(&stemmer, &stop_words);
    let indexer = SegmentIndexer::new(&normalizer);

    let xml = BufReader::new(File::open(&xml_dump_path)?);
    let total_docs = build_index(&config, &indexer, xml)?;
    let segment_count = total_docs.div_ceil(config.batch_size);

    eprintln!("streamed {total_docs} pages into {segment_count} segments, merging...");
    merger::merge(&config, segment_count)?;
    eprintln!("build complete: {index_folder}");

    Ok(())
}
