use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};

/// Splits one segment line `word: [rec1,rec2,...]` into the word and its
/// bracketed postings fragment, stripped of the brackets (spec.md §4.5).
fn parse_segment_line(line: &str) -> Result<(String, String)> {
    let (word, rest) = line
        .split_once(':')
        .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("missing ':' in segment line '{line}'")))?;
    let rest = rest.trim();
    let fragment = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("missing '[]' in segment line '{line}'")))?;
    Ok((word.trim().to_string(), fragment.to_string()))
}

/// Reads the next line out of segment file `idx`, if it's still open.
/// On EOF, closes and deletes the segment file (spec.md §3 lifecycle).
fn refill(
    config: &Config,
    readers: &mut [Option<BufReader<File>>],
    pending: &mut BTreeMap<String, Vec<(usize, String)>>,
    idx: usize,
) -> Result<()> {
    let reader = match readers[idx].as_mut() {
        Some(reader) => reader,
        None => return Ok(()),
    };

    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        readers[idx] = None;
        std::fs::remove_file(config.segment_path(idx))?;
        return Ok(());
    }

    let trimmed = line.trim_end_matches('\n');
    let (word, fragment) = parse_segment_line(trimmed).map_err(|err| {
        Error::new(
            ErrorKind::Corrupt,
            format!("{} (in {})", err.context, config.segment_path(idx).display()),
        )
    })?;
    pending.entry(word).or_default().push((idx, fragment));
    Ok(())
}

fn write_shard(
    config: &Config,
    shard: usize,
    lines: &[String],
    offsets: &HashMap<String, u64>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(config.merged_shard_path(shard))?);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    let json = serde_json::to_string(offsets)?;
    std::fs::write(config.word_offset_path(shard), json)?;
    Ok(())
}

fn write_break_words(config: &Config, break_words: &[String]) -> Result<()> {
    let mut out = BufWriter::new(File::create(config.break_words_path())?);
    for word in break_words {
        writeln!(out, "{word}")?;
    }
    out.flush()?;
    Ok(())
}

/// External Merger (C5): k-way merges `segment_count` segment files into
/// sharded, offset-indexed merged index files, deleting each segment as
/// it drains (spec.md §4.5).
pub fn merge(config: &Config, segment_count: usize) -> Result<()> {
    let mut readers: Vec<Option<BufReader<File>>> = Vec::with_capacity(segment_count);
    for k in 0..segment_count {
        readers.push(Some(BufReader::new(File::open(config.segment_path(k))?)));
    }

    let mut pending: BTreeMap<String, Vec<(usize, String)>> = BTreeMap::new();
    let mut next_files: Vec<usize> = (0..segment_count).collect();

    let mut shard_lines: Vec<String> = Vec::new();
    let mut shard_offsets: HashMap<String, u64> = HashMap::new();
    let mut byte_offset: u64 = 0;
    let mut word_count: usize = 0;
    let mut shard_index = 0usize;
    let mut break_words: Vec<String> = Vec::new();
    // The word a shard rotation just finished on. Recorded as a break word
    // only once a further word actually arrives for the next shard — if the
    // stream ends right on a shard boundary, there is no next shard to
    // route past it into, so it must not be counted (spec.md §3/§9: M-1
    // break words for M shards, never M).
    let mut pending_break_word: Option<String> = None;

    loop {
        for &idx in &next_files {
            refill(config, &mut readers, &mut pending, idx)?;
        }

        if pending.is_empty() {
            if readers.iter().all(Option::is_none) {
                break;
            }
            // Every still-open file already has a buffered word waiting in
            // `pending` per the refill/emit invariant below; this branch is
            // a defensive fallback that should not trigger in practice.
            next_files = (0..segment_count).filter(|&i| readers[i].is_some()).collect();
            continue;
        }

        if let Some(word) = pending_break_word.take() {
            break_words.push(word);
        }

        let word = pending.keys().next().expect("checked non-empty above").clone();
        let mut fragments = pending.remove(&word).expect("word came from pending.keys()");
        // Preserve ascending docId order: fragments must be joined in
        // file-index order, not the order files happened to contribute to
        // `pending` this tick, since segment k's docIds are strictly less
        // than segment k+1's (spec.md §3/§4.5's ordering invariant).
        fragments.sort_by_key(|(idx, _)| *idx);
        let postings_csv = fragments
            .iter()
            .map(|(_, fragment)| fragment.as_str())
            .collect::<Vec<_>>()
            .join(",");

        shard_offsets.insert(word.clone(), byte_offset);
        byte_offset += postings_csv.len() as u64 + 1;
        shard_lines.push(postings_csv);
        word_count += 1;
        next_files = fragments.into_iter().map(|(idx, _)| idx).collect();

        if word_count % config.shard_words == 0 {
            write_shard(config, shard_index, &shard_lines, &shard_offsets)?;
            pending_break_word = Some(word);
            shard_index += 1;
            shard_lines.clear();
            shard_offsets.clear();
            byte_offset = 0;
        }
    }

    if !shard_lines.is_empty() {
        write_shard(config, shard_index, &shard_lines, &shard_offsets)?;
    }

    write_break_words(config, &break_words)
}
