use std::io::BufRead;
use std::thread;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Page};
use crate::indexer::SegmentIndexer;

enum OpenTag {
    None,
    Title,
    Text,
}

/// XML Streamer and Scheduler (C4): pulls `<page>`/`<title>`/`<text>`
/// events off the dump, assigns docIds in stream order starting at 1,
/// and hands off full batches to the indexer while it keeps reading the
/// next one. At most one indexer worker runs at a time — the scheduler
/// joins batch k-1's worker before dispatching batch k (spec.md §4.4).
///
/// Returns the total number of pages seen, which doubles as N for the
/// ranker's idf computation (spec.md §4.7).
pub fn build_index<R: BufRead>(config: &Config, indexer: &SegmentIndexer, xml: R) -> Result<usize> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut next_doc_id: u64 = 1;
    let mut batch: Vec<Page> = Vec::with_capacity(config.batch_size);
    let mut batch_index = 0usize;

    let mut in_page = false;
    let mut open_tag = OpenTag::None;
    let mut cur_title = String::new();
    let mut cur_body = String::new();

    thread::scope(|scope| -> Result<()> {
        let mut worker: Option<thread::ScopedJoinHandle<Result<()>>> = None;

        let mut join_worker = |worker: &mut Option<thread::ScopedJoinHandle<Result<()>>>| -> Result<()> {
            if let Some(handle) = worker.take() {
                handle
                    .join()
                    .map_err(|_| Error::new(ErrorKind::InvalidState, "indexer worker panicked"))??;
            }
            Ok(())
        };

        let dispatch = |scope: &thread::Scope<'_, '_>, pages: Vec<Page>, idx: usize| {
            scope.spawn(move || -> Result<()> {
                eprintln!("indexing batch {idx} ({} pages)", pages.len());
                let built = indexer.index_batch(&pages);
                built.write_segment(&config.segment_path(idx))?;
                built.write_titles(&config.title_path(idx))?;
                eprintln!("batch {idx} flushed: {} words", built.postings.len());
                Ok(())
            })
        };

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"page" => {
                        in_page = true;
                        cur_title.clear();
                        cur_body.clear();
                    }
                    b"title" if in_page => open_tag = OpenTag::Title,
                    b"text" if in_page => open_tag = OpenTag::Text,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::new(ErrorKind::Parse, err.to_string()))?;
                    match open_tag {
                        OpenTag::Title => cur_title.push_str(&text),
                        OpenTag::Text => cur_body.push_str(&text),
                        OpenTag::None => {}
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"title" => open_tag = OpenTag::None,
                    b"text" => open_tag = OpenTag::None,
                    b"page" => {
                        in_page = false;
                        open_tag = OpenTag::None;
                        batch.push(Page {
                            doc_id: DocId(next_doc_id),
                            title: std::mem::take(&mut cur_title),
                            body: std::mem::take(&mut cur_body),
                        });
                        next_doc_id += 1;

                        if batch.len() >= config.batch_size {
                            let dispatched = std::mem::replace(&mut batch, Vec::with_capacity(config.batch_size));
                            join_worker(&mut worker)?;
                            worker = Some(dispatch(scope, dispatched, batch_index));
                            batch_index += 1;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(err) => return Err(Error::new(ErrorKind::Parse, err.to_string())),
                _ => {}
            }
            buf.clear();
        }

        join_worker(&mut worker)?;
        if !batch.is_empty() {
            let idx = batch_index;
            let handle = dispatch(scope, batch, idx);
            handle
                .join()
                .map_err(|_| Error::new(ErrorKind::InvalidState, "indexer worker panicked"))??;
        }
        Ok(())
    })?;

    Ok((next_doc_id - 1) as usize)
}
