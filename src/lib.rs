//! A batch-indexed, field-weighted full-text search engine over a
//! wiki-style XML dump.
//!
//! Pipeline, end to end:
//!
//! ```text
//! XML dump --[streamer]--> batches of Pages --[indexer]--> index{k}.txt, title{k}.txt
//!                                                                |
//!                                                          [merger] (k-way merge)
//!                                                                v
//!                             mergedIndex{s}.txt, wordOffset{s}.txt, breakWords.txt
//!                                                                |
//!                            query --[query]--> routed shard lookup --[search]--> ranked titles
//! ```
//!
//! Each stage lives in its own module, named after the component it
//! implements: [`analysis`] and [`parser`] turn raw markup into field
//! tokens, [`indexer`] folds one batch of pages into an in-memory inverted
//! map and flushes it, [`streamer`] drives the XML source and hands
//! batches to the indexer, [`merger`] k-way merges segment files into
//! sharded, offset-indexed postings, and [`query`]/[`search`] parse a
//! query string and rank matching documents.

pub mod analysis;
pub mod core;
pub mod indexer;
pub mod merger;
pub mod parser;
pub mod query;
pub mod search;
pub mod streamer;

pub use core::config::Config;
pub use core::error::{Error, ErrorKind, Result};
pub use core::types::{DocId, Field, Page};
