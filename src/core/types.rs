use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};

/// Monotonic page identifier, assigned in XML stream order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u64);

impl DocId {
    pub fn new(id: u64) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        DocId(id)
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six fixed fields a page is split into, in WORD_ORDER (spec.md §3).
/// Order is load-bearing: it defines per-doc record tag order and the
/// iteration order the segment indexer uses when composing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Body,
    Infobox,
    Category,
    Link,
    Reference,
}

/// `t, b, i, c, l, r` in this exact order.
pub const WORD_ORDER: [Field; 6] = [
    Field::Title,
    Field::Body,
    Field::Infobox,
    Field::Category,
    Field::Link,
    Field::Reference,
];

impl Field {
    pub fn tag(self) -> char {
        match self {
            Field::Title => 't',
            Field::Body => 'b',
            Field::Infobox => 'i',
            Field::Category => 'c',
            Field::Link => 'l',
            Field::Reference => 'r',
        }
    }

    pub fn from_tag(tag: char) -> Option<Field> {
        WORD_ORDER.iter().copied().find(|f| f.tag() == tag)
    }

    /// Index into WORD_ORDER / FieldCounts, 0..6.
    pub fn ordinal(self) -> usize {
        WORD_ORDER.iter().position(|&f| f == self).unwrap()
    }
}

/// Per-field token lists produced by the page parser (C2) for one page.
#[derive(Debug, Clone, Default)]
pub struct FieldTokens {
    pub title: Vec<String>,
    pub body: Vec<String>,
    pub infobox: Vec<String>,
    pub category: Vec<String>,
    pub link: Vec<String>,
    pub reference: Vec<String>,
}

impl FieldTokens {
    pub fn get(&self, field: Field) -> &[String] {
        match field {
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::Infobox => &self.infobox,
            Field::Category => &self.category,
            Field::Link => &self.link,
            Field::Reference => &self.reference,
        }
    }
}

/// A page as it arrives off the XML stream, before field parsing.
#[derive(Debug, Clone)]
pub struct Page {
    pub doc_id: DocId,
    pub title: String,
    pub body: String,
}

/// Per-field term frequencies for a single `(docId, word)` pair (spec.md §3).
/// Only non-zero fields are carried; encoding skips the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCounts([u32; 6]);

impl FieldCounts {
    pub fn new() -> Self {
        FieldCounts([0; 6])
    }

    pub fn get(&self, field: Field) -> u32 {
        self.0[field.ordinal()]
    }

    pub fn increment(&mut self, field: Field) {
        self.0[field.ordinal()] += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }
}

/// Encodes `(docId, counts)` as `<docId><tag><count>[<tag><count>...]`,
/// e.g. `4217t1b12c2`, tags in WORD_ORDER, zero-count fields omitted.
pub fn encode_term_record(doc_id: DocId, counts: &FieldCounts) -> String {
    let mut out = doc_id.0.to_string();
    for field in WORD_ORDER {
        let count = counts.get(field);
        if count > 0 {
            out.push(field.tag());
            out.push_str(&count.to_string());
        }
    }
    out
}

/// One decoded per-doc term record: a docId plus its non-zero field counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    pub doc_id: DocId,
    pub counts: FieldCounts,
}

const TAG_CHARS: [char; 6] = ['t', 'b', 'i', 'c', 'l', 'r'];

/// Parses one per-doc record of the form `<docId><tag><count>...`.
/// The docId is the numeric prefix up to the first tag character.
pub fn parse_term_record(record: &str) -> Result<TermRecord> {
    let split_at = record
        .find(|c: char| TAG_CHARS.contains(&c))
        .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("no field tag in record '{record}'")))?;

    let (doc_part, mut rest) = record.split_at(split_at);
    let doc_id: u64 = doc_part
        .parse()
        .map_err(|_| Error::new(ErrorKind::Corrupt, format!("bad docId in record '{record}'")))?;

    let mut counts = FieldCounts::new();
    while !rest.is_empty() {
        let tag = rest
            .chars()
            .next()
            .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("truncated record '{record}'")))?;
        let field = Field::from_tag(tag)
            .ok_or_else(|| Error::new(ErrorKind::Corrupt, format!("unknown field tag '{tag}' in '{record}'")))?;
        rest = &rest[tag.len_utf8()..];

        let digits_end = rest.find(|c: char| TAG_CHARS.contains(&c)).unwrap_or(rest.len());
        let (count_str, remainder) = rest.split_at(digits_end);
        let count: u32 = count_str
            .parse()
            .map_err(|_| Error::new(ErrorKind::Corrupt, format!("bad count in record '{record}'")))?;
        if count == 0 {
            return Err(Error::new(ErrorKind::Corrupt, format!("zero count in record '{record}'")));
        }

        for _ in 0..count {
            counts.increment(field);
        }
        rest = remainder;
    }

    Ok(TermRecord {
        doc_id: DocId(doc_id),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_order_matches_tags() {
        let tags: Vec<char> = WORD_ORDER.iter().map(|f| f.tag()).collect();
        assert_eq!(tags, vec!['t', 'b', 'i', 'c', 'l', 'r']);
    }

    #[test]
    fn encodes_only_nonzero_fields() {
        let mut counts = FieldCounts::new();
        counts.increment(Field::Title);
        for _ in 0..12 {
            counts.increment(Field::Body);
        }
        counts.increment(Field::Category);
        counts.increment(Field::Category);

        assert_eq!(encode_term_record(DocId(4217), &counts), "4217t1b12c2");
    }

    #[test]
    fn round_trips_through_parse() {
        let record = parse_term_record("4217t1b12c2").unwrap();
        assert_eq!(record.doc_id, DocId(4217));
        assert_eq!(record.counts.get(Field::Title), 1);
        assert_eq!(record.counts.get(Field::Body), 12);
        assert_eq!(record.counts.get(Field::Category), 2);
        assert_eq!(record.counts.get(Field::Infobox), 0);
    }

    #[test]
    fn rejects_missing_tag() {
        assert!(parse_term_record("4217").is_err());
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(parse_term_record("42x1").is_err());
    }
}
