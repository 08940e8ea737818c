use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::normalizer::Normalizer;
use crate::core::types::Field;

fn fielded_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(title|body|infobox|category|ref|link):").unwrap())
}

/// Maps a field name token (`title`, `body`, `infobox`, `category`, `ref`,
/// `link`) to its tag (spec.md §4.6). Unknown names return `None`; callers
/// drop the terms that would have been attributed to them (spec.md §7 case 6).
fn field_for_name(name: &str) -> Option<Field> {
    match name {
        "title" => Some(Field::Title),
        "body" => Some(Field::Body),
        "infobox" => Some(Field::Infobox),
        "category" => Some(Field::Category),
        "ref" => Some(Field::Reference),
        "link" => Some(Field::Link),
        _ => None,
    }
}

/// Query Parser (C6) output: a free-text bag of normalized terms searched
/// across all six fields, or a field-to-terms map from a `field:term...`
/// query where each term list only searches its declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    Bag(Vec<String>),
    Fielded(HashMap<Field, Vec<String>>),
}

/// Parses `raw` per spec.md §4.6: fielded if it matches
/// `^(title|body|infobox|category|ref|link):`, otherwise a bag query over
/// the whole normalized string.
pub fn parse_query(raw: &str, normalizer: &Normalizer) -> ParsedQuery {
    if fielded_prefix_re().is_match(raw) {
        ParsedQuery::Fielded(parse_fielded(raw, normalizer))
    } else {
        ParsedQuery::Bag(normalizer.normalize(raw))
    }
}

/// Splits `raw` on `:`. The first segment names the first field. Every
/// subsequent segment's whitespace-tokens belong to the CURRENT field,
/// except — unless the segment is the last one — its final whitespace-token
/// instead names the NEXT field (spec.md §4.6).
fn parse_fielded(raw: &str, normalizer: &Normalizer) -> HashMap<Field, Vec<String>> {
    let segments: Vec<&str> = raw.split(':').collect();
    let mut by_field: HashMap<Field, Vec<String>> = HashMap::new();
    let mut current_field = field_for_name(segments[0].trim());

    for (i, segment) in segments.iter().enumerate().skip(1) {
        let tokens: Vec<&str> = segment.split_whitespace().collect();
        let is_last = i == segments.len() - 1;

        let (terms, next_field_name) = if is_last {
            (tokens.as_slice(), None)
        } else {
            match tokens.split_last() {
                Some((next, rest)) => (rest, Some(*next)),
                None => (tokens.as_slice(), None),
            }
        };

        if let Some(field) = current_field {
            if !terms.is_empty() {
                let normalized = normalizer.normalize(&terms.join(" "));
                by_field.entry(field).or_default().extend(normalized);
            }
        }

        if let Some(name) = next_field_name {
            current_field = field_for_name(name);
        }
    }

    by_field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stemmer::PorterEnglishStemmer;
    use crate::analysis::stopwords::EnglishStopWords;

    fn normalizer() -> (PorterEnglishStemmer, EnglishStopWords) {
        (PorterEnglishStemmer::new(), EnglishStopWords::new())
    }

    #[test]
    fn bag_query_normalizes_whole_string() {
        let (stemmer, stop_words) = normalizer();
        let normalizer = Normalizer::new(&stemmer, &stop_words);
        match parse_query("running dogs", &normalizer) {
            ParsedQuery::Bag(terms) => assert_eq!(terms, vec!["run".to_string(), "dog".to_string()]),
            other => panic!("expected bag query, got {other:?}"),
        }
    }

    #[test]
    fn fielded_query_matches_spec_example_5() {
        let (stemmer, stop_words) = normalizer();
        let normalizer = Normalizer::new(&stemmer, &stop_words);
        match parse_query("title: quantum body: physics", &normalizer) {
            ParsedQuery::Fielded(fields) => {
                assert_eq!(fields.get(&Field::Title).unwrap(), &vec!["quantum".to_string()]);
                assert_eq!(fields.get(&Field::Body).unwrap(), &vec!["physic".to_string()]);
            }
            other => panic!("expected fielded query, got {other:?}"),
        }
    }

    #[test]
    fn fielded_query_with_single_field_and_multiple_terms() {
        let (stemmer, stop_words) = normalizer();
        let normalizer = Normalizer::new(&stemmer, &stop_words);
        match parse_query("category: river lake ocean", &normalizer) {
            ParsedQuery::Fielded(fields) => {
                assert_eq!(
                    fields.get(&Field::Category).unwrap(),
                    &vec!["river".to_string(), "lake".to_string(), "ocean".to_string()]
                );
            }
            other => panic!("expected fielded query, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_name_drops_its_terms() {
        let (stemmer, stop_words) = normalizer();
        let normalizer = Normalizer::new(&stemmer, &stop_words);
        match parse_query("title: alpha bogus: beta body: gamma", &normalizer) {
            ParsedQuery::Fielded(fields) => {
                assert_eq!(fields.get(&Field::Title).unwrap(), &vec!["alpha".to_string()]);
                assert_eq!(fields.get(&Field::Body).unwrap(), &vec!["gamma".to_string()]);
                assert!(!fields.values().any(|terms| terms.iter().any(|t| t == "beta")));
            }
            other => panic!("expected fielded query, got {other:?}"),
        }
    }
}
