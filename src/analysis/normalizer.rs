use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::stemmer::Stemmer;
use crate::analysis::stopwords::StopWords;

/// Permissive URL matcher covering alphanumerics, `$-_@.&+!*(),` and `%hh`
/// escapes (spec.md §4.1 step 2).
fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)https?://(?:[a-zA-Z0-9]|[$\-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+").unwrap()
    })
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&nbsp;|&lt;|&gt;|&amp;|&quot;|&apos;").unwrap())
}

/// `@~—%$'|.*[]:;,{}()=+-_#!`"?/><&\` plus U+2013 and newline (spec.md §4.1
/// step 4). Checked as a plain character set rather than a regex class
/// since several of these characters are regex metacharacters.
const PUNCTUATION: &[char] = &[
    '@', '~', '\u{2014}', '%', '$', '\'', '|', '.', '*', '[', ']', ':', ';', ',', '{', '}', '(',
    ')', '=', '+', '-', '_', '#', '!', '`', '"', '?', '/', '>', '<', '&', '\\', '\u{2013}', '\n',
];

/// Text Normalizer (C1): URL/entity/punctuation stripping, ASCII fold,
/// tokenize, stop-word drop, stem.
pub struct Normalizer<'a> {
    stemmer: &'a dyn Stemmer,
    stop_words: &'a dyn StopWords,
}

impl<'a> Normalizer<'a> {
    pub fn new(stemmer: &'a dyn Stemmer, stop_words: &'a dyn StopWords) -> Self {
        Normalizer { stemmer, stop_words }
    }

    /// Runs the full spec.md §4.1 pipeline over `text`, producing normalized
    /// tokens. Case-folding happens entirely upstream of this call (spec.md
    /// §4.2: pages are lowercased before field extraction), so this does not
    /// lowercase on its own.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let ascii: String = text.bytes().filter(|b| b.is_ascii()).map(|b| b as char).collect();
        let no_urls = url_re().replace_all(&ascii, " ");
        let no_entities = entity_re().replace_all(&no_urls, " ");
        let scrubbed: String = no_entities
            .chars()
            .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
            .collect();

        scrubbed
            .split_whitespace()
            .filter(|tok| !tok.is_empty())
            .filter(|tok| !self.stop_words.is_stop_word(tok))
            .map(|tok| self.stemmer.stem(tok))
            .collect()
    }
}
