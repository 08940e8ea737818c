use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::normalizer::Normalizer;
use crate::core::types::FieldTokens;

fn braces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{.*\}\}").unwrap())
}

fn category_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[category:(.*)\]\]").unwrap())
}

fn ref_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*title\s*=\s*([^|]*).*").unwrap())
}

fn ext_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\s*\[").unwrap())
}

const REFERENCES_MARKER: &str = "==references==";
const INFOBOX_PREFIX: &str = "{{infobox";

/// Page Parser (C2): splits raw wiki markup into the six fields in
/// WORD_ORDER (spec.md §4.2).
pub struct PageParser<'a> {
    normalizer: &'a Normalizer<'a>,
}

impl<'a> PageParser<'a> {
    pub fn new(normalizer: &'a Normalizer<'a>) -> Self {
        PageParser { normalizer }
    }

    pub fn parse(&self, raw_title: &str, raw_body: &str) -> FieldTokens {
        let body_lower = raw_body.to_lowercase();
        let mut parts = body_lower.splitn(2, REFERENCES_MARKER);
        let main = parts.next().unwrap_or("");
        let tail = parts.next();

        let (category, link, reference) = match tail {
            Some(tail) => (
                self.extract_categories(tail),
                self.extract_external_links(tail),
                self.extract_references(tail),
            ),
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let body = self.extract_body(main);
        let infobox = self.extract_infobox(main);
        let title = self.normalizer.normalize(&raw_title.to_lowercase());

        FieldTokens {
            title,
            body,
            infobox,
            category,
            link,
            reference,
        }
    }

    fn extract_body(&self, main: &str) -> Vec<String> {
        let stripped = braces_re().replace_all(main, " ");
        self.normalizer.normalize(&stripped)
    }

    fn extract_infobox(&self, main: &str) -> Vec<String> {
        let mut info = String::new();
        let mut started = false;
        for line in main.lines() {
            if line.starts_with(INFOBOX_PREFIX) {
                started = true;
                info.push(' ');
                info.push_str(&line[INFOBOX_PREFIX.len()..]);
            } else if started {
                info.push(' ');
                info.push_str(line);
                if line == "}}" {
                    started = false;
                }
            }
        }
        self.normalizer.normalize(&info)
    }

    fn extract_references(&self, tail: &str) -> Vec<String> {
        let mut refs = Vec::new();
        for line in tail.lines() {
            if line.contains("<ref") {
                match ref_title_re().captures(line) {
                    Some(caps) => refs.push(caps[1].to_string()),
                    None => refs.push(line.to_string()),
                }
            }
        }
        self.normalizer.normalize(&refs.join(" "))
    }

    fn extract_categories(&self, tail: &str) -> Vec<String> {
        let mut categories = Vec::new();
        for line in tail.lines() {
            if let Some(caps) = category_re().captures(line) {
                categories.push(caps[1].to_string());
            }
        }
        self.normalizer.normalize(&categories.join(" "))
    }

    fn extract_external_links(&self, tail: &str) -> Vec<String> {
        let mut links = Vec::new();
        for line in tail.lines() {
            if ext_link_re().is_match(line) {
                links.push(line.to_string());
            }
        }
        self.normalizer.normalize(&links.join(" "))
    }
}
