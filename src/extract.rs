//! Reference extraction from markdown and plain text
//!
//! Two passes per line: markdown `[label](url)` links first, then bare URLs
//! on the line with the markdown spans stripped out.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// One URL occurrence in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub url: String,
    /// 1-based line in the source document
    pub line_number: usize,
    /// Display text for markdown links, empty for bare URLs
    pub link_text: String,
}

/// Extract unique references with line numbers, first sighting wins.
/// Only http/https URLs are recognized.
pub fn extract_references(content: &str) -> Vec<Reference> {
    let md_link_re = Regex::new(r"\[([^\]]*)\]\((https?://[^\s)]+)\)").unwrap();
    // No lookbehind in the regex crate: a URL preceded by '(' is leftover
    // markdown syntax and is skipped via the leading group.
    let bare_url_re = Regex::new(r#"(^|[^(])(https?://[^\s)\]>]+)"#).unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut refs = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;

        for cap in md_link_re.captures_iter(line) {
            let url = clean_url(&cap[2]);
            if seen.insert(url.clone()) {
                refs.push(Reference {
                    url,
                    line_number,
                    link_text: cap[1].to_string(),
                });
            }
        }

        let stripped = md_link_re.replace_all(line, "");
        for cap in bare_url_re.captures_iter(&stripped) {
            let url = clean_url(&cap[2]);
            if seen.insert(url.clone()) {
                refs.push(Reference {
                    url,
                    line_number,
                    link_text: String::new(),
                });
            }
        }
    }

    refs
}

/// Trim the trailing punctuation that prose tends to glue onto URLs.
fn clean_url(url: &str) -> String {
    url.trim_end_matches(['.', ',', ';', ':']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_and_bare_urls() {
        let content = "See [docs](https://example.com/a/b) and also https://example.com/c.";
        let refs = extract_references(content);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].url, "https://example.com/a/b");
        assert_eq!(refs[0].link_text, "docs");
        assert_eq!(refs[0].line_number, 1);
        assert_eq!(refs[1].url, "https://example.com/c");
        assert_eq!(refs[1].link_text, "");
    }

    #[test]
    fn test_line_numbers() {
        let content = "intro\n\nhttps://one.example.org\ntext [x](https://two.example.org) text\n";
        let refs = extract_references(content);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].line_number, 3);
        assert_eq!(refs[1].line_number, 4);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let content = "[first](https://dup.example.com)\nbare https://dup.example.com here\n";
        let refs = extract_references(content);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].link_text, "first");
        assert_eq!(refs[0].line_number, 1);
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        let refs =
            extract_references("Visit https://example.com/page;, then https://example.org:.");
        assert_eq!(refs[0].url, "https://example.com/page");
        assert_eq!(refs[1].url, "https://example.org");
    }

    #[test]
    fn test_non_http_schemes_ignored() {
        let refs = extract_references(
            "ftp://files.example.com mailto:x@example.com [m](mailto:y@example.com)",
        );
        assert!(refs.is_empty());
    }

    #[test]
    fn test_query_string_is_part_of_identity() {
        let content = "https://example.com/p?q=1 and https://example.com/p?q=2";
        let refs = extract_references(content);
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_empty_link_text_markdown() {
        let refs = extract_references("[](https://example.com/anon)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].link_text, "");
    }
}
