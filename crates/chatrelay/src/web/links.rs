use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"https?://[^\s]+").unwrap();
}

/// Extract every http(s) URL from free text.
///
/// - A URL runs until the next whitespace character.
/// - Results are in order of appearance.
/// - Duplicates are kept; a URL mentioned twice is fetched twice.
pub fn extract_links(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
