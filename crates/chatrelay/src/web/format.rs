use super::metadata::MetadataResult;

/// Longest content body, in characters, that goes into the prompt per URL.
pub const MAX_CONTENT_CHARS: usize = 3000;

const TRUNCATION_MARKER: &str = "...";
const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// Render metadata results as one block an LLM can read.
///
/// Entries keep their input order and are separated by a horizontal rule.
/// Failed fetches contribute only their error text.
pub fn format_for_prompt(results: &[MetadataResult]) -> String {
    results
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

fn format_entry(result: &MetadataResult) -> String {
    if let Some(error) = &result.error {
        return error.clone();
    }

    let content = result.content.trim();
    let mut entry = format!("URL: {}", result.url);

    if let Some(title) = content.lines().next() {
        entry.push_str(&format!("\nTitle: {}", title));
    }
    if let Some(likes) = marker_value(content, "Likes: ") {
        entry.push_str(&format!("\nLikes: {}", likes));
    }
    if let Some(views) = marker_value(content, "Views: ") {
        entry.push_str(&format!("\nViews: {}", views));
    }
    if let Some(summary) = result.summary.as_deref().filter(|s| !s.is_empty()) {
        entry.push_str(&format!("\nSummary: {}", summary));
    }
    if !content.is_empty() {
        entry.push_str(&format!("\n\nExtracted Content:\n{}", truncate(content)));
    }

    entry
}

/// First word after the last occurrence of `marker`, unless it is `N/A`.
fn marker_value<'a>(content: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = content.rsplit_once(marker)?;
    rest.split_whitespace().next().filter(|value| *value != "N/A")
}

/// Clip to [`MAX_CONTENT_CHARS`] characters, marking the cut.
pub fn truncate(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::metadata::MetadataError;

    fn ok(url: &str, content: &str, summary: Option<&str>) -> MetadataResult {
        MetadataResult {
            url: url.to_string(),
            content: content.to_string(),
            summary: summary.map(String::from),
            error: None,
        }
    }

    #[test]
    fn test_full_entry() {
        let result = ok(
            "https://video.example/watch",
            "Cat video\nLikes: 1.2K Views: 30K\nA cat plays piano.",
            Some("A cat, a piano"),
        );

        assert_eq!(
            format_for_prompt(&[result]),
            "URL: https://video.example/watch\n\
             Title: Cat video\n\
             Likes: 1.2K\n\
             Views: 30K\n\
             Summary: A cat, a piano\n\
             \n\
             Extracted Content:\n\
             Cat video\nLikes: 1.2K Views: 30K\nA cat plays piano."
        );
    }

    #[test]
    fn test_not_available_counters_are_suppressed() {
        let result = ok("https://x.example", "Post\nLikes: N/A\nViews: N/A", None);

        // The raw counters stay in the content body, only the labeled fields go
        assert_eq!(
            format_for_prompt(&[result]),
            "URL: https://x.example\n\
             Title: Post\n\
             \n\
             Extracted Content:\n\
             Post\nLikes: N/A\nViews: N/A"
        );
    }

    #[test]
    fn test_error_entry_has_no_structured_fields() {
        let result = MetadataResult {
            url: "https://private.example".to_string(),
            error: Some(
                "Unfortunately, I could not extract any data from that URL: https://private.example"
                    .to_string(),
            ),
            ..Default::default()
        };

        assert_eq!(
            format_for_prompt(&[result]),
            "Unfortunately, I could not extract any data from that URL: https://private.example"
        );
    }

    #[test]
    fn test_empty_content_only_has_url() {
        let result = ok("https://empty.example", "   ", Some(""));
        assert_eq!(format_for_prompt(&[result]), "URL: https://empty.example");
    }

    #[test]
    fn test_entries_are_separated_in_order() {
        let results = vec![
            ok("https://one.example", "One", None),
            MetadataResult::failed(
                "https://two.example",
                &MetadataError::Decode("bad json".to_string()),
            ),
            ok("https://three.example", "Three", None),
        ];
        let text = format_for_prompt(&results);
        let parts: Vec<&str> = text.split("\n\n---\n\n").collect();

        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("URL: https://one.example"));
        assert_eq!(parts[1], "Invalid metadata response: bad json");
        assert!(parts[2].starts_with("URL: https://three.example"));
    }

    #[test]
    fn test_truncation_boundary() {
        let exact = "a".repeat(MAX_CONTENT_CHARS);
        assert_eq!(truncate(&exact), exact);

        let long = "b".repeat(MAX_CONTENT_CHARS + 1);
        let clipped = truncate(&long);
        assert_eq!(clipped.len(), MAX_CONTENT_CHARS + TRUNCATION_MARKER.len());
        assert!(clipped.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "é".repeat(MAX_CONTENT_CHARS + 10);
        let clipped = truncate(&long);
        assert_eq!(
            clipped.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.len()
        );
    }
}
