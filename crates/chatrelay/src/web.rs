//! Link-aware prompt augmentation: find URLs in a prompt, ask the link-reader
//! service about each one, and render the answers as a text block.
pub mod format;
pub mod links;
pub mod metadata;

use tracing::{debug, info};

use self::format::format_for_prompt;
use self::links::extract_links;
use self::metadata::MetadataFetcher;

/// Label of the marker placed between a prompt and its extracted web content.
pub const EXTRACTED_CONTENT_LABEL: &str = "Extracted Web Content";

/// Build the web content block for the links in `text`.
///
/// Returns `None` when the text contains no links. Individual fetch failures
/// are rendered inline and never make this fail.
pub async fn extract_web_content(fetcher: &MetadataFetcher, text: &str) -> Option<String> {
    let links = extract_links(text);
    if links.is_empty() {
        return None;
    }

    info!("Extracting web content from {} link(s)", links.len());
    let results = fetcher.fetch_all(&links).await;
    let block = format_for_prompt(&results);
    debug!("Extracted web content:\n{}", block);

    Some(block)
}
