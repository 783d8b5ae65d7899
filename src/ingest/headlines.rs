//! Raw markup → cleaned text → representative headlines.
//!
//! Search result pages render each story as a block of lines closed by a
//! "More" control; the first line of every block is its headline.

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::Html;

/// Line that closes a headline block.
pub const BLOCK_SENTINEL: &str = "More";

/// Strip tags, one text run per line, whitespace collapsed, blank lines dropped.
/// Script/style contents are skipped.
pub fn clean_html(markup: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));

    let doc = Html::parse_document(markup);
    let mut lines = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if hidden {
            continue;
        }
        for line in text.lines() {
            let line = re_ws.replace_all(line.trim(), " ");
            if !line.is_empty() {
                lines.push(line.into_owned());
            }
        }
    }
    lines.join("\n")
}

/// Headlines in original order: the first line of every block.
pub fn headline_set(cleaned_text: &str) -> Vec<String> {
    let mut headlines = Vec::new();
    let mut current_block: Vec<&str> = Vec::new();

    for line in cleaned_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line == BLOCK_SENTINEL {
            if let Some(first) = current_block.first() {
                headlines.push((*first).to_string());
            }
            current_block.clear();
        } else {
            current_block.push(line);
        }
    }
    // Unterminated trailing block still counts.
    if let Some(first) = current_block.first() {
        headlines.push((*first).to_string());
    }
    headlines
}

/// [`headline_set`] joined by newlines.
pub fn extract_headlines(cleaned_text: &str) -> String {
    headline_set(cleaned_text).join("\n")
}
