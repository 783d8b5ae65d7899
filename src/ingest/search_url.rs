// src/ingest/search_url.rs
use url::{form_urlencoded, Url};

pub const SEARCH_BASE: &str = "https://news.google.com/search";

/// Search URL for a topic, newest first. The topic is form-encoded, so it can
/// never add or override query parameters.
pub fn build_search_url(topic: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", topic)
        .append_pair("tbs", "sbd:1")
        .finish();
    format!("{SEARCH_BASE}?{query}")
}

/// Recover the topic from a URL built by [`build_search_url`].
pub fn topic_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
