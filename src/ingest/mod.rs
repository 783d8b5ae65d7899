// src/ingest/mod.rs
//! Content acquisition: admission control, search URLs, the fallback fetch
//! chain, retry discipline and headline extraction.

pub mod admission;
pub mod fallback;
pub mod headlines;
pub mod providers;
pub mod retry;
pub mod types;
pub mod search_url;

pub use admission::AdmissionController;
pub use fallback::FallbackFetcher;
pub use headlines::{clean_html, extract_headlines, headline_set};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use types::{FetchAttemptResult, FetchStage, FetchStrategy};
pub use search_url::{build_search_url, topic_from_url};
