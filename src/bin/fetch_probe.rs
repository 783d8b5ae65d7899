//! Probe that runs the fallback fetcher and headline extractor for each topic
//! given on the command line, printing the stage used and the headlines found.
//!
//!     cargo run --bin fetch_probe -- "artificial intelligence" climate

use news_briefing::config::BriefingConfig;
use news_briefing::ingest::{
    build_search_url, clean_html, headline_set, AdmissionController, FallbackFetcher,
};
use news_briefing::llm::build_text_generator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let topics: Vec<String> = std::env::args().skip(1).collect();
    if topics.is_empty() {
        eprintln!("usage: fetch_probe <topic> [topic ...]");
        std::process::exit(2);
    }

    let cfg = BriefingConfig::load()?;
    let admission = AdmissionController::per_second(cfg.fetch.rate_per_sec);
    let fetcher = FallbackFetcher::from_config(&cfg, build_text_generator(&cfg)?)?;
    println!("stages: {:?}", fetcher.stages());

    for topic in &topics {
        let url = build_search_url(topic);
        let result = fetcher.fetch(&admission, topic, &url).await;
        let headlines = headline_set(&clean_html(&result.raw_text));

        println!(
            "\n== {topic} ({}, success={}, {} bytes)",
            result.stage.as_str(),
            result.success,
            result.raw_text.len()
        );
        if headlines.is_empty() {
            println!("   (no headlines found)");
        }
        for h in headlines.iter().take(10) {
            println!("   - {h}");
        }
    }

    println!("\nfetch-probe done");
    Ok(())
}
