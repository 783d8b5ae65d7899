// tests/http_clients.rs
//
// Real HTTP clients (direct fetch, unlocking proxy, chat completions, TTS)
// against small axum servers bound to 127.0.0.1.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use shuttle_axum::axum::{
    self,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use news_briefing::ingest::providers::{DirectFetch, ProxyFetch};
use news_briefing::ingest::FetchStrategy;
use news_briefing::llm::{ChatMessage, GenerationRequest, OpenAiCompatClient, TextGenerator};
use news_briefing::speech::{GoogleTranslateTts, SpeechEngine};

/// What a handler saw: the Authorization header and the JSON body.
type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn auth(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn capture_and_reply(
    State((seen, status, reply)): State<(Seen, StatusCode, Value)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.lock().unwrap().push((auth(&headers), body));
    (status, Json(reply))
}

async fn unlock(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> &'static str {
    seen.lock().unwrap().push((auth(&headers), body));
    "<html><body><p>Unlocked story</p></body></html>"
}

// --- direct fetch ---

#[tokio::test]
async fn direct_fetch_returns_page_body() {
    let app = Router::new().route(
        "/search",
        get(|| async { "<html><body><p>Port strike ends</p><p>More</p></body></html>" }),
    );
    let base = serve(app).await;

    let direct = DirectFetch::new(5).unwrap();
    let body = direct.attempt(&format!("{base}/search?q=ports")).await.unwrap();
    assert!(body.contains("Port strike ends"));
}

#[tokio::test]
async fn direct_fetch_non_success_status_is_a_failure() {
    let app = Router::new().route(
        "/search",
        get(|| async { (StatusCode::FORBIDDEN, "<html><body>blocked</body></html>") }),
    );
    let base = serve(app).await;

    let direct = DirectFetch::new(5).unwrap();
    let err = direct.attempt(&format!("{base}/search")).await.unwrap_err();
    assert!(err.to_string().contains("403"), "{err:#}");
}

// --- unlocking proxy ---

#[tokio::test]
async fn proxy_posts_zone_url_and_raw_format_with_bearer_key() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/request", post(unlock))
        .with_state(seen.clone());
    let base = serve(app).await;

    let proxy =
        ProxyFetch::new(format!("{base}/request"), "unlock-key", "web_unlocker1", 5).unwrap();
    let target = "https://news.google.com/search?q=ports&hl=en-US";
    let body = proxy.attempt(target).await.unwrap();
    assert!(body.contains("Unlocked story"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (authorization, sent) = &seen[0];
    assert_eq!(authorization.as_deref(), Some("Bearer unlock-key"));
    assert_eq!(
        sent,
        &json!({ "zone": "web_unlocker1", "url": target, "format": "raw" })
    );
}

#[tokio::test]
async fn proxy_error_status_is_a_failure() {
    let app = Router::new().route(
        "/request",
        post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
    );
    let base = serve(app).await;

    let proxy = ProxyFetch::new(format!("{base}/request"), "k", "z", 5).unwrap();
    let err = proxy.attempt("https://example.com").await.unwrap_err();
    assert!(err.to_string().contains("401"), "{err:#}");
}

// --- chat completions ---

#[tokio::test]
async fn chat_completion_request_and_reply_mapping() {
    let seen: Seen = Arc::default();
    let reply = json!({
        "id": "cmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": "  Markets rallied today.\n" } }]
    });
    let app = Router::new()
        .route("/v1/chat/completions", post(capture_and_reply))
        .with_state((seen.clone(), StatusCode::OK, reply));
    let base = serve(app).await;

    let client = OpenAiCompatClient::new(
        format!("{base}/v1/chat/completions"),
        "gen-key",
        "llama-3.1-8b-instant",
        5,
    )
    .unwrap();
    let req = GenerationRequest::new(
        vec![
            ChatMessage::system("You are a news editor."),
            ChatMessage::user("Summarize the markets."),
        ],
        0.4,
        800,
    );
    let text = client.generate(req).await.unwrap();
    assert_eq!(text, "Markets rallied today.");

    let seen = seen.lock().unwrap();
    let (authorization, sent) = &seen[0];
    assert_eq!(authorization.as_deref(), Some("Bearer gen-key"));
    assert_eq!(sent["model"], "llama-3.1-8b-instant");
    assert_eq!(sent["max_tokens"], 800);
    assert_eq!(sent["stream"], false);
    assert!((sent["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    assert_eq!(
        sent["messages"],
        json!([
            { "role": "system", "content": "You are a news editor." },
            { "role": "user", "content": "Summarize the markets." }
        ])
    );
}

#[tokio::test]
async fn chat_completion_error_carries_status_and_body() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(capture_and_reply))
        .with_state((
            seen.clone(),
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "model overloaded" }),
        ));
    let base = serve(app).await;

    let client =
        OpenAiCompatClient::new(format!("{base}/v1/chat/completions"), "gen-key", "m", 5).unwrap();
    let err = client
        .generate(GenerationRequest::new(vec![ChatMessage::user("hi")], 0.4, 10))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("503"), "{err}");
    assert!(err.contains("model overloaded"), "{err}");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_completion_without_key_never_calls_the_service() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(capture_and_reply))
        .with_state((seen.clone(), StatusCode::OK, json!({ "choices": [] })));
    let base = serve(app).await;

    let client =
        OpenAiCompatClient::new(format!("{base}/v1/chat/completions"), "  ", "m", 5).unwrap();
    let err = client
        .generate(GenerationRequest::new(vec![ChatMessage::user("hi")], 0.4, 10))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not configured"));
    assert!(seen.lock().unwrap().is_empty());
}

// --- text to speech ---

#[tokio::test]
async fn tts_chunks_are_requested_and_concatenated_in_order() {
    let queries: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
    let app = Router::new()
        .route(
            "/translate_tts",
            get(
                |State(seen): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
                 Query(q): Query<HashMap<String, String>>| async move {
                    let chunk = format!("<{}>", q.get("idx").cloned().unwrap_or_default());
                    seen.lock().unwrap().push(q);
                    chunk
                },
            ),
        )
        .with_state(queries.clone());
    let base = serve(app).await;

    let tts = GoogleTranslateTts::new()
        .unwrap()
        .with_endpoint(format!("{base}/translate_tts"));
    let script = "Markets opened higher this morning after the overnight rally in Asia. \
                  Oil prices held steady. Analysts expect a quiet session ahead of the rate decision.";
    let audio = tts.synthesize(script, "de").await.unwrap();

    let queries = queries.lock().unwrap();
    assert!(queries.len() >= 2, "script longer than one chunk");
    let expected: String = (0..queries.len()).map(|i| format!("<{i}>")).collect();
    assert_eq!(String::from_utf8(audio).unwrap(), expected);

    let total = queries.len().to_string();
    let mut rebuilt = Vec::new();
    for q in queries.iter() {
        assert_eq!(q["tl"], "de");
        assert_eq!(q["client"], "tw-ob");
        assert_eq!(q["total"], total);
        assert!(q["q"].chars().count() <= 100);
        rebuilt.push(q["q"].clone());
    }
    assert_eq!(rebuilt.join(" "), script.split_whitespace().collect::<Vec<_>>().join(" "));
}

#[tokio::test]
async fn tts_error_status_fails_the_synthesis() {
    let app = Router::new().route(
        "/translate_tts",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let base = serve(app).await;

    let tts = GoogleTranslateTts::new()
        .unwrap()
        .with_endpoint(format!("{base}/translate_tts"));
    let err = tts.synthesize("Short script.", "en").await.unwrap_err();
    assert!(format!("{err:#}").contains("429"), "{err:#}");
}
