use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use finder_app::config::AppConfig;
use finder_app::routes::{router, AppState};
use finder_app::server::build_state;
use finder_core::{Dispatcher, Job, JobRegistry, SearchService, DEFAULT_MAX_URLS};
use tokio::runtime::Handle;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Jobs handed to the test dispatcher; tests complete them by hand.
type Parked = Arc<Mutex<Vec<Arc<Job>>>>;

struct ParkingDispatcher(Parked);

impl Dispatcher for ParkingDispatcher {
    fn dispatch(&self, job: Arc<Job>) {
        self.0.lock().unwrap().push(job);
    }
}

fn parked_app(max_body_bytes: usize) -> (Router, Parked) {
    let parked = Parked::default();
    let service = SearchService::new(
        Arc::new(JobRegistry::new()),
        Arc::new(ParkingDispatcher(parked.clone())),
        DEFAULT_MAX_URLS,
    );
    (router(AppState { service }, max_body_bytes), parked)
}

fn form_request(query: &str) -> Request<Body> {
    let body = format!("query={}", urlencode(query));
    Request::post("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

fn init_logging() {
    engine_logging::initialize_for_tests();
}

#[tokio::test]
async fn form_page_is_served() {
    init_logging();
    let (app, _) = parked_app(1000);
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("<form action=\"/\" method=\"post\">"));
    assert!(text.contains("name=\"query\""));
}

#[tokio::test]
async fn form_submission_registers_a_pending_job() {
    init_logging();
    let (app, parked) = parked_app(1000);

    let response = app
        .clone()
        .oneshot(form_request(
            r#"{"Search": "hello", "URLs": ["https://a.example.com/"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/url/0"));
    assert_eq!(parked.lock().unwrap().len(), 1);

    let response = app.clone().oneshot(get("/url/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Processing not finished"));

    let job = parked.lock().unwrap()[0].clone();
    job.record_outcome("https://a.example.com/", true).unwrap();

    let response = app.oneshot(get("/url/0")).await.unwrap();
    let text = body_text(response).await;
    assert!(text.contains("Search phrase: hello."));
    assert!(text.contains("<a href=\"https://a.example.com/\">"));
}

#[tokio::test]
async fn invalid_form_submission_is_rejected() {
    init_logging();
    let (app, parked) = parked_app(1000);

    for query in [
        "",
        "{broken",
        r#"{"Search": "", "URLs": ["https://a.example.com/"]}"#,
        r#"{"Search": "hello", "URLs": []}"#,
    ] {
        let response = app.clone().oneshot(form_request(query)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query:?}");
    }
    assert!(parked.lock().unwrap().is_empty());

    let response = app.oneshot(get("/result/check")).await.unwrap();
    assert!(body_text(response).await.contains("No requests yet."));
}

#[tokio::test]
async fn oversized_body_is_refused() {
    init_logging();
    let (app, parked) = parked_app(64);
    let urls: Vec<String> = (0..10).map(|i| format!("\"https://a{i}.example.com/\"")).collect();
    let query = format!(r#"{{"Search": "hello", "URLs": [{}]}}"#, urls.join(","));

    let response = app.oneshot(form_request(&query)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(parked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    init_logging();
    let (app, _) = parked_app(1000);
    for uri in ["/url/0", "/url/-1", "/url/abc", "/api/jobs/3", "/result/other"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn listing_shows_jobs_in_submission_order() {
    init_logging();
    let (app, _) = parked_app(1000);
    for (phrase, count) in [("alpha", 1), ("beta", 2), ("gamma", 3)] {
        let urls: Vec<String> = (0..count)
            .map(|i| format!("\"https://{phrase}{i}.example.com/\""))
            .collect();
        let body = format!(r#"{{"phrase": "{phrase}", "urls": [{}]}}"#, urls.join(","));
        let response = app
            .clone()
            .oneshot(json_request("/api/jobs", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.clone().oneshot(get("/api/jobs")).await.unwrap();
    let listing: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let rows = listing["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for (i, (phrase, count)) in [("alpha", 1), ("beta", 2), ("gamma", 3)].iter().enumerate() {
        assert_eq!(rows[i]["id"], i);
        assert_eq!(rows[i]["phrase"], *phrase);
        assert_eq!(rows[i]["url_count"], *count);
        assert_eq!(rows[i]["complete"], false);
    }

    let response = app.oneshot(get("/result/check")).await.unwrap();
    let text = body_text(response).await;
    let alpha = text.find("alpha").unwrap();
    let beta = text.find("beta").unwrap();
    let gamma = text.find("gamma").unwrap();
    assert!(alpha < beta && beta < gamma);
    assert!(text.contains("<a href=\"/url/2\">"));
}

#[tokio::test]
async fn api_rejects_invalid_submission_with_json_error() {
    init_logging();
    let (app, _) = parked_app(1000);
    let response = app
        .oneshot(json_request("/api/jobs", r#"{"phrase": "hello", "urls": []}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid input"));
}

#[tokio::test]
async fn api_reports_unreadable_json_as_invalid_input() {
    init_logging();
    let (app, parked) = parked_app(1000);
    for body in [
        r#"{"phrase": 5, "urls": ["https://a.example.com/"]}"#,
        r#"{"phrase": "x""#,
    ] {
        let response = app
            .clone()
            .oneshot(json_request("/api/jobs", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let error: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(
            error["error"].as_str().unwrap().starts_with("invalid input"),
            "body {body:?}"
        );
    }
    assert!(parked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn api_keeps_payload_too_large_status() {
    init_logging();
    let (app, parked) = parked_app(64);
    let urls: Vec<String> = (0..10).map(|i| format!("\"https://a{i}.example.com/\"")).collect();
    let body = format!(r#"{{"phrase": "hello", "urls": [{}]}}"#, urls.join(","));

    let response = app.oneshot(json_request("/api/jobs", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(parked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn api_accepts_a_whitespace_phrase() {
    init_logging();
    let (app, parked) = parked_app(1000);
    let response = app
        .oneshot(json_request(
            "/api/jobs",
            r#"{"phrase": " ", "urls": ["https://a.example.com/"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(parked.lock().unwrap()[0].phrase(), " ");
}

#[tokio::test]
async fn favicon_is_short_circuited() {
    let (app, _) = parked_app(1000);
    let response = app.oneshot(get("/favicon.ico")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn submitted_job_completes_against_real_fetches() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("say hello"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no"))
        .respond_with(ResponseTemplate::new(200).set_body_string("say nothing"))
        .mount(&server)
        .await;

    let config = AppConfig::default();
    let app = router(build_state(&config, Handle::current()).unwrap(), config.max_body_bytes);
    let yes = format!("{}/yes", server.uri());
    let no = format!("{}/no", server.uri());
    let body = format!(r#"{{"phrase": "hello", "urls": ["{yes}", "{no}"]}}"#);

    let response = app
        .clone()
        .oneshot(json_request("/api/jobs", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut status = serde_json::Value::Null;
    for _ in 0..200 {
        let response = app.clone().oneshot(get("/api/jobs/0")).await.unwrap();
        status = serde_json::from_str(&body_text(response).await).unwrap();
        if status["status"] == "complete" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(status["status"], "complete");
    assert_eq!(status["matched"], serde_json::json!([yes]));
}
