use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use episode_engine::{Engine, EngineSettings};
use episode_server::{router, ServerState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::form_urlencoded::byte_serialize;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Services {
    catalog: MockServer,
    bypass: MockServer,
}

impl Services {
    async fn start() -> Self {
        Self {
            catalog: MockServer::start().await,
            bypass: MockServer::start().await,
        }
    }

    fn state(&self) -> ServerState {
        let settings = EngineSettings {
            catalog_base_url: self.catalog.uri(),
            bypass_base_url: self.bypass.uri(),
            request_timeout: Duration::from_secs(2),
            resolver_timeout: Duration::from_secs(2),
            ..EngineSettings::default()
        };
        ServerState::new(Engine::new(&settings).expect("engine"), "")
    }

    async fn links(&self, episode: &str, links: Value) {
        Mock::given(method("GET"))
            .and(query_param("method", "episode"))
            .and(query_param("ep", episode))
            .respond_with(ResponseTemplate::new(200).set_body_json(links))
            .mount(&self.catalog)
            .await;
    }

    async fn unlocks(&self, obfuscated: &str, direct: &str) {
        Mock::given(method("GET"))
            .and(query_param("url", obfuscated))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "url": direct })),
            )
            .mount(&self.bypass)
            .await;
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

async fn get(state: ServerState, uri: &str) -> Response {
    router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn proxy_without_url_is_a_bad_request() {
    let services = Services::start().await;
    let response = get(services.state(), "/proxy?modify").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["status"], json!(false));
}

#[tokio::test]
async fn proxy_download_names_the_file_after_series_and_episode() {
    let services = Services::start().await;
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "video/mp4")
                .set_body_bytes(b"media".to_vec()),
        )
        .mount(&origin)
        .await;

    let uri = format!(
        "/proxy?proxyUrl={}&modify&download&title={}&episode=3",
        encode(&format!("{}/v.mp4", origin.uri())),
        encode("My/Anime: S1"),
    );
    let response = get(services.state(), &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My_Anime_S1_3.mp4\""
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"media");
}

#[tokio::test]
async fn proxy_forwards_range_requests() {
    let services = Services::start().await;
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::header("Range", "bytes=0-3"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "bytes 0-3/10")
                .set_body_bytes(b"abcd".to_vec()),
        )
        .mount(&origin)
        .await;

    let request = Request::builder()
        .uri(format!(
            "/proxy?proxyUrl={}&modify",
            encode(&format!("{}/clip.mp4", origin.uri()))
        ))
        .header(header::RANGE, "bytes=0-3")
        .body(Body::empty())
        .unwrap();
    let response = router(services.state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 0-3/10");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
}

#[tokio::test]
async fn proxy_passes_upstream_errors_through_and_reports_unreachable_hosts() {
    let services = Services::start().await;
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("expired token"))
        .mount(&origin)
        .await;

    let uri = format!("/proxy?proxyUrl={}&modify", encode(&origin.uri()));
    let response = get(services.state(), &uri).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"expired token");

    let uri = format!("/proxy?proxyUrl={}", encode("http://127.0.0.1:1/a.mp4"));
    let response = get(services.state(), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn proxy_preflight_is_permissive() {
    let services = Services::start().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/proxy")
        .body(Body::empty())
        .unwrap();
    let response = router(services.state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET,POST,HEAD,OPTIONS"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");
}

#[tokio::test]
async fn sources_lists_ranked_qualities_with_relay_urls() {
    let services = Services::start().await;
    services
        .links(
            "e1",
            json!([
                { "name": "720p", "link": "https://kwik.example/720" },
                { "name": "1080p", "link": "https://kwik.example/1080" },
            ]),
        )
        .await;
    services
        .unlocks("https://kwik.example/720", "https://cdn.example/720.mp4")
        .await;
    services
        .unlocks("https://kwik.example/1080", "https://cdn.example/1080.mp4")
        .await;

    let response = get(
        services.state(),
        "/sources?session=s1&ep=e1&title=My%20Anime&episode=3",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["status"], json!(true));
    assert_eq!(body["default"], json!(0));
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["quality"], json!("1080p"));
    assert_eq!(sources[0]["direct_url"], json!("https://cdn.example/1080.mp4"));
    assert_eq!(
        sources[0]["stream_url"],
        json!("/proxy?proxyUrl=https%3A%2F%2Fcdn.example%2F1080.mp4&modify")
    );
    assert_eq!(
        sources[0]["download_url"],
        json!(
            "/proxy?proxyUrl=https%3A%2F%2Fcdn.example%2F1080.mp4&modify&download&title=My+Anime&episode=3"
        )
    );
    assert_eq!(sources[1]["quality"], json!("720p"));
}

#[tokio::test]
async fn sources_distinguishes_missing_links_from_failed_bypass() {
    let services = Services::start().await;
    services.links("empty", json!({ "message": "not ready" })).await;
    services
        .links("blocked", json!([{ "name": "720p", "link": "https://kwik.example/x" }]))
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&services.bypass)
        .await;

    let response = get(services.state(), "/sources?session=s1&ep=empty").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], json!("no_links"));

    let response = get(services.state(), "/sources?session=s1&ep=blocked").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["error"], json!("no_sources_resolved"));
}

#[tokio::test]
async fn sources_reports_catalog_outage() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&services.catalog)
        .await;

    let response = get(services.state(), "/sources?session=s1&ep=e1").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], json!("catalog_unavailable"));
}

#[tokio::test]
async fn harvest_runs_in_background_and_rejects_a_second_start() {
    let services = Services::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(json!({
                    "episodes": [{ "episode": 1, "session": "e1" }],
                    "last_page": 1
                })),
        )
        .mount(&services.catalog)
        .await;
    services
        .links("e1", json!([{ "name": "1080p", "link": "https://kwik.example/1" }]))
        .await;
    services
        .unlocks("https://kwik.example/1", "https://cdn.example/1.mp4")
        .await;

    let app = router(services.state());
    let start = || {
        Request::builder()
            .method(Method::POST)
            .uri("/harvest")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "session": "s1", "title": "Show" }).to_string()))
            .unwrap()
    };

    let response = app.clone().oneshot(start()).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let response = app.clone().oneshot(start()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let mut snapshot = Value::Null;
    for _ in 0..100 {
        let request = Request::builder().uri("/harvest").body(Body::empty()).unwrap();
        snapshot = json_body(app.clone().oneshot(request).await.unwrap()).await;
        if snapshot["session"] == json!("finished") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(snapshot["session"], json!("finished"));
    assert_eq!(snapshot["phase_label"], json!("Complete!"));
    assert_eq!(snapshot["percent"], json!(100.0));
    assert_eq!(snapshot["series_title"], json!("Show"));
    assert_eq!(snapshot["entries"], json!(["1: https://cdn.example/1.mp4"]));
}
