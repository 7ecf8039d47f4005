use std::time::Duration;

use episode_core::CandidateLink;
use episode_engine::{
    Bypass, BypassClient, BypassError, Catalog, CatalogClient, CatalogError, EngineSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> EngineSettings {
    EngineSettings {
        catalog_base_url: server.uri(),
        bypass_base_url: server.uri(),
        request_timeout: Duration::from_millis(500),
        ..EngineSettings::default()
    }
}

#[tokio::test]
async fn bypass_returns_direct_url_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("url", "https://kwik.example/f/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "url": "https://cdn.example/abc.mp4?token=1"
        })))
        .mount(&server)
        .await;

    let client = BypassClient::new(&settings_for(&server)).expect("client");
    let direct = client
        .unlock("https://kwik.example/f/abc")
        .await
        .expect("unlocked");
    assert_eq!(direct, "https://cdn.example/abc.mp4?token=1");
}

#[tokio::test]
async fn bypass_reports_failure_for_unsuccessful_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let client = BypassClient::new(&settings_for(&server)).expect("client");
    let err = client.unlock("https://kwik.example/f/x").await.unwrap_err();
    assert!(matches!(err, BypassError::Failure(_)));
}

#[tokio::test]
async fn bypass_reports_failure_for_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = BypassClient::new(&settings_for(&server)).expect("client");
    let err = client.unlock("https://kwik.example/f/x").await.unwrap_err();
    assert!(matches!(err, BypassError::Failure(_)));
}

#[tokio::test]
async fn bypass_reports_unavailable_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({ "success": true, "url": "https://cdn.example/a.mp4" })),
        )
        .mount(&server)
        .await;

    let settings = EngineSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let client = BypassClient::new(&settings).expect("client");
    let err = client.unlock("https://kwik.example/f/x").await.unwrap_err();
    assert!(matches!(err, BypassError::Unavailable(_)));
}

#[tokio::test]
async fn bypass_rejects_empty_link_without_calling_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = BypassClient::new(&settings_for(&server)).expect("client");
    assert_eq!(client.unlock("  ").await, Err(BypassError::EmptyLink));
}

#[tokio::test]
async fn catalog_lists_episodes_with_numeric_or_text_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "series"))
        .and(query_param("session", "series-1"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "episodes": [
                { "episode": 13, "session": "ep-13", "snapshot": "https://img.example/13.jpg" },
                { "episode": "13.5", "session": "ep-13-5" },
                { "session": "ep-x" }
            ],
            "last_page": 4
        })))
        .mount(&server)
        .await;

    let catalog = CatalogClient::new(&settings_for(&server)).expect("client");
    let page = catalog.episode_page("series-1", 2).await.expect("page");

    let labels: Vec<_> = page.episodes.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["13", "13.5", "ep-x"]);
    assert_eq!(page.total_pages, Some(4));
    assert_eq!(page.episodes[0].session, "ep-13");
}

#[tokio::test]
async fn catalog_candidates_preserve_listing_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "episode"))
        .and(query_param("session", "series-1"))
        .and(query_param("ep", "ep-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "SubsPlease · 360p", "link": "https://kwik.example/f/360" },
            { "name": "SubsPlease · 1080p", "link": "https://kwik.example/f/1080" }
        ])))
        .mount(&server)
        .await;

    let catalog = CatalogClient::new(&settings_for(&server)).expect("client");
    let candidates = catalog.candidates("series-1", "ep-1").await.expect("links");
    assert_eq!(
        candidates,
        vec![
            CandidateLink::new("SubsPlease · 360p", "https://kwik.example/f/360"),
            CandidateLink::new("SubsPlease · 1080p", "https://kwik.example/f/1080"),
        ]
    );
}

#[tokio::test]
async fn catalog_without_links_is_empty_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "episode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "none" })))
        .mount(&server)
        .await;

    let catalog = CatalogClient::new(&settings_for(&server)).expect("client");
    let candidates = catalog.candidates("series-1", "ep-1").await.expect("links");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn catalog_transport_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let catalog = CatalogClient::new(&settings_for(&server)).expect("client");
    let err = catalog.episode_page("series-1", 1).await.unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
}
