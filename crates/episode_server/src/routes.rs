use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use engine_logging::{engine_debug, engine_warn};
use episode_core::{download_filename, EpisodeResolution, Msg, DEFAULT_DOWNLOAD_FILENAME};
use episode_engine::{insert_cors_headers, RelayError, RelayMode, RelayRequest, ResolveError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::form_urlencoded;

use crate::app::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/proxy", get(proxy).options(proxy_preflight))
        .route("/sources", get(sources))
        .route("/harvest", get(harvest_status).post(start_harvest))
        .with_state(state)
}

fn failure(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "status": false, "error": error }))).into_response()
}

/// Flags such as `modify` count as set whenever they appear in the query.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    #[serde(rename = "proxyUrl")]
    pub proxy_url: Option<String>,
    pub modify: Option<String>,
    pub download: Option<String>,
    pub filename: Option<String>,
    pub title: Option<String>,
    pub episode: Option<String>,
}

impl ProxyQuery {
    fn mode(&self) -> RelayMode {
        if self.download.is_some() {
            RelayMode::Download
        } else {
            RelayMode::Play
        }
    }

    fn filename(&self) -> String {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        if self.title.is_some() || self.episode.is_some() {
            download_filename(self.title.as_deref(), self.episode.as_deref())
        } else {
            DEFAULT_DOWNLOAD_FILENAME.to_string()
        }
    }
}

async fn proxy(
    State(state): State<ServerState>,
    Query(query): Query<ProxyQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(url) = query.proxy_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "missing proxyUrl");
    };

    let request = RelayRequest {
        url: url.to_string(),
        range: headers.get(header::RANGE).cloned(),
        rewrite_headers: query.modify.is_some(),
        mode: query.mode(),
        filename: query.filename(),
    };

    match state.engine.relay.relay(request).await {
        Ok(relayed) => {
            let mut response = Response::new(Body::from_stream(relayed.body));
            *response.status_mut() = relayed.status;
            *response.headers_mut() = relayed.headers;
            response
        }
        Err(err @ RelayError::InvalidUrl(_)) => {
            engine_debug!("rejecting relay request: {}", err);
            failure(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(err @ RelayError::Upstream(_)) => {
            engine_warn!("relay failed: {}", err);
            failure(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    }
}

async fn proxy_preflight() -> Response {
    let mut headers = HeaderMap::new();
    insert_cors_headers(&mut headers);
    (StatusCode::NO_CONTENT, headers).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SourcesQuery {
    pub session: Option<String>,
    pub ep: Option<String>,
    pub title: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Serialize)]
struct SourcesBody {
    status: bool,
    default: usize,
    sources: Vec<SourceView>,
}

#[derive(Debug, Serialize)]
struct SourceView {
    quality: String,
    direct_url: String,
    stream_url: String,
    download_url: String,
}

async fn sources(State(state): State<ServerState>, Query(query): Query<SourcesQuery>) -> Response {
    let (Some(session), Some(ep)) = (
        query.session.as_deref().filter(|s| !s.is_empty()),
        query.ep.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return failure(StatusCode::BAD_REQUEST, "missing session or ep");
    };

    let resolution = state
        .engine
        .resolver
        .resolve_episode(state.engine.catalog.as_ref(), session, ep)
        .await;

    match resolution {
        Ok(resolution) => {
            Json(sources_body(&state.public_base_url, &resolution, &query)).into_response()
        }
        Err(ResolveError::NoLinks) => failure(StatusCode::NOT_FOUND, "no_links"),
        Err(ResolveError::NoSourcesResolved { .. }) => {
            failure(StatusCode::BAD_GATEWAY, "no_sources_resolved")
        }
        Err(ResolveError::Catalog(err)) => {
            engine_warn!("sources for {}/{}: {}", session, ep, err);
            failure(StatusCode::SERVICE_UNAVAILABLE, "catalog_unavailable")
        }
    }
}

fn sources_body(base: &str, resolution: &EpisodeResolution, query: &SourcesQuery) -> SourcesBody {
    let sources = resolution
        .sources()
        .iter()
        .map(|source| SourceView {
            quality: source.quality_label.clone(),
            direct_url: source.direct_url.clone(),
            stream_url: relay_url(base, &source.direct_url, RelayMode::Play, query),
            download_url: relay_url(base, &source.direct_url, RelayMode::Download, query),
        })
        .collect();
    SourcesBody {
        status: true,
        default: 0,
        sources,
    }
}

/// Relay URL for a direct media link, always in rewrite mode.
pub fn relay_url(base: &str, direct_url: &str, mode: RelayMode, query: &SourcesQuery) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("proxyUrl", direct_url);
    let mut url = format!("{base}/proxy?{}&modify", params.finish());

    if mode == RelayMode::Download {
        url.push_str("&download");
        let mut extra = form_urlencoded::Serializer::new(String::new());
        if let Some(title) = &query.title {
            extra.append_pair("title", title);
        }
        if let Some(episode) = &query.episode {
            extra.append_pair("episode", episode);
        }
        let extra = extra.finish();
        if !extra.is_empty() {
            url.push('&');
            url.push_str(&extra);
        }
    }
    url
}

#[derive(Debug, Deserialize)]
pub struct HarvestRequest {
    pub session: String,
    pub title: Option<String>,
    pub total_pages: Option<u32>,
}

async fn start_harvest(
    State(state): State<ServerState>,
    Json(request): Json<HarvestRequest>,
) -> Response {
    if request.session.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "missing session");
    }

    let effects = state.harvest.dispatch(Msg::HarvestRequested {
        series_session: request.session,
        series_title: request.title,
        total_pages: request.total_pages,
    });
    if effects.is_empty() {
        return failure(StatusCode::CONFLICT, "harvest_running");
    }
    (StatusCode::ACCEPTED, Json(json!({ "status": true }))).into_response()
}

async fn harvest_status(State(state): State<ServerState>) -> Response {
    Json(state.harvest.view()).into_response()
}
