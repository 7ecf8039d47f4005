use bytes::Bytes;
use engine_logging::{engine_debug, engine_warn};
use episode_core::header_safe_filename;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_DISPOSITION, CONTENT_TYPE, ORIGIN, RANGE, REFERER, USER_AGENT,
};
use reqwest::StatusCode;
use url::Url;

use crate::{EngineSettings, RelayError, RelayIdentity, SetupError};

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Play,
    Download,
}

#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub url: String,
    /// Inbound `Range` header, forwarded verbatim.
    pub range: Option<HeaderValue>,
    pub rewrite_headers: bool,
    pub mode: RelayMode,
    pub filename: String,
}

/// Where a relayed request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Streaming,
    /// Upstream answered non-2xx; its status and body are forwarded as is.
    PassthroughError,
}

pub struct RelayResponse {
    pub outcome: RelayOutcome,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
}

impl std::fmt::Debug for RelayResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayResponse")
            .field("outcome", &self.outcome)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Streams media from a direct URL, repairing the headers the origin omits.
#[derive(Debug, Clone)]
pub struct StreamRelay {
    client: reqwest::Client,
    identity: RelayIdentity,
}

impl StreamRelay {
    pub fn new(settings: &EngineSettings) -> Result<Self, SetupError> {
        // No overall timeout: a stream may legitimately run for a long time.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.request_timeout)
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))?;
        Ok(Self {
            client,
            identity: settings.relay_identity.clone(),
        })
    }

    pub async fn relay(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let url = Url::parse(&request.url)
            .map_err(|err| RelayError::InvalidUrl(format!("{}: {err}", request.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::InvalidUrl(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }
        engine_debug!("relay RECEIVED {} mode={:?}", url, request.mode);

        let mut upstream = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.identity.user_agent.as_str())
            .header(REFERER, self.identity.referer.as_str())
            .header(ORIGIN, self.identity.origin.as_str());
        if let Some(range) = &request.range {
            upstream = upstream.header(RANGE, range.clone());
        }

        engine_debug!("relay FORWARDING range={:?}", request.range);
        let response = upstream
            .send()
            .await
            .map_err(|err| RelayError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            engine_warn!("relay PASSTHROUGH_ERROR {} for {}", status, url);
            return Ok(RelayResponse {
                outcome: RelayOutcome::PassthroughError,
                status,
                headers: HeaderMap::new(),
                body: response.bytes_stream().boxed(),
            });
        }

        let mut headers = without_hop_by_hop(response.headers());
        if request.rewrite_headers {
            rewrite_headers(&mut headers, &url, request.mode, &request.filename);
        }
        engine_debug!("relay STREAMING {}", status);

        Ok(RelayResponse {
            outcome: RelayOutcome::Streaming,
            status,
            headers,
            body: response.bytes_stream().boxed(),
        })
    }
}

/// Applies the header repairs of rewrite mode to a successful response.
pub fn rewrite_headers(headers: &mut HeaderMap, url: &Url, mode: RelayMode, filename: &str) {
    insert_cors_headers(headers);

    match mode {
        RelayMode::Download => {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            let disposition = format!(
                "attachment; filename=\"{}\"",
                header_safe_filename(filename)
            );
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(CONTENT_DISPOSITION, value);
            }
        }
        RelayMode::Play => {
            if !headers.contains_key(CONTENT_TYPE) {
                if let Some(content_type) = infer_content_type(url) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
            }
        }
    }
}

pub fn insert_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,HEAD,OPTIONS"),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
}

/// Content type implied by the URL path's extension, for the few media
/// kinds the relay serves.
pub fn infer_content_type(url: &Url) -> Option<&'static str> {
    let path = url.path().to_ascii_lowercase();
    if path.ends_with(".jpg") {
        Some("image/jpeg")
    } else if path.ends_with(".png") {
        Some("image/png")
    } else if path.ends_with(".mp4") {
        Some("video/mp4")
    } else {
        None
    }
}

fn without_hop_by_hop(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers
}
