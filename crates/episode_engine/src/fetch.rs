use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::SetupError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Identification headers the media host expects on every relayed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayIdentity {
    pub user_agent: String,
    pub referer: String,
    pub origin: String,
}

impl Default for RelayIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://animepahe.si/".to_string(),
            origin: "https://animepahe.si".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub catalog_base_url: String,
    pub bypass_base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound on one episode's whole bypass fan-out.
    pub resolver_timeout: Duration,
    /// Cap on bypass calls in flight across every resolution.
    pub bypass_concurrency: usize,
    /// Episodes of one catalog page resolved at the same time.
    pub episode_workers: usize,
    pub relay_identity: RelayIdentity,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catalog_base_url: "http://127.0.0.1:3000".to_string(),
            bypass_base_url: "http://127.0.0.1:3001".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            resolver_timeout: Duration::from_secs(45),
            bypass_concurrency: 8,
            episode_workers: 4,
            relay_identity: RelayIdentity::default(),
        }
    }
}

impl EngineSettings {
    pub(crate) fn api_client(&self) -> Result<reqwest::Client, SetupError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, SetupError> {
    Url::parse(raw).map_err(|err| SetupError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })
}

/// Base URL with the given query pairs appended.
pub(crate) fn with_query(base: &Url, pairs: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

#[derive(Debug, Error)]
pub(crate) enum JsonFetchError {
    #[error("timeout: {0}")]
    Timeout(reqwest::Error),
    #[error("network error: {0}")]
    Transport(reqwest::Error),
    #[error("http status {0}")]
    Status(reqwest::StatusCode),
    #[error("undecodable payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for JsonFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JsonFetchError::Timeout(err)
        } else {
            JsonFetchError::Transport(err)
        }
    }
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<T, JsonFetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(JsonFetchError::Status(status));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| JsonFetchError::Decode(err.to_string()))
}
