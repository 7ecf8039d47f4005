use engine_logging::engine_debug;
use serde::Deserialize;
use url::Url;

use crate::fetch::{get_json, parse_base_url, with_query, JsonFetchError};
use crate::{BypassError, EngineSettings, SetupError};

/// Turns an obfuscated hosting link into a direct, time-limited media URL.
#[async_trait::async_trait]
pub trait Bypass: Send + Sync {
    async fn unlock(&self, obfuscated_url: &str) -> Result<String, BypassError>;
}

#[derive(Debug, Deserialize)]
struct BypassResponse {
    #[serde(default)]
    success: bool,
    url: Option<String>,
}

/// Client for the external unlock service: `GET /?url=<obfuscated>`.
#[derive(Debug, Clone)]
pub struct BypassClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BypassClient {
    pub fn new(settings: &EngineSettings) -> Result<Self, SetupError> {
        Ok(Self {
            client: settings.api_client()?,
            base_url: parse_base_url(&settings.bypass_base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl Bypass for BypassClient {
    async fn unlock(&self, obfuscated_url: &str) -> Result<String, BypassError> {
        let obfuscated_url = obfuscated_url.trim();
        if obfuscated_url.is_empty() {
            return Err(BypassError::EmptyLink);
        }

        let url = with_query(&self.base_url, &[("url", obfuscated_url)]);
        let response: BypassResponse = get_json(&self.client, url)
            .await
            .map_err(|err| match err {
                JsonFetchError::Timeout(_) | JsonFetchError::Transport(_) => {
                    BypassError::Unavailable(err.to_string())
                }
                JsonFetchError::Status(_) | JsonFetchError::Decode(_) => {
                    BypassError::Failure(err.to_string())
                }
            })?;

        match response {
            BypassResponse {
                success: true,
                url: Some(direct),
            } if !direct.trim().is_empty() => {
                engine_debug!("bypass unlocked {}", obfuscated_url);
                Ok(direct)
            }
            BypassResponse { success: true, .. } => {
                Err(BypassError::Failure("success without a url".to_string()))
            }
            BypassResponse { success: false, .. } => {
                Err(BypassError::Failure("service reported success=false".to_string()))
            }
        }
    }
}
