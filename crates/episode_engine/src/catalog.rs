use episode_core::CandidateLink;
use serde::Deserialize;
use url::Url;

use crate::fetch::{get_json, parse_base_url, with_query};
use crate::{CatalogError, EngineSettings, SetupError};

/// One episode as listed on a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeListing {
    pub label: String,
    pub session: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EpisodePage {
    pub episodes: Vec<EpisodeListing>,
    /// Page count advertised by the catalog, when present.
    pub total_pages: Option<u32>,
}

/// Catalog service: paginated episode listings and per-episode quality links.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    async fn episode_page(
        &self,
        series_session: &str,
        page: u32,
    ) -> Result<EpisodePage, CatalogError>;

    /// Candidate links in catalog order. An empty list is a valid answer.
    async fn candidates(
        &self,
        series_session: &str,
        episode_session: &str,
    ) -> Result<Vec<CandidateLink>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    episodes: Vec<EpisodeDto>,
    total_pages: Option<u32>,
    last_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EpisodeDto {
    episode: Option<EpisodeNumber>,
    session: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EpisodeNumber {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct LinkDto {
    name: String,
    link: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinksResponse {
    Links(Vec<LinkDto>),
    // Anything but a list means the episode has no links yet.
    Other(serde_json::Value),
}

impl From<EpisodeDto> for EpisodeListing {
    fn from(dto: EpisodeDto) -> Self {
        let label = match dto.episode {
            Some(EpisodeNumber::Number(number)) => number.to_string(),
            Some(EpisodeNumber::Text(text)) if !text.trim().is_empty() => text.trim().to_string(),
            _ => dto.session.clone(),
        };
        Self {
            label,
            session: dto.session,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(settings: &EngineSettings) -> Result<Self, SetupError> {
        Ok(Self {
            client: settings.api_client()?,
            base_url: parse_base_url(&settings.catalog_base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl Catalog for CatalogClient {
    async fn episode_page(
        &self,
        series_session: &str,
        page: u32,
    ) -> Result<EpisodePage, CatalogError> {
        let page_param = page.to_string();
        let url = with_query(
            &self.base_url,
            &[
                ("method", "series"),
                ("session", series_session),
                ("page", &page_param),
            ],
        );
        let response: SeriesResponse = get_json(&self.client, url)
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        Ok(EpisodePage {
            episodes: response.episodes.into_iter().map(Into::into).collect(),
            total_pages: response.total_pages.or(response.last_page),
        })
    }

    async fn candidates(
        &self,
        series_session: &str,
        episode_session: &str,
    ) -> Result<Vec<CandidateLink>, CatalogError> {
        let url = with_query(
            &self.base_url,
            &[
                ("method", "episode"),
                ("session", series_session),
                ("ep", episode_session),
            ],
        );
        let response: LinksResponse = get_json(&self.client, url)
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        Ok(match response {
            LinksResponse::Links(links) => links
                .into_iter()
                .map(|dto| CandidateLink::new(dto.name, dto.link))
                .collect(),
            LinksResponse::Other(_) => Vec::new(),
        })
    }
}
