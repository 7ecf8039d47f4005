use episode_core::{HarvestEntry, HarvestProgress, JobId};
use thiserror::Error;

/// Failure to unlock one obfuscated link. Never fatal beyond its quality.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BypassError {
    /// The service answered, but with a failing status or `success: false`.
    #[error("bypass failed: {0}")]
    Failure(String),
    /// The service could not be reached or timed out.
    #[error("bypass service unavailable: {0}")]
    Unavailable(String),
    #[error("empty obfuscated link")]
    EmptyLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Why an episode has nothing to play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The catalog lists no links for the episode.
    #[error("episode has no links")]
    NoLinks,
    /// Links exist, but every bypass failed.
    #[error("no sources resolved from {candidates} candidate links")]
    NoSourcesResolved { candidates: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The relay could not obtain any upstream response.
///
/// A non-2xx upstream answer is not an error; it is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
    #[error("upstream unreachable: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("http client: {0}")]
    Client(String),
}

/// Progress of one batch harvest, in the order the harvester produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    Started {
        total_pages: u32,
    },
    PageStarted {
        page: u32,
        progress: HarvestProgress,
    },
    /// Emitted once per page after every episode task of the page finished.
    PageCompleted {
        page: u32,
        entries: Vec<HarvestEntry>,
        failed_episodes: usize,
        progress: HarvestProgress,
    },
    PageSkipped {
        page: u32,
        reason: String,
        progress: HarvestProgress,
    },
    /// Terminal status: the number of harvested episodes.
    Finished {
        harvested: usize,
        progress: HarvestProgress,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Harvest { job_id: JobId, event: HarvestEvent },
    HarvestFailed { job_id: JobId, reason: String },
}
