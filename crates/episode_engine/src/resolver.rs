use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use episode_core::{CandidateLink, EpisodeResolution, ResolvedSource};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

use crate::{Bypass, BypassError, Catalog, EngineSettings, ResolveError};

/// Resolves every candidate quality of one episode concurrently.
///
/// Outbound bypass calls share one limiter, so the cap holds across all
/// episodes resolved through clones of the same resolver.
#[derive(Clone)]
pub struct SourceResolver {
    bypass: Arc<dyn Bypass>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl SourceResolver {
    pub fn new(bypass: Arc<dyn Bypass>, settings: &EngineSettings) -> Self {
        Self {
            bypass,
            permits: Arc::new(Semaphore::new(settings.bypass_concurrency.max(1))),
            timeout: settings.resolver_timeout,
        }
    }

    /// Unlocks all candidates and ranks the successes.
    ///
    /// Calls still pending when the resolver timeout elapses are abandoned;
    /// successes collected so far are kept.
    pub async fn resolve(
        &self,
        candidates: &[CandidateLink],
    ) -> Result<EpisodeResolution, ResolveError> {
        if candidates.is_empty() {
            return Err(ResolveError::NoLinks);
        }

        let deadline = Instant::now() + self.timeout;
        let mut slots: Vec<Option<ResolvedSource>> = vec![None; candidates.len()];
        let mut pending: FuturesUnordered<_> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| async move { (index, self.unlock(candidate).await) })
            .collect();

        loop {
            match timeout_at(deadline, pending.next()).await {
                Ok(Some((index, Ok(direct_url)))) => {
                    slots[index] = Some(ResolvedSource::from_candidate(
                        &candidates[index],
                        direct_url,
                    ));
                }
                Ok(Some((index, Err(err)))) => {
                    engine_warn!(
                        "dropping quality '{}': {}",
                        candidates[index].quality_label,
                        err
                    );
                }
                Ok(None) => break,
                Err(_) => {
                    engine_warn!(
                        "resolver timeout after {:?}; abandoning {} bypass calls",
                        self.timeout,
                        pending.len()
                    );
                    break;
                }
            }
        }

        // Slots are in candidate order, which drives duplicate elimination.
        let resolution = EpisodeResolution::from_ordered_successes(slots.into_iter().flatten());
        if resolution.is_empty() {
            return Err(ResolveError::NoSourcesResolved {
                candidates: candidates.len(),
            });
        }
        engine_debug!(
            "resolved {}/{} qualities, default '{}'",
            resolution.len(),
            candidates.len(),
            resolution
                .default_source()
                .map(|s| s.quality_label.as_str())
                .unwrap_or_default()
        );
        Ok(resolution)
    }

    /// Playback path: fetch one episode's links, then resolve them.
    pub async fn resolve_episode(
        &self,
        catalog: &dyn Catalog,
        series_session: &str,
        episode_session: &str,
    ) -> Result<EpisodeResolution, ResolveError> {
        let candidates = catalog
            .candidates(series_session, episode_session)
            .await?;
        self.resolve(&candidates).await
    }

    async fn unlock(&self, candidate: &CandidateLink) -> Result<String, BypassError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| BypassError::Unavailable("bypass limiter closed".to_string()))?;
        self.bypass.unlock(&candidate.obfuscated_url).await
    }
}
