use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use episode_core::{HarvestEntry, HarvestProgress};
use futures_util::stream::{self, StreamExt};

use crate::catalog::EpisodeListing;
use crate::{Catalog, CatalogError, EngineSettings, HarvestEvent, ResolveError, SourceResolver};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestReport {
    /// Catalog page order, then in-page episode order.
    pub entries: Vec<HarvestEntry>,
    pub skipped_pages: Vec<u32>,
    pub failed_episodes: usize,
}

/// Walks a series' catalog pages and collects the best direct link of
/// every episode.
///
/// Pages are processed one after another; the episodes of a page are
/// resolved by a fixed number of workers.
#[derive(Clone)]
pub struct BatchHarvester {
    catalog: Arc<dyn Catalog>,
    resolver: SourceResolver,
    episode_workers: usize,
}

impl BatchHarvester {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        resolver: SourceResolver,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            catalog,
            resolver,
            episode_workers: settings.episode_workers.max(1),
        }
    }

    /// Reads the page count advertised by the first catalog page.
    pub async fn discover_total_pages(&self, series_session: &str) -> Result<u32, CatalogError> {
        let first = self.catalog.episode_page(series_session, 1).await?;
        Ok(first.total_pages.unwrap_or(1))
    }

    /// Harvests pages `1..=total_pages`. Failed pages and episodes are
    /// reported as omissions; the harvest itself always completes.
    pub async fn harvest(
        &self,
        series_session: &str,
        total_pages: u32,
        sink: &dyn ProgressSink,
    ) -> HarvestReport {
        let mut report = HarvestReport::default();
        let mut progress = HarvestProgress::new(total_pages);
        sink.emit(HarvestEvent::Started { total_pages });

        for page in 1..=total_pages {
            progress.start_page(page);
            sink.emit(HarvestEvent::PageStarted {
                page,
                progress: progress.clone(),
            });

            let listing = match self.catalog.episode_page(series_session, page).await {
                Ok(listing) => listing,
                Err(err) => {
                    engine_warn!("skipping page {}/{}: {}", page, total_pages, err);
                    report.skipped_pages.push(page);
                    progress.complete_page(page);
                    sink.emit(HarvestEvent::PageSkipped {
                        page,
                        reason: err.to_string(),
                        progress: progress.clone(),
                    });
                    continue;
                }
            };

            let (entries, failed_episodes) =
                self.harvest_page(series_session, listing.episodes).await;
            engine_info!(
                "page {}/{}: {} harvested, {} failed",
                page,
                total_pages,
                entries.len(),
                failed_episodes
            );

            // The page is sealed here; nothing from it is visible earlier.
            report.entries.extend(entries.iter().cloned());
            report.failed_episodes += failed_episodes;
            progress.complete_page(page);
            sink.emit(HarvestEvent::PageCompleted {
                page,
                entries,
                failed_episodes,
                progress: progress.clone(),
            });
        }

        progress.finish();
        engine_info!(
            "harvest of {} finished: {} links, {} pages skipped",
            series_session,
            report.entries.len(),
            report.skipped_pages.len()
        );
        sink.emit(HarvestEvent::Finished {
            harvested: report.entries.len(),
            progress,
        });
        report
    }

    async fn harvest_page(
        &self,
        series_session: &str,
        episodes: Vec<EpisodeListing>,
    ) -> (Vec<HarvestEntry>, usize) {
        // Workers own their inputs so the harvest future stays `Send` when spawned.
        // `buffered` yields results in listing order regardless of completion order.
        let outcomes: Vec<Option<HarvestEntry>> = stream::iter(episodes)
            .map(|episode| {
                let this = self.clone();
                let series_session = series_session.to_string();
                async move { this.harvest_episode(&series_session, &episode).await }
            })
            .buffered(self.episode_workers)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|outcome| outcome.is_none()).count();
        (outcomes.into_iter().flatten().collect(), failed)
    }

    async fn harvest_episode(
        &self,
        series_session: &str,
        episode: &EpisodeListing,
    ) -> Option<HarvestEntry> {
        let resolution = self
            .resolver
            .resolve_episode(self.catalog.as_ref(), series_session, &episode.session)
            .await;

        match resolution {
            Ok(resolution) => {
                let best = resolution.default_source()?;
                engine_debug!("episode {} -> {}", episode.label, best.quality_label);
                Some(HarvestEntry {
                    episode_label: episode.label.clone(),
                    direct_url: best.direct_url.clone(),
                })
            }
            Err(ResolveError::NoLinks) => {
                engine_debug!("episode {} has no links yet", episode.label);
                None
            }
            Err(err) => {
                engine_warn!("episode {} not harvested: {}", episode.label, err);
                None
            }
        }
    }
}
