use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use episode_core::JobId;
use tokio::sync::mpsc;

use crate::{
    BatchHarvester, Bypass, BypassClient, Catalog, CatalogClient, EngineEvent, EngineSettings,
    HarvestEvent, ProgressSink, SetupError, SourceResolver, StreamRelay,
};

/// The engine's services, wired from one set of settings.
#[derive(Clone)]
pub struct Engine {
    pub catalog: Arc<dyn Catalog>,
    pub resolver: SourceResolver,
    pub harvester: BatchHarvester,
    pub relay: StreamRelay,
}

impl Engine {
    pub fn new(settings: &EngineSettings) -> Result<Self, SetupError> {
        let catalog: Arc<dyn Catalog> = Arc::new(CatalogClient::new(settings)?);
        let bypass: Arc<dyn Bypass> = Arc::new(BypassClient::new(settings)?);
        Self::with_services(catalog, bypass, settings)
    }

    /// Wires the engine around caller-provided catalog and bypass services.
    pub fn with_services(
        catalog: Arc<dyn Catalog>,
        bypass: Arc<dyn Bypass>,
        settings: &EngineSettings,
    ) -> Result<Self, SetupError> {
        let resolver = SourceResolver::new(bypass, settings);
        let harvester = BatchHarvester::new(catalog.clone(), resolver.clone(), settings);
        Ok(Self {
            catalog,
            resolver,
            harvester,
            relay: StreamRelay::new(settings)?,
        })
    }
}

enum EngineCommand {
    Harvest {
        job_id: JobId,
        series_session: String,
        total_pages: Option<u32>,
    },
}

/// Runs harvest jobs in the background and reports them as `EngineEvent`s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    /// Starts the command loop on the current Tokio runtime.
    pub fn spawn(harvester: BatchHarvester) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(command) = cmd_rx.recv().await {
                let harvester = harvester.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    handle_command(&harvester, command, event_tx).await;
                });
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn enqueue_harvest(
        &self,
        job_id: JobId,
        series_session: impl Into<String>,
        total_pages: Option<u32>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Harvest {
            job_id,
            series_session: series_session.into(),
            total_pages,
        });
    }
}

async fn handle_command(
    harvester: &BatchHarvester,
    command: EngineCommand,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
) {
    match command {
        EngineCommand::Harvest {
            job_id,
            series_session,
            total_pages,
        } => {
            let total_pages = match total_pages {
                Some(total) => total,
                None => match harvester.discover_total_pages(&series_session).await {
                    Ok(total) => total,
                    Err(err) => {
                        engine_warn!("harvest job {} could not start: {}", job_id, err);
                        let _ = event_tx.send(EngineEvent::HarvestFailed {
                            job_id,
                            reason: err.to_string(),
                        });
                        return;
                    }
                },
            };
            engine_info!(
                "harvest job {} for {} over {} pages",
                job_id,
                series_session,
                total_pages
            );
            let sink = ChannelProgressSink::new(job_id, event_tx);
            harvester.harvest(&series_session, total_pages, &sink).await;
        }
    }
}

pub struct ChannelProgressSink {
    job_id: JobId,
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(job_id: JobId, tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { job_id, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: HarvestEvent) {
        let _ = self.tx.send(EngineEvent::Harvest {
            job_id: self.job_id,
            event,
        });
    }
}
