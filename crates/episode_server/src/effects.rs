use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use episode_core::{Effect, Msg};
use episode_engine::{EngineEvent, EngineHandle, HarvestEvent};
use tokio::sync::mpsc;

use crate::session::HarvestSession;

/// Turns state-machine effects into engine commands.
#[derive(Clone)]
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::StartHarvest {
                    job_id,
                    series_session,
                    total_pages,
                } => {
                    engine_info!(
                        "StartHarvest job_id={} series={} pages={:?}",
                        job_id,
                        series_session,
                        total_pages
                    );
                    self.engine
                        .enqueue_harvest(*job_id, series_session.clone(), *total_pages);
                }
            }
        }
    }
}

/// Feeds engine events back into the session until the engine goes away.
pub fn spawn_event_pump(
    mut events: mpsc::UnboundedReceiver<EngineEvent>,
    session: Arc<HarvestSession>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            session.dispatch(map_event(event));
        }
    })
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Harvest { job_id, event } => match event {
            HarvestEvent::Started { total_pages } => Msg::HarvestStarted {
                job_id,
                total_pages,
            },
            HarvestEvent::PageStarted { page, .. } => Msg::PageStarted { job_id, page },
            HarvestEvent::PageCompleted {
                page,
                entries,
                failed_episodes,
                ..
            } => Msg::PageCompleted {
                job_id,
                page,
                entries,
                failed_episodes,
            },
            HarvestEvent::PageSkipped { page, reason, .. } => Msg::PageSkipped {
                job_id,
                page,
                reason,
            },
            HarvestEvent::Finished { harvested, .. } => {
                engine_info!("Harvest job {} finished with {} links", job_id, harvested);
                Msg::HarvestFinished { job_id }
            }
        },
        EngineEvent::HarvestFailed { job_id, reason } => {
            engine_warn!("Harvest job {} failed: {}", job_id, reason);
            Msg::HarvestFailed { job_id, reason }
        }
    }
}
