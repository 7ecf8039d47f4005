use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use episode_engine::{
    render_labeled_list, render_link_list, write_atomically, Engine, HarvestEvent, ProgressSink,
    ResolveError,
};

use crate::{router, ServerConfig, ServerState};

fn build_engine(config: &ServerConfig) -> anyhow::Result<Engine> {
    Engine::new(&config.engine_settings()).context("setting up engine clients")
}

pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;
    let state = ServerState::new(build_engine(config)?, &config.public_base_url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    engine_info!("Listening on http://{}", addr);
    axum::serve(listener, router(state))
        .await
        .context("http server")?;
    Ok(())
}

/// Logs the status line of every page as the harvest advances.
struct LogProgress;

impl ProgressSink for LogProgress {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::Started { total_pages } => {
                engine_info!("Harvesting {} pages", total_pages);
            }
            HarvestEvent::PageStarted { progress, .. } => {
                engine_info!("{} ({:.0}%)", progress.phase_label, progress.percent());
            }
            HarvestEvent::PageSkipped { page, reason, .. } => {
                engine_warn!("Page {} skipped: {}", page, reason);
            }
            HarvestEvent::PageCompleted { .. } => {}
            HarvestEvent::Finished { progress, .. } => {
                engine_info!("{}", progress.phase_label);
            }
        }
    }
}

pub async fn harvest(
    config: &ServerConfig,
    series_session: &str,
    pages: Option<u32>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let total_pages = match pages {
        Some(pages) => pages,
        None => engine
            .harvester
            .discover_total_pages(series_session)
            .await
            .context("discovering page count")?,
    };

    let report = engine
        .harvester
        .harvest(series_session, total_pages, &LogProgress)
        .await;

    match output {
        Some(path) => {
            write_atomically(path, &render_link_list(&report.entries))
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => print!("{}", render_labeled_list(&report.entries)),
    }
    println!(
        "Harvested {} episodes ({} failed, {} pages skipped)",
        report.entries.len(),
        report.failed_episodes,
        report.skipped_pages.len()
    );
    Ok(())
}

pub async fn sources(
    config: &ServerConfig,
    series_session: &str,
    episode_session: &str,
) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let resolution = engine
        .resolver
        .resolve_episode(engine.catalog.as_ref(), series_session, episode_session)
        .await;

    match resolution {
        Ok(resolution) => {
            for (index, source) in resolution.sources().iter().enumerate() {
                let marker = if index == 0 { "*" } else { " " };
                println!("{marker} {:<8} {}", source.quality_label, source.direct_url);
            }
            Ok(())
        }
        Err(ResolveError::NoLinks) => bail!("no links available for this episode"),
        Err(err @ ResolveError::NoSourcesResolved { .. }) => {
            bail!("no sources resolved: {err}")
        }
        Err(err) => Err(err).context("resolving episode"),
    }
}
