use clap::Parser;
use engine_logging::engine_info;
use episode_server::cli::{Cli, Command};
use episode_server::{commands, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.overrides.config.as_deref())?;
    config.apply_overrides(&cli.overrides);
    engine_logging::initialize(config.log_destination(), config.log_level());
    if let Some(path) = &cli.overrides.config {
        engine_info!("Loaded configuration from {:?}", path);
    }

    match cli.command {
        Command::Serve => commands::serve(&config).await,
        Command::Harvest {
            session,
            pages,
            output,
        } => commands::harvest(&config, &session, pages, output.as_deref()).await,
        Command::Sources { session, episode } => {
            commands::sources(&config, &session, &episode).await
        }
    }
}
