mod bootstrap;
mod health;

use std::path::PathBuf;

use anyhow::Result;
use archivbot_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "archivbot",
    about = "Discord bot for the stream archive",
    after_help = "Examples:\n  archivbot --token <TOKEN>\n  archivbot -t <TOKEN> -f archiv.example.org -b api.example.org"
)]
struct Args {
    #[arg(short = 't', long, help = "Discord bot token")]
    token: Option<String>,
    #[arg(short = 'f', long, help = "Archive frontend host used for watch links")]
    frontend: Option<String>,
    #[arg(short = 'b', long, help = "Archive API host")]
    backend: Option<String>,
    #[arg(long, help = "Path to a TOML config file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
}

impl Args {
    fn load_options(self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config,
            overrides: ConfigOverrides {
                discord_token: self.token,
                frontend_url: self.frontend,
                backend_url: self.backend,
                log_level: self.log_level,
            },
        }
    }
}

fn init_logging(config: &AppConfig) {
    use archivbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    // Logging depends on the loaded config, so it starts after loading.
    let config = AppConfig::load(args.load_options())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.archive.clone(),
    )
    .await?;

    tracing::info!(event_name = "system.server.started", "archivbot started");

    tokio::select! {
        result = app.gateway_runner.start() => {
            result?;
            tracing::info!(event_name = "system.gateway.finished", "gateway session ended");
            wait_for_shutdown().await?;
        }
        result = wait_for_shutdown() => result?,
    }

    tracing::info!(event_name = "system.server.stopping", "archivbot stopping");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
