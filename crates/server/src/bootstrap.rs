use std::sync::Arc;

use archivbot_archive::{ApiError, ArchiveClient};
use archivbot_core::config::{AppConfig, ConfigError};
use archivbot_discord::{
    archive_dispatcher, ArchiveLinks, CommandRouter, GatewayRunner, NoopGatewaySession,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub archive: Arc<ArchiveClient>,
    pub gateway_runner: GatewayRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("archive client setup failed: {0}")]
    ArchiveClient(#[source] ApiError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let archive = Arc::new(
        ArchiveClient::from_config(&config.archive).map_err(BootstrapError::ArchiveClient)?,
    );
    info!(
        event_name = "system.bootstrap.archive_ready",
        backend = %config.archive.backend_base(),
        frontend = %config.archive.frontend_base(),
        timeout_secs = config.archive.request_timeout_secs,
        "archive client configured"
    );

    let links = ArchiveLinks::from_config(&config.archive);
    let router = CommandRouter::new(Arc::clone(&archive), links);
    let gateway_runner =
        GatewayRunner::new(Arc::new(NoopGatewaySession), archive_dispatcher(router));

    Ok(Application { config, archive, gateway_runner })
}

#[cfg(test)]
mod tests {
    use archivbot_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    fn config_with_token() -> AppConfig {
        let mut config = AppConfig::default();
        config.discord.token = "bot-token".to_string().into();
        config
    }

    #[test]
    fn config_load_fails_fast_without_discord_token() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                discord_token: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(BootstrapError::from);

        let message = result.err().expect("error").to_string();
        assert!(message.contains("discord.token"));
    }

    #[test]
    fn bootstrap_wires_archive_from_config() {
        let mut config = config_with_token();
        config.archive.frontend_url = "archiv.example.org".to_string();
        config.archive.backend_url = "http://127.0.0.1:9".to_string();

        let app = bootstrap_with_config(config).expect("bootstrap should succeed");

        assert_eq!(app.config.archive.frontend_base(), "https://archiv.example.org");
        assert_eq!(
            app.archive.lookup_url("abc").expect("url").as_str(),
            "http://127.0.0.1:9/vods/abc"
        );
    }

    #[test]
    fn bootstrap_rejects_unusable_backend_url() {
        let mut config = config_with_token();
        config.archive.backend_url = "bad host".to_string();

        let result = bootstrap_with_config(config);

        assert!(matches!(result, Err(BootstrapError::ArchiveClient(_))));
    }

    #[tokio::test]
    async fn bootstrapped_runner_finishes_without_a_gateway() {
        let app = bootstrap_with_config(config_with_token()).expect("bootstrap");

        app.gateway_runner.start().await.expect("noop gateway");
    }
}
