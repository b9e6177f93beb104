use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub archive: ArchiveConfig,
    pub discord: DiscordConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Hostnames of the archive web frontend and API backend.
///
/// Values without a scheme are served over `https://`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub frontend_url: String,
    pub backend_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    pub token: SecretString,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub discord_token: Option<String>,
    pub frontend_url: Option<String>,
    pub backend_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            archive: ArchiveConfig {
                frontend_url: "archiv.wubbl0rz.tv".to_string(),
                backend_url: "api.wubbl0rz.tv".to_string(),
                request_timeout_secs: 5,
            },
            discord: DiscordConfig { token: String::new().into() },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), health_check_port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ArchiveConfig {
    pub fn frontend_base(&self) -> String {
        with_scheme(&self.frontend_url)
    }

    pub fn backend_base(&self) -> String {
        with_scheme(&self.backend_url)
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("archivbot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(archive) = patch.archive {
            if let Some(frontend_url) = archive.frontend_url {
                self.archive.frontend_url = frontend_url;
            }
            if let Some(backend_url) = archive.backend_url {
                self.archive.backend_url = backend_url;
            }
            if let Some(request_timeout_secs) = archive.request_timeout_secs {
                self.archive.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(discord) = patch.discord {
            if let Some(token) = discord.token {
                self.discord.token = token.into();
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let frontend =
            read_env("ARCHIVBOT_ARCHIVE_FRONTEND_URL").or_else(|| read_env("ARCHIV_FRONTEND"));
        if let Some(value) = frontend {
            self.archive.frontend_url = value;
        }
        let backend =
            read_env("ARCHIVBOT_ARCHIVE_BACKEND_URL").or_else(|| read_env("ARCHIV_BACKEND"));
        if let Some(value) = backend {
            self.archive.backend_url = value;
        }
        if let Some(value) = read_env("ARCHIVBOT_ARCHIVE_REQUEST_TIMEOUT_SECS") {
            self.archive.request_timeout_secs =
                parse_u64("ARCHIVBOT_ARCHIVE_REQUEST_TIMEOUT_SECS", &value)?;
        }

        let token = read_env("ARCHIVBOT_DISCORD_TOKEN").or_else(|| read_env("DISCORD_TOKEN"));
        if let Some(value) = token {
            self.discord.token = value.into();
        }

        if let Some(value) = read_env("ARCHIVBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ARCHIVBOT_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("ARCHIVBOT_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        let log_level =
            read_env("ARCHIVBOT_LOGGING_LEVEL").or_else(|| read_env("ARCHIVBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ARCHIVBOT_LOGGING_FORMAT").or_else(|| read_env("ARCHIVBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(token) = overrides.discord_token {
            self.discord.token = token.into();
        }
        if let Some(frontend_url) = overrides.frontend_url {
            self.archive.frontend_url = frontend_url;
        }
        if let Some(backend_url) = overrides.backend_url {
            self.archive.backend_url = backend_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_archive(&self.archive)?;
        validate_discord(&self.discord)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("archivbot.toml"), PathBuf::from("config/archivbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_archive(archive: &ArchiveConfig) -> Result<(), ConfigError> {
    let hosts = [
        ("archive.frontend_url", &archive.frontend_url),
        ("archive.backend_url", &archive.backend_url),
    ];
    for (key, value) in hosts {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{key} is required (a hostname such as `archiv.wubbl0rz.tv`)"
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "{key} must be a hostname without whitespace, got `{value}`"
            )));
        }
    }

    if archive.request_timeout_secs == 0 || archive.request_timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "archive.request_timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    if discord.token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.token is required. Get it from https://discord.com/developers/applications > Your App > Bot > Token (or set DISCORD_TOKEN)".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    archive: Option<ArchivePatch>,
    discord: Option<DiscordPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivePatch {
    frontend_url: Option<String>,
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
