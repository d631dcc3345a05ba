use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// Postgres (or SQLite) connection string. Without one the server keeps
    /// everything in memory.
    pub database_url: Option<String>,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    pub line_channel_id: String,
    pub line_channel_secret: String,

    #[serde(default = "default_line_api_base_url")]
    pub line_api_base_url: String,

    #[serde(default = "default_line_timeout_secs")]
    pub line_timeout_secs: u64,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    line_channel_id: Option<String>,
    line_channel_secret: Option<String>,
    line_api_base_url: Option<String>,
    line_timeout_secs: Option<u64>,
    log_dir: Option<String>,
    cors_allowed_origins: Option<Vec<String>>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

fn default_line_timeout_secs() -> u64 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Result<Self, String> {
        let line_timeout_secs = env_config
            .line_timeout_secs
            .or(file_config.line_timeout_secs)
            .unwrap_or_else(default_line_timeout_secs);
        if line_timeout_secs == 0 {
            return Err("LINE_TIMEOUT_SECS must be greater than zero".to_string());
        }

        Ok(ServerConfig {
            database_url: env_config.database_url.or(file_config.database_url),
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            line_channel_id: env_config.line_channel_id.or(file_config.line_channel_id)
                .ok_or("LINE_CHANNEL_ID is required")?,
            line_channel_secret: env_config.line_channel_secret.or(file_config.line_channel_secret)
                .ok_or("LINE_CHANNEL_SECRET is required")?,
            line_api_base_url: env_config.line_api_base_url.or(file_config.line_api_base_url)
                .unwrap_or_else(default_line_api_base_url),
            line_timeout_secs,
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            cors_allowed_origins: env_config.cors_allowed_origins.or(file_config.cors_allowed_origins)
                .unwrap_or_default(),
        })
    }

    pub fn line_timeout(&self) -> Duration {
        Duration::from_secs(self.line_timeout_secs)
    }
}
