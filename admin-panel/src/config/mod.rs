use crate::api::catalog::MessageCatalogSettings;
use serde::Deserialize;
use service_core::config::ConfigLoader;
use service_core::error::AppError;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    /// Extra upstream-message → notice mappings.
    #[serde(default)]
    pub messages: MessageCatalogSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_session_idle_minutes() -> i64 {
    120
}

fn default_static_dir() -> String {
    "admin-panel/static".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Upstream REST API root, e.g. `https://api.example.com/api`.
    /// Set through `API_BASE_URL`.
    #[serde(default)]
    pub base_url: String,
    /// Public root of uploaded files (profile images). Set through
    /// `STORAGE_URL`.
    #[serde(default)]
    pub storage_url: Option<String>,
}

impl ApiSettings {
    /// Absolute URL for a stored file path such as `profiles/7.png`.
    /// Already-absolute paths are returned unchanged.
    pub fn storage_link(&self, path: &str) -> Option<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        let root = self.storage_url.as_deref()?.trim_end_matches('/');
        Some(format!("{}/{}", root, path.trim_start_matches('/')))
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    fn validate(self) -> Result<Self, AppError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "API_BASE_URL is required (api.base_url)"
            )));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "API_BASE_URL must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        Ok(self)
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let settings: Settings = ConfigLoader::for_crate("admin-panel")?
        .env_override("API_BASE_URL", "api.base_url")
        .env_override("STORAGE_URL", "api.storage_url")
        .load()?;
    settings.validate()
}
