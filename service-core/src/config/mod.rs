use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Layered configuration: `<dir>/base.yaml`, then `APP_`-prefixed environment
/// variables (`__` as the nesting separator), then plain environment variables
/// mapped onto individual keys.
pub struct ConfigLoader {
    directory: PathBuf,
    env_overrides: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            env_overrides: Vec::new(),
        }
    }

    /// Locate `<crate_name>/config` whether the process runs from the
    /// workspace root or from inside the crate directory.
    pub fn for_crate(crate_name: &str) -> Result<Self, AppError> {
        let base_path = std::env::current_dir()
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
        Ok(Self::new(config_directory(&base_path, crate_name)))
    }

    /// Map an environment variable (e.g. `API_BASE_URL`) onto a config key
    /// (e.g. `api.base_url`). Set variables win over every other source.
    pub fn env_override(mut self, variable: &str, key: &str) -> Self {
        self.env_overrides
            .push((variable.to_string(), key.to_string()));
        self
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        dotenvy::dotenv().ok();

        let mut builder = Cfg::builder()
            .add_source(File::from(self.directory.join("base.yaml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        for (variable, key) in &self.env_overrides {
            let value = std::env::var(variable).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(key.as_str(), value)?;
        }

        Ok(builder.build()?.try_deserialize::<T>()?)
    }
}

fn config_directory(base_path: &Path, crate_name: &str) -> PathBuf {
    if base_path.ends_with(crate_name) {
        base_path.join("config")
    } else {
        base_path.join(crate_name).join("config")
    }
}
