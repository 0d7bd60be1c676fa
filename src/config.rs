use crate::constants::{
    DEFAULT_ADMIN_USER, DEFAULT_BUDGET_KB, DEFAULT_CONFIG_FILE, DEFAULT_CREDENTIAL_TABLE,
    DEFAULT_DRIVE_API, DEFAULT_DRIVE_UPLOAD_API, ENV_PREFIX,
};
use crate::error::{Result, SqueezeError};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Google,
    Local,
}

/// Runtime settings, layered as defaults < TOML file < `DRIVE_SQUEEZE_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreKind,
    pub local_root: PathBuf,
    pub api_base_url: String,
    pub upload_base_url: String,
    pub access_token: Option<String>,
    pub credential_table: String,
    pub credential_folder_id: String,
    pub admin_user: String,
    pub default_budget_kb: u32,
    pub enhance_by_default: bool,
}

impl AppConfig {
    /// Loads configuration from `path`, or from `drive-squeeze.toml` in the
    /// working directory when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings = Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn defaults() -> std::result::Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("store", "google")?
            .set_default("local_root", ".")?
            .set_default("api_base_url", DEFAULT_DRIVE_API)?
            .set_default("upload_base_url", DEFAULT_DRIVE_UPLOAD_API)?
            .set_default("credential_table", DEFAULT_CREDENTIAL_TABLE)?
            .set_default("credential_folder_id", "root")?
            .set_default("admin_user", DEFAULT_ADMIN_USER)?
            .set_default("default_budget_kb", DEFAULT_BUDGET_KB as i64)?
            .set_default("enhance_by_default", true)
    }

    /// Applies a `--store` override: `google` or `local:<dir>`.
    pub fn with_store_override(mut self, spec: &str) -> Result<Self> {
        match spec.split_once(':') {
            Some(("local", dir)) if !dir.is_empty() => {
                self.store = StoreKind::Local;
                self.local_root = PathBuf::from(dir);
            }
            None if spec == "google" => self.store = StoreKind::Google,
            _ => {
                return Err(SqueezeError::Config(ConfigError::Message(format!(
                    "invalid store '{}', expected 'google' or 'local:<dir>'",
                    spec
                ))))
            }
        }
        Ok(self)
    }
}
