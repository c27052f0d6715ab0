// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub weather: WeatherSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
  pub cache_dir: PathBuf,
  pub cache_ttl_hours: u64,
  pub max_retries: u32,
  pub base_retry_delay_secs: u64,
  pub lang: String,
}

impl Default for WeatherSettings {
  fn default() -> Self {
    Self {
      cache_dir: PathBuf::from("."),
      cache_ttl_hours: 3,
      max_retries: 3,
      base_retry_delay_secs: 1,
      lang: "ru".to_string(),
    }
  }
}

impl Config {
  #[instrument(skip(path))]
  pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
    let content = fs::read_to_string(path)?;
    let config: Self = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration successfully");
    Ok(config)
  }

  /// Falls back to defaults when the file is absent or unreadable.
  pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
    match Self::from_file(path) {
      Ok(config) => config,
      Err(e) => {
        tracing::debug!("Using default configuration: {e}");
        Self::default()
      }
    }
  }
}
