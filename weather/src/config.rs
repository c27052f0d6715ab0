// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use error::Error;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WeatherConfig {
  pub(crate) api_key: String,
  pub(crate) cache_dir: PathBuf,
  pub(crate) cache_ttl: Duration,
  pub(crate) max_retries: u32,
  pub(crate) base_retry_delay: Duration,
  pub(crate) lang: String,
}

impl WeatherConfig {
  pub fn new(
    api_key: impl Into<String>,
    cache_dir: impl Into<PathBuf>,
    cache_ttl: Duration,
  ) -> Result<Self, Error> {
    let api_key = api_key.into();
    if api_key.trim().is_empty() {
      return Err(Error::InvalidApiKey);
    }

    Ok(Self {
      api_key,
      cache_dir: cache_dir.into(),
      cache_ttl,
      max_retries: 3,
      base_retry_delay: Duration::from_secs(1),
      lang: "ru".to_string(),
    })
  }

  pub fn with_retry(mut self, max_retries: u32, base_retry_delay: Duration) -> Self {
    self.max_retries = max_retries;
    self.base_retry_delay = base_retry_delay;
    self
  }

  pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
    self.lang = lang.into();
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_api_key_is_rejected() {
    let result = WeatherConfig::new("  ", ".", Duration::from_secs(3 * 3600));
    assert!(matches!(result, Err(Error::InvalidApiKey)));
  }

  #[test]
  fn defaults_for_retry_and_lang() {
    let config = WeatherConfig::new("key", ".", Duration::from_secs(3 * 3600)).unwrap();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.base_retry_delay, Duration::from_secs(1));
    assert_eq!(config.lang, "ru");
  }
}
