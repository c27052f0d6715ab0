// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
  #[error("API error: {0}")]
  ApiError(String),
  #[error("City '{0}' not found")]
  CityNotFound(String),
  #[error("Invalid API key")]
  InvalidApiKey,
  #[error("Invalid response from weather API: {0}")]
  InvalidResponse(String),
  #[error("Rate limit exceeded")]
  RateLimitExceeded,
  #[error("Timeout error")]
  TimeoutError,
  #[error("HTTP error: {0}")]
  HttpError(#[from] reqwest::Error),
  #[error("Configuration error: {0}")]
  ConfigError(String),
  #[error("IO error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Failed to read cache: {0}")]
  CacheRead(String),
  #[error("Failed to write cache: {0}")]
  CacheWrite(String),
  #[error("Weather data is missing field '{0}'")]
  MissingField(&'static str),
  #[error("File not found: {0:?}")]
  PathNotFound(PathBuf),
}
