// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
pub mod air_quality;
pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod service;

pub use air_quality::{classify, AirQualityReport, PollutantDetail};
pub use cache::{CacheEntry, CacheKind, CacheStore};
pub use client::{RetryPolicy, WeatherClient};
pub use config::WeatherConfig;
pub use models::weather::{
  Coordinates, ForecastEntry, ForecastSet, PollutantReading, WeatherSnapshot,
};
pub use service::{CurrentReport, ForecastReport, WeatherService};

pub(crate) const GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
pub(crate) const CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub(crate) const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
pub(crate) const AIR_POLLUTION_URL: &str = "https://api.openweathermap.org/data/2.5/air_pollution";
pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
