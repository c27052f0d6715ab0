// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! Single-slot disk cache for the last successful weather and forecast
//! fetches. One JSON file per kind, last write wins, entries older than the
//! TTL count as absent. Cache failures never propagate to callers.
use crate::models::weather::{Coordinates, ForecastSet, WeatherSnapshot};
use chrono::{DateTime, Utc};
use error::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) const WEATHER_CACHE_FILE: &str = "weather_cache.json";
pub(crate) const FORECAST_CACHE_FILE: &str = "forecast_cache.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
  Weather,
  Forecast,
}

/// On-disk shape; field names and the ISO-8601 `fetched_at` are a contract
/// other tooling reads, do not rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
  pub city: String,
  pub lat: f64,
  pub lon: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weather_data: Option<WeatherSnapshot>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub forecast_data: Option<ForecastSet>,
  pub fetched_at: DateTime<Utc>,
  #[serde(rename = "type")]
  pub kind: CacheKind,
}

pub struct CacheStore {
  dir: PathBuf,
  ttl: Duration,
}

impl CacheStore {
  pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
    Self {
      dir: dir.into(),
      ttl,
    }
  }

  fn slot_path(&self, kind: CacheKind) -> PathBuf {
    match kind {
      CacheKind::Weather => self.dir.join(WEATHER_CACHE_FILE),
      CacheKind::Forecast => self.dir.join(FORECAST_CACHE_FILE),
    }
  }

  pub fn save_weather(&self, city: &str, coords: &Coordinates, snapshot: &WeatherSnapshot) {
    let entry = CacheEntry {
      city: city.to_string(),
      lat: coords.lat,
      lon: coords.lon,
      weather_data: Some(snapshot.clone()),
      forecast_data: None,
      fetched_at: Utc::now(),
      kind: CacheKind::Weather,
    };
    self.save(entry);
  }

  pub fn save_forecast(&self, city: &str, coords: &Coordinates, forecast: &ForecastSet) {
    let entry = CacheEntry {
      city: city.to_string(),
      lat: coords.lat,
      lon: coords.lon,
      weather_data: None,
      forecast_data: Some(forecast.clone()),
      fetched_at: Utc::now(),
      kind: CacheKind::Forecast,
    };
    self.save(entry);
  }

  /// Overwrites the slot for the entry's kind. Write failures are logged
  /// and swallowed; the caller proceeds without cache.
  pub fn save(&self, entry: CacheEntry) {
    if let Err(e) = self.try_save(&entry) {
      warn!("Failed to save cache: {e}");
    }
  }

  fn try_save(&self, entry: &CacheEntry) -> Result<(), Error> {
    let content = serde_json::to_string_pretty(entry)
      .map_err(|e| Error::CacheWrite(format!("failed to serialize entry: {e}")))?;
    fs::write(self.slot_path(entry.kind), content)
      .map_err(|e| Error::CacheWrite(e.to_string()))?;
    debug!("Cached {:?} data for '{}'", entry.kind, entry.city);
    Ok(())
  }

  /// Returns the cached entry of the given kind, or `None` when the slot is
  /// missing, unreadable, malformed or older than the TTL. Expired files
  /// are left in place.
  pub fn read(&self, kind: CacheKind) -> Option<CacheEntry> {
    match self.try_read(kind) {
      Ok(entry) => entry,
      Err(e) => {
        warn!("Failed to read cache: {e}");
        None
      }
    }
  }

  fn try_read(&self, kind: CacheKind) -> Result<Option<CacheEntry>, Error> {
    let path = self.slot_path(kind);
    if !path.exists() {
      return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| Error::CacheRead(e.to_string()))?;
    let entry: CacheEntry = serde_json::from_str(&content)
      .map_err(|e| Error::CacheRead(format!("failed to parse entry: {e}")))?;

    if entry.kind != kind {
      debug!("Cache slot {:?} holds {:?} data, ignoring", kind, entry.kind);
      return Ok(None);
    }

    let ttl = chrono::Duration::from_std(self.ttl)
      .map_err(|e| Error::CacheRead(format!("invalid TTL: {e}")))?;
    if Utc::now() - entry.fetched_at > ttl {
      info!("Cache entry for '{}' is older than TTL, ignoring", entry.city);
      return Ok(None);
    }

    Ok(Some(entry))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store(test: &str) -> CacheStore {
    let dir = std::env::temp_dir().join(format!("pogoda-cache-{}-{}", test, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    CacheStore::new(dir, Duration::from_secs(3 * 3600))
  }

  fn snapshot() -> WeatherSnapshot {
    WeatherSnapshot {
      temp: Some(3.5),
      feels_like: Some(-1.0),
      humidity: Some(81.0),
      pressure: Some(1021.0),
      wind_speed: Some(6.0),
      description: Some("снег".to_string()),
    }
  }

  const COORDS: Coordinates = Coordinates {
    lat: 55.7504,
    lon: 37.6175,
  };

  #[test]
  fn save_then_read_round_trips_payload() {
    let store = store("roundtrip");
    store.save_weather("Москва", &COORDS, &snapshot());

    let entry = store.read(CacheKind::Weather).unwrap();
    assert_eq!(entry.city, "Москва");
    assert_eq!(entry.lat, COORDS.lat);
    assert_eq!(entry.weather_data, Some(snapshot()));
    assert_eq!(entry.forecast_data, None);
  }

  #[test]
  fn expired_entry_reads_as_absent_but_survives_on_disk() {
    let store = store("expired");
    let entry = CacheEntry {
      city: "Москва".to_string(),
      lat: COORDS.lat,
      lon: COORDS.lon,
      weather_data: Some(snapshot()),
      forecast_data: None,
      fetched_at: Utc::now() - chrono::Duration::hours(4),
      kind: CacheKind::Weather,
    };
    store.save(entry);

    assert!(store.read(CacheKind::Weather).is_none());
    assert!(store.slot_path(CacheKind::Weather).exists());
  }

  #[test]
  fn missing_file_reads_as_absent() {
    let store = store("missing");
    assert!(store.read(CacheKind::Forecast).is_none());
  }

  #[test]
  fn corrupted_file_reads_as_absent() {
    let store = store("corrupted");
    fs::write(store.slot_path(CacheKind::Weather), "{not json").unwrap();
    assert!(store.read(CacheKind::Weather).is_none());
  }

  #[test]
  fn unparsable_timestamp_reads_as_absent() {
    let store = store("bad-timestamp");
    fs::write(
      store.slot_path(CacheKind::Weather),
      r#"{"city":"Москва","lat":55.75,"lon":37.62,"weather_data":null,"fetched_at":"вчера","type":"weather"}"#,
    )
    .unwrap();
    assert!(store.read(CacheKind::Weather).is_none());
  }

  #[test]
  fn slots_are_independent_per_kind() {
    let store = store("slots");
    store.save_weather("Москва", &COORDS, &snapshot());

    assert!(store.read(CacheKind::Weather).is_some());
    assert!(store.read(CacheKind::Forecast).is_none());
  }

  #[test]
  fn save_overwrites_previous_slot() {
    let store = store("overwrite");
    store.save_weather("Москва", &COORDS, &snapshot());
    let other = Coordinates { lat: 59.94, lon: 30.31 };
    store.save_weather("Санкт-Петербург", &other, &snapshot());

    let entry = store.read(CacheKind::Weather).unwrap();
    assert_eq!(entry.city, "Санкт-Петербург");
  }

  #[test]
  fn on_disk_format_keeps_contract_fields() {
    let store = store("contract");
    store.save_weather("Москва", &COORDS, &snapshot());

    let content = fs::read_to_string(store.slot_path(CacheKind::Weather)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["city"], "Москва");
    assert_eq!(value["type"], "weather");
    assert!(value["weather_data"].is_object());
    // ISO-8601 timestamp
    assert!(value["fetched_at"]
      .as_str()
      .unwrap()
      .parse::<DateTime<Utc>>()
      .is_ok());
  }

  #[test]
  fn save_failure_is_swallowed() {
    let store = CacheStore::new("/nonexistent/pogoda", Duration::from_secs(60));
    store.save_weather("Москва", &COORDS, &snapshot());
    assert!(store.read(CacheKind::Weather).is_none());
  }
}
