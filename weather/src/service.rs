// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  air_quality::{classify, AirQualityReport},
  cache::{CacheKind, CacheStore},
  client::WeatherClient,
  config::WeatherConfig,
  models::weather::{Coordinates, ForecastSet, WeatherSnapshot},
};
use error::Error;
use tracing::{info, instrument, warn};

/// End-to-end operations for a single city: geocode, fetch, cache. On a
/// failed live fetch the last cached entry of the same kind is offered
/// instead, even when it was saved for another city.
pub struct WeatherService {
  client: WeatherClient,
  cache: CacheStore,
}

#[derive(Debug, Clone)]
pub struct CurrentReport {
  pub city: String,
  pub coords: Coordinates,
  pub snapshot: WeatherSnapshot,
  pub from_cache: bool,
}

#[derive(Debug, Clone)]
pub struct ForecastReport {
  pub city: String,
  pub coords: Coordinates,
  pub forecast: ForecastSet,
  pub from_cache: bool,
}

impl WeatherService {
  pub fn new(config: WeatherConfig) -> Self {
    let cache = CacheStore::new(config.cache_dir.clone(), config.cache_ttl);
    Self {
      client: WeatherClient::new(config),
      cache,
    }
  }

  #[cfg(test)]
  pub(crate) fn with_client(client: WeatherClient, cache: CacheStore) -> Self {
    Self { client, cache }
  }

  #[instrument(skip(self))]
  pub async fn current(&self, city: &str) -> Result<CurrentReport, Error> {
    let coords = self.client.coordinates(city).await?;

    match self.client.current_weather(&coords).await {
      Ok(snapshot) => {
        self.cache.save_weather(city, &coords, &snapshot);
        Ok(CurrentReport {
          city: city.to_string(),
          coords,
          snapshot,
          from_cache: false,
        })
      }
      Err(e) => {
        warn!("Live weather fetch failed: {e}, trying cache");
        let fallback = self.cache.read(CacheKind::Weather).and_then(|entry| {
          entry.weather_data.map(|snapshot| CurrentReport {
            coords: Coordinates {
              lat: entry.lat,
              lon: entry.lon,
            },
            city: entry.city,
            snapshot,
            from_cache: true,
          })
        });
        match fallback {
          Some(report) => {
            info!("Serving cached weather for '{}'", report.city);
            Ok(report)
          }
          None => Err(e),
        }
      }
    }
  }

  #[instrument(skip(self))]
  pub async fn forecast(&self, city: &str) -> Result<ForecastReport, Error> {
    let coords = self.client.coordinates(city).await?;

    match self.client.forecast(&coords).await {
      Ok(forecast) => {
        self.cache.save_forecast(city, &coords, &forecast);
        Ok(ForecastReport {
          city: city.to_string(),
          coords,
          forecast,
          from_cache: false,
        })
      }
      Err(e) => {
        warn!("Live forecast fetch failed: {e}, trying cache");
        let fallback = self.cache.read(CacheKind::Forecast).and_then(|entry| {
          entry.forecast_data.map(|forecast| ForecastReport {
            coords: Coordinates {
              lat: entry.lat,
              lon: entry.lon,
            },
            city: entry.city,
            forecast,
            from_cache: true,
          })
        });
        match fallback {
          Some(report) => {
            info!("Serving cached forecast for '{}'", report.city);
            Ok(report)
          }
          None => Err(e),
        }
      }
    }
  }

  #[instrument(skip(self))]
  pub async fn air_quality(&self, city: &str, extended: bool) -> Result<AirQualityReport, Error> {
    let coords = self.client.coordinates(city).await?;
    let reading = self.client.air_pollution(&coords).await?;
    Ok(classify(&reading, extended))
  }
}
