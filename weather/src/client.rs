// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  config::WeatherConfig,
  models::{
    api::{AirPollutionResponse, CurrentResponse, ForecastResponse, GeoEntry},
    weather::{Coordinates, ForecastSet, PollutantReading, WeatherSnapshot},
  },
  AIR_POLLUTION_URL, CURRENT_WEATHER_URL, FORECAST_URL, GEOCODING_URL, REQUEST_TIMEOUT,
};
use async_trait::async_trait;
use error::Error;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Backoff schedule for transient failures: `base_delay * 2^attempt`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
  pub max_retries: u32,
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 3,
      base_delay: Duration::from_secs(1),
    }
  }
}

impl RetryPolicy {
  pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
    self.base_delay * 2u32.saturating_pow(attempt)
  }
}

#[derive(Debug)]
pub(crate) struct RawResponse {
  pub status: StatusCode,
  pub body: String,
}

#[async_trait]
pub(crate) trait Transport: Send + Sync {
  async fn get(&self, url: Url) -> Result<RawResponse, Error>;
}

struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  fn new() -> Self {
    Self {
      client: reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client"),
    }
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, url: Url) -> Result<RawResponse, Error> {
    let response = self.client.get(url).send().await.map_err(|e| {
      if e.is_timeout() {
        Error::TimeoutError
      } else {
        Error::HttpError(e)
      }
    })?;

    let status = response.status();
    let body = response.text().await?;
    Ok(RawResponse { status, body })
  }
}

#[async_trait]
pub(crate) trait Sleeper: Send + Sync {
  async fn sleep(&self, delay: Duration);
}

struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
  async fn sleep(&self, delay: Duration) {
    tokio::time::sleep(delay).await;
  }
}

/// Typed access to the OpenWeatherMap endpoints. Every request goes through
/// the retrying fetcher; `units=metric` and the response language are fixed
/// by configuration.
pub struct WeatherClient {
  config: WeatherConfig,
  retry: RetryPolicy,
  transport: Box<dyn Transport>,
  sleeper: Box<dyn Sleeper>,
}

impl WeatherClient {
  pub fn new(config: WeatherConfig) -> Self {
    let retry = RetryPolicy {
      max_retries: config.max_retries,
      base_delay: config.base_retry_delay,
    };
    Self {
      config,
      retry,
      transport: Box::new(HttpTransport::new()),
      sleeper: Box::new(TokioSleeper),
    }
  }

  #[cfg(test)]
  pub(crate) fn with_transport(
    config: WeatherConfig,
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
  ) -> Self {
    let retry = RetryPolicy {
      max_retries: config.max_retries,
      base_delay: config.base_retry_delay,
    };
    Self {
      config,
      retry,
      transport,
      sleeper,
    }
  }

  /// Issues a GET, retrying on 429, timeout and connection failures. Any
  /// other outcome, success or not, is handed back for interpretation.
  async fn fetch_with_retry(&self, url: Url) -> Result<RawResponse, Error> {
    let attempts = self.retry.max_retries.max(1);
    for attempt in 0..attempts {
      let outcome = self.transport.get(url.clone()).await;

      let transient = match &outcome {
        Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
          Some("rate limited (429)".to_string())
        }
        Ok(_) => None,
        Err(Error::TimeoutError) => Some("request timed out".to_string()),
        Err(Error::HttpError(e)) if e.is_connect() => {
          Some(format!("connection failed: {e}"))
        }
        Err(_) => None,
      };

      let Some(reason) = transient else {
        return outcome;
      };

      if attempt + 1 == attempts {
        return Err(Error::ApiError(format!(
          "request failed after {attempts} attempts: {reason}"
        )));
      }

      let delay = self.retry.delay_for_attempt(attempt);
      warn!(
        "Attempt {}/{} failed ({}), retrying in {:?}",
        attempt + 1,
        attempts,
        reason,
        delay,
      );
      self.sleeper.sleep(delay).await;
    }

    Err(Error::ApiError("retry attempts exhausted".to_string()))
  }

  fn ensure_success(response: &RawResponse) -> Result<(), Error> {
    match response.status {
      status if status.is_success() => Ok(()),
      StatusCode::UNAUTHORIZED => Err(Error::InvalidApiKey),
      status => Err(Error::ApiError(format!(
        "API request failed with status: {status}"
      ))),
    }
  }

  fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T, Error> {
    serde_json::from_str(&response.body)
      .map_err(|e| Error::InvalidResponse(format!("failed to decode response body: {e}")))
  }

  fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
    Url::parse_with_params(base, params)
      .map_err(|e| Error::ConfigError(format!("failed to build API URL: {e}")))
  }

  fn data_url(&self, base: &str, coords: &Coordinates, localized: bool) -> Result<Url, Error> {
    let lat = coords.lat.to_string();
    let lon = coords.lon.to_string();
    let mut params = vec![
      ("lat", lat.as_str()),
      ("lon", lon.as_str()),
      ("appid", self.config.api_key.as_str()),
    ];
    if localized {
      params.push(("units", "metric"));
      params.push(("lang", self.config.lang.as_str()));
    }
    Self::build_url(base, &params)
  }

  /// Resolves a free-text city name to coordinates via the geocoding
  /// endpoint (`limit=1`, first match wins).
  #[instrument(skip(self))]
  pub async fn coordinates(&self, city: &str) -> Result<Coordinates, Error> {
    if city.trim().is_empty() {
      return Err(Error::CityNotFound(city.to_string()));
    }

    let url = Self::build_url(
      GEOCODING_URL,
      &[
        ("q", city),
        ("limit", "1"),
        ("appid", self.config.api_key.as_str()),
      ],
    )?;

    let response = self.fetch_with_retry(url).await?;
    Self::ensure_success(&response)?;

    let entries: Vec<GeoEntry> = Self::decode(&response)?;
    let entry = entries
      .into_iter()
      .next()
      .ok_or_else(|| Error::CityNotFound(city.to_string()))?;

    debug!("Resolved '{}' to ({}, {})", city, entry.lat, entry.lon);
    Ok(Coordinates {
      lat: entry.lat,
      lon: entry.lon,
    })
  }

  #[instrument(skip(self))]
  pub async fn current_weather(&self, coords: &Coordinates) -> Result<WeatherSnapshot, Error> {
    let url = self.data_url(CURRENT_WEATHER_URL, coords, true)?;
    let response = self.fetch_with_retry(url).await?;
    Self::ensure_success(&response)?;

    let raw: CurrentResponse = Self::decode(&response)?;
    Ok(WeatherSnapshot::from_response(raw))
  }

  /// Five-day forecast in three-hour steps.
  #[instrument(skip(self))]
  pub async fn forecast(&self, coords: &Coordinates) -> Result<ForecastSet, Error> {
    let url = self.data_url(FORECAST_URL, coords, true)?;
    let response = self.fetch_with_retry(url).await?;
    Self::ensure_success(&response)?;

    let raw: ForecastResponse = Self::decode(&response)?;
    ForecastSet::from_response(raw)
  }

  /// Raw pollutant concentrations from `list[0].components`.
  #[instrument(skip(self))]
  pub async fn air_pollution(&self, coords: &Coordinates) -> Result<PollutantReading, Error> {
    let url = self.data_url(AIR_POLLUTION_URL, coords, false)?;
    let response = self.fetch_with_retry(url).await?;
    Self::ensure_success(&response)?;

    let raw: AirPollutionResponse = Self::decode(&response)?;
    PollutantReading::from_response(raw)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  struct ScriptedTransport {
    responses: Mutex<Vec<Result<RawResponse, Error>>>,
  }

  #[async_trait]
  impl Transport for ScriptedTransport {
    async fn get(&self, _url: Url) -> Result<RawResponse, Error> {
      let mut responses = self.responses.lock().unwrap();
      assert!(!responses.is_empty(), "transport script exhausted");
      responses.remove(0)
    }
  }

  struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
  }

  #[async_trait]
  impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
      self.delays.lock().unwrap().push(delay);
    }
  }

  fn response(status: u16, body: &str) -> Result<RawResponse, Error> {
    Ok(RawResponse {
      status: StatusCode::from_u16(status).unwrap(),
      body: body.to_string(),
    })
  }

  fn client(
    responses: Vec<Result<RawResponse, Error>>,
  ) -> (WeatherClient, Arc<Mutex<Vec<Duration>>>) {
    let config =
      WeatherConfig::new("test-key", ".", Duration::from_secs(3 * 3600)).unwrap();
    let delays = Arc::new(Mutex::new(Vec::new()));
    let client = WeatherClient::with_transport(
      config,
      Box::new(ScriptedTransport {
        responses: Mutex::new(responses),
      }),
      Box::new(RecordingSleeper {
        delays: Arc::clone(&delays),
      }),
    );
    (client, delays)
  }

  const GEO_BODY: &str = r#"[{"name":"Москва","lat":55.7504,"lon":37.6175,"country":"RU"}]"#;

  #[tokio::test]
  async fn succeeds_after_two_rate_limits_with_growing_backoff() {
    let (client, delays) = client(vec![
      response(429, ""),
      response(429, ""),
      response(200, GEO_BODY),
    ]);

    let coords = client.coordinates("Москва").await.unwrap();
    assert_eq!(coords.lat, 55.7504);
    assert_eq!(coords.lon, 37.6175);
    assert_eq!(
      *delays.lock().unwrap(),
      vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
  }

  #[tokio::test]
  async fn exhausted_retries_fail_without_a_third_sleep() {
    let (client, delays) = client(vec![
      response(429, ""),
      response(429, ""),
      response(429, ""),
    ]);

    let err = client.coordinates("Москва").await.unwrap_err();
    assert!(matches!(err, Error::ApiError(_)));
    assert_eq!(delays.lock().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn timeouts_are_retried() {
    let (client, delays) = client(vec![
      Err(Error::TimeoutError),
      response(200, GEO_BODY),
    ]);

    client.coordinates("Москва").await.unwrap();
    assert_eq!(*delays.lock().unwrap(), vec![Duration::from_secs(1)]);
  }

  #[tokio::test]
  async fn unauthorized_maps_to_invalid_api_key() {
    let (client, delays) = client(vec![response(401, r#"{"cod":401}"#)]);

    let err = client
      .current_weather(&Coordinates { lat: 55.75, lon: 37.62 })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidApiKey));
    assert!(delays.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unexpected_status_is_not_retried() {
    let (client, delays) = client(vec![response(500, "")]);

    let err = client.coordinates("Москва").await.unwrap_err();
    assert!(matches!(err, Error::ApiError(_)));
    assert!(delays.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_geocoding_result_is_city_not_found() {
    let (client, _) = client(vec![response(200, "[]")]);

    let err = client.coordinates("Нетбург").await.unwrap_err();
    assert!(matches!(err, Error::CityNotFound(city) if city == "Нетбург"));
  }

  #[tokio::test]
  async fn blank_city_is_rejected_without_a_request() {
    let (client, _) = client(vec![]);

    let err = client.coordinates("  ").await.unwrap_err();
    assert!(matches!(err, Error::CityNotFound(_)));
  }

  #[tokio::test]
  async fn current_weather_parses_named_fields() {
    let body = r#"{
      "main": {"temp": 11.5, "feels_like": 9.8, "humidity": 70, "pressure": 1008},
      "weather": [{"description": "пасмурно"}],
      "wind": {"speed": 4.1},
      "name": "Москва"
    }"#;
    let (client, _) = client(vec![response(200, body)]);

    let snapshot = client
      .current_weather(&Coordinates { lat: 55.75, lon: 37.62 })
      .await
      .unwrap();
    assert_eq!(snapshot.temp, Some(11.5));
    assert_eq!(snapshot.humidity, Some(70.0));
    assert_eq!(snapshot.description.as_deref(), Some("пасмурно"));
  }

  #[tokio::test]
  async fn forecast_without_entries_is_invalid() {
    let (client, _) = client(vec![response(200, r#"{"cod":"200"}"#)]);

    let err = client
      .forecast(&Coordinates { lat: 55.75, lon: 37.62 })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
  }

  #[tokio::test]
  async fn pollution_requires_a_list_entry() {
    let (client, _) = client(vec![response(200, r#"{"list":[]}"#)]);

    let err = client
      .air_pollution(&Coordinates { lat: 55.75, lon: 37.62 })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
  }

  #[tokio::test]
  async fn pollution_extracts_components() {
    let body = r#"{"list":[{"main":{"aqi":2},"components":{"so2":15.0,"no2":40.0}}]}"#;
    let (client, _) = client(vec![response(200, body)]);

    let reading = client
      .air_pollution(&Coordinates { lat: 55.75, lon: 37.62 })
      .await
      .unwrap();
    assert_eq!(reading.get("so2"), Some(15.0));
    assert_eq!(reading.get("no2"), Some(40.0));
  }

  #[test]
  fn backoff_delays_double_per_attempt() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
  }
}
