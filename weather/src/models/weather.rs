// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use super::api::{AirPollutionResponse, CurrentResponse, ForecastResponse};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use error::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lon: f64,
}

/// Current conditions as reported by the provider. Every field is optional:
/// the provider omits sections freely, and formatting reports the gap
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
  pub temp: Option<f64>,
  pub feels_like: Option<f64>,
  pub humidity: Option<f64>,
  pub pressure: Option<f64>,
  pub wind_speed: Option<f64>,
  pub description: Option<String>,
}

impl WeatherSnapshot {
  pub(crate) fn from_response(response: CurrentResponse) -> Self {
    let main = response.main;
    Self {
      temp: main.as_ref().and_then(|m| m.temp),
      feels_like: main.as_ref().and_then(|m| m.feels_like),
      humidity: main.as_ref().and_then(|m| m.humidity),
      pressure: main.as_ref().and_then(|m| m.pressure),
      wind_speed: response.wind.and_then(|w| w.speed),
      description: response.weather.into_iter().next().and_then(|w| w.description),
    }
  }

  pub fn format_summary(&self, city: &str) -> Result<String, Error> {
    let temp = self.temp.ok_or(Error::MissingField("main.temp"))?;
    let description = self
      .description
      .as_deref()
      .ok_or(Error::MissingField("weather.description"))?;
    let humidity = self.humidity.ok_or(Error::MissingField("main.humidity"))?;
    let wind_speed = self.wind_speed.ok_or(Error::MissingField("wind.speed"))?;

    Ok(format!(
      "{} Погода в {}: {:.1}°C, {}\n   💧 Влажность: {}% | 💨 Ветер: {} м/с",
      condition_emoji(description),
      city,
      temp,
      capitalize(description),
      humidity,
      wind_speed,
    ))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
  pub dt: DateTime<Utc>,
  pub temp: Option<f64>,
  pub description: Option<String>,
}

/// Five-day forecast in three-hour steps, ordered as returned by the
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
  pub city: String,
  pub country: String,
  pub count: u32,
  pub entries: Vec<ForecastEntry>,
}

impl ForecastSet {
  pub(crate) fn from_response(response: ForecastResponse) -> Result<Self, Error> {
    if response.list.is_empty() {
      return Err(Error::InvalidResponse(
        "forecast response contained no entries".to_string(),
      ));
    }

    let entries: Vec<ForecastEntry> = response
      .list
      .into_iter()
      .filter_map(|item| {
        let dt = Utc.timestamp_opt(item.dt, 0).single()?;
        Some(ForecastEntry {
          dt,
          temp: item.main.as_ref().and_then(|m| m.temp),
          description: item.weather.into_iter().next().and_then(|w| w.description),
        })
      })
      .collect();

    let (city, country) = response
      .city
      .map(|c| (c.name.unwrap_or_default(), c.country.unwrap_or_default()))
      .unwrap_or_default();

    Ok(Self {
      city,
      country,
      count: response.cnt.unwrap_or(entries.len() as u32),
      entries,
    })
  }

  /// Day-level summary: min/max temperature and the first reported
  /// condition of each calendar day.
  pub fn format_daily(&self) -> String {
    let mut days: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
    for entry in &self.entries {
      days.entry(entry.dt.date_naive()).or_default().push(entry);
    }

    let mut lines = vec![format!("📅 Прогноз для {} ({}):", self.city, self.country)];
    for (date, entries) in days {
      let temps: Vec<f64> = entries.iter().filter_map(|e| e.temp).collect();
      let description = entries
        .iter()
        .find_map(|e| e.description.as_deref())
        .unwrap_or("нет данных");

      match (
        temps.iter().cloned().reduce(f64::min),
        temps.iter().cloned().reduce(f64::max),
      ) {
        (Some(min), Some(max)) => lines.push(format!(
          "  {}: от {:.1}°C до {:.1}°C, {}",
          date.format("%d.%m"),
          min,
          max,
          description,
        )),
        _ => lines.push(format!("  {}: нет данных", date.format("%d.%m"))),
      }
    }

    lines.join("\n")
  }
}

/// Pollutant key (so2, no2, pm10, pm2_5, o3, co, nh3, no) mapped to its
/// concentration in µg/m³, straight from `list[0].components`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading(HashMap<String, f64>);

impl PollutantReading {
  pub fn new(components: HashMap<String, f64>) -> Self {
    Self(components)
  }

  pub(crate) fn from_response(response: AirPollutionResponse) -> Result<Self, Error> {
    let first = response.list.into_iter().next().ok_or_else(|| {
      Error::InvalidResponse("air pollution response contained no data".to_string())
    })?;
    Ok(Self(first.components))
  }

  pub fn get(&self, key: &str) -> Option<f64> {
    self.0.get(key).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
    self.0.iter()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

pub(crate) fn condition_emoji(description: &str) -> &'static str {
  let lowered = description.to_lowercase();
  // Matches the keyword anywhere in the description ("небольшой дождь").
  let table = [
    ("ясно", "☀️"),
    ("пасмурно", "☁️"),
    ("дождь", "🌧️"),
    ("снег", "❄️"),
    ("туман", "🌫️"),
    ("облачно", "⛅"),
  ];
  for (keyword, emoji) in table {
    if lowered.contains(keyword) {
      return emoji;
    }
  }
  "🌤️"
}

pub(crate) fn capitalize(text: &str) -> String {
  let mut chars = text.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}
