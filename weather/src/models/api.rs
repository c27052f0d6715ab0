// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! Raw OpenWeatherMap response shapes. Fields the provider may omit are
//! optional; the conversion into domain types lives in `models::weather`.
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct GeoEntry {
  pub lat: f64,
  pub lon: f64,
  pub name: Option<String>,
  pub country: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrentResponse {
  pub main: Option<MainInfo>,
  #[serde(default)]
  pub weather: Vec<WeatherDesc>,
  pub wind: Option<WindInfo>,
  pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MainInfo {
  pub temp: Option<f64>,
  pub feels_like: Option<f64>,
  pub humidity: Option<f64>,
  pub pressure: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherDesc {
  pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindInfo {
  pub speed: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastResponse {
  #[serde(default)]
  pub list: Vec<ForecastItem>,
  pub city: Option<CityInfo>,
  pub cnt: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastItem {
  pub dt: i64,
  pub main: Option<MainInfo>,
  #[serde(default)]
  pub weather: Vec<WeatherDesc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CityInfo {
  pub name: Option<String>,
  pub country: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirPollutionResponse {
  #[serde(default)]
  pub list: Vec<PollutionItem>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollutionItem {
  #[serde(default)]
  pub components: HashMap<String, f64>,
}
