// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
mod dotenv;

use anyhow::{Context, Result};
use config::Config;
use std::env;
use std::time::Duration;
use tracing::{error, info};
use weather::{WeatherConfig, WeatherService};

const CONFIG_PATH: &str = "pogoda.toml";
const DEFAULT_CITY: &str = "Москва";

#[cfg(debug_assertions)]
fn setup_logging() {
  tracing_subscriber::fmt()
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .init();
}

#[cfg(not(debug_assertions))]
fn setup_logging() {
  tracing_subscriber::fmt().init();
}

#[tokio::main]
async fn main() -> Result<()> {
  #[cfg(debug_assertions)]
  if let Err(e) = dotenv::load() {
    // Missing .env is fine in development, everything else is not.
    if !matches!(e, error::Error::PathNotFound(_)) {
      return Err(e.into());
    }
  }
  setup_logging();

  let api_key =
    env::var("OPENWEATHER_API_KEY").context("Missing OPENWEATHER_API_KEY environment variable")?;
  let city = env::args().nth(1).unwrap_or_else(|| DEFAULT_CITY.to_string());

  let settings = Config::load_or_default(CONFIG_PATH).weather;
  let config = WeatherConfig::new(
    api_key,
    settings.cache_dir,
    Duration::from_secs(settings.cache_ttl_hours * 3600),
  )?
  .with_retry(
    settings.max_retries,
    Duration::from_secs(settings.base_retry_delay_secs),
  )
  .with_lang(settings.lang);

  let service = WeatherService::new(config);

  info!("Requesting weather for city: {}", city);
  if let Err(e) = run(&service, &city).await {
    error!("Failed to fetch weather: {:?}", e);
    std::process::exit(1);
  }

  Ok(())
}

async fn run(service: &WeatherService, city: &str) -> Result<()> {
  let current = service.current(city).await?;
  match current.snapshot.format_summary(&current.city) {
    Ok(summary) => {
      if current.from_cache {
        println!("ℹ️ Сеть недоступна, показаны сохранённые данные:");
      }
      println!("{summary}");
    }
    Err(e) => println!("⚠️ Неполные данные о погоде: {e}"),
  }

  let forecast = service.forecast(city).await?;
  println!("\n{}", forecast.forecast.format_daily());

  let report = service.air_quality(city, true).await?;
  println!("\n{}", report.format_report());

  Ok(())
}
