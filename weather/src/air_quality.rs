// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
//! Grading of raw pollutant concentrations into a five-step air-quality
//! index. Pure: the tables are fixed and classification never fails.
use crate::models::weather::PollutantReading;
use std::collections::HashMap;

pub(crate) const CONCENTRATION_UNIT: &str = "мкг/м³";

/// Upper bounds (µg/m³) of severity bands 1..=4; a concentration above the
/// last bound grades 5. Bands are half-open: `min <= value < max`.
struct PrimaryPollutant {
  key: &'static str,
  display_name: &'static str,
  bounds: [f64; 4],
}

/// Main pollutants in grading order; ties on the overall index resolve to
/// the earliest entry here.
const PRIMARY: [PrimaryPollutant; 6] = [
  PrimaryPollutant {
    key: "so2",
    display_name: "Диоксид серы (SO₂)",
    bounds: [20.0, 80.0, 250.0, 350.0],
  },
  PrimaryPollutant {
    key: "no2",
    display_name: "Диоксид азота (NO₂)",
    bounds: [40.0, 70.0, 150.0, 250.0],
  },
  PrimaryPollutant {
    key: "pm10",
    display_name: "Крупные частицы (PM₁₀)",
    bounds: [20.0, 50.0, 100.0, 200.0],
  },
  PrimaryPollutant {
    key: "pm2_5",
    display_name: "Мелкие частицы (PM₂.₅)",
    bounds: [10.0, 25.0, 50.0, 75.0],
  },
  PrimaryPollutant {
    key: "o3",
    display_name: "Озон (O₃)",
    bounds: [60.0, 100.0, 140.0, 180.0],
  },
  PrimaryPollutant {
    key: "co",
    display_name: "Оксид углерода (CO)",
    bounds: [4400.0, 9400.0, 12400.0, 15400.0],
  },
];

/// Reported only in extended mode with a single qualitative range; these
/// never move the overall index.
const SECONDARY: [(&str, &'static str, f64, f64); 2] = [
  ("nh3", "Аммиак (NH₃)", 0.1, 200.0),
  ("no", "Оксид азота (NO)", 0.1, 100.0),
];

const STATUS_LABELS: [&str; 5] = [
  "Хорошо",
  "Удовлетворительно",
  "Умеренно",
  "Плохо",
  "Очень плохо",
];

const IN_RANGE: &str = "В пределах диапазона";
const OUT_OF_RANGE: &str = "Вне диапазона";

fn status_label(index: u8) -> &'static str {
  STATUS_LABELS[(index.clamp(1, 5) - 1) as usize]
}

fn grade(value: f64, bounds: &[f64; 4]) -> u8 {
  for (i, bound) in bounds.iter().enumerate() {
    if value < *bound {
      return (i + 1) as u8;
    }
  }
  5
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantDetail {
  pub key: &'static str,
  pub display_name: &'static str,
  pub value: f64,
  pub unit: &'static str,
  pub status: &'static str,
  /// `None` for secondary pollutants, which carry no severity grade.
  pub index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReport {
  /// 1..=5, or 0 when no primary pollutant was present.
  pub overall_index: u8,
  pub overall_status: &'static str,
  pub components: Vec<PollutantDetail>,
  pub components_analyzed: usize,
}

impl AirQualityReport {
  pub fn format_report(&self) -> String {
    let mut lines = vec![format!(
      "🌬️ Качество воздуха: {} (индекс {}/5)",
      self.overall_status, self.overall_index,
    )];
    for detail in &self.components {
      lines.push(format!(
        "  • {}: {} {} — {}",
        detail.display_name, detail.value, detail.unit, detail.status,
      ));
    }
    lines.push(format!(
      "Проанализировано компонентов: {}",
      self.components_analyzed,
    ));
    lines.join("\n")
  }
}

/// Grades every recognized pollutant in `readings`. Keys are matched
/// case-insensitively; unknown keys are ignored. With `extended`, the
/// secondary pollutants are appended without a severity index.
pub fn classify(readings: &PollutantReading, extended: bool) -> AirQualityReport {
  let normalized: HashMap<String, f64> = readings
    .iter()
    .map(|(key, value)| (key.to_lowercase(), *value))
    .collect();

  let mut components = Vec::new();
  let mut overall_index = 0u8;
  let mut overall_status = status_label(1);

  for pollutant in &PRIMARY {
    let Some(&value) = normalized.get(pollutant.key) else {
      continue;
    };
    let index = grade(value, &pollutant.bounds);
    let status = status_label(index);
    if index > overall_index {
      overall_index = index;
      overall_status = status;
    }
    components.push(PollutantDetail {
      key: pollutant.key,
      display_name: pollutant.display_name,
      value,
      unit: CONCENTRATION_UNIT,
      status,
      index: Some(index),
    });
  }

  if extended {
    for (key, display_name, min, max) in SECONDARY {
      let Some(&value) = normalized.get(key) else {
        continue;
      };
      let status = if value >= min && value < max {
        IN_RANGE
      } else {
        OUT_OF_RANGE
      };
      components.push(PollutantDetail {
        key,
        display_name,
        value,
        unit: CONCENTRATION_UNIT,
        status,
        index: None,
      });
    }
  }

  // Stable: equal indices keep the grading order, secondaries go last.
  components.sort_by(|a, b| match (a.index, b.index) {
    (Some(left), Some(right)) => right.cmp(&left),
    (Some(_), None) => std::cmp::Ordering::Less,
    (None, Some(_)) => std::cmp::Ordering::Greater,
    (None, None) => std::cmp::Ordering::Equal,
  });

  let components_analyzed = components.iter().filter(|c| c.index.is_some()).count();

  AirQualityReport {
    overall_index,
    overall_status,
    components,
    components_analyzed,
  }
}
