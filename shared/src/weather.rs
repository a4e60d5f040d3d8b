use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

impl Condition {
    /// Buckets a WMO weather interpretation code.
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 | 1 => Self::Sunny,
            51..=67 | 80..=99 => Self::Rain,
            71..=77 => Self::Snow,
            _ => Self::Cloudy,
        }
    }
}

pub const fn describe(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        51..=55 => "Drizzle",
        61..=65 => "Rain",
        80..=82 => "Rain showers",
        95..=99 => "Thunderstorm",
        _ => "Cloudy",
    }
}

/// The `current` block of an Open-Meteo forecast.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub time: Option<String>,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub weather_code: u16,
    pub wind_speed_10m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub current: Option<CurrentWeather>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub observed_at: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_code: u16,
    pub description: &'static str,
    pub condition: Condition,
}

impl From<CurrentWeather> for WeatherReport {
    fn from(current: CurrentWeather) -> Self {
        Self {
            observed_at: current.time,
            temperature: current.temperature_2m,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            weather_code: current.weather_code,
            description: describe(current.weather_code),
            condition: Condition::from_code(current.weather_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_described() {
        assert_eq!(describe(0), "Clear sky");
        assert_eq!(describe(63), "Rain");
        assert_eq!(describe(96), "Thunderstorm");
        assert_eq!(describe(45), "Cloudy");
    }

    #[test]
    fn codes_are_bucketed() {
        assert_eq!(Condition::from_code(1), Condition::Sunny);
        assert_eq!(Condition::from_code(3), Condition::Cloudy);
        assert_eq!(Condition::from_code(66), Condition::Rain);
        assert_eq!(Condition::from_code(75), Condition::Snow);
        assert_eq!(Condition::from_code(81), Condition::Rain);
    }

    #[test]
    fn forecast_without_current_block_is_accepted() {
        let forecast: Forecast = serde_json::from_str(r#"{"latitude":3.6}"#).unwrap();
        assert!(forecast.current.is_none());

        let forecast: Forecast = serde_json::from_str(
            r#"{"current":{"time":"2024-06-01T10:00","temperature_2m":31.2,
                "relative_humidity_2m":70,"weather_code":2,"wind_speed_10m":8.4}}"#,
        )
        .unwrap();
        let report = WeatherReport::from(forecast.current.unwrap());
        assert_eq!(report.description, "Partly cloudy");
        assert_eq!(report.condition, Condition::Cloudy);
        assert_eq!(report.humidity, 70.0);
    }
}
