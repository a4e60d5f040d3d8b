use reqwest::Client;
use shared::{weather::Forecast, WeatherReport};
use tracing::instrument;

use crate::{config::Env, error::ApiError, fetch_json};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

pub struct WeatherClient {
    http: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

impl WeatherClient {
    pub fn new(env: &Env, http: Client) -> Self {
        Self {
            http,
            base_url: env.open_meteo_api_url.trim_end_matches('/').to_string(),
            latitude: env.weather_latitude,
            longitude: env.weather_longitude,
            timezone: env.weather_timezone.clone(),
        }
    }

    #[instrument(skip(self), fields(latitude = self.latitude, longitude = self.longitude))]
    pub async fn current(&self) -> Result<WeatherReport, ApiError> {
        let request = self
            .http
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", self.timezone.clone()),
            ]);

        let forecast: Forecast = fetch_json(request, "Open-Meteo").await?;
        forecast
            .current
            .map(WeatherReport::from)
            .ok_or_else(|| ApiError::Upstream("Open-Meteo returned no current weather".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn missing_current_block_is_upstream_error() {
        let env = Env {
            open_meteo_api_url: crate::canned::serve("200 OK", r#"{"latitude":3.6}"#).await,
            ..Env::default()
        };

        let error = WeatherClient::new(&env, Client::new()).current().await.unwrap_err();
        assert_eq!(error.to_string(), "Open-Meteo returned no current weather");
    }
}
