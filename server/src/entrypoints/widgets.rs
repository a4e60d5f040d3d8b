use rocket::{serde::json::Json, State};
use shared::Currency;
use tracing::instrument;

use crate::{
    error::{ApiError, ErrorBody},
    market::MarketClient,
    types::{MarketResponse, WeatherResponse},
    weather::WeatherClient,
};

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Top coins by market cap", body = MarketResponse),
    (status = 400, description = "Unsupported currency", body = ErrorBody),
    (status = 500, description = "CoinGecko failure", body = ErrorBody)
))]
#[get("/market?<currency>")]
#[instrument(skip(market))]
pub async fn get_market(
    currency: Option<&str>,
    market: &State<MarketClient>,
) -> Result<Json<MarketResponse>, ApiError> {
    let currency = match currency {
        Some(value) => value
            .parse::<Currency>()
            .map_err(|_| ApiError::Input(format!("Unsupported currency {value}, use idr or usd")))?,
        None => Currency::default(),
    };

    let tickers = market.tickers(currency).await?;
    Ok(Json(MarketResponse::new(currency, tickers)))
}

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Current weather at the configured location", body = WeatherResponse),
    (status = 500, description = "Open-Meteo failure", body = ErrorBody)
))]
#[get("/weather")]
#[instrument(skip(weather))]
pub async fn get_weather(weather: &State<WeatherClient>) -> Result<Json<WeatherResponse>, ApiError> {
    let report = weather.current().await?;
    Ok(Json(report.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing widget entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![get_market, get_weather])
    })
}
