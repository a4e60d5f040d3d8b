//! HTTP backend of the portfolio dashboard.
//!
//! Every endpoint calls one external service (GitHub GraphQL, the Arcade public profile,
//! the Hugging Face inference API, CoinGecko, Open-Meteo), reshapes the answer with the
//! `shared` crate and reports failures through [`error::ApiError`].

#[macro_use]
extern crate rocket;

use reqwest::RequestBuilder;
use rocket::{http::Method, Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_prometheus::PrometheusMetrics;
use serde::de::DeserializeOwned;

pub mod alerts;
pub mod arcade;
#[cfg(test)]
mod canned;
pub mod config;
pub mod entrypoints;
pub mod error;
pub mod github;
pub mod inference;
pub mod market;
pub mod types;
pub mod weather;

use arcade::ArcadeClient;
use config::Env;
use error::ApiError;
use github::GithubClient;
use inference::InferenceClient;
use market::MarketClient;
use weather::WeatherClient;

/// Builds the application with all clients, fairings and routes.
pub fn build(env: Env) -> anyhow::Result<Rocket<Build>> {
    let http = reqwest::Client::new();
    let github = GithubClient::new(&env)?;
    let arcade = ArcadeClient::new(&env, http.clone());
    let inference = InferenceClient::new(&env, http.clone());
    let market = MarketClient::new(&env, http.clone());
    let weather = WeatherClient::new(&env, http);

    let cors = CorsOptions {
        allowed_origins: AllowedOrigins::all(),
        allowed_methods: [Method::Get, Method::Post, Method::Options]
            .into_iter()
            .map(From::from)
            .collect(),
        ..Default::default()
    }
    .to_cors()?;
    let prometheus = PrometheusMetrics::new();

    Ok(rocket::build()
        .manage(github)
        .manage(arcade)
        .manage(inference)
        .manage(market)
        .manage(weather)
        .attach(cors)
        .attach(prometheus.clone())
        .attach(entrypoints::stage())
        .mount("/metrics", prometheus))
}

/// Sends `request` and decodes a successful JSON answer of `service`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &str,
) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::upstream(&format!("{service} request failed"), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Upstream(format!(
            "{service} returned HTTP {status}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::upstream(&format!("Unexpected {service} response"), e))
}
