use reqwest::Client;
use shared::{
    market::{self, CoinMarket, TICKER_SIZE},
    Currency, Ticker,
};
use tracing::instrument;

use crate::{config::Env, error::ApiError, fetch_json};

pub struct MarketClient {
    http: Client,
    base_url: String,
}

impl MarketClient {
    pub fn new(env: &Env, http: Client) -> Self {
        Self {
            http,
            base_url: env.coingecko_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Top coins by market cap, priced in `currency`.
    #[instrument(skip(self))]
    pub async fn tickers(&self, currency: Currency) -> Result<Vec<Ticker>, ApiError> {
        let per_page = TICKER_SIZE.to_string();
        let request = self
            .http
            .get(format!("{}/coins/markets", self.base_url))
            .query(&[
                ("vs_currency", currency.as_ref()),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "7d"),
            ]);

        let coins: Vec<CoinMarket> = fetch_json(request, "CoinGecko").await?;
        Ok(market::tickers(coins))
    }
}
