use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const TICKER_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Idr,
    Usd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(change) if change > 0.0 => Self::Up,
            Some(change) if change < 0.0 => Self::Down,
            _ => Self::Flat,
        }
    }
}

/// One row of the CoinGecko `coins/markets` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d_in_currency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub trend: Trend,
}

impl From<CoinMarket> for Ticker {
    fn from(coin: CoinMarket) -> Self {
        Self {
            trend: Trend::from_change(coin.price_change_percentage_24h),
            id: coin.id,
            symbol: coin.symbol.to_uppercase(),
            name: coin.name,
            image: coin.image,
            current_price: coin.current_price.unwrap_or_default(),
            change_24h: coin.price_change_percentage_24h.unwrap_or_default(),
            change_7d: coin.price_change_percentage_7d_in_currency.unwrap_or_default(),
            market_cap: coin.market_cap.unwrap_or_default(),
            total_volume: coin.total_volume.unwrap_or_default(),
        }
    }
}

pub fn tickers(coins: Vec<CoinMarket>) -> Vec<Ticker> {
    coins.into_iter().take(TICKER_SIZE).map(Into::into).collect()
}
