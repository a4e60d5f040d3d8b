use serde::{Deserialize, Serialize};
use shared::{
    inference::{BoundingBox, ScoredSentiment},
    ArcadeProfile, ArcadeStats, Badge, ContributionStats, Currency, Detection, LanguageUsage,
    SentimentResult, Ticker, WeatherReport,
};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    pub name: String,
    pub color: String,
    pub percentage: f64,
    pub size: u64,
}

impl From<LanguageUsage> for LanguageResponse {
    fn from(language: LanguageUsage) -> Self {
        Self {
            name: language.name,
            color: language.color,
            percentage: language.percentage,
            size: language.size,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GithubStatsResponse {
    pub username: String,
    pub total_contributions: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub languages: Vec<LanguageResponse>,
}

impl GithubStatsResponse {
    pub fn new(username: String, stats: ContributionStats) -> Self {
        Self {
            username,
            total_contributions: stats.total_contributions,
            current_streak: stats.streaks.current,
            longest_streak: stats.streaks.longest,
            languages: stats.languages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeStatsResponse {
    pub total_badges: u32,
    pub estimated_points: u32,
    pub last_active: String,
    pub profile_url: String,
}

impl From<ArcadeStats> for ArcadeStatsResponse {
    fn from(stats: ArcadeStats) -> Self {
        Self {
            total_badges: stats.total_badges,
            estimated_points: stats.estimated_points,
            last_active: stats.last_active,
            profile_url: stats.profile_url,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BadgeResponse {
    pub title: String,
    pub date: String,
    pub image: String,
}

impl From<Badge> for BadgeResponse {
    fn from(badge: Badge) -> Self {
        Self {
            title: badge.title,
            date: badge.date,
            image: badge.image,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ArcadeResponse {
    pub stats: ArcadeStatsResponse,
    pub badges: Vec<BadgeResponse>,
}

impl From<ArcadeProfile> for ArcadeResponse {
    fn from(profile: ArcadeProfile) -> Self {
        Self {
            stats: profile.stats.into(),
            badges: profile.badges.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
pub struct BoxResponse {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl From<BoundingBox> for BoxResponse {
    fn from(bounding_box: BoundingBox) -> Self {
        Self {
            xmin: bounding_box.xmin,
            ymin: bounding_box.ymin,
            xmax: bounding_box.xmax,
            ymax: bounding_box.ymax,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectionItem {
    pub label: String,
    pub score: f64,
    #[serde(rename = "box")]
    pub bounding_box: BoxResponse,
}

impl From<Detection> for DetectionItem {
    fn from(detection: Detection) -> Self {
        Self {
            label: detection.label,
            score: detection.score,
            bounding_box: detection.bounding_box.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectionResponse {
    pub detections: Vec<DetectionItem>,
}

impl From<Vec<Detection>> for DetectionResponse {
    fn from(detections: Vec<Detection>) -> Self {
        Self {
            detections: detections.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct SentimentRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub text: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelScoreResponse {
    pub label: String,
    pub display_label: String,
    pub score: f64,
}

impl From<ScoredSentiment> for LabelScoreResponse {
    fn from(scored: ScoredSentiment) -> Self {
        Self {
            label: scored.label,
            display_label: scored.sentiment.to_string(),
            score: scored.score,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBody {
    pub label: String,
    pub display_label: String,
    pub stars: u8,
    pub score: f64,
    pub all_scores: Vec<LabelScoreResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SentimentResponse {
    pub sentiment: SentimentBody,
}

impl From<SentimentResult> for SentimentResponse {
    fn from(result: SentimentResult) -> Self {
        Self {
            sentiment: SentimentBody {
                display_label: result.sentiment.to_string(),
                stars: result.stars(),
                label: result.label,
                score: result.score,
                all_scores: result.all_scores.into_iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TickerResponse {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub trend: String,
}

impl From<Ticker> for TickerResponse {
    fn from(ticker: Ticker) -> Self {
        Self {
            id: ticker.id,
            symbol: ticker.symbol,
            name: ticker.name,
            image: ticker.image,
            current_price: ticker.current_price,
            change_24h: ticker.change_24h,
            change_7d: ticker.change_7d,
            market_cap: ticker.market_cap,
            total_volume: ticker.total_volume,
            trend: ticker.trend.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketResponse {
    pub currency: String,
    pub coins: Vec<TickerResponse>,
}

impl MarketResponse {
    pub fn new(currency: Currency, tickers: Vec<Ticker>) -> Self {
        Self {
            currency: currency.to_string(),
            coins: tickers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub observed_at: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_code: u16,
    pub description: String,
    pub condition: String,
}

impl From<WeatherReport> for WeatherResponse {
    fn from(report: WeatherReport) -> Self {
        Self {
            observed_at: report.observed_at,
            temperature: report.temperature,
            humidity: report.humidity,
            wind_speed: report.wind_speed,
            weather_code: report.weather_code,
            description: report.description.to_string(),
            condition: report.condition.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
