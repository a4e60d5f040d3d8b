//! Data shaping for the portfolio dashboard: everything between a raw upstream payload
//! and the JSON the dashboard widgets render. Nothing in here performs I/O.

pub mod arcade;
pub mod contributions;
pub mod inference;
pub mod market;
pub mod weather;

pub use arcade::{ArcadeProfile, ArcadeStats, Badge};
pub use contributions::{ContributionDay, ContributionStats, GithubUser, LanguageUsage, StreakResult};
pub use inference::{Detection, Sentiment, SentimentResult, UpstreamFailure};
pub use market::{Currency, Ticker};
pub use weather::WeatherReport;
