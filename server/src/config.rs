use std::time::Duration;

use serde::Deserialize;

/// Process environment of the server, loaded with `envy`.
///
/// Credentials are optional on purpose: a missing key only fails the endpoints that
/// need it, at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
    pub github_token: Option<String>,
    #[serde(default = "default_github_username")]
    pub github_username: String,
    pub github_api_url: Option<String>,
    #[serde(default = "default_repository_limit")]
    pub github_repository_limit: u32,
    #[serde(default = "default_languages_per_repository")]
    pub github_languages_per_repository: u32,

    pub huggingface_api_key: Option<String>,
    #[serde(default = "default_huggingface_api_url")]
    pub huggingface_api_url: String,
    #[serde(default = "default_detection_model")]
    pub detection_model: String,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    #[serde(default = "default_max_retries")]
    pub inference_max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub inference_retry_delay_secs: u64,

    #[serde(default = "default_arcade_profile_id")]
    pub arcade_profile_id: String,
    #[serde(default = "default_arcade_base_url")]
    pub arcade_base_url: String,
    #[serde(default = "default_points_per_badge")]
    pub arcade_points_per_badge: f64,

    #[serde(default = "default_coingecko_api_url")]
    pub coingecko_api_url: String,
    #[serde(default = "default_open_meteo_api_url")]
    pub open_meteo_api_url: String,
    #[serde(default = "default_latitude")]
    pub weather_latitude: f64,
    #[serde(default = "default_longitude")]
    pub weather_longitude: f64,
    #[serde(default = "default_timezone")]
    pub weather_timezone: String,

    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Default for Env {
    fn default() -> Self {
        Self {
            github_token: None,
            github_username: default_github_username(),
            github_api_url: None,
            github_repository_limit: default_repository_limit(),
            github_languages_per_repository: default_languages_per_repository(),
            huggingface_api_key: None,
            huggingface_api_url: default_huggingface_api_url(),
            detection_model: default_detection_model(),
            sentiment_model: default_sentiment_model(),
            inference_max_retries: default_max_retries(),
            inference_retry_delay_secs: default_retry_delay_secs(),
            arcade_profile_id: default_arcade_profile_id(),
            arcade_base_url: default_arcade_base_url(),
            arcade_points_per_badge: default_points_per_badge(),
            coingecko_api_url: default_coingecko_api_url(),
            open_meteo_api_url: default_open_meteo_api_url(),
            weather_latitude: default_latitude(),
            weather_longitude: default_longitude(),
            weather_timezone: default_timezone(),
            telegram_token: None,
            telegram_chat_id: None,
        }
    }
}

impl Env {
    pub fn github_token(&self) -> Option<&str> {
        non_empty(&self.github_token)
    }

    pub fn huggingface_api_key(&self) -> Option<&str> {
        non_empty(&self.huggingface_api_key)
    }

    pub fn telegram(&self) -> Option<(String, String)> {
        Some((
            non_empty(&self.telegram_token)?.to_string(),
            non_empty(&self.telegram_chat_id)?.to_string(),
        ))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.inference_max_retries,
            delay: Duration::from_secs(self.inference_retry_delay_secs),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// How many extra attempts a caller may request while a model is warming up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn allowed(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or_default().min(self.max_retries)
    }
}

fn default_github_username() -> String {
    "fakhrizamaris".to_string()
}

const fn default_repository_limit() -> u32 {
    20
}

const fn default_languages_per_repository() -> u32 {
    5
}

fn default_huggingface_api_url() -> String {
    "https://router.huggingface.co/hf-inference/models".to_string()
}

fn default_detection_model() -> String {
    "hustvl/yolos-tiny".to_string()
}

fn default_sentiment_model() -> String {
    "nlptown/bert-base-multilingual-uncased-sentiment".to_string()
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_secs() -> u64 {
    3
}

fn default_arcade_profile_id() -> String {
    "3ee205e0-bbfa-48d6-852f-770aac47be0a".to_string()
}

fn default_arcade_base_url() -> String {
    "https://www.cloudskillsboost.google/public_profiles".to_string()
}

const fn default_points_per_badge() -> f64 {
    shared::arcade::DEFAULT_POINTS_PER_BADGE
}

fn default_coingecko_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_open_meteo_api_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

const fn default_latitude() -> f64 {
    3.5952
}

const fn default_longitude() -> f64 {
    98.6722
}

fn default_timezone() -> String {
    "Asia/Bangkok".to_string()
}
