use std::future::Future;

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{
    inference::{ClassificationOutput, Detection},
    SentimentResult, UpstreamFailure,
};
use tracing::{info, instrument, warn};

use crate::{
    config::{Env, RetryPolicy},
    error::ApiError,
};

/// Error payload of the inference service.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: ErrorMessage,
    #[serde(default)]
    estimated_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_message(self) -> String {
        match self {
            Self::One(message) => message,
            Self::Many(messages) => messages.join("; "),
        }
    }
}

pub struct InferenceClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    detection_model: String,
    sentiment_model: String,
    pub retry: RetryPolicy,
}

impl InferenceClient {
    pub fn new(env: &Env, http: Client) -> Self {
        if env.huggingface_api_key().is_none() {
            warn!("HUGGINGFACE_API_KEY is not set, AI demos are disabled");
        }
        Self {
            http,
            api_key: env.huggingface_api_key().map(ToString::to_string),
            base_url: env.huggingface_api_url.trim_end_matches('/').to_string(),
            detection_model: env.detection_model.clone(),
            sentiment_model: env.sentiment_model.clone(),
            retry: env.retry_policy(),
        }
    }

    pub fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key.as_deref().ok_or_else(|| {
            ApiError::Configuration(
                "Hugging Face API key not configured. Please add HUGGINGFACE_API_KEY to .env"
                    .to_string(),
            )
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }

    #[instrument(skip(self, image), fields(model = %self.detection_model, bytes = image.len()))]
    pub async fn detect(&self, image: &[u8], content_type: &str) -> Result<Vec<Detection>, ApiError> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(self.model_url(&self.detection_model))
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, content_type)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| ApiError::upstream("Detection request failed", e))?;

        let detections: Vec<Detection> = read_json(response).await?;
        info!("Received {} detections", detections.len());
        Ok(detections)
    }

    #[instrument(skip(self, text), fields(model = %self.sentiment_model, chars = text.len()))]
    pub async fn sentiment(&self, text: &str) -> Result<SentimentResult, ApiError> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(self.model_url(&self.sentiment_model))
            .bearer_auth(api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| ApiError::upstream("Sentiment request failed", e))?;

        let output: ClassificationOutput = read_json(response).await?;
        SentimentResult::from_scores(output.into_scores())
            .ok_or_else(|| ApiError::Upstream("No results returned from model".to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::upstream("Failed to read inference response", e))?;

    if !status.is_success() {
        return Err(failure_from_body(status, body).into());
    }

    serde_json::from_str(&body).map_err(|e| ApiError::upstream("Unexpected inference response", e))
}

fn failure_from_body(status: StatusCode, body: String) -> UpstreamFailure {
    match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => UpstreamFailure::classify(payload.error.into_message(), payload.estimated_time),
        Err(_) if body.trim().is_empty() => {
            UpstreamFailure::classify(format!("Inference service returned HTTP {status}"), None)
        }
        Err(_) => UpstreamFailure::classify(body, None),
    }
}

/// Runs `attempt` until it stops reporting a cold model, at most `retries` extra times
/// (capped by the policy), sleeping `policy.delay` in between.
pub async fn with_retries<T, F, Fut>(
    policy: RetryPolicy,
    retries: Option<u32>,
    mut attempt: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut remaining = policy.allowed(retries);
    loop {
        match attempt().await {
            Err(ApiError::ModelLoading { retry_after, .. }) if remaining > 0 => {
                remaining -= 1;
                info!(
                    "Model is loading (ready in ~{}s), retrying in {:?}, {remaining} retries left",
                    retry_after.as_secs(),
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use super::*;

    fn loading() -> ApiError {
        ApiError::ModelLoading {
            message: "Model is currently loading".to_string(),
            retry_after: Duration::from_secs(20),
        }
    }

    const POLICY: RetryPolicy = RetryPolicy {
        max_retries: 2,
        delay: Duration::ZERO,
    };

    #[test]
    fn loading_body_is_retryable() {
        let failure = failure_from_body(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":"Model hustvl/yolos-tiny is currently loading","estimated_time":20.0}"#
                .to_string(),
        );
        assert!(failure.is_loading());
    }

    #[test]
    fn other_server_errors_are_terminal() {
        let failure = failure_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":["Input is not an image"]}"#.to_string(),
        );
        assert_eq!(
            failure,
            UpstreamFailure::Terminal {
                message: "Input is not an image".to_string()
            }
        );

        let failure = failure_from_body(StatusCode::BAD_GATEWAY, String::new());
        assert_eq!(
            failure,
            UpstreamFailure::Terminal {
                message: "Inference service returned HTTP 502 Bad Gateway".to_string()
            }
        );

        let failure = failure_from_body(StatusCode::BAD_GATEWAY, "upstream timeout".to_string());
        assert!(!failure.is_loading());
    }

    #[rocket::async_test]
    async fn retries_stop_at_policy_cap() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), ApiError> = with_retries(POLICY, Some(10), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(loading())
        })
        .await;

        assert!(matches!(result, Err(ApiError::ModelLoading { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[rocket::async_test]
    async fn no_retries_by_default() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), ApiError> = with_retries(POLICY, None, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(loading())
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rocket::async_test]
    async fn warm_model_result_is_returned() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retries(POLICY, Some(2), move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(loading()),
                _ => Ok("ready"),
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rocket::async_test]
    async fn terminal_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), ApiError> = with_retries(POLICY, Some(2), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Upstream("boom".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ApiError::Upstream(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rocket::async_test]
    async fn missing_key_fails_before_any_request() {
        let client = InferenceClient::new(&Env::default(), Client::new());

        let error = client.detect(b"png", "image/png").await.unwrap_err();
        assert!(matches!(error, ApiError::Configuration(_)));
        let error = client.sentiment("bagus sekali").await.unwrap_err();
        assert!(matches!(error, ApiError::Configuration(_)));
    }

    fn client_for(base_url: String) -> InferenceClient {
        let env = Env {
            huggingface_api_key: Some("hf_test".to_string()),
            huggingface_api_url: base_url,
            ..Env::default()
        };
        InferenceClient::new(&env, Client::new())
    }

    #[rocket::async_test]
    async fn cold_model_response_is_model_loading() {
        let base_url = crate::canned::serve(
            "503 Service Unavailable",
            r#"{"error":"Model hustvl/yolos-tiny is currently loading","estimated_time":7}"#,
        )
        .await;

        let error = client_for(base_url)
            .detect(b"png", "image/png")
            .await
            .unwrap_err();
        match error {
            ApiError::ModelLoading { retry_after, .. } => {
                assert_eq!(retry_after, Duration::from_secs(7))
            }
            other => panic!("expected ModelLoading, got {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn failed_inference_is_upstream_error() {
        let base_url = crate::canned::serve(
            "500 Internal Server Error",
            r#"{"error":"Input is not an image"}"#,
        )
        .await;

        let error = client_for(base_url)
            .detect(b"png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Upstream(_)));
        assert_eq!(error.to_string(), "Input is not an image");
    }

    #[rocket::async_test]
    async fn sentiment_scores_are_read_from_response() {
        let base_url = crate::canned::serve(
            "200 OK",
            r#"[[{"label":"4 stars","score":0.7},{"label":"5 stars","score":0.3}]]"#,
        )
        .await;

        let result = client_for(base_url).sentiment("Lumayan bagus").await.unwrap();
        assert_eq!(result.label, "4 stars");
        assert_eq!(result.stars(), 4);
    }
}
