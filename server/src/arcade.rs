use reqwest::{header::USER_AGENT, Client};
use shared::ArcadeProfile;
use tracing::{info, instrument};

use crate::{config::Env, error::ApiError};

// The profile page rejects requests that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

pub struct ArcadeClient {
    http: Client,
    base_url: String,
    profile_id: String,
    points_per_badge: f64,
}

impl ArcadeClient {
    pub fn new(env: &Env, http: Client) -> Self {
        Self {
            http,
            base_url: env.arcade_base_url.trim_end_matches('/').to_string(),
            profile_id: env.arcade_profile_id.clone(),
            points_per_badge: env.arcade_points_per_badge,
        }
    }

    pub fn profile_url(&self) -> String {
        format!("{}/{}", self.base_url, self.profile_id)
    }

    #[instrument(skip(self), fields(profile = %self.profile_id))]
    pub async fn profile(&self) -> Result<ArcadeProfile, ApiError> {
        let url = self.profile_url();
        let response = self
            .http
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| ApiError::upstream("Failed to fetch Arcade profile", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "Failed to fetch Arcade profile: HTTP {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ApiError::upstream("Failed to read Arcade profile", e))?;
        let profile = ArcadeProfile::parse(&html, url, self.points_per_badge);
        info!("Scraped {} badges", profile.badges.len());

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_url_is_templated_on_id() {
        let env = Env {
            arcade_base_url: "https://example.com/public_profiles/".to_string(),
            arcade_profile_id: "abc-123".to_string(),
            ..Env::default()
        };
        let client = ArcadeClient::new(&env, Client::new());

        assert_eq!(
            client.profile_url(),
            "https://example.com/public_profiles/abc-123"
        );
    }

    #[rocket::async_test]
    async fn unreachable_profile_is_upstream_error() {
        let env = Env {
            arcade_base_url: "http://127.0.0.1:9".to_string(),
            ..Env::default()
        };
        let client = ArcadeClient::new(&env, Client::new());

        let error = client.profile().await.unwrap_err();
        assert!(matches!(error, ApiError::Upstream(_)));
    }

    #[rocket::async_test]
    async fn non_success_status_is_upstream_error() {
        let env = Env {
            arcade_base_url: crate::canned::serve("503 Service Unavailable", "").await,
            ..Env::default()
        };
        let client = ArcadeClient::new(&env, Client::new());

        let error = client.profile().await.unwrap_err();
        assert!(matches!(error, ApiError::Upstream(_)));
        assert_eq!(
            error.to_string(),
            "Failed to fetch Arcade profile: HTTP 503 Service Unavailable"
        );
    }
}
