use octocrab::Octocrab;
use serde::Deserialize;
use shared::GithubUser;
use tracing::{instrument, warn};

use crate::{config::Env, error::ApiError};

const CONTRIBUTIONS_QUERY: &str = r#"
query($username: String!, $repositories: Int!, $languages: Int!) {
  user(login: $username) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            date
          }
        }
      }
    }
    repositories(first: $repositories, orderBy: {field: UPDATED_AT, direction: DESC}, ownerAffiliations: OWNER) {
      nodes {
        name
        languages(first: $languages, orderBy: {field: SIZE, direction: DESC}) {
          edges {
            size
            node {
              name
              color
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<GithubUser>,
}

pub struct GithubClient {
    octocrab: Option<Octocrab>,
    pub username: String,
    repository_limit: u32,
    languages_per_repository: u32,
}

impl GithubClient {
    pub fn new(env: &Env) -> anyhow::Result<Self> {
        let octocrab = match env.github_token() {
            Some(token) => {
                let mut builder = Octocrab::builder();
                if let Some(url) = &env.github_api_url {
                    builder = builder.base_uri(url.as_str())?;
                }
                Some(builder.personal_token(token.to_string()).build()?)
            }
            None => {
                warn!("GITHUB_TOKEN is not set, GitHub statistics are disabled");
                None
            }
        };

        Ok(Self {
            octocrab,
            username: env.github_username.clone(),
            repository_limit: env.github_repository_limit,
            languages_per_repository: env.github_languages_per_repository,
        })
    }

    fn octocrab(&self) -> Result<&Octocrab, ApiError> {
        self.octocrab.as_ref().ok_or_else(|| {
            ApiError::Configuration(
                "GitHub token not configured. Please add GITHUB_TOKEN to .env".to_string(),
            )
        })
    }

    #[instrument(skip(self), fields(username = %self.username))]
    pub async fn contributions(&self) -> Result<GithubUser, ApiError> {
        let octocrab = self.octocrab()?;
        let payload = serde_json::json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": {
                "username": self.username,
                "repositories": self.repository_limit,
                "languages": self.languages_per_repository,
            },
        });

        let response: GraphQlResponse<UserData> = octocrab
            .graphql(&payload)
            .await
            .map_err(github_error)?;

        user_from_response(response, &self.username)
    }
}

fn user_from_response(
    response: GraphQlResponse<UserData>,
    username: &str,
) -> Result<GithubUser, ApiError> {
    let user = response.data.and_then(|data| data.user);

    if !response.errors.is_empty() {
        let not_found = response
            .errors
            .iter()
            .all(|error| error.kind.as_deref() == Some("NOT_FOUND"));
        if not_found && user.is_none() {
            return Err(ApiError::NotFound(format!("GitHub user {username} not found")));
        }

        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ApiError::Upstream(format!(
            "GitHub GraphQL error: {}",
            messages.join("; ")
        )));
    }

    user.ok_or_else(|| ApiError::NotFound(format!("GitHub user {username} not found")))
}

fn github_error(error: octocrab::Error) -> ApiError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            ApiError::Upstream(format!("GitHub API error: {}", source.message))
        }
        other => ApiError::upstream("Failed to fetch GitHub data", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: serde_json::Value) -> GraphQlResponse<UserData> {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn missing_user_is_not_found() {
        let response = parse(serde_json::json!({
            "data": { "user": null },
            "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve to a User" }]
        }));

        let error = user_from_response(response, "ghost").unwrap_err();
        assert!(matches!(error, ApiError::NotFound(_)));

        let response = parse(serde_json::json!({ "data": { "user": null } }));
        let error = user_from_response(response, "ghost").unwrap_err();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn graphql_errors_are_upstream_errors() {
        let response = parse(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Field 'foo' doesn't exist" }]
        }));

        let error = user_from_response(response, "someone").unwrap_err();
        assert_eq!(
            error.to_string(),
            "GitHub GraphQL error: Field 'foo' doesn't exist"
        );
        assert!(matches!(error, ApiError::Upstream(_)));
    }

    #[test]
    fn user_is_extracted() {
        let response = parse(serde_json::json!({
            "data": { "user": {
                "contributionsCollection": {
                    "contributionCalendar": { "totalContributions": 3, "weeks": [] }
                },
                "repositories": { "nodes": [] }
            }}
        }));

        let user = user_from_response(response, "someone").unwrap();
        assert_eq!(
            user.contributions_collection
                .contribution_calendar
                .total_contributions,
            3
        );
    }

    #[rocket::async_test]
    async fn missing_token_is_configuration_error() {
        let client = GithubClient::new(&Env::default()).unwrap();

        let error = client.contributions().await.unwrap_err();
        assert!(matches!(error, ApiError::Configuration(_)));
    }

    #[rocket::async_test]
    async fn rejected_token_is_upstream_error() {
        let env = Env {
            github_token: Some("ghp_revoked".to_string()),
            github_api_url: Some(
                crate::canned::serve(
                    "401 Unauthorized",
                    r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/graphql"}"#,
                )
                .await,
            ),
            ..Env::default()
        };
        let client = GithubClient::new(&env).unwrap();

        let error = client.contributions().await.unwrap_err();
        assert!(matches!(error, ApiError::Upstream(_)), "{error:?}");
        assert_eq!(error.status(), rocket::http::Status::InternalServerError);
    }
}
