use chrono::{NaiveDate, Utc};
use rocket::{serde::json::Json, State};
use tracing::instrument;

use crate::{
    error::{ApiError, ErrorBody},
    github::GithubClient,
    types::GithubStatsResponse,
};

/// `today` overrides the reference date of the current streak (`YYYY-MM-DD`).
#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Contribution streaks and language share", body = GithubStatsResponse),
    (status = 400, description = "Invalid reference date", body = ErrorBody),
    (status = 404, description = "GitHub user does not exist", body = ErrorBody),
    (status = 500, description = "Missing token or GitHub failure", body = ErrorBody)
))]
#[get("/github?<today>")]
#[instrument(skip(github))]
pub async fn get_github_stats(
    today: Option<&str>,
    github: &State<GithubClient>,
) -> Result<Json<GithubStatsResponse>, ApiError> {
    let today = match today {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| ApiError::Input(format!("Invalid date {value}, expected YYYY-MM-DD")))?,
        None => Utc::now().date_naive(),
    };

    let user = github.contributions().await?;
    let stats = user.stats(today);

    Ok(Json(GithubStatsResponse::new(github.username.clone(), stats)))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing GitHub entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![get_github_stats])
    })
}
