use rocket::{serde::json::Json, State};
use tracing::instrument;

use crate::{
    arcade::ArcadeClient,
    error::{ApiError, ErrorBody},
    types::ArcadeResponse,
};

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Badges scraped from the public Arcade profile", body = ArcadeResponse),
    (status = 500, description = "Profile page could not be fetched", body = ErrorBody)
))]
#[get("/arcade")]
#[instrument(skip(arcade))]
pub async fn get_arcade(arcade: &State<ArcadeClient>) -> Result<Json<ArcadeResponse>, ApiError> {
    let profile = arcade.profile().await?;
    Ok(Json(profile.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing Arcade entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![get_arcade])
    })
}
