use rocket::{fairing::AdHoc, serde::json::Json};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ErrorBody, types::*};

pub mod ai;
pub mod arcade;
pub mod github;
pub mod widgets;

#[derive(OpenApi)]
#[openapi(
    info(title = "Portfolio dashboard API"),
    paths(
        github::get_github_stats,
        arcade::get_arcade,
        ai::detect,
        ai::sentiment,
        widgets::get_market,
        widgets::get_weather,
        health,
    ),
    components(schemas(
        GithubStatsResponse,
        LanguageResponse,
        ArcadeResponse,
        ArcadeStatsResponse,
        BadgeResponse,
        DetectionResponse,
        DetectionItem,
        BoxResponse,
        SentimentRequest,
        SentimentResponse,
        SentimentBody,
        LabelScoreResponse,
        MarketResponse,
        TickerResponse,
        WeatherResponse,
        HealthResponse,
        ErrorBody,
    ))
)]
pub struct ApiDoc;

#[utoipa::path(responses(
    (status = 200, description = "Service is up", body = HealthResponse)
))]
#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(github::stage())
            .attach(arcade::stage())
            .attach(ai::stage())
            .attach(widgets::stage())
            .mount("/", routes![health])
            .mount(
                "/",
                SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };
    use serde_json::Value;

    use crate::config::Env;

    async fn client(env: Env) -> Client {
        Client::tracked(crate::build(env).unwrap()).await.unwrap()
    }

    fn with_hf_key() -> Env {
        Env {
            huggingface_api_key: Some("hf_test".to_string()),
            ..Env::default()
        }
    }

    #[rocket::async_test]
    async fn health_reports_version() {
        let client = client(Env::default()).await;

        let response = client.get("/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[rocket::async_test]
    async fn github_without_token_is_configuration_error() {
        let client = client(Env::default()).await;

        let response = client.get("/api/github").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["kind"], "configuration");
        assert!(body["error"].as_str().unwrap().contains("GITHUB_TOKEN"));
    }

    #[rocket::async_test]
    async fn github_rejects_malformed_reference_date() {
        let client = client(Env::default()).await;

        let response = client.get("/api/github?today=16-10-2026").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn sentiment_without_key_is_configuration_error() {
        let client = client(Env::default()).await;

        let response = client
            .post("/api/ai/sentiment")
            .header(ContentType::JSON)
            .body(r#"{"text":"Produk ini bagus"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["kind"], "configuration");
        assert!(body.get("loading").is_none());
    }

    #[rocket::async_test]
    async fn sentiment_requires_text() {
        let client = client(with_hf_key()).await;

        for payload in [r#"{"text":""}"#, r#"{"text":"   "}"#, r#"{"text":42}"#, "{}"] {
            let response = client
                .post("/api/ai/sentiment")
                .header(ContentType::JSON)
                .body(payload)
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest, "{payload}");
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(body["error"], "No text provided");
        }
    }

    #[rocket::async_test]
    async fn detect_requires_image() {
        let client = client(with_hf_key()).await;

        let response = client.post("/api/ai/detect").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "No image provided");
        assert_eq!(body["kind"], "input");
    }

    #[rocket::async_test]
    async fn market_rejects_unknown_currency() {
        let client = client(Env::default()).await;

        let response = client.get("/api/market?currency=eur").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn openapi_lists_dashboard_routes() {
        let client = client(Env::default()).await;

        let response = client.get("/api-docs/openapi.json").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        for path in ["/api/github", "/api/arcade", "/api/ai/detect", "/api/ai/sentiment", "/health"] {
            assert!(body["paths"].get(path).is_some(), "{path}");
        }
    }
}
