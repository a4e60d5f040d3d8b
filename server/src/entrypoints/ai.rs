use rocket::{
    form::{Form, FromForm},
    fs::TempFile,
    serde::json::Json,
    State,
};
use tokio::io::AsyncReadExt;
use tracing::instrument;

use crate::{
    error::{ApiError, ErrorBody},
    inference::{with_retries, InferenceClient},
    types::{DetectionResponse, SentimentRequest, SentimentResponse},
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(FromForm)]
pub struct DetectUpload<'r> {
    image: Option<TempFile<'r>>,
}

async fn read_upload(file: &TempFile<'_>) -> Result<Vec<u8>, ApiError> {
    let reader = file
        .open()
        .await
        .map_err(|e| ApiError::Input(format!("Failed to read uploaded image: {e}")))?;
    tokio::pin!(reader);

    let mut bytes = Vec::with_capacity(file.len() as usize);
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| ApiError::Input(format!("Failed to read uploaded image: {e}")))?;
    Ok(bytes)
}

/// Runs object detection on the multipart `image` field.
///
/// `retries` asks the server to wait for a cold model instead of answering 503 right away.
#[utoipa::path(context_path = "/api", params(
    ("retries" = Option<u32>, Query, description = "Extra attempts while the model is loading")
), responses(
    (status = 200, description = "Detected objects", body = DetectionResponse),
    (status = 400, description = "No image provided", body = ErrorBody),
    (status = 503, description = "Model is loading", body = ErrorBody),
    (status = 500, description = "Missing API key or inference failure", body = ErrorBody)
))]
#[post("/ai/detect?<retries>", data = "<upload>")]
#[instrument(skip(upload, inference))]
pub async fn detect(
    retries: Option<u32>,
    upload: Option<Form<DetectUpload<'_>>>,
    inference: &State<InferenceClient>,
) -> Result<Json<DetectionResponse>, ApiError> {
    inference.api_key()?;

    let Some(image) = upload.and_then(|form| form.into_inner().image) else {
        return Err(ApiError::Input("No image provided".to_string()));
    };
    let bytes = read_upload(&image).await?;
    if bytes.is_empty() {
        return Err(ApiError::Input("No image provided".to_string()));
    }
    let content_type = image
        .content_type()
        .map(ToString::to_string)
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let detections = with_retries(inference.retry, retries, || {
        inference.detect(&bytes, &content_type)
    })
    .await?;

    Ok(Json(detections.into()))
}

#[utoipa::path(context_path = "/api", params(
    ("retries" = Option<u32>, Query, description = "Extra attempts while the model is loading")
), request_body = SentimentRequest, responses(
    (status = 200, description = "Sentiment on the five level scale", body = SentimentResponse),
    (status = 400, description = "No text provided", body = ErrorBody),
    (status = 503, description = "Model is loading", body = ErrorBody),
    (status = 500, description = "Missing API key or inference failure", body = ErrorBody)
))]
#[post("/ai/sentiment?<retries>", data = "<request>")]
#[instrument(skip(request, inference))]
pub async fn sentiment(
    retries: Option<u32>,
    request: Option<Json<SentimentRequest>>,
    inference: &State<InferenceClient>,
) -> Result<Json<SentimentResponse>, ApiError> {
    inference.api_key()?;

    let text = request
        .and_then(|request| request.into_inner().text)
        .and_then(|text| text.as_str().map(ToString::to_string))
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::Input("No text provided".to_string()))?;

    let result = with_retries(inference.retry, retries, || inference.sentiment(&text)).await?;

    Ok(Json(result.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing AI demo entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![detect, sentiment])
    })
}
