use std::time::Duration;

use rocket::{
    http::{Header, Status},
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use shared::UpstreamFailure;
use thiserror::Error;
use tracing::Level;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Input(String),

    #[error("Model is loading, please try again in {} seconds", .retry_after.as_secs())]
    ModelLoading {
        message: String,
        retry_after: Duration,
    },

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn upstream(context: &str, error: impl std::fmt::Display) -> Self {
        Self::Upstream(format!("{context}: {error}"))
    }

    pub const fn status(&self) -> Status {
        match self {
            Self::Configuration(_) | Self::Upstream(_) => Status::InternalServerError,
            Self::Input(_) => Status::BadRequest,
            Self::ModelLoading { .. } => Status::ServiceUnavailable,
            Self::NotFound(_) => Status::NotFound,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Input(_) => "input",
            Self::ModelLoading { .. } => "model_loading",
            Self::Upstream(_) => "upstream",
            Self::NotFound(_) => "not_found",
        }
    }

    /// Level the responder logs at. Caller faults and cold models stay below WARN.
    pub const fn log_level(&self) -> Level {
        match self {
            Self::Input(_) | Self::NotFound(_) | Self::ModelLoading { .. } => Level::INFO,
            Self::Configuration(_) | Self::Upstream(_) => Level::ERROR,
        }
    }

    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelLoading { .. })
    }
}

impl From<UpstreamFailure> for ApiError {
    fn from(failure: UpstreamFailure) -> Self {
        match failure {
            UpstreamFailure::Loading {
                message,
                retry_after,
            } => Self::ModelLoading {
                message,
                retry_after,
            },
            UpstreamFailure::Terminal { message } => Self::Upstream(message),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl From<&ApiError> for ErrorBody {
    fn from(error: &ApiError) -> Self {
        let retry_after = match error {
            ApiError::ModelLoading { retry_after, .. } => Some(retry_after.as_secs()),
            _ => None,
        };
        Self {
            error: error.to_string(),
            kind: error.kind().to_string(),
            loading: error.is_retryable().then_some(true),
            retry_after,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::ModelLoading { message, .. } = &self {
            tracing::info!("{} {}: model is loading: {message}", request.method(), request.uri());
        } else if self.log_level() == Level::ERROR {
            tracing::error!("{} {}: {self}", request.method(), request.uri());
        } else {
            tracing::info!("{} {}: {self}", request.method(), request.uri());
        }

        let body = ErrorBody::from(&self);
        let retry_after = body.retry_after;
        let mut response = Response::build_from(Json(body).respond_to(request)?);
        response.status(self.status());
        if let Some(seconds) = retry_after {
            response.header(Header::new("Retry-After", seconds.to_string()));
        }
        response.ok()
    }
}
