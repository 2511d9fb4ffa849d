use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics::counter;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring a model artifact up at startup. Always fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: InvalidArtifact,
    },
}

/// An artifact that deserialized but whose parameters are inconsistent.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidArtifact(pub String);

/// An upload that could not be turned into a table.
#[derive(Debug, Error)]
pub enum FileParseError {
    #[error("upload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV upload has no header columns")]
    NoColumns,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// The classifier failed on some input. Carries the underlying cause.
#[derive(Debug, Error)]
#[error("prediction failed: {cause}")]
pub struct PredictionError {
    #[source]
    cause: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl PredictionError {
    pub fn new(cause: anyhow::Error) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("input has no columns to classify")]
    NoTextColumn,

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown classifier: {0}")]
    UnknownClassifier(String),

    #[error("classifier {0} is under development")]
    Unavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("error reading file: {0}")]
    FileParse(#[from] FileParseError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::UnknownClassifier(_) => (StatusCode::NOT_FOUND, "unknown_classifier"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::FileParse(_) => (StatusCode::BAD_REQUEST, "file_parse"),
            ApiError::Classify(ClassifyError::EmptyInput) => {
                (StatusCode::BAD_REQUEST, "empty_input")
            }
            ApiError::Classify(ClassifyError::NoTextColumn) => {
                (StatusCode::BAD_REQUEST, "no_text_column")
            }
            ApiError::Classify(ClassifyError::Prediction(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "prediction")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        counter!("classification_errors_total", "type" => kind).increment(1);

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
