use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Json,
    routing::{get, post},
};
use metrics::counter;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult, ClassifyError};
use crate::handler::ClassificationRequestHandler;
use crate::registry::{ClassifierKind, Registry};
use crate::types::{
    ClassificationRequest, ClassificationResponse, ClassifierInfo, TableResponse, TableRow,
};
use crate::upload::read_upload;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Resolve a path segment to a handler that can serve requests.
    fn handler(&self, classifier: &str) -> ApiResult<ClassificationRequestHandler> {
        let kind: ClassifierKind = classifier
            .parse()
            .map_err(ApiError::UnknownClassifier)?;

        if !kind.profile().available {
            return Err(ApiError::Unavailable(kind.to_string()));
        }

        self.registry
            .handler(kind)
            .cloned()
            .ok_or_else(|| ApiError::UnknownClassifier(kind.to_string()))
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classifiers", get(list_classifiers))
        .route("/classify/:classifier", post(classify_handler))
        .route("/classify/:classifier/batch", post(classify_batch_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_classifiers(State(state): State<AppState>) -> Json<Vec<ClassifierInfo>> {
    Json(state.registry.describe())
}

#[tracing::instrument(skip(state, request), fields(input_len = request.input.len()))]
async fn classify_handler(
    State(state): State<AppState>,
    Path(classifier): Path<String>,
    Json(request): Json<ClassificationRequest>,
) -> ApiResult<Json<ClassificationResponse>> {
    counter!("classification_requests_total", "mode" => "single").increment(1);
    let handler = state.handler(&classifier)?;

    let label = {
        let handler = handler.clone();
        run_blocking(move || handler.classify_single(&request.input)).await?
    };
    let shown = handler.display(&label);

    tracing::info!(%label, %shown, "Classification completed");
    Ok(Json(ClassificationResponse {
        id: format!("classify-{}", uuid::Uuid::new_v4().simple()),
        object: "classification".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: handler.profile().kind.to_string(),
        label,
        display: shown,
    }))
}

#[tracing::instrument(skip(state, multipart))]
async fn classify_batch_handler(
    State(state): State<AppState>,
    Path(classifier): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<TableResponse>> {
    counter!("classification_requests_total", "mode" => "batch").increment(1);
    let handler = state.handler(&classifier)?;

    let mut upload = None;
    let mut column = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_multipart)?;
                upload = Some((file_name, bytes));
            }
            Some("column") => {
                let value = field.text().await.map_err(invalid_multipart)?;
                let value = value.trim();
                if !value.is_empty() {
                    column = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::InvalidRequest("missing `file` field".to_string()))?;
    let table = read_upload(&file_name, &bytes)?;
    let hint = column.or_else(|| handler.profile().column_hint.map(str::to_string));

    let result = {
        let handler = handler.clone();
        run_blocking(move || handler.classify_batch(table, hint.as_deref())).await?
    };
    counter!("classification_rows_total").increment(result.len() as u64);

    let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
    tracing::info!(
        file = %file_name,
        rows = result.len(),
        warnings = warnings.len(),
        "Batch classification completed"
    );

    Ok(Json(TableResponse {
        id: format!("classify-{}", uuid::Uuid::new_v4().simple()),
        object: "table".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: handler.profile().kind.to_string(),
        columns: vec![result.input_column, result.output_column],
        rows: result
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| TableRow {
                index: i + 1,
                text: row.text,
                label: row.label,
                display: row.display,
            })
            .collect(),
        warnings,
    }))
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::InvalidRequest(err.to_string())
}

/// Run a prediction on the blocking pool.
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, ClassifyError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))?
        .map_err(ApiError::from)
}
