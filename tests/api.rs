//! HTTP tests against the bundled model artifacts.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
};
use pretty_assertions::assert_eq;
use sensebox::types::{ClassificationResponse, ClassifierInfo, TableResponse};
use sensebox::{AppState, Label, Registry, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "sensebox-test-boundary";

fn app() -> Router {
    let models_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
    let registry = Registry::load(&models_dir).expect("bundled models load");
    build_router(AppState::new(Arc::new(registry)), 1024 * 1024)
}

fn classify_request(classifier: &str, input: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/classify/{classifier}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "input": input }).to_string()))
        .unwrap()
}

fn upload_request(
    classifier: &str,
    file_name: &str,
    content: &[u8],
    column: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
    if let Some(column) = column {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"column\"\r\n\r\n{column}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/classify/{classifier}/batch"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn lists_all_four_classifiers() {
    let request = Request::builder()
        .uri("/classifiers")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);

    let infos: Vec<ClassifierInfo> = serde_json::from_slice(&body).unwrap();
    let ids: Vec<_> = infos.iter().map(|info| info.id.as_str()).collect();
    assert_eq!(ids, vec!["spam", "language", "review", "news"]);
    assert_eq!(infos[0].labels, vec!["Spam", "Not Spam"]);
    assert_eq!(infos[1].labels, vec!["English", "French", "Spanish"]);
    assert!(!infos[3].available);
}

#[tokio::test]
async fn spam_message_is_detected() {
    let (status, body) = send(classify_request("spam", "WIN A FREE PRIZE NOW")).await;
    assert_eq!(status, StatusCode::OK);

    let response: ClassificationResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.label, Label::Id(0));
    assert_eq!(response.display, "Spam");
    assert_eq!(response.model, "spam");
    assert!(response.id.starts_with("classify-"));
}

#[tokio::test]
async fn everyday_message_is_not_spam() {
    let (status, body) = send(classify_request("spam", "See you at lunch tomorrow")).await;
    assert_eq!(status, StatusCode::OK);

    let response: ClassificationResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.display, "Not Spam");
}

#[tokio::test]
async fn review_sentiment() {
    let (_, body) = send(classify_request("review", "The food was delicious")).await;
    let response: ClassificationResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.display, "Positive Feedback");

    let (_, body) = send(classify_request("review", "Cold and terrible")).await;
    let response: ClassificationResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.display, "Negative Feedback");
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let (status, body) = send(classify_request("language", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["type"], "empty_input");
}

#[tokio::test]
async fn unknown_classifier_is_not_found() {
    let (status, _) = send(classify_request("weather", "sunny")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn news_is_under_development() {
    let (status, body) = send(classify_request("news", "Stocks rally")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["message"], "classifier news is under development");
}

#[tokio::test]
async fn news_batch_is_under_development() {
    let request = upload_request("news", "headlines.txt", b"Stocks rally\n", None);
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["type"], "unavailable");
}

#[tokio::test]
async fn language_csv_prefers_text_column() {
    let csv = b"Id,Text,Source\n1,Bonjour,web\n2,\"Hola, gracias\",app\n3,Hello,web\n";
    let (status, body) = send(upload_request("language", "samples.csv", csv, None)).await;
    assert_eq!(status, StatusCode::OK);

    let table: TableResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(table.columns, vec!["Text", "Language"]);
    let texts: Vec<_> = table.rows.iter().map(|row| row.text.as_str()).collect();
    assert_eq!(texts, vec!["Bonjour", "Hola, gracias", "Hello"]);
    let languages: Vec<_> = table.rows.iter().map(|row| row.display.as_str()).collect();
    assert_eq!(languages, vec!["French", "Spanish", "English"]);
    assert!(table.warnings.is_empty());
}

#[tokio::test]
async fn text_upload_detects_each_line() {
    let request = upload_request("language", "greetings.txt", b"Bonjour\nHello\n", None);
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);

    let table: TableResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(table.columns, vec!["Text", "Language"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].index, 1);
    assert_eq!(table.rows[0].text, "Bonjour");
    assert_eq!(table.rows[0].display, "French");
    assert_eq!(table.rows[1].display, "English");
    assert!(table.warnings.is_empty());
}

#[tokio::test]
async fn csv_upload_uses_configured_column() {
    let csv = b"Id,Review\n1,The food was delicious\n2,Cold and terrible\n3,\"Great service, I love it\"\n";
    let (status, body) = send(upload_request("review", "reviews.csv", csv, None)).await;
    assert_eq!(status, StatusCode::OK);

    let table: TableResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(table.columns, vec!["Review", "Sentiment"]);
    let display: Vec<_> = table.rows.iter().map(|row| row.display.as_str()).collect();
    assert_eq!(
        display,
        vec!["Positive Feedback", "Negative Feedback", "Positive Feedback"]
    );
    assert!(table.warnings.is_empty());
}

#[tokio::test]
async fn ambiguous_csv_warns_and_uses_first_column() {
    let csv = b"Msg,Extra\nWIN A FREE PRIZE NOW,x\nthanks for the meeting,y\n";
    let (status, body) = send(upload_request("spam", "inbox.csv", csv, None)).await;
    assert_eq!(status, StatusCode::OK);

    let table: TableResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(table.columns, vec!["Msg", "Prediction"]);
    assert_eq!(table.rows[0].display, "Spam");
    assert_eq!(table.rows[1].display, "Not Spam");
    assert_eq!(table.warnings.len(), 1);
    assert!(table.warnings[0].contains("\"Msg\""));
}

#[tokio::test]
async fn column_field_overrides_fallback() {
    let csv = b"Extra,Msg\nx,Claim your free prize\n";
    let (status, body) = send(upload_request("spam", "inbox.csv", csv, Some("Msg"))).await;
    assert_eq!(status, StatusCode::OK);

    let table: TableResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(table.rows[0].text, "Claim your free prize");
    assert_eq!(table.rows[0].display, "Spam");
    assert!(table.warnings.is_empty());
}

#[tokio::test]
async fn unreadable_upload_is_bad_request() {
    let request = upload_request("spam", "inbox.txt", &[0xff, 0xfe, 0x00], None);
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["type"], "file_parse");
}

#[tokio::test]
async fn upload_without_file_is_bad_request() {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"column\"\r\n\r\nMsg\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/classify/spam/batch")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
