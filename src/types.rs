use serde::{Deserialize, Serialize};

use crate::labels::Label;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub label: Label,
    pub display: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableRow {
    /// 1-based row number, matching the order of the upload.
    pub index: usize,
    pub text: String,
    pub label: Label,
    pub display: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifierInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub available: bool,
    pub input_column: String,
    pub output_column: String,
    pub labels: Vec<String>,
}
