use std::fmt;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::{ClassifyError, PredictionError};
use crate::labels::{Label, LabelMap};
use crate::registry::Profile;
use crate::table::Table;

/// A multi-column upload where no column matched the hint, so the first one
/// was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAmbiguityWarning {
    pub used: String,
    pub available: Vec<String>,
}

impl fmt::Display for ColumnAmbiguityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "using first column {:?} of [{}]",
            self.used,
            self.available.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pub index: usize,
    pub warning: Option<ColumnAmbiguityWarning>,
}

/// Pick the text column: the hint if present, the only column, or the first
/// column with a warning. `None` for a table without columns.
pub fn select_column(table: &Table, hint: Option<&str>) -> Option<ColumnSelection> {
    let columns = table.columns();

    if let Some(index) = hint.and_then(|name| table.column_index(name)) {
        return Some(ColumnSelection {
            index,
            warning: None,
        });
    }

    match columns.len() {
        0 => None,
        1 => Some(ColumnSelection {
            index: 0,
            warning: None,
        }),
        _ => Some(ColumnSelection {
            index: 0,
            warning: Some(ColumnAmbiguityWarning {
                used: columns[0].clone(),
                available: columns.to_vec(),
            }),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    pub text: String,
    pub label: Label,
    pub display: String,
}

/// The normalized text column plus its derived label column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub input_column: String,
    pub output_column: String,
    pub rows: Vec<PredictionRow>,
    pub warnings: Vec<ColumnAmbiguityWarning>,
}

impl PredictionResult {
    /// Recompute display strings from the raw labels.
    pub fn apply_labels(&mut self, labels: &LabelMap) {
        for row in &mut self.rows {
            row.display = labels.display(&row.label);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs one classifier over single texts or uploaded tables.
#[derive(Clone)]
pub struct ClassificationRequestHandler {
    profile: &'static Profile,
    classifier: Arc<dyn Classifier>,
}

impl fmt::Debug for ClassificationRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRequestHandler")
            .field("profile", &self.profile.kind)
            .field("model", &self.classifier.name())
            .finish()
    }
}

impl ClassificationRequestHandler {
    pub fn new(profile: &'static Profile, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            profile,
            classifier,
        }
    }

    pub fn profile(&self) -> &'static Profile {
        self.profile
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn display(&self, label: &Label) -> String {
        self.profile.labels.display(label)
    }

    #[tracing::instrument(skip(self, text), fields(classifier = %self.profile.kind, len = text.len()))]
    pub fn classify_single(&self, text: &str) -> Result<Label, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::EmptyInput);
        }

        let mut labels = self.predict(&[text.to_string()])?;
        Ok(labels.remove(0))
    }

    #[tracing::instrument(skip(self, rows), fields(classifier = %self.profile.kind, rows = rows.len()))]
    pub fn classify_batch(
        &self,
        rows: Table,
        column_hint: Option<&str>,
    ) -> Result<PredictionResult, ClassifyError> {
        let selection = select_column(&rows, column_hint).ok_or(ClassifyError::NoTextColumn)?;
        if let Some(warning) = &selection.warning {
            tracing::warn!(%warning, "Ambiguous upload columns");
        }

        let texts = rows.into_column(selection.index);
        let labels = if texts.is_empty() {
            Vec::new()
        } else {
            self.predict(&texts)?
        };

        let mut result = PredictionResult {
            input_column: self.profile.input_column.to_string(),
            output_column: self.profile.output_column.to_string(),
            rows: texts
                .into_iter()
                .zip(labels)
                .map(|(text, label)| PredictionRow {
                    text,
                    label,
                    display: String::new(),
                })
                .collect(),
            warnings: selection.warning.into_iter().collect(),
        };
        result.apply_labels(&self.profile.labels);

        tracing::debug!(rows = result.len(), "Batch classified");
        Ok(result)
    }

    /// One predict call over all texts; the label count must match.
    fn predict(&self, texts: &[String]) -> Result<Vec<Label>, ClassifyError> {
        let labels = self
            .classifier
            .predict(texts)
            .map_err(PredictionError::new)?;

        if labels.len() != texts.len() {
            return Err(PredictionError::new(anyhow::anyhow!(
                "{} returned {} labels for {} inputs",
                self.classifier.name(),
                labels.len(),
                texts.len()
            ))
            .into());
        }

        Ok(labels)
    }
}
