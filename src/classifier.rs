use anyhow::Result;

use crate::labels::Label;

/// A pre-fit text classifier.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait Classifier: Send + Sync {
    /// Predict one label per input text, in input order.
    fn predict(&self, texts: &[String]) -> Result<Vec<Label>>;

    /// Every label `predict` can return.
    fn classes(&self) -> &[Label];

    /// Name of the underlying model, for logging.
    fn name(&self) -> &str;
}
