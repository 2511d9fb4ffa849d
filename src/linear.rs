use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::classifier::Classifier;
use crate::error::{InvalidArtifact, LoadError};
use crate::labels::Label;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    /// Word n-grams over tokens of two or more word characters.
    #[default]
    Word,
    /// Character n-grams over whitespace-normalized text.
    Char,
}

/// On-disk parameters of a fitted TF-IDF + linear model.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    pub name: String,
    #[serde(default)]
    pub analyzer: Analyzer,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub classes: Vec<Label>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_lowercase() -> bool {
    true
}

/// TF-IDF vectorizer followed by a linear decision function.
#[derive(Debug)]
pub struct LinearTextClassifier {
    artifact: LinearArtifact,
}

impl TryFrom<LinearArtifact> for LinearTextClassifier {
    type Error = InvalidArtifact;

    fn try_from(artifact: LinearArtifact) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Err(InvalidArtifact(reason));
        let (min_n, max_n) = artifact.ngram_range;
        let width = artifact.idf.len();

        if min_n == 0 || min_n > max_n {
            return invalid(format!("invalid ngram range ({min_n}, {max_n})"));
        }
        if artifact.vocabulary.len() != width {
            return invalid(format!(
                "vocabulary has {} terms but idf has {width} weights",
                artifact.vocabulary.len()
            ));
        }
        if let Some((term, index)) = artifact.vocabulary.iter().find(|(_, i)| **i >= width) {
            return invalid(format!("term {term:?} maps to out-of-range column {index}"));
        }
        if artifact.classes.len() < 2 {
            return invalid(format!(
                "expected at least two classes, found {}",
                artifact.classes.len()
            ));
        }

        let binary = artifact.classes.len() == 2 && artifact.coef.len() == 1;
        if !binary && artifact.coef.len() != artifact.classes.len() {
            return invalid(format!(
                "{} coefficient rows for {} classes",
                artifact.coef.len(),
                artifact.classes.len()
            ));
        }
        if let Some(row) = artifact.coef.iter().position(|row| row.len() != width) {
            return invalid(format!(
                "coefficient row {row} has {} weights, expected {width}",
                artifact.coef[row].len()
            ));
        }
        if artifact.intercept.len() != artifact.coef.len() {
            return invalid(format!(
                "{} intercepts for {} coefficient rows",
                artifact.intercept.len(),
                artifact.coef.len()
            ));
        }

        Ok(Self { artifact })
    }
}

impl LinearTextClassifier {
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: LinearArtifact =
            serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let classifier = Self::try_from(artifact).map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            model = %classifier.artifact.name,
            terms = classifier.artifact.idf.len(),
            classes = classifier.artifact.classes.len(),
            "Loaded linear text classifier"
        );
        Ok(classifier)
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.artifact.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let (min_n, max_n) = self.artifact.ngram_range;

        match self.artifact.analyzer {
            Analyzer::Word => word_ngrams(&word_tokens(&text), min_n, max_n),
            Analyzer::Char => char_ngrams(&text, min_n, max_n),
        }
    }

    /// Sparse, L2-normalized TF-IDF vector keyed by vocabulary column.
    fn vectorize(&self, text: &str) -> HashMap<usize, f64> {
        let mut features: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.artifact.vocabulary.get(&term) {
                *features.entry(column).or_default() += 1.0;
            }
        }

        for (column, value) in features.iter_mut() {
            if self.artifact.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            *value *= self.artifact.idf[*column];
        }

        let norm = features.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in features.values_mut() {
                *value /= norm;
            }
        }

        features
    }

    fn predict_one(&self, text: &str) -> Label {
        let features = self.vectorize(text);
        let scores: Vec<f64> = self
            .artifact
            .coef
            .iter()
            .zip(&self.artifact.intercept)
            .map(|(weights, bias)| {
                bias + features
                    .iter()
                    .map(|(column, value)| weights[*column] * value)
                    .sum::<f64>()
            })
            .collect();

        let class = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            scores
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &score)| {
                    if score > best.1 { (i, score) } else { best }
                })
                .0
        };

        self.artifact.classes[class].clone()
    }
}

impl Classifier for LinearTextClassifier {
    fn predict(&self, texts: &[String]) -> Result<Vec<Label>> {
        Ok(texts.iter().map(|text| self.predict_one(text)).collect())
    }

    fn classes(&self) -> &[Label] {
        &self.artifact.classes
    }

    fn name(&self) -> &str {
        &self.artifact.name
    }
}

/// Runs of two or more alphanumeric or underscore characters.
fn word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .collect()
}

fn word_ngrams(tokens: &[&str], min_n: usize, max_n: usize) -> Vec<String> {
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n == 1 {
            grams.extend(tokens.iter().map(|token| token.to_string()));
        } else {
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
    }
    grams
}

fn char_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let chars = collapse_whitespace(text);
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        grams.extend(chars.windows(n).map(|window| window.iter().collect::<String>()));
    }
    grams
}

/// Replace runs of two or more whitespace characters with one space. Edges
/// and lone whitespace characters are kept as they are.
fn collapse_whitespace(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = Vec::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c.is_whitespace() {
            run += 1;
            match run {
                1 => chars.push(c),
                2 => {
                    chars.pop();
                    chars.push(' ');
                }
                _ => {}
            }
        } else {
            run = 0;
            chars.push(c);
        }
    }
    chars
}
