use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::LoadError;
use crate::handler::ClassificationRequestHandler;
use crate::labels::LabelMap;
use crate::linear::LinearTextClassifier;
use crate::types::ClassifierInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifierKind {
    Spam,
    Language,
    Review,
    News,
}

/// Static description of one classifier and how its inputs and outputs are
/// laid out.
#[derive(Debug)]
pub struct Profile {
    pub kind: ClassifierKind,
    /// File name of the artifact inside the models directory.
    pub artifact: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Name the selected text column is renamed to.
    pub input_column: &'static str,
    /// Column preferred when an upload has several columns.
    pub column_hint: Option<&'static str>,
    pub output_column: &'static str,
    pub labels: LabelMap,
    pub available: bool,
}

static PROFILES: [Profile; 4] = [
    Profile {
        kind: ClassifierKind::Spam,
        artifact: "spam_classifier.json",
        title: "Spam Classifier",
        description: "Classifies text messages as either spam or not spam using TF-IDF \
                      features and a logistic regression model.",
        input_column: "Msg",
        column_hint: None,
        output_column: "Prediction",
        labels: LabelMap::new(&[(0, "Spam"), (1, "Not Spam")]),
        available: true,
    },
    Profile {
        kind: ClassifierKind::Language,
        artifact: "lang_det.json",
        title: "Language Detection",
        description: "Identifies the language of a text from its character and word \
                      patterns.",
        input_column: "Text",
        column_hint: Some("Text"),
        output_column: "Language",
        labels: LabelMap::passthrough(),
        available: true,
    },
    Profile {
        kind: ClassifierKind::Review,
        artifact: "review.json",
        title: "Food Review Sentiment",
        description: "Determines whether a food review expresses positive or negative \
                      feedback.",
        input_column: "Review",
        column_hint: Some("Review"),
        output_column: "Sentiment",
        labels: LabelMap::new(&[(0, "Negative Feedback"), (1, "Positive Feedback")]),
        available: true,
    },
    Profile {
        kind: ClassifierKind::News,
        artifact: "news_cat.json",
        title: "News Classification",
        description: "Predicts the category of a news article. Currently under development.",
        input_column: "Text",
        column_hint: None,
        output_column: "Category",
        labels: LabelMap::passthrough(),
        available: false,
    },
];

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 4] = [
        ClassifierKind::Spam,
        ClassifierKind::Language,
        ClassifierKind::Review,
        ClassifierKind::News,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ClassifierKind::Spam => "spam",
            ClassifierKind::Language => "language",
            ClassifierKind::Review => "review",
            ClassifierKind::News => "news",
        }
    }

    pub fn profile(self) -> &'static Profile {
        &PROFILES[self as usize]
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// The loaded classifiers, one request handler each.
#[derive(Debug, Default)]
pub struct Registry {
    handlers: HashMap<ClassifierKind, ClassificationRequestHandler>,
}

impl Registry {
    /// Load every classifier artifact from `models_dir`. Any failure aborts.
    #[tracing::instrument(skip(models_dir), fields(models_dir = %models_dir.display()))]
    pub fn load(models_dir: &Path) -> Result<Self, LoadError> {
        let mut classifiers: Vec<(ClassifierKind, Arc<dyn Classifier>)> = Vec::new();

        for kind in ClassifierKind::ALL {
            let path = models_dir.join(kind.profile().artifact);
            let classifier: Arc<dyn Classifier> = Arc::new(LinearTextClassifier::load(&path)?);
            tracing::info!(classifier = %kind, model = classifier.name(), "Classifier ready");
            classifiers.push((kind, classifier));
        }

        Ok(Self::from_classifiers(classifiers))
    }

    pub fn from_classifiers(
        classifiers: impl IntoIterator<Item = (ClassifierKind, Arc<dyn Classifier>)>,
    ) -> Self {
        let handlers = classifiers
            .into_iter()
            .map(|(kind, classifier)| {
                (
                    kind,
                    ClassificationRequestHandler::new(kind.profile(), classifier),
                )
            })
            .collect();

        Self { handlers }
    }

    pub fn handler(&self, kind: ClassifierKind) -> Option<&ClassificationRequestHandler> {
        self.handlers.get(&kind)
    }

    /// Catalogue of the loaded classifiers, in display order.
    pub fn describe(&self) -> Vec<ClassifierInfo> {
        ClassifierKind::ALL
            .into_iter()
            .filter_map(|kind| self.handler(kind))
            .map(|handler| {
                let profile = handler.profile();
                ClassifierInfo {
                    id: profile.kind.id().to_string(),
                    title: profile.title.to_string(),
                    description: profile.description.to_string(),
                    available: profile.available,
                    input_column: profile.input_column.to_string(),
                    output_column: profile.output_column.to_string(),
                    labels: handler
                        .classifier()
                        .classes()
                        .iter()
                        .map(|label| handler.display(label))
                        .collect(),
                }
            })
            .collect()
    }
}
