use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw output of a classifier, before display mapping.
///
/// Binary models emit integer class ids, while the language model emits the
/// language name directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Id(i64),
    Name(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Id(id) => write!(f, "{id}"),
            Label::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Name(name.to_string())
    }
}

/// Static mapping from raw class ids to display strings.
///
/// Labels without an entry display as themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMap {
    entries: &'static [(i64, &'static str)],
}

impl LabelMap {
    pub const fn new(entries: &'static [(i64, &'static str)]) -> Self {
        Self { entries }
    }

    pub const fn passthrough() -> Self {
        Self { entries: &[] }
    }

    pub fn display(&self, label: &Label) -> String {
        match label {
            Label::Id(id) => self
                .entries
                .iter()
                .find(|(raw, _)| raw == id)
                .map(|(_, display)| display.to_string())
                .unwrap_or_else(|| id.to_string()),
            Label::Name(name) => name.clone(),
        }
    }
}
