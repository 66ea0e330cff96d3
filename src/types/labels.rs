//! Intent label sets

use serde::{Deserialize, Serialize};

/// Labels used when the caller supplies none.
pub const DEFAULT_LABELS: [&str; 5] = [
    "greeting",
    "order_status",
    "complaint",
    "product_query",
    "fallback",
];

/// Ordered set of intent labels offered to the model.
///
/// Uniqueness is expected but not enforced. An empty set is never produced:
/// constructors substitute [`DEFAULT_LABELS`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet(Vec<String>);

impl Default for LabelSet {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|l| l.to_string()).collect())
    }
}

impl LabelSet {
    /// Build a label set, falling back to the defaults when `labels` is empty.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            Self::default()
        } else {
            Self(labels)
        }
    }

    /// Parse a comma-separated list such as `"greeting, refund,,other"`.
    ///
    /// Items are trimmed and blank items dropped.
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty()),
        )
    }

    /// Whether `label` is one of the configured labels (exact match).
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Labels joined with `", "`, as substituted into prompts.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(labels: LabelSet) -> Self {
        labels.0
    }
}

impl From<&[&str]> for LabelSet {
    fn from(labels: &[&str]) -> Self {
        Self::new(labels.iter().copied())
    }
}
