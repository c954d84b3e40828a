//! Hand-labelled evaluation corpus

use std::collections::BTreeMap;
use std::path::Path;

use finner_core::{EntityKind, FinnerError, Result};
use serde::{Deserialize, Serialize};

/// A document with its ground-truth entities, keyed by entity kind name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    #[serde(default)]
    pub expected: BTreeMap<String, Vec<String>>,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expected: BTreeMap::new(),
        }
    }

    /// Add expected entities of one kind
    pub fn with_expected<I, S>(mut self, kind: EntityKind, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected
            .insert(kind.as_str().to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Expected entities of one kind; a missing key means none are expected
    pub fn expected_for(&self, kind: EntityKind) -> &[String] {
        self.expected
            .get(kind.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The built-in financial test set
pub fn builtin_corpus() -> Vec<LabeledExample> {
    use EntityKind::*;

    vec![
        LabeledExample::new("Apple Inc. raised $2.5 billion on January 10, 2024.")
            .with_expected(Amounts, ["$2.5 billion"])
            .with_expected(Dates, ["January 10, 2024"])
            .with_expected(Organizations, ["Apple Inc."]),
        LabeledExample::new("On 03/22/2023, Bank of America issued bonds worth $500 million.")
            .with_expected(Amounts, ["$500 million"])
            .with_expected(Dates, ["03/22/2023"])
            .with_expected(Organizations, ["Bank of America"]),
        LabeledExample::new(
            "Microsoft acquired Activision Blizzard for $68.7 billion, closing December 31, 2023.",
        )
        .with_expected(Amounts, ["$68.7 billion"])
        .with_expected(Dates, ["December 31, 2023"])
        .with_expected(Organizations, ["Microsoft", "Activision Blizzard"]),
        LabeledExample::new(
            "On 06/15/2024, Citigroup announced a $1.5 billion share buyback program.",
        )
        .with_expected(Amounts, ["$1.5 billion"])
        .with_expected(Dates, ["06/15/2024"])
        .with_expected(Organizations, ["Citigroup"]),
        LabeledExample::new(
            "Wells Fargo reported net income of $4.9 billion for the quarter ending March 31, 2024.",
        )
        .with_expected(Amounts, ["$4.9 billion"])
        .with_expected(Dates, ["March 31, 2024"])
        .with_expected(Organizations, ["Wells Fargo"]),
    ]
}

/// Load a corpus from a JSON array of examples
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<LabeledExample>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FinnerError::CorpusError(format!("Failed to read {}: {e}", path.display()))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        FinnerError::CorpusError(format!("Failed to parse {}: {e}", path.display()))
    })
}
