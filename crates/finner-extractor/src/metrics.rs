//! Quality Metrics module
//!
//! Scores extraction output against a labelled corpus with micro-averaged
//! precision, recall, and F1 per entity kind and overall.

use std::collections::{BTreeMap, HashSet};

use finner_core::{EntityKind, ExtractionResult, FinnerError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::LabeledExample;
use crate::fusion::SpanExtractor;

// ============================================================================
// Entity Metrics
// ============================================================================

/// Confusion counts for one entity kind (or all kinds together)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetrics {
    /// True positives (predicted and expected)
    pub true_positives: usize,
    /// False positives (predicted but not expected)
    pub false_positives: usize,
    /// False negatives (expected but missed)
    pub false_negatives: usize,
}

impl EntityMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f64 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f64 / (self.true_positives + self.false_positives) as f64
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f64 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f64 / (self.true_positives + self.false_negatives) as f64
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Accumulate counts from another set of metrics
    pub fn add(&mut self, other: &EntityMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    /// The (precision, recall, F1) triple
    pub fn score(&self) -> Score {
        Score {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1_score(),
        }
    }
}

/// Precision, recall, and F1, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Lower-cased, trimmed set used for loose matching
pub fn normalized_set<S: AsRef<str>>(values: &[S]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .collect()
}

// ============================================================================
// Score Report
// ============================================================================

/// Micro-averaged scores over a corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreReport {
    pub per_kind: BTreeMap<EntityKind, EntityMetrics>,
    pub overall: EntityMetrics,
    pub num_examples: usize,
}

impl ScoreReport {
    /// Metrics for one kind (zero counts if never seen)
    pub fn metrics(&self, kind: EntityKind) -> EntityMetrics {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn score(&self, kind: EntityKind) -> Score {
        self.metrics(kind).score()
    }

    pub fn overall_score(&self) -> Score {
        self.overall.score()
    }

    fn record(&mut self, counts: &BTreeMap<EntityKind, EntityMetrics>) {
        for (kind, metrics) in counts {
            self.per_kind.entry(*kind).or_default().add(metrics);
            self.overall.add(metrics);
        }
        self.num_examples += 1;
    }

    /// Render the score table
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();

        out.push_str(&format!("{rule}\n"));
        out.push_str(&format!(
            "{:<16} {:>9} {:>9} {:>9}\n",
            "Entity Type", "Precision", "Recall", "F1"
        ));
        out.push_str(&format!("{rule}\n"));

        for kind in EntityKind::ALL {
            out.push_str(&format_row(kind.as_str(), &self.score(kind)));
        }

        out.push_str(&format!("{}\n", "-".repeat(60)));
        out.push_str(&format_row("OVERALL", &self.overall_score()));
        out.push_str(&format!("{rule}\n"));
        out
    }
}

fn format_row(name: &str, score: &Score) -> String {
    format!(
        "{:<16} {:>9} {:>9} {:>9}\n",
        name,
        percent(score.precision),
        percent(score.recall),
        percent(score.f1)
    )
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

// ============================================================================
// Scorer
// ============================================================================

/// Scores an extractor against labelled examples
#[derive(Debug, Clone)]
pub struct Scorer {
    /// Documents extracted concurrently
    concurrency: usize,
}

impl Scorer {
    /// Create a scorer that extracts one document at a time
    pub fn new() -> Self {
        Self { concurrency: 1 }
    }

    /// Extract up to `n` documents concurrently (the labeler must allow it)
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Compare one prediction against one example, per kind
    pub fn compare(
        &self,
        predicted: &ExtractionResult,
        example: &LabeledExample,
    ) -> BTreeMap<EntityKind, EntityMetrics> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| {
                let predicted_set = normalized_set(predicted.get(kind));
                let expected_set = normalized_set(example.expected_for(kind));

                let true_positives = predicted_set.intersection(&expected_set).count();
                let metrics = EntityMetrics {
                    true_positives,
                    false_positives: predicted_set.len() - true_positives,
                    false_negatives: expected_set.len() - true_positives,
                };
                (kind, metrics)
            })
            .collect()
    }

    /// Score pre-computed predictions, paired with examples in order
    pub fn score_predictions(
        &self,
        predictions: &[ExtractionResult],
        examples: &[LabeledExample],
    ) -> Result<ScoreReport> {
        if predictions.len() != examples.len() {
            return Err(FinnerError::ValidationError(format!(
                "{} predictions for {} examples",
                predictions.len(),
                examples.len()
            )));
        }

        let mut report = ScoreReport::default();
        for kind in EntityKind::ALL {
            report.per_kind.insert(kind, EntityMetrics::default());
        }

        for (predicted, example) in predictions.iter().zip(examples) {
            report.record(&self.compare(predicted, example));
        }
        Ok(report)
    }

    /// Run the extractor over every example and score the results
    pub async fn evaluate(
        &self,
        extractor: &SpanExtractor,
        examples: &[LabeledExample],
    ) -> Result<ScoreReport> {
        let predictions: Vec<ExtractionResult> = stream::iter(examples)
            .map(|example| extractor.extract(&example.text))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let report = self.score_predictions(&predictions, examples)?;

        info!(
            examples = report.num_examples,
            labeler = extractor.labeler_name(),
            precision = report.overall.precision(),
            recall = report.overall.recall(),
            f1 = report.overall.f1_score(),
            "evaluation complete"
        );

        Ok(report)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
