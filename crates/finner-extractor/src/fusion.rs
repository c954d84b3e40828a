//! Entity fusion
//!
//! Combines the sequence-labeling model's spans with pattern matches:
//! - Amounts: patterns only
//! - Dates: model spans first, then pattern matches
//! - Organizations: model spans only
//!
//! Every list is deduplicated by exact string, keeping the first occurrence.

use std::collections::HashSet;
use std::sync::Arc;

use finner_core::{ExtractionResult, LabeledSpan, Result, SequenceLabeler, SpanRoute};
use tracing::{debug, warn};

use crate::patterns::{find_amounts, find_dates};

/// Remove repeated strings, keeping first occurrences in order
pub fn dedupe<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            result.push(item);
        }
    }

    result
}

/// Fuse an already-obtained span sequence with pattern matches over `text`
pub fn fuse<I>(text: &str, spans: I) -> ExtractionResult
where
    I: IntoIterator<Item = LabeledSpan>,
{
    let mut organizations = Vec::new();
    let mut model_dates = Vec::new();

    for span in spans {
        match span.route() {
            SpanRoute::Organization => organizations.push(span.text.trim().to_string()),
            SpanRoute::Date => model_dates.push(span.text.trim().to_string()),
            SpanRoute::Ignored => {}
        }
    }

    let dates = model_dates
        .into_iter()
        .chain(find_dates(text).into_iter().map(str::to_string));

    ExtractionResult {
        amounts: dedupe(find_amounts(text)),
        dates: dedupe(dates),
        organizations: dedupe(organizations),
    }
}

/// Extracts amounts, dates, and organizations from one document at a time
#[derive(Clone)]
pub struct SpanExtractor {
    labeler: Arc<dyn SequenceLabeler>,
}

impl SpanExtractor {
    /// Create an extractor around a sequence-labeling model
    pub fn new(labeler: Arc<dyn SequenceLabeler>) -> Self {
        Self { labeler }
    }

    /// Name of the underlying labeler
    pub fn labeler_name(&self) -> &str {
        self.labeler.name()
    }

    /// Extract entities from a document.
    ///
    /// Labeler failures are returned unchanged; there is no pattern-only
    /// fallback.
    pub async fn extract(&self, text: &str) -> Result<ExtractionResult> {
        let spans = self.labeler.label(text).await.map_err(|e| {
            warn!(labeler = self.labeler.name(), error = %e, "sequence labeler failed");
            e
        })?;

        let span_count = spans.len();
        let result = fuse(text, spans);

        debug!(
            spans = span_count,
            amounts = result.amounts.len(),
            dates = result.dates.len(),
            organizations = result.organizations.len(),
            "extracted entities"
        );

        Ok(result)
    }

    /// Extract from several independent documents, preserving input order
    pub async fn extract_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ExtractionResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.extract(text.as_ref()).await?);
        }
        Ok(results)
    }
}

impl std::fmt::Debug for SpanExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanExtractor")
            .field("labeler", &self.labeler.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finner_core::FinnerError;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed span list on every call
    struct ScriptedLabeler {
        spans: Vec<LabeledSpan>,
        calls: AtomicUsize,
    }

    impl ScriptedLabeler {
        fn new(spans: Vec<LabeledSpan>) -> Self {
            Self {
                spans,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SequenceLabeler for ScriptedLabeler {
        async fn label(&self, _text: &str) -> Result<Vec<LabeledSpan>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.spans.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingLabeler;

    #[async_trait]
    impl SequenceLabeler for FailingLabeler {
        async fn label(&self, _text: &str) -> Result<Vec<LabeledSpan>> {
            Err(FinnerError::ModelError("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn span(text: &str, label: &str) -> LabeledSpan {
        LabeledSpan::new(text, label)
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        assert_eq!(
            dedupe(["Microsoft", "Activision Blizzard", "Microsoft"]),
            vec!["Microsoft", "Activision Blizzard"]
        );
        assert!(dedupe(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_dedupe_is_case_sensitive() {
        assert_eq!(
            dedupe(["Apple Inc.", "apple inc."]),
            vec!["Apple Inc.", "apple inc."]
        );
    }

    #[test]
    fn test_fuse_exact_match_scenario() {
        let text = "Apple Inc. raised $2.5 billion on January 10, 2024.";
        let result = fuse(text, vec![span("Apple Inc.", "ORG")]);

        assert_eq!(result.amounts, vec!["$2.5 billion"]);
        assert_eq!(result.dates, vec!["January 10, 2024"]);
        assert_eq!(result.organizations, vec!["Apple Inc."]);
    }

    #[test]
    fn test_fuse_numeric_date_from_patterns_alone() {
        let text = "On 03/22/2023, Bank of America issued bonds worth $500 million.";
        let result = fuse(text, vec![span("Bank of America", "ORG")]);

        assert_eq!(result.dates, vec!["03/22/2023"]);
        assert_eq!(result.amounts, vec!["$500 million"]);
        assert_eq!(result.organizations, vec!["Bank of America"]);
    }

    #[test]
    fn test_fuse_duplicate_organizations() {
        let text = "Microsoft acquired Activision Blizzard. Microsoft said so.";
        let spans = vec![
            span("Microsoft", "ORG"),
            span("Activision Blizzard", "ORG"),
            span("Microsoft", "ORG"),
        ];

        let result = fuse(text, spans);
        assert_eq!(result.organizations, vec!["Microsoft", "Activision Blizzard"]);
    }

    #[test]
    fn test_fuse_model_dates_come_first() {
        let text = "Filed 06/15/2024, effective next quarter, reviewed March 31, 2024.";
        let spans = vec![
            span(" next quarter ", "DATE"),
            span("March 31, 2024", "DATE"),
            span("noon", "TIME"),
        ];

        let result = fuse(text, spans);
        assert_eq!(
            result.dates,
            vec!["next quarter", "March 31, 2024", "noon", "06/15/2024"]
        );
    }

    #[test]
    fn test_fuse_equivalent_dates_in_different_formats_stay_separate() {
        let text = "Paid 03/15/2024.";
        let result = fuse(text, vec![span("March 15, 2024", "DATE")]);

        assert_eq!(result.dates, vec!["March 15, 2024", "03/15/2024"]);
    }

    #[test]
    fn test_fuse_trims_model_spans_only() {
        let text = "Goldman Sachs paid $5 billion";
        let result = fuse(text, vec![span("  Goldman Sachs ", "ORG")]);
        assert_eq!(result.organizations, vec!["Goldman Sachs"]);
    }

    #[test]
    fn test_fuse_ignores_other_labels_and_model_money() {
        let text = "Tim Cook spoke in Cupertino.";
        let spans = vec![
            span("Tim Cook", "PER"),
            span("Cupertino", "LOC"),
            span("$9 billion", "MONEY"),
        ];

        let result = fuse(text, spans);
        assert!(result.is_empty());
    }

    #[test]
    fn test_fuse_empty_text() {
        assert!(fuse("", Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_extractor_calls_labeler_once() {
        let labeler = Arc::new(ScriptedLabeler::new(vec![span("Citigroup", "ORG")]));
        let extractor = SpanExtractor::new(labeler.clone());

        let result = extractor
            .extract("On 06/15/2024, Citigroup announced a $1.5 billion share buyback program.")
            .await
            .unwrap();

        assert_eq!(labeler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.organizations, vec!["Citigroup"]);
        assert_eq!(result.dates, vec!["06/15/2024"]);
        assert_eq!(result.amounts, vec!["$1.5 billion"]);
        assert_eq!(extractor.labeler_name(), "scripted");
    }

    #[tokio::test]
    async fn test_extractor_propagates_labeler_failure() {
        let extractor = SpanExtractor::new(Arc::new(FailingLabeler));

        let err = extractor.extract("$5 million on 01/02/2024").await.unwrap_err();
        assert!(matches!(err, FinnerError::ModelError(_)));
    }

    #[tokio::test]
    async fn test_extract_batch_preserves_order() {
        let extractor = SpanExtractor::new(Arc::new(ScriptedLabeler::new(Vec::new())));
        let texts = ["$1 million", "no entities here", "$2 billion"];

        let results = extractor.extract_batch(&texts).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].amounts, vec!["$1 million"]);
        assert!(results[1].is_empty());
        assert_eq!(results[2].amounts, vec!["$2 billion"]);
    }

    #[tokio::test]
    async fn test_extract_is_deterministic_for_fixed_spans() {
        let extractor = SpanExtractor::new(Arc::new(ScriptedLabeler::new(vec![
            span("Wells Fargo", "ORG"),
            span("March 31, 2024", "DATE"),
        ])));
        let text = "Wells Fargo reported net income of $4.9 billion for the quarter ending March 31, 2024.";

        let first = extractor.extract(text).await.unwrap();
        let second = extractor.extract(text).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.dates, vec!["March 31, 2024"]);
    }

    fn arb_span() -> impl Strategy<Value = LabeledSpan> {
        (
            "[A-Za-z$0-9 ,./]{0,12}",
            prop::sample::select(vec!["ORG", "DATE", "TIME", "PER", "LOC", "MISC"]),
        )
            .prop_map(|(text, label)| LabeledSpan::new(text, label))
    }

    proptest! {
        #[test]
        fn prop_dedupe_is_idempotent(items in prop::collection::vec("[a-c]{0,2}", 0..20)) {
            let once = dedupe(items.clone());
            let twice = dedupe(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_dedupe_has_no_repeats_and_preserves_first_order(
            items in prop::collection::vec("[a-c]{0,2}", 0..20)
        ) {
            let result = dedupe(items.clone());
            let unique: HashSet<&String> = result.iter().collect();
            prop_assert_eq!(unique.len(), result.len());

            let mut firsts: Vec<String> = Vec::new();
            for item in &items {
                if !firsts.contains(item) {
                    firsts.push(item.clone());
                }
            }
            prop_assert_eq!(&result, &firsts);
        }

        #[test]
        fn prop_amounts_ignore_model_output(
            text in "[A-Za-z0-9 $,.]{0,40}",
            spans in prop::collection::vec(arb_span(), 0..8)
        ) {
            let with_model = fuse(&text, spans);
            let without_model = fuse(&text, Vec::new());
            prop_assert_eq!(with_model.amounts, without_model.amounts);
        }
    }
}
