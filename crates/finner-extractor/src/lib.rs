//! FinNER Extractor - Financial entity extraction and scoring
//!
//! Fuses a sequence-labeling model's spans with currency and date pattern
//! matches, and measures extraction quality against a labelled corpus.

pub mod corpus;
pub mod fusion;
pub mod labeler;
pub mod metrics;
pub mod patterns;

pub use corpus::{builtin_corpus, load_corpus, LabeledExample};
pub use fusion::{dedupe, fuse, SpanExtractor};
pub use labeler::{create_labeler, GazetteerLabeler, HuggingFaceLabeler};
pub use metrics::{EntityMetrics, Score, ScoreReport, Scorer};
pub use patterns::{find_amounts, find_dates};
