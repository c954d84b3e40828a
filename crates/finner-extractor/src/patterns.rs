//! Currency-amount and date pattern matchers
//!
//! Both matchers are compiled once and shared; they scan left-to-right and
//! return non-overlapping matches exactly as they appear in the text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `$` + digits with optional thousands separators, optional fraction,
/// optional scale word.
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$[\d,]+(?:\.\d+)?(?:\s?(?:trillion|billion|million|thousand))?")
        .expect("amount pattern is valid")
});

/// Numeric `D/M/Y` dates or `Month D, YYYY`.
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
        r"|\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?",
        r"|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)",
        r"\s+\d{1,2},?\s+\d{4})\b",
    ))
    .expect("date pattern is valid")
});

/// Currency amounts in order of appearance
pub fn find_amounts(text: &str) -> Vec<&str> {
    AMOUNT_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Dates in order of appearance
pub fn find_dates(text: &str) -> Vec<&str> {
    DATE_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}
