//! Header-row classification.
//!
//! Lab report layouts vary too much for one deterministic rule, so several weak signals are
//! OR-combined. A row is a header when its text contains a vocabulary term, or when it is
//! structurally header-like: enough words, spanning a large share of the page width, starting in
//! the top part of the page, with evenly spaced words. When nothing qualifies the first few rows
//! are scanned once more with a looser width requirement. An empty result is valid and means no
//! header row was identified.
//!
//! Alternative strategies share the [`HeaderClassifier`] trait and are selected through
//! [`HeaderStrategy`].

use super::rows::Row;
use crate::core::config::{HeaderConfig, HeaderStrategy};
use crate::types::{BoundingBox, RecognizedWord};
use std::collections::BTreeSet;

/// Flags header rows among rows ordered top to bottom. Returned indices refer to `rows`.
pub trait HeaderClassifier {
    fn classify(&self, rows: &[Row], document: &BoundingBox) -> BTreeSet<usize>;
}

/// Measurements taken on one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSignals {
    pub word_count: usize,
    /// Row width divided by document width.
    pub span_ratio: f64,
    /// Row's top edge lies within the configured top fraction of the document.
    pub in_top_region: bool,
    /// Coefficient of variation of consecutive horizontal gaps; `None` below three words or
    /// when the mean gap is not positive.
    pub gap_cv: Option<f64>,
    pub lexical_match: bool,
}

impl RowSignals {
    pub fn measure(row: &Row, document: &BoundingBox, config: &HeaderConfig) -> Self {
        let Some(bounds) = row.bounds() else {
            return Self {
                word_count: 0,
                span_ratio: 0.0,
                in_top_region: false,
                gap_cv: None,
                lexical_match: false,
            };
        };

        let document_width = document.width();
        let span_ratio = if document_width > 0.0 {
            bounds.width() / document_width
        } else {
            0.0
        };

        let top_limit = document.y0 + document.height() * config.top_fraction;

        Self {
            word_count: row.len(),
            span_ratio,
            in_top_region: bounds.y0 <= top_limit,
            gap_cv: gap_coefficient_of_variation(row.words()),
            lexical_match: matches_vocabulary(&row.text(), &config.vocabulary),
        }
    }

    pub fn is_structural_header(&self, config: &HeaderConfig) -> bool {
        self.word_count >= config.min_words
            && self.span_ratio >= config.min_span_ratio
            && self.in_top_region
            && self.gap_cv.is_some_and(|cv| cv < config.max_gap_cv)
    }

    fn is_fallback_header(&self, config: &HeaderConfig) -> bool {
        self.word_count >= config.min_words && self.span_ratio > config.fallback_span_ratio
    }
}

/// Lexical OR structural signals with the first-rows fallback.
pub struct SignalHeaderClassifier<'a> {
    config: &'a HeaderConfig,
}

impl<'a> SignalHeaderClassifier<'a> {
    pub fn new(config: &'a HeaderConfig) -> Self {
        Self { config }
    }
}

impl HeaderClassifier for SignalHeaderClassifier<'_> {
    fn classify(&self, rows: &[Row], document: &BoundingBox) -> BTreeSet<usize> {
        let signals: Vec<RowSignals> = rows
            .iter()
            .map(|row| RowSignals::measure(row, document, self.config))
            .collect();

        let mut headers = BTreeSet::new();
        for (index, row_signals) in signals.iter().enumerate() {
            if row_signals.word_count == 0 {
                continue;
            }
            let structural = row_signals.is_structural_header(self.config);
            if row_signals.lexical_match || structural {
                tracing::trace!(
                    row = index,
                    lexical = row_signals.lexical_match,
                    structural,
                    "Header row"
                );
                headers.insert(index);
            }
        }

        if headers.is_empty() && rows.len() >= 2 {
            let fallback = signals
                .iter()
                .take(self.config.fallback_rows)
                .position(|row_signals| row_signals.is_fallback_header(self.config));
            if let Some(index) = fallback {
                tracing::trace!(row = index, "Header row from fallback scan");
                headers.insert(index);
            }
        }

        headers
    }
}

/// Vocabulary match only; no structural signal, no fallback.
pub struct LexicalHeaderClassifier<'a> {
    vocabulary: &'a [String],
}

impl<'a> LexicalHeaderClassifier<'a> {
    pub fn new(vocabulary: &'a [String]) -> Self {
        Self { vocabulary }
    }
}

impl HeaderClassifier for LexicalHeaderClassifier<'_> {
    fn classify(&self, rows: &[Row], _document: &BoundingBox) -> BTreeSet<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| !row.is_empty() && matches_vocabulary(&row.text(), self.vocabulary))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Classify with the strategy selected in `config`.
pub fn classify_headers(rows: &[Row], document: &BoundingBox, config: &HeaderConfig) -> BTreeSet<usize> {
    match config.strategy {
        HeaderStrategy::Combined => SignalHeaderClassifier::new(config).classify(rows, document),
        HeaderStrategy::Lexical => LexicalHeaderClassifier::new(&config.vocabulary).classify(rows, document),
        HeaderStrategy::Disabled => BTreeSet::new(),
    }
}

/// True when the lowercase `text` contains any non-empty vocabulary term.
pub fn matches_vocabulary(text: &str, vocabulary: &[String]) -> bool {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .map(|term| term.trim().to_lowercase())
        .any(|term| !term.is_empty() && haystack.contains(&term))
}

/// Coefficient of variation (population standard deviation / mean) of the horizontal gaps
/// between consecutive words, taken left to right.
pub fn gap_coefficient_of_variation(words: &[RecognizedWord]) -> Option<f64> {
    if words.len() < 3 {
        return None;
    }

    let mut boxes: Vec<&BoundingBox> = words.iter().map(|w| &w.bounding_box).collect();
    boxes.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let gaps: Vec<f64> = boxes.windows(2).map(|pair| pair[1].x0 - pair[0].x1).collect();
    let count = gaps.len() as f64;
    let mean = gaps.iter().sum::<f64>() / count;
    if !(mean > 0.0) {
        return None;
    }

    let variance = gaps.iter().map(|gap| (gap - mean).powi(2)).sum::<f64>() / count;
    Some(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::rows::cluster_rows;

    fn word(text: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> RecognizedWord {
        RecognizedWord::new(text, BoundingBox::new(x0, y0, x1, y1))
    }

    fn rows_and_bounds(words: &[RecognizedWord]) -> (Vec<Row>, BoundingBox) {
        let mut rows = cluster_rows(words, 15.0);
        rows.iter_mut().for_each(Row::sort_left_to_right);
        let bounds = BoundingBox::enclosing(words.iter().map(|w| &w.bounding_box)).unwrap();
        (rows, bounds)
    }

    fn no_vocabulary() -> HeaderConfig {
        HeaderConfig {
            vocabulary: Vec::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gap_cv() {
        let even = vec![
            word("a", 0.0, 0.0, 10.0, 10.0),
            word("b", 30.0, 0.0, 40.0, 10.0),
            word("c", 60.0, 0.0, 70.0, 10.0),
        ];
        assert_eq!(gap_coefficient_of_variation(&even), Some(0.0));

        let uneven = vec![
            word("a", 0.0, 0.0, 10.0, 10.0),
            word("b", 12.0, 0.0, 20.0, 10.0),
            word("c", 200.0, 0.0, 210.0, 10.0),
        ];
        // gaps 2 and 180: mean 91, std 89
        let cv = gap_coefficient_of_variation(&uneven).unwrap();
        assert!((cv - 89.0 / 91.0).abs() < 1e-9);

        assert_eq!(gap_coefficient_of_variation(&even[..2]), None);
    }

    #[test]
    fn test_gap_cv_overlapping_words() {
        let overlapping = vec![
            word("a", 0.0, 0.0, 20.0, 10.0),
            word("b", 10.0, 0.0, 30.0, 10.0),
            word("c", 20.0, 0.0, 40.0, 10.0),
        ];
        assert_eq!(gap_coefficient_of_variation(&overlapping), None);
    }

    #[test]
    fn test_vocabulary_match_is_case_insensitive_substring() {
        let vocabulary = vec!["Result".to_string(), "  ".to_string()];
        assert!(matches_vocabulary("Test RESULTS", &vocabulary));
        assert!(!matches_vocabulary("Hemoglobine 13.5", &vocabulary));
        assert!(!matches_vocabulary("anything", &[String::new()]));
    }

    #[test]
    fn test_structural_header_without_vocabulary() {
        let words = vec![
            word("Analyte", 0.0, 0.0, 60.0, 10.0),
            word("Level", 200.0, 0.0, 250.0, 10.0),
            word("Norms", 400.0, 0.0, 450.0, 10.0),
            word("Glucose", 0.0, 50.0, 60.0, 60.0),
            word("5.2", 200.0, 50.0, 230.0, 60.0),
            word("mmol/L", 400.0, 50.0, 450.0, 60.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        let config = no_vocabulary();
        let headers = SignalHeaderClassifier::new(&config).classify(&rows, &bounds);
        assert_eq!(headers, BTreeSet::from([0]));
    }

    #[test]
    fn test_structural_requires_top_region() {
        let words = vec![
            word("Patient", 0.0, 0.0, 60.0, 10.0),
            word("Glucose", 0.0, 100.0, 60.0, 110.0),
            word("5.2", 200.0, 100.0, 230.0, 110.0),
            word("mmol/L", 400.0, 100.0, 450.0, 110.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        let signals = RowSignals::measure(&rows[1], &bounds, &no_vocabulary());
        assert!(!signals.in_top_region);
        assert!(!signals.is_structural_header(&no_vocabulary()));
    }

    #[test]
    fn test_lexical_match_anywhere() {
        let words = vec![
            word("Laboratoire", 0.0, 0.0, 90.0, 10.0),
            word("Glucose", 0.0, 100.0, 60.0, 110.0),
            word("Reference", 0.0, 200.0, 80.0, 210.0),
            word("range", 100.0, 200.0, 140.0, 210.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        let config = HeaderConfig::default();
        let headers = classify_headers(&rows, &bounds, &config);
        assert_eq!(headers, BTreeSet::from([2]));
    }

    #[test]
    fn test_fallback_flags_first_wide_row() {
        // Row 0 is narrow; row 1 is wide but its gaps are too uneven to be structural.
        let words = vec![
            word("CHU", 0.0, 0.0, 40.0, 10.0),
            word("x", 0.0, 100.0, 10.0, 110.0),
            word("y", 12.0, 100.0, 20.0, 110.0),
            word("z", 300.0, 100.0, 400.0, 110.0),
            word("last", 0.0, 300.0, 40.0, 310.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        let config = no_vocabulary();
        assert!(!RowSignals::measure(&rows[1], &bounds, &config).is_structural_header(&config));
        let headers = classify_headers(&rows, &bounds, &config);
        assert_eq!(headers, BTreeSet::from([1]));
    }

    #[test]
    fn test_fallback_needs_two_rows() {
        let words = vec![
            word("x", 0.0, 100.0, 10.0, 110.0),
            word("y", 12.0, 100.0, 20.0, 110.0),
            word("z", 300.0, 100.0, 400.0, 110.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        assert!(classify_headers(&rows, &bounds, &no_vocabulary()).is_empty());
    }

    #[test]
    fn test_fallback_limited_to_leading_rows() {
        let mut words: Vec<RecognizedWord> = (0..6)
            .map(|i| {
                let y = i as f64 * 50.0;
                word(&format!("r{}", i), 0.0, y, 20.0, y + 10.0)
            })
            .collect();
        words.push(word("p", 100.0, 250.0, 110.0, 260.0));
        words.push(word("q", 300.0, 250.0, 310.0, 260.0));
        let (rows, bounds) = rows_and_bounds(&words);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5].len(), 3);
        assert!(classify_headers(&rows, &bounds, &no_vocabulary()).is_empty());
    }

    #[test]
    fn test_lexical_strategy_skips_structure() {
        let words = vec![
            word("Analyte", 0.0, 0.0, 60.0, 10.0),
            word("Level", 200.0, 0.0, 250.0, 10.0),
            word("Norms", 400.0, 0.0, 450.0, 10.0),
            word("Glucose", 0.0, 50.0, 60.0, 60.0),
        ];
        let (rows, bounds) = rows_and_bounds(&words);
        let config = HeaderConfig {
            strategy: HeaderStrategy::Lexical,
            vocabulary: vec!["glucose".to_string()],
            ..Default::default()
        };
        assert_eq!(classify_headers(&rows, &bounds, &config), BTreeSet::from([1]));
    }

    #[test]
    fn test_disabled_strategy() {
        let words = vec![word("Test", 0.0, 0.0, 40.0, 10.0), word("Result", 200.0, 0.0, 260.0, 10.0)];
        let (rows, bounds) = rows_and_bounds(&words);
        let config = HeaderConfig {
            strategy: HeaderStrategy::Disabled,
            ..Default::default()
        };
        assert!(classify_headers(&rows, &bounds, &config).is_empty());
    }
}
