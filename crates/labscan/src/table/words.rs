//! Input sanitation applied before clustering.
//!
//! Words with degenerate geometry (zero width or height, NaN, infinite or negative
//! coordinates) or blank text are filtered out, never propagated into the algorithms.

use crate::types::RecognizedWord;

/// Why a word was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BlankText,
    DegenerateGeometry,
    LowConfidence,
}

/// Check a single word, returning the reason it cannot be used.
pub fn check_word(word: &RecognizedWord, min_confidence: f64) -> Option<Rejection> {
    if word.text.trim().is_empty() {
        return Some(Rejection::BlankText);
    }
    if !word.bounding_box.is_well_formed() {
        return Some(Rejection::DegenerateGeometry);
    }
    match word.confidence {
        Some(confidence) if confidence < min_confidence => Some(Rejection::LowConfidence),
        _ => None,
    }
}

/// Keep the usable words, with surrounding whitespace trimmed from their text.
///
/// Words without a confidence are never dropped by the confidence floor.
pub fn sanitize_words(words: &[RecognizedWord], min_confidence: f64) -> Vec<RecognizedWord> {
    let mut kept = Vec::with_capacity(words.len());
    let mut degenerate = 0usize;
    let mut blank = 0usize;
    let mut low_confidence = 0usize;

    for word in words {
        match check_word(word, min_confidence) {
            None => {
                let mut word = word.clone();
                let trimmed = word.text.trim();
                if trimmed.len() != word.text.len() {
                    word.text = trimmed.to_string();
                }
                kept.push(word);
            }
            Some(Rejection::BlankText) => blank += 1,
            Some(Rejection::DegenerateGeometry) => degenerate += 1,
            Some(Rejection::LowConfidence) => low_confidence += 1,
        }
    }

    if kept.len() != words.len() {
        tracing::debug!(
            kept = kept.len(),
            degenerate,
            blank,
            low_confidence,
            "Filtered unusable words"
        );
    }

    kept
}
