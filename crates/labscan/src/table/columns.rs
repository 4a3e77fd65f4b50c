//! Column segmentation within a row.
//!
//! Consecutive words (left to right) separated by more than `gap_threshold` pixels land in
//! different cells; closer words are joined with a single space. Cell boundaries are local to
//! each row, so cells of different rows are only aligned by position later on.

use super::rows::Row;
use crate::types::RecognizedWord;

/// Split left-to-right ordered `words` into cell strings.
///
/// The gap is measured as `word.x0 - previous.x1`; overlapping words give a negative gap and
/// always share a cell. A non-empty input yields at least one cell.
pub fn segment_words(words: &[RecognizedWord], gap_threshold: f64) -> Vec<String> {
    let mut cells: Vec<String> = Vec::new();
    let mut previous_x1: Option<f64> = None;

    for word in words {
        let starts_cell = match previous_x1 {
            None => true,
            Some(x1) => word.bounding_box.x0 - x1 > gap_threshold,
        };

        match cells.last_mut() {
            Some(cell) if !starts_cell => {
                cell.push(' ');
                cell.push_str(&word.text);
            }
            _ => cells.push(word.text.clone()),
        }

        previous_x1 = Some(word.bounding_box.x1);
    }

    cells
}

/// Segment a row whose words are already sorted left to right.
pub fn segment_row(row: &Row, gap_threshold: f64) -> Vec<String> {
    segment_words(row.words(), gap_threshold)
}
