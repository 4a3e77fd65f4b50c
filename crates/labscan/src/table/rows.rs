//! Row clustering by vertical-center proximity.
//!
//! Words are visited top to bottom (by vertical center, stable on input order). Each word
//! joins the existing row whose running-average center is nearest and strictly within
//! `tolerance`, or seeds a new row. The running average drifts as a row grows, so the result
//! depends on visiting order; sorting first keeps that order canonical for a given word set.

use crate::types::{BoundingBox, RecognizedWord};
use std::cmp::Ordering;

/// Words sharing one horizontal band of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    representative_y: f64,
    words: Vec<RecognizedWord>,
}

impl Row {
    fn seeded(word: RecognizedWord) -> Self {
        Self {
            representative_y: word.vertical_center(),
            words: vec![word],
        }
    }

    fn push(&mut self, word: RecognizedWord) {
        let n = self.words.len() as f64;
        self.representative_y = (self.representative_y * n + word.vertical_center()) / (n + 1.0);
        self.words.push(word);
    }

    /// Running average of the member words' vertical centers.
    pub fn representative_y(&self) -> f64 {
        self.representative_y
    }

    pub fn words(&self) -> &[RecognizedWord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Box enclosing every word of the row.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.words.iter().map(|w| &w.bounding_box))
    }

    /// Member texts joined by single spaces, in current word order.
    pub fn text(&self) -> String {
        self.words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
    }

    /// Reorder words left to right (by `x0`, then `x1`, then text).
    pub fn sort_left_to_right(&mut self) {
        self.words.sort_by(compare_left_to_right);
    }
}

fn compare_left_to_right(a: &RecognizedWord, b: &RecognizedWord) -> Ordering {
    a.bounding_box
        .x0
        .total_cmp(&b.bounding_box.x0)
        .then_with(|| a.bounding_box.x1.total_cmp(&b.bounding_box.x1))
        .then_with(|| a.text.cmp(&b.text))
}

/// Group words into rows ordered top to bottom.
///
/// Words within a returned row keep assignment order; call [`Row::sort_left_to_right`]
/// before segmenting. Zero words yield zero rows.
pub fn cluster_rows(words: &[RecognizedWord], tolerance: f64) -> Vec<Row> {
    let mut order: Vec<&RecognizedWord> = words.iter().collect();
    order.sort_by(|a, b| a.vertical_center().total_cmp(&b.vertical_center()));

    let mut rows: Vec<Row> = Vec::new();

    for word in order {
        let center = word.vertical_center();
        let target = nearest_row_within(&rows, center, tolerance);

        match target {
            Some(index) => {
                tracing::trace!(text = %word.text, center, row = index, "Word joins row");
                rows[index].push(word.clone());
            }
            None => {
                tracing::trace!(text = %word.text, center, row = rows.len(), "Word seeds row");
                rows.push(Row::seeded(word.clone()));
            }
        }
    }

    rows.sort_by(|a, b| a.representative_y.total_cmp(&b.representative_y));
    rows
}

/// Index of the row whose average is nearest `center`, if strictly within `tolerance`.
/// Ties keep the earliest-created row.
fn nearest_row_within(rows: &[Row], center: f64, tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, row) in rows.iter().enumerate() {
        let distance = (row.representative_y - center).abs();
        if distance >= tolerance {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}
