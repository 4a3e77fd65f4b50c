//! Data model shared by the reconstruction core and its collaborators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Marker handed to the analysis collaborator when nothing could be reconstructed.
pub const NO_DATA_MARKER: &str = "(no table data)";

/// Axis-aligned rectangle in pixel coordinates of the rendered page, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// True when all coordinates are finite and non-negative with `x0 < x1` and `y0 < y1`.
    pub fn is_well_formed(&self) -> bool {
        let coords = [self.x0, self.y0, self.x1, self.y1];
        coords.iter().all(|c| c.is_finite() && *c >= 0.0) && self.x0 < self.x1 && self.y0 < self.y1
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Bounding box enclosing every box in `boxes`, `None` when empty.
    pub fn enclosing<'a, I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes.into_iter().fold(None, |acc, bbox| match acc {
            None => Some(*bbox),
            Some(current) => Some(current.union(bbox)),
        })
    }
}

/// A token recognized by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,

    #[serde(alias = "bbox")]
    pub bounding_box: BoundingBox,

    /// OCR confidence in the 0-100 range, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn vertical_center(&self) -> f64 {
        self.bounding_box.center_y()
    }
}

/// Rectangular table of cell strings: every row has the same number of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Wraps rows that are already rectangular. Use [`crate::table::normalize`] to pad ragged rows.
    pub(crate) fn from_rectangular(rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.windows(2).all(|pair| pair[0].len() == pair[1].len()));
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cells per row; 0 for an empty grid.
    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(String::as_str)
    }

    /// Overwrites one cell, as done by a manual-correction surface. Returns false when out of range.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn is_rectangular(&self) -> bool {
        let columns = self.num_columns();
        self.rows.iter().all(|row| row.len() == columns)
    }
}

/// Output of one reconstruction call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedTable {
    pub grid: Grid,

    /// Indices into `grid` of rows classified as column labels. Empty means no header was identified.
    pub header_rows: BTreeSet<usize>,

    /// HTML table rendering of `grid`.
    pub markup: String,
}

impl ReconstructedTable {
    /// True when no words survived to form a row.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn is_header_row(&self, row: usize) -> bool {
        self.header_rows.contains(&row)
    }

    /// Serialization handed to the language-model analysis collaborator.
    pub fn to_analysis_text(&self) -> String {
        if self.is_empty() {
            return NO_DATA_MARKER.to_string();
        }
        crate::table::table_to_markdown(&self.grid, &self.header_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_geometry() {
        let bbox = BoundingBox::new(100.0, 50.0, 180.0, 80.0);
        assert_eq!(bbox.width(), 80.0);
        assert_eq!(bbox.height(), 30.0);
        assert_eq!(bbox.center_x(), 140.0);
        assert_eq!(bbox.center_y(), 65.0);
        assert!(bbox.is_well_formed());
    }

    #[test]
    fn test_bounding_box_degenerate() {
        assert!(!BoundingBox::new(10.0, 10.0, 10.0, 20.0).is_well_formed());
        assert!(!BoundingBox::new(10.0, 20.0, 30.0, 20.0).is_well_formed());
        assert!(!BoundingBox::new(-1.0, 0.0, 30.0, 20.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, f64::NAN, 30.0, 20.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 0.0, f64::INFINITY, 20.0).is_well_formed());
    }

    #[test]
    fn test_enclosing_box() {
        let boxes = [
            BoundingBox::new(10.0, 5.0, 20.0, 15.0),
            BoundingBox::new(0.0, 30.0, 5.0, 40.0),
        ];
        let enclosing = BoundingBox::enclosing(boxes.iter()).unwrap();
        assert_eq!(enclosing, BoundingBox::new(0.0, 5.0, 20.0, 40.0));
        assert!(BoundingBox::enclosing(std::iter::empty::<&BoundingBox>()).is_none());
    }

    #[test]
    fn test_word_deserializes_bbox_alias() {
        let json = r#"{"text": "13.5", "bbox": {"x0": 200, "y0": 50, "x1": 240, "y1": 60}, "confidence": 91.0}"#;
        let word: RecognizedWord = serde_json::from_str(json).unwrap();
        assert_eq!(word.text, "13.5");
        assert_eq!(word.bounding_box.x1, 240.0);
        assert_eq!(word.confidence, Some(91.0));
        assert_eq!(word.vertical_center(), 55.0);
    }

    #[test]
    fn test_word_confidence_optional() {
        let json = r#"{"text": "g/dL", "bounding_box": {"x0": 0, "y0": 0, "x1": 1, "y1": 1}}"#;
        let word: RecognizedWord = serde_json::from_str(json).unwrap();
        assert!(word.confidence.is_none());
    }

    #[test]
    fn test_grid_set_cell() {
        let mut grid = Grid::from_rectangular(vec![vec!["Glucose".to_string(), "5.2".to_string()]]);
        assert!(grid.set_cell(0, 1, "5.3"));
        assert_eq!(grid.cell(0, 1), Some("5.3"));
        assert!(!grid.set_cell(3, 0, "x"));
        assert_eq!(grid.num_columns(), 2);
        assert!(grid.is_rectangular());
    }

    #[test]
    fn test_empty_table_analysis_marker() {
        let table = ReconstructedTable::default();
        assert!(table.is_empty());
        assert_eq!(table.to_analysis_text(), NO_DATA_MARKER);
    }

    #[test]
    fn test_grid_serializes_as_nested_arrays() {
        let grid = Grid::from_rectangular(vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert_eq!(serde_json::to_string(&grid).unwrap(), r#"[["a"],["b"]]"#);
    }
}
