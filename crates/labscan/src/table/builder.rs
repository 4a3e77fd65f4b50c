//! Table reconstruction from recognized words.

use super::columns::segment_row;
use super::grid::{normalize, render_markup};
use super::header::classify_headers;
use super::rows::{Row, cluster_rows};
use super::words::sanitize_words;
use crate::core::config::TableConfig;
use crate::types::{BoundingBox, RecognizedWord, ReconstructedTable};

/// Turns a flat list of words into a [`ReconstructedTable`].
///
/// Stages run in order: sanitize, cluster rows, order words left to right, classify header rows,
/// segment cells, normalize the grid and render markup. The builder holds no mutable state, so
/// one instance can serve concurrent calls.
///
/// ```rust
/// use labscan::table::TableBuilder;
/// use labscan::{BoundingBox, RecognizedWord};
///
/// let words = vec![
///     RecognizedWord::new("Test", BoundingBox::new(0.0, 0.0, 40.0, 10.0)),
///     RecognizedWord::new("Result", BoundingBox::new(200.0, 0.0, 260.0, 10.0)),
/// ];
/// let table = TableBuilder::default().build(&words);
/// assert_eq!(table.grid.rows()[0], vec!["Test", "Result"]);
/// assert!(table.is_header_row(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    config: TableConfig,
}

impl TableBuilder {
    /// Pixel thresholds that are non-finite or out of range fall back to their defaults; see
    /// [`TableConfig::with_usable_thresholds`].
    pub fn new(config: TableConfig) -> Self {
        Self {
            config: config.with_usable_thresholds(),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[tracing::instrument(level = "debug", skip_all, fields(words = words.len()))]
    pub fn build(&self, words: &[RecognizedWord]) -> ReconstructedTable {
        let words = sanitize_words(words, self.config.min_confidence);

        let Some(document) = BoundingBox::enclosing(words.iter().map(|w| &w.bounding_box)) else {
            tracing::debug!("No usable words, returning empty table");
            return ReconstructedTable {
                markup: render_markup(&Default::default(), &Default::default(), &self.config.placeholder),
                ..Default::default()
            };
        };

        let mut rows = cluster_rows(&words, self.config.row_tolerance);
        rows.iter_mut().for_each(Row::sort_left_to_right);

        let header_rows = classify_headers(&rows, &document, &self.config.header);

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| segment_row(row, self.config.gap_threshold))
            .collect();
        let grid = normalize(cells, &self.config.placeholder);
        let markup = render_markup(&grid, &header_rows, &self.config.placeholder);

        tracing::debug!(
            rows = grid.num_rows(),
            columns = grid.num_columns(),
            headers = header_rows.len(),
            "Reconstructed table"
        );

        ReconstructedTable {
            grid,
            header_rows,
            markup,
        }
    }
}
