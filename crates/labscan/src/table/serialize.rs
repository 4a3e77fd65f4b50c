//! Text serializations of a reconstructed grid.
//!
//! The Markdown form is what the analysis collaborator receives. It keeps grid order: row 0
//! becomes the GFM header line only when it was flagged, so an unflagged first data row is never
//! promoted to column labels. Other flagged rows stay in place with bold cells.

use crate::types::Grid;
use std::collections::BTreeSet;

/// Render `grid` as a GitHub-Flavored Markdown table. Empty grids give an empty string.
pub fn table_to_markdown(grid: &Grid, header_rows: &BTreeSet<usize>) -> String {
    let num_cols = grid.num_columns();
    if grid.is_empty() || num_cols == 0 {
        return String::new();
    }

    let estimated_capacity = grid.num_rows().saturating_mul(num_cols).saturating_mul(12).max(64);
    let mut markdown = String::with_capacity(estimated_capacity);

    let first_is_header = header_rows.contains(&0);
    if first_is_header {
        push_markdown_row(&mut markdown, &grid.rows()[0], false);
    } else {
        markdown.push('|');
        for _ in 0..num_cols {
            markdown.push_str("   |");
        }
        markdown.push('\n');
    }

    markdown.push('|');
    for _ in 0..num_cols {
        markdown.push_str("---|");
    }
    markdown.push('\n');

    let skip = usize::from(first_is_header);
    for (index, row) in grid.rows().iter().enumerate().skip(skip) {
        push_markdown_row(&mut markdown, row, header_rows.contains(&index));
    }

    markdown
}

fn push_markdown_row(markdown: &mut String, row: &[String], bold: bool) {
    markdown.push('|');
    for cell in row {
        markdown.push(' ');
        let escaped = flatten(cell).replace('|', "\\|");
        if bold && !escaped.is_empty() {
            markdown.push_str("**");
            markdown.push_str(&escaped);
            markdown.push_str("**");
        } else {
            markdown.push_str(&escaped);
        }
        markdown.push_str(" |");
    }
    markdown.push('\n');
}

/// Render `grid` as tab-separated values, one line per row.
pub fn table_to_tsv(grid: &Grid) -> String {
    grid.rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.replace('\t', " ").replace(['\r', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn flatten(cell: &str) -> String {
    cell.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid::normalize;

    fn grid(data: &[&[&str]]) -> Grid {
        normalize(
            data.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
            "—",
        )
    }

    #[test]
    fn test_markdown_with_header() {
        let grid = grid(&[&["Test", "Result"], &["Hemoglobine", "13.5"]]);
        let markdown = table_to_markdown(&grid, &BTreeSet::from([0]));
        assert_eq!(markdown, "| Test | Result |\n|---|---|\n| Hemoglobine | 13.5 |\n");
    }

    #[test]
    fn test_markdown_without_header_keeps_first_row_as_data() {
        let grid = grid(&[&["Glucose", "5.2"]]);
        let markdown = table_to_markdown(&grid, &BTreeSet::new());
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines, vec!["|   |   |", "|---|---|", "| Glucose | 5.2 |"]);
    }

    #[test]
    fn test_markdown_bolds_later_header_rows() {
        let grid = grid(&[&["CHU Lyon", "—"], &["Analyse", "Valeur"], &["Sodium", "140"]]);
        let markdown = table_to_markdown(&grid, &BTreeSet::from([1]));
        assert!(markdown.contains("| **Analyse** | **Valeur** |"));
        assert!(markdown.contains("| CHU Lyon | — |"));
        assert!(markdown.starts_with("|   |   |\n"));
    }

    #[test]
    fn test_markdown_escapes_pipes_and_newlines() {
        let grid = grid(&[&["a|b", "line\nbreak"]]);
        let markdown = table_to_markdown(&grid, &BTreeSet::new());
        assert!(markdown.contains("| a\\|b | line break |"));
    }

    #[test]
    fn test_markdown_empty() {
        assert_eq!(table_to_markdown(&Grid::default(), &BTreeSet::new()), "");
    }

    #[test]
    fn test_tsv() {
        let grid = grid(&[&["Test", "Result"], &["Na\t+", "140\n"]]);
        assert_eq!(table_to_tsv(&grid), "Test\tResult\nNa + \t140 ");
    }
}
