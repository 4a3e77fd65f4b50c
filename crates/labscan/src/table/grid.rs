//! Grid normalization and HTML markup.

use crate::types::Grid;
use std::collections::BTreeSet;

/// Right-pad every row with `placeholder` to the length of the longest row.
///
/// Columns are aligned by position only: cell `i` of one row and cell `i` of another are assumed
/// to be the same column. An empty input gives an empty grid.
pub fn normalize(rows: Vec<Vec<String>>, placeholder: &str) -> Grid {
    if rows.is_empty() {
        return Grid::default();
    }
    let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let padded = rows
        .into_iter()
        .map(|mut row| {
            row.resize(num_columns, placeholder.to_string());
            row
        })
        .collect();

    Grid::from_rectangular(padded)
}

/// Render `grid` as an HTML table. Header rows use `<th>` cells, blank cells show `placeholder`
/// and cell text is escaped.
pub fn render_markup(grid: &Grid, header_rows: &BTreeSet<usize>, placeholder: &str) -> String {
    if grid.is_empty() {
        return "<table></table>".to_string();
    }

    let mut html = String::from("<table>\n");
    for (index, row) in grid.rows().iter().enumerate() {
        let tag = if header_rows.contains(&index) { "th" } else { "td" };
        html.push_str("  <tr>");
        for cell in row {
            let text = if cell.trim().is_empty() {
                placeholder
            } else {
                cell.as_str()
            };
            html.push('<');
            html.push_str(tag);
            html.push('>');
            html.push_str(&escape_html(text));
            html.push_str("</");
            html.push_str(tag);
            html.push('>');
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
