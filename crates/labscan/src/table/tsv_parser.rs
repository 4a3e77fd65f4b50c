use crate::Result;
use crate::types::{BoundingBox, RecognizedWord};

/// Tesseract TSV level for word rows.
pub const TSV_WORD_LEVEL: u32 = 5;

/// Columns in a Tesseract TSV row: level .. conf, text.
pub const TSV_MIN_FIELDS: usize = 12;

/// Extract words from Tesseract TSV output.
///
/// Accepts both the file renderer's output, which starts with a `level ...` header line, and the
/// header-less per-page text from `GetTSVText`. Only level-5 rows are kept, so the header and the
/// page, block, paragraph and line rows fall out on the level check. Tesseract reports `-1`
/// confidence for non-word rows; word rows with a confidence below `min_confidence` are dropped
/// here, and rows with unparseable geometry are skipped.
pub fn extract_words_from_tsv(tsv_data: &str, min_confidence: f64) -> Result<Vec<RecognizedWord>> {
    if tsv_data.trim().is_empty() {
        return Ok(Vec::new());
    }

    let lines = tsv_data
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .skip_while(|line| line.trim_start().starts_with("level"));

    let mut words = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let conf = fields[10].trim().parse::<f64>().unwrap_or(-1.0);
        if conf < min_confidence {
            continue;
        }

        let text = fields[11..].join("\t");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let Some((left, top, width, height)) = parse_geometry(&fields[6..=9]) else {
            skipped += 1;
            continue;
        };

        let mut word = RecognizedWord::new(text, BoundingBox::new(left, top, left + width, top + height));
        if conf >= 0.0 {
            word = word.with_confidence(conf);
        }
        words.push(word);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped TSV word rows with invalid geometry");
    }

    Ok(words)
}

fn parse_geometry(fields: &[&str]) -> Option<(f64, f64, f64, f64)> {
    let parse = |index: usize| fields.get(index)?.trim().parse::<f64>().ok();
    Some((parse(0)?, parse(1)?, parse(2)?, parse(3)?))
}
