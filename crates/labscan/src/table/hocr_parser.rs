//! Word extraction from hOCR documents.
//!
//! Only `ocrx_word` elements are read. Their `title` attribute carries
//! `bbox x0 y0 x1 y1` and, when present, `x_wconf <confidence>`.

use crate::types::{BoundingBox, RecognizedWord};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span\b([^>]*\bocrx_word\b[^>]*)>(.*?)</span>"#)
        .expect("hOCR word regex pattern is valid and should compile")
});
static BBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"bbox (\d+(?:\.\d+)?) (\d+(?:\.\d+)?) (\d+(?:\.\d+)?) (\d+(?:\.\d+)?)")
        .expect("hOCR bbox regex pattern is valid and should compile")
});
static WCONF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"x_wconf (\d+(?:\.\d+)?)").expect("hOCR x_wconf regex pattern is valid and should compile"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("HTML tag regex pattern is valid and should compile"));

/// Extract words from an hOCR document.
///
/// Words without a `bbox` are skipped; words below `min_confidence` are dropped when a
/// confidence is reported.
pub fn extract_words_from_hocr(hocr: &str, min_confidence: f64) -> Result<Vec<RecognizedWord>> {
    let mut words = Vec::new();
    let mut missing_bbox = 0usize;

    for captures in WORD_SPAN.captures_iter(hocr) {
        let attributes = &captures[1];
        let text = decode_entities(&TAG.replace_all(&captures[2], ""));
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let Some(bbox) = BBOX.captures(attributes) else {
            missing_bbox += 1;
            continue;
        };
        let coordinate = |index: usize| bbox[index].parse::<f64>().unwrap_or(0.0);
        let bounding_box = BoundingBox::new(coordinate(1), coordinate(2), coordinate(3), coordinate(4));

        let confidence = WCONF
            .captures(attributes)
            .and_then(|c| c[1].parse::<f64>().ok());
        if let Some(conf) = confidence
            && conf < min_confidence
        {
            continue;
        }

        let mut word = RecognizedWord::new(text, bounding_box);
        word.confidence = confidence;
        words.push(word);
    }

    if missing_bbox > 0 {
        tracing::debug!(missing_bbox, "Skipped hOCR words without bbox");
    }

    Ok(words)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div class='ocr_page' id='page_1' title='image "scan.png"; bbox 0 0 1240 1754'>
  <span class='ocr_line' id='line_1_1' title="bbox 100 50 400 80">
    <span class='ocrx_word' id='word_1_1' title='bbox 100 50 180 80; x_wconf 95'>Glucose</span>
    <span class='ocrx_word' id='word_1_2' title='bbox 300 50 340 80; x_wconf 41'><strong>5.2</strong></span>
    <span class='ocrx_word' id='word_1_3' title='bbox 360 50 400 80'>&lt;6.1</span>
  </span>
</div>"#;

    #[test]
    fn test_extract_words() {
        let words = extract_words_from_hocr(PAGE, 0.0).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Glucose");
        assert_eq!(words[0].bounding_box, BoundingBox::new(100.0, 50.0, 180.0, 80.0));
        assert_eq!(words[0].confidence, Some(95.0));
        assert_eq!(words[1].text, "5.2");
        assert_eq!(words[2].text, "<6.1");
        assert_eq!(words[2].confidence, None);
    }

    #[test]
    fn test_confidence_filter_keeps_unscored_words() {
        let words = extract_words_from_hocr(PAGE, 60.0).unwrap();
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Glucose", "<6.1"]);
    }

    #[test]
    fn test_lines_are_not_words() {
        let hocr = r#"<span class='ocr_line' title='bbox 0 0 10 10'>line</span>"#;
        assert!(extract_words_from_hocr(hocr, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_word_without_bbox_skipped() {
        let hocr = r#"<span class='ocrx_word' title='x_wconf 90'>orphan</span>"#;
        assert!(extract_words_from_hocr(hocr, 0.0).unwrap().is_empty());
    }
}
