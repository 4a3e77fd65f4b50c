//! Configuration file loading tests.
//!
//! Tests for:
//! - TOML, YAML and JSON files
//! - discover() searching parent directories
//! - Validation of out-of-range thresholds

use labscan::core::config::{CONFIG_FILE_NAME, HeaderStrategy, LabscanConfig, PageSegmentation};
use labscan::{LabscanError, reconstruct};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_full_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.toml");
    fs::write(
        &config_path,
        r#"
[table]
row_tolerance = 30.0
gap_threshold = 40.0
min_confidence = 55.0
placeholder = "-"

[table.header]
strategy = "lexical"
vocabulary = ["analyte", "valeur"]
min_words = 4

[ocr]
language = "fra+eng"
page_segmentation = "single_block"
char_whitelist = "0123456789.,<>"

[pdf]
render_scale = 3.0
min_text_chars = 80
"#,
    )
    .unwrap();

    let config = LabscanConfig::from_toml_file(&config_path).unwrap();
    assert_eq!(config.table.row_tolerance, 30.0);
    assert_eq!(config.table.gap_threshold, 40.0);
    assert_eq!(config.table.min_confidence, 55.0);
    assert_eq!(config.table.placeholder, "-");
    assert_eq!(config.table.header.strategy, HeaderStrategy::Lexical);
    assert_eq!(config.table.header.min_words, 4);
    assert_eq!(config.table.header.max_gap_cv, 0.7);
    assert_eq!(config.ocr.language, "fra+eng");
    assert_eq!(config.ocr.page_segmentation, PageSegmentation::SingleBlock);
    assert_eq!(config.ocr.char_whitelist.as_deref(), Some("0123456789.,<>"));
    assert!(config.ocr.preserve_interword_spaces);
    assert_eq!(config.pdf.threshold_factor(), 2.0);
}

#[test]
fn test_load_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.yaml");
    fs::write(
        &config_path,
        "table:\n  gap_threshold: 25.0\n  header:\n    strategy: disabled\n",
    )
    .unwrap();

    let config = LabscanConfig::from_file(&config_path).unwrap();
    assert_eq!(config.table.gap_threshold, 25.0);
    assert_eq!(config.table.row_tolerance, 15.0);
    assert_eq!(config.table.header.strategy, HeaderStrategy::Disabled);
}

#[test]
fn test_load_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.json");
    fs::write(&config_path, r#"{"table": {"row_tolerance": 12.5}, "ocr": {"language": "deu"}}"#).unwrap();

    let config = LabscanConfig::from_file(&config_path).unwrap();
    assert_eq!(config.table.row_tolerance, 12.5);
    assert_eq!(config.ocr.language, "deu");
}

#[test]
fn test_unknown_extension_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.ini");
    fs::write(&config_path, "row_tolerance=1").unwrap();

    let result = LabscanConfig::from_file(&config_path);
    assert!(matches!(result, Err(LabscanError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file_rejected() {
    let result = LabscanConfig::from_toml_file("/nonexistent/labscan.toml");
    assert!(matches!(result, Err(LabscanError::Validation { .. })));
}

#[test]
fn test_negative_tolerance_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.toml");
    fs::write(&config_path, "[table]\nrow_tolerance = -5.0\n").unwrap();

    let err = LabscanConfig::from_toml_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("row_tolerance"));
}

#[test]
fn test_disabled_strategy_applies_to_reconstruction() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("labscan.toml");
    fs::write(&config_path, "[table.header]\nstrategy = \"disabled\"\n").unwrap();
    let config = LabscanConfig::from_toml_file(&config_path).unwrap();

    let words = vec![
        labscan::RecognizedWord::new("Test", labscan::BoundingBox::new(0.0, 0.0, 40.0, 10.0)),
        labscan::RecognizedWord::new("Result", labscan::BoundingBox::new(200.0, 0.0, 260.0, 10.0)),
        labscan::RecognizedWord::new("Unit", labscan::BoundingBox::new(400.0, 0.0, 440.0, 10.0)),
    ];
    let table = reconstruct(&words, &config.table);
    assert!(table.header_rows.is_empty());
    assert!(!table.markup.contains("<th>"));
}

/// Test discover() finds config in current directory.
#[test]
#[serial_test::serial]
fn test_discover_finds_config_in_current_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[table]\ngap_threshold = 33.0\n").unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let result = LabscanConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    let config = result.unwrap().expect("config should be discovered");
    assert_eq!(config.table.gap_threshold, 33.0);
}

/// Test discover() finds config in parent directory.
#[test]
#[serial_test::serial]
fn test_discover_finds_config_in_parent_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[table]\nrow_tolerance = 22.0\n").unwrap();
    let sub_dir = temp_dir.path().join("reports").join("2024");
    fs::create_dir_all(&sub_dir).unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(&sub_dir).unwrap();

    let result = LabscanConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    let config = result.unwrap().expect("config should be discovered");
    assert_eq!(config.table.row_tolerance, 22.0);
}

/// Test discover() surfaces invalid files instead of ignoring them.
#[test]
#[serial_test::serial]
fn test_discover_reports_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[table\nbroken").unwrap();

    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let result = LabscanConfig::discover();

    std::env::set_current_dir(original_dir).unwrap();

    assert!(result.is_err());
}
