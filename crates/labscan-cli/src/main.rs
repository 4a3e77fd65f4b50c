use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use labscan::table::{WordFormat, parse_words, table_to_tsv};
use labscan::{LabscanConfig, ReconstructedTable, reconstruct};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "labscan",
    version,
    about = "Reconstruct lab-report tables from OCR word boxes"
)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild a table from a word file (Tesseract TSV, hOCR or JSON).
    Reconstruct(ReconstructArgs),
    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
    /// Recognize an image with Tesseract and rebuild its table.
    #[cfg(feature = "ocr")]
    Ocr(OcrArgs),
    /// Process every page of a PDF: embedded text when usable, OCR otherwise.
    #[cfg(feature = "pdf")]
    Pdf(PdfArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Html,
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Tsv,
    Hocr,
    Json,
}

impl From<InputFormat> for WordFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Tsv => WordFormat::Tsv,
            InputFormat::Hocr => WordFormat::Hocr,
            InputFormat::Json => WordFormat::Json,
        }
    }
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Configuration file (.toml, .yaml, .yml or .json). Defaults to a discovered labscan.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ThresholdArgs {
    #[command(flatten)]
    source: ConfigArgs,

    /// Row clustering tolerance in pixels.
    #[arg(long)]
    row_tolerance: Option<f64>,

    /// Horizontal gap in pixels that starts a new cell.
    #[arg(long)]
    gap_threshold: Option<f64>,

    /// Minimum OCR confidence (0-100) for a word to be kept.
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Multiply both pixel thresholds, for word boxes at a different resolution.
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Debug, Args)]
struct ReconstructArgs {
    /// Word file path.
    input: PathBuf,

    /// Word file format; guessed from the extension when omitted.
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

#[cfg(feature = "ocr")]
#[derive(Debug, Args)]
struct OcrArgs {
    /// Image path.
    input: PathBuf,

    /// Tesseract language codes, e.g. "fra+eng".
    #[arg(short, long)]
    language: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

#[cfg(feature = "pdf")]
#[derive(Debug, Args)]
struct PdfArgs {
    /// PDF path.
    input: PathBuf,

    /// Tesseract language codes, e.g. "fra+eng".
    #[arg(short, long)]
    language: Option<String>,

    /// Render scale for pages that need OCR.
    #[arg(long)]
    render_scale: Option<f64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

fn load_config(args: &ConfigArgs) -> Result<LabscanConfig> {
    match &args.config {
        Some(path) => LabscanConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from '{}'", path.display())),
        None => Ok(LabscanConfig::discover()
            .context("failed to load discovered labscan.toml")?
            .unwrap_or_default()),
    }
}

fn resolve_config(args: &ThresholdArgs) -> Result<LabscanConfig> {
    let mut config = load_config(&args.source)?;

    if let Some(row_tolerance) = args.row_tolerance {
        config.table.row_tolerance = row_tolerance;
    }
    if let Some(gap_threshold) = args.gap_threshold {
        config.table.gap_threshold = gap_threshold;
    }
    if let Some(min_confidence) = args.min_confidence {
        config.table.min_confidence = min_confidence;
    }
    if let Some(scale) = args.scale {
        if !scale.is_finite() || scale <= 0.0 {
            anyhow::bail!("--scale must be a positive number, got {scale}");
        }
        config.table = config.table.scaled(scale);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn detect_input_format(path: &Path, explicit: Option<InputFormat>) -> Result<WordFormat> {
    if let Some(format) = explicit {
        return Ok(format.into());
    }
    WordFormat::from_path(path).context("pass --input-format tsv|hocr|json to override")
}

fn render_table(table: &ReconstructedTable, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(table).context("failed to serialize table")?,
        OutputFormat::Markdown => table.to_analysis_text(),
        OutputFormat::Html => table.markup.clone(),
        OutputFormat::Tsv => table_to_tsv(&table.grid),
    })
}

fn print_output(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

/// Returns whether a non-empty table was produced.
fn run_reconstruct(args: &ReconstructArgs) -> Result<bool> {
    let config = resolve_config(&args.thresholds)?;
    let format = detect_input_format(&args.input, args.input_format)?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let words = parse_words(&data, format, config.table.min_confidence)
        .with_context(|| format!("failed to parse words from '{}'", args.input.display()))?;
    tracing::debug!(words = words.len(), "Parsed word file");

    let table = reconstruct(&words, &config.table);
    print_output(&render_table(&table, args.format)?);
    Ok(!table.is_empty())
}

fn run_config(args: &ConfigArgs) -> Result<()> {
    let config = load_config(args)?;
    let rendered = toml::to_string_pretty(&config).context("failed to serialize configuration")?;
    print_output(&rendered);
    Ok(())
}

#[cfg(feature = "ocr")]
fn run_ocr(args: &OcrArgs) -> Result<bool> {
    use labscan::ocr::TesseractBackend;

    let mut config = resolve_config(&args.thresholds)?;
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }

    let image = image::open(&args.input).with_context(|| format!("failed to open image '{}'", args.input.display()))?;
    let page = labscan::process_image(&image, &TesseractBackend::new(), None, &config)
        .with_context(|| format!("failed to recognize '{}'", args.input.display()))?;

    let table = page.table.unwrap_or_default();
    print_output(&render_table(&table, args.format)?);
    Ok(!table.is_empty())
}

#[cfg(feature = "pdf")]
fn run_pdf(args: &PdfArgs) -> Result<bool> {
    use labscan::PageSource;
    use labscan::ocr::TesseractBackend;

    let mut config = resolve_config(&args.thresholds)?;
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }
    if let Some(render_scale) = args.render_scale {
        config.pdf.render_scale = render_scale;
        config.validate().context("invalid configuration")?;
    }

    let bytes = std::fs::read(&args.input).with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let pages = labscan::process_pdf(&bytes, &TesseractBackend::new(), None, &config)
        .with_context(|| format!("failed to process '{}'", args.input.display()))?;

    let has_data = pages.iter().any(|page| match &page.table {
        Some(table) => !table.is_empty(),
        None => page.source == PageSource::EmbeddedText,
    });

    if args.format == OutputFormat::Json {
        print_output(&serde_json::to_string_pretty(&pages).context("failed to serialize pages")?);
        return Ok(has_data);
    }

    for page in &pages {
        println!("## Page {}", page.page_index + 1);
        println!();
        match &page.table {
            Some(table) => print_output(&render_table(table, args.format)?),
            None => print_output(&page.text),
        }
        println!();
    }
    Ok(has_data)
}

fn exit_code(result: Result<bool>) -> ExitCode {
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("warning: no table data reconstructed");
            ExitCode::from(2)
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "labscan=debug" } else { "labscan=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match &cli.command {
        Commands::Reconstruct(args) => exit_code(run_reconstruct(args)),
        Commands::Config(args) => exit_code(run_config(args).map(|()| true)),
        #[cfg(feature = "ocr")]
        Commands::Ocr(args) => exit_code(run_ocr(args)),
        #[cfg(feature = "pdf")]
        Commands::Pdf(args) => exit_code(run_pdf(args)),
    }
}
