use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tablescan::{
    BatchItem, BatchSummary, ColumnAnchor, DetectionFormat, ImagePreprocessor, OcrChain, Preprocessor, Reconstruction,
    ScanConfig, Table, batch_scan_files, parse_detections, reconstruct,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// File name of the per-run log written next to batch output.
const PROCESSING_LOG: &str = "processing_log.json";

#[derive(Debug, Parser)]
#[command(
    name = "tablescan",
    version,
    about = "Reconstruct typed tables from OCR text detections"
)]
struct Cli {
    /// Log debug output (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild a table from stored OCR detections.
    Reconstruct(ReconstructArgs),
    /// OCR images and rebuild their tables.
    Scan(ScanArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// JSON array of {text, polygon, confidence}
    Json,
    /// Tesseract TSV
    Tsv,
    /// PaddleOCR 3.x result JSON
    Paddle,
}

impl From<InputFormat> for DetectionFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Json => DetectionFormat::Json,
            InputFormat::Tsv => DetectionFormat::Tsv,
            InputFormat::Paddle => DetectionFormat::Paddle,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Markdown,
    Csv,
    Json,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Configuration file (TOML, YAML or JSON). Defaults to a discovered tablescan.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Row threshold as a fraction of the median text height.
    #[arg(long)]
    row_threshold_factor: Option<f64>,

    /// Drop text whose left edge is within this many pixels of the image edge.
    #[arg(long)]
    x_margin_left: Option<f64>,

    /// Horizontal anchor for ordering columns (x_min or x_center).
    #[arg(long)]
    column_anchor: Option<ColumnAnchor>,

    /// Minimum detection confidence (0-1).
    #[arg(long)]
    confidence_threshold: Option<f64>,

    /// Keep the first row as data instead of header labels.
    #[arg(long)]
    no_header: bool,
}

#[derive(Debug, Args)]
struct ReconstructArgs {
    /// Detections file.
    input: PathBuf,

    /// Input layout. Guessed from the extension when omitted (.tsv is TSV, otherwise JSON).
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    output: OutputFormat,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Image files.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output format for tables printed to stdout.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    output: OutputFormat,

    /// Send images to OCR without enhancement.
    #[arg(long)]
    no_preprocess: bool,

    /// Write one CSV per image and a processing log here instead of printing.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

fn load_config(args: &ConfigArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None => ScanConfig::discover()
            .context("failed to load discovered tablescan.toml")?
            .unwrap_or_default(),
    };

    let table = &mut config.table;
    if let Some(factor) = args.row_threshold_factor {
        table.row_threshold_factor = factor;
    }
    if let Some(margin) = args.x_margin_left {
        table.x_margin_left = margin;
    }
    if let Some(anchor) = args.column_anchor {
        table.column_anchor = anchor;
    }
    if let Some(threshold) = args.confidence_threshold {
        table.confidence_threshold = threshold;
    }
    if args.no_header {
        table.enable_header_promotion = false;
    }

    table.validate().context("invalid table options")?;
    Ok(config)
}

fn render_table(table: &Table, output: OutputFormat) -> Result<String> {
    Ok(match output {
        OutputFormat::Markdown => table.to_markdown(),
        OutputFormat::Csv => table.to_csv()?,
        OutputFormat::Json => serde_json::to_string_pretty(table)?,
    })
}

fn render_reconstruction(result: &Reconstruction, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        other => render_table(&result.table, other),
    }
}

fn run_reconstruct(args: &ReconstructArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let format = args
        .format
        .map(DetectionFormat::from)
        .unwrap_or_else(|| DetectionFormat::from_extension(&args.input));

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let detections = parse_detections(&content, format)
        .with_context(|| format!("failed to parse detections from '{}'", args.input.display()))?;

    let result = reconstruct(&detections, &config.table);
    for diagnostic in &result.diagnostics {
        tracing::debug!(
            index = diagnostic.index,
            text = %diagnostic.text,
            reason = %diagnostic.reason,
            "Skipped detection"
        );
    }

    print!("{}", render_reconstruction(&result, args.output)?);
    Ok(())
}

/// Contents of `processing_log.json`.
#[derive(Debug, Serialize)]
struct ProcessingLog {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    summary: BatchSummary,
}

fn file_stem(image: &Path) -> String {
    image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string())
}

/// One CSV path per image. Images sharing a file stem get their batch index appended.
fn csv_paths(out_dir: &Path, images: &[PathBuf]) -> Vec<PathBuf> {
    let stems: Vec<String> = images.iter().map(|image| file_stem(image)).collect();
    let mut taken = HashSet::new();

    stems
        .iter()
        .enumerate()
        .map(|(index, stem)| {
            let shared = stems.iter().filter(|other| *other == stem).count() > 1;
            let mut name = if shared { format!("{stem}-{index}") } else { stem.clone() };
            while !taken.insert(name.clone()) {
                name = format!("{name}-{index}");
            }
            out_dir.join(format!("{name}.csv"))
        })
        .collect()
}

fn write_outputs(out_dir: &Path, items: &mut [BatchItem]) -> Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    let files: Vec<PathBuf> = items.iter().map(|item| item.file.clone()).collect();
    for (item, path) in items.iter_mut().zip(csv_paths(out_dir, &files)) {
        let Some(scan) = &item.scan else {
            continue;
        };
        let csv = scan.reconstruction.table.to_csv()?;
        std::fs::write(&path, csv).with_context(|| format!("failed to write '{}'", path.display()))?;
        tracing::info!(image = %item.file.display(), output = %path.display(), "Wrote table");
        item.output = Some(path);
    }
    Ok(())
}

async fn run_scan(args: &ScanArgs) -> Result<BatchSummary> {
    let config = load_config(&args.config)?;
    let chain = OcrChain::from_config(&config.ocr).context("failed to set up OCR backends")?;

    let preprocessor: Option<Arc<dyn Preprocessor>> = if args.no_preprocess {
        None
    } else {
        let settings = config.preprocessing.clone().unwrap_or_default();
        Some(Arc::new(ImagePreprocessor::new(settings)))
    };

    let mut items = batch_scan_files(args.images.clone(), &config, Arc::new(chain), preprocessor).await;

    match &args.out_dir {
        Some(out_dir) => {
            write_outputs(out_dir, &mut items)?;
            let log = ProcessingLog {
                timestamp: Utc::now(),
                summary: BatchSummary::from_items(items),
            };
            let log_path = out_dir.join(PROCESSING_LOG);
            std::fs::write(&log_path, serde_json::to_string_pretty(&log)?)
                .with_context(|| format!("failed to write '{}'", log_path.display()))?;
            Ok(log.summary)
        }
        None => {
            for item in &items {
                match &item.scan {
                    Some(scan) => {
                        println!("## {}\n", item.file.display());
                        println!("{}", render_reconstruction(&scan.reconstruction, args.output)?);
                    }
                    None => eprintln!(
                        "error: {}: {}",
                        item.file.display(),
                        item.error.as_deref().unwrap_or("scan failed")
                    ),
                }
            }
            Ok(BatchSummary::from_items(items))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "tablescan=debug" } else { "tablescan=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Reconstruct(args) => match run_reconstruct(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Scan(args) => match run_scan(&args).await {
            Ok(summary) => {
                tracing::info!(
                    total = summary.total,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Scan complete"
                );
                if summary.failed == 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
