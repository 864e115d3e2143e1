//! Process command - extract data from a single bill.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use epd_core::export::item_rows;
use epd_core::models::config::EpdConfig;
use epd_core::{format_amount, BillParser, DocumentRecord, EpdParser, PdfExtractor, Selection};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report missing fields and total mismatches
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per line item)
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if !is_supported(&args.input) {
        anyhow::bail!(
            "Unsupported file format: {}",
            args.input.extension().and_then(|e| e.to_str()).unwrap_or("")
        );
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Extracting text...");
    let text = read_document_text(&args.input)?;

    pb.set_message("Parsing bill...");
    let result = EpdParser::from_config(&config).parse(&text)?;

    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &result.warnings {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_record(&result.record, args.format, &config)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Whether the file can be read as a bill.
pub fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(ext.as_str(), "pdf" | "txt")
}

/// Read bill text: PDFs through the text extractor, `.txt` files verbatim.
pub fn read_document_text(path: &Path) -> epd_core::Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        PdfExtractor::text_from_file(path)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Render a record in the requested format.
pub fn format_record(
    record: &DocumentRecord,
    format: OutputFormat,
    config: &EpdConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_record_csv(record, config),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

fn format_record_csv(record: &DocumentRecord, config: &EpdConfig) -> anyhow::Result<String> {
    let mut selection = Selection::from_config(&config.export);
    selection.load(record.clone());

    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in item_rows(&selection) {
        wtr.serialize(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_record_text(record: &DocumentRecord) -> String {
    let mut output = String::new();
    let na = "Н/Д";

    output.push_str(&format!("Период: {}\n", record.period.as_deref().unwrap_or(na)));
    output.push_str(&format!(
        "Лицевой счет: {}\n",
        record.account_id.as_deref().unwrap_or(na)
    ));
    output.push_str(&format!("ФИО: {}\n", record.payer_name.as_deref().unwrap_or(na)));
    output.push_str(&format!("Адрес: {}\n", record.address.as_deref().unwrap_or(na)));
    output.push('\n');

    for (title, items) in [
        ("Жилищные услуги", &record.housing_items),
        ("Коммунальные услуги", &record.utility_items),
    ] {
        output.push_str(&format!("{} ({}):\n", title, items.len()));
        for item in items {
            output.push_str(&format!(
                "  {:<40} {:>10} {:<8} {:>10} {:>12}\n",
                item.name,
                item.volume.to_string().replace('.', ","),
                item.unit,
                format_amount(item.tariff),
                format_amount(item.total)
            ));
        }
        output.push('\n');
    }

    output.push_str("Итоги:\n");
    for (label, amount) in record.category_totals.entries() {
        output.push_str(&format!("  {:<28} {:>12} руб.\n", label, format_amount(amount)));
    }

    if let Some(total) = record.total_with_insurance {
        output.push_str(&format!(
            "\nК оплате с учетом страхования: {} руб.\n",
            format_amount(total)
        ));
    }
    if let Some(total) = record.total_without_insurance {
        output.push_str(&format!(
            "К оплате без учета страхования: {} руб.\n",
            format_amount(total)
        ));
    }

    output
}
