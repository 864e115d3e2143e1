//! Batch processing command for multiple bills.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use epd_core::export::{export_selection, DocumentRow, ExportSink, ItemRow, StatisticsRow};
use epd_core::{
    format_amount, process_batch, DocumentSource, EpdParser, ItemRef, Selection, ServiceCategory,
    SummaryView,
};

use super::config::load_config;
use super::process::{format_record, is_supported, read_document_text, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write items.csv, documents.csv and statistics.csv
    #[arg(long)]
    summary: bool,

    /// Include voluntary insurance in the totals
    #[arg(long)]
    include_insurance: bool,

    /// Exclude all housing items
    #[arg(long)]
    exclude_housing: bool,

    /// Exclude all utility items
    #[arg(long)]
    exclude_utility: bool,

    /// Exclude items whose name contains this text (repeatable)
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let parser = EpdParser::from_config(&config);
    let sources = files.iter().map(|path| {
        pb.inc(1);
        DocumentSource::new(path.display().to_string(), read_document_text(path))
    });
    let outcome = process_batch(&parser, sources);

    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for document in &outcome.documents {
            let stem = Path::new(&document.name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bill");
            let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

            fs::write(&output_path, format_record(&document.record, args.format, &config)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    let mut selection = Selection::from_config(&config.export);
    if args.include_insurance {
        selection.set_insurance_included(true);
    }
    for document in &outcome.documents {
        selection.load(document.record.clone());
    }
    apply_exclusions(&mut selection, &args);

    println!();
    print!("{}", format_summary(&selection.compute_summary()));

    if args.summary {
        let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut sink = CsvDirSink::new(&dir);
        export_selection(&selection, &mut sink)?;
        println!(
            "{} Summary tables written to {}",
            style("✓").green(),
            dir.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcome.total(),
        start.elapsed()
    );

    if !outcome.failures.is_empty() {
        println!(
            "{} {} files failed:",
            style("✗").red(),
            outcome.failures.len()
        );
        for failure in &outcome.failures {
            println!("  - {}: {}", failure.name, failure.error);
        }
    }

    if outcome.documents.is_empty() {
        anyhow::bail!("No bills could be processed");
    }

    Ok(())
}

fn apply_exclusions(selection: &mut Selection, args: &BatchArgs) {
    if args.exclude_housing {
        selection.set_all_included(ServiceCategory::Housing, false);
    }
    if args.exclude_utility {
        selection.set_all_included(ServiceCategory::Utility, false);
    }

    if args.exclude.is_empty() {
        return;
    }

    let patterns: Vec<String> = args.exclude.iter().map(|p| p.to_lowercase()).collect();
    let excluded: Vec<ItemRef> = selection
        .items()
        .filter(|(_, item, _)| {
            let name = item.name.to_lowercase();
            patterns.iter().any(|p| name.contains(p))
        })
        .map(|(item_ref, _, _)| item_ref)
        .collect();

    debug!("Excluding {} items by name", excluded.len());
    for item_ref in excluded {
        selection.set_item_included(item_ref, false);
    }
}

fn format_summary(summary: &SummaryView) -> String {
    let mut output = String::new();

    output.push_str(&format!("Документов: {}\n", summary.document_count));
    output.push_str(&format!(
        "  {:<28} {:>12} руб.\n",
        "Жилищные услуги",
        format_amount(summary.housing_total)
    ));
    output.push_str(&format!(
        "  {:<28} {:>12} руб.\n",
        "Коммунальные услуги",
        format_amount(summary.utility_total)
    ));
    output.push_str(&format!(
        "  {:<28} {:>12} руб.\n",
        "Добровольное страхование",
        format_amount(summary.insurance_total)
    ));
    output.push_str(&format!(
        "  {:<28} {:>12} руб.\n",
        "ИТОГО",
        format_amount(summary.grand_total)
    ));

    if !summary.per_period.is_empty() {
        output.push_str("\nПо периодам:\n");
        for period in &summary.per_period {
            output.push_str(&format!(
                "  {:<16} жилищные {:>10}  коммунальные {:>10}  страхование {:>8}  итого {:>12}\n",
                period.period,
                format_amount(period.housing),
                format_amount(period.utility),
                format_amount(period.insurance),
                format_amount(period.total)
            ));
        }
    }

    output
}

/// Writes each export table as a CSV file in one directory.
struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn write<T: Serialize>(&self, file_name: &str, rows: &[T]) -> epd_core::Result<()> {
        let path = self.dir.join(file_name);
        let mut wtr = csv::Writer::from_path(&path).map_err(io::Error::from)?;

        for row in rows {
            wtr.serialize(row).map_err(io::Error::from)?;
        }

        wtr.flush()?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

impl ExportSink for CsvDirSink {
    fn write_items(&mut self, rows: &[ItemRow]) -> epd_core::Result<()> {
        self.write("items.csv", rows)
    }

    fn write_documents(&mut self, rows: &[DocumentRow]) -> epd_core::Result<()> {
        self.write("documents.csv", rows)
    }

    fn write_statistics(&mut self, rows: &[StatisticsRow]) -> epd_core::Result<()> {
        self.write("statistics.csv", rows)
    }
}
