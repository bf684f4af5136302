use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use mps_report_builder::{
    ingestion, merge_reports, MpsReporter, ReportConfig, DEFAULT_EXCEL_HEADER_ROW,
    DEFAULT_PROJECT_CODE_TEMPLATE,
};

#[derive(Parser, Debug)]
#[command(
    name = "mps-report-builder",
    about = "Consolidate monthly profit and loss exports into one project cost ledger."
)]
struct Args {
    /// The spreadsheet row number which contains the project column headings.
    #[arg(long, default_value_t = DEFAULT_EXCEL_HEADER_ROW)]
    excel_header_row: usize,

    /// Regex string to parse the project codes from the column headings.
    #[arg(long, env = "PROJECT_CODE_TEMPLATE", default_value = DEFAULT_PROJECT_CODE_TEMPLATE)]
    project_code_template: String,

    /// Path to folder containing finance reports.
    #[arg(long, env = "DEFAULT_INPUT_PATH", default_value = "uploads")]
    input_path: PathBuf,

    /// Path to write the outputs.
    #[arg(long, env = "DEFAULT_OUTPUT_PATH", default_value = "outputs")]
    output_path: PathBuf,

    /// The path to the config file.
    #[arg(long, env = "DEFAULT_CONFIG_FILE", default_value = "config.json")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mps_report_builder=info".into()),
        )
        .init();

    let args = Args::parse();

    println!("Using Config: {}", args.config.display());
    println!("Using Input Dir: {}", args.input_path.display());
    println!("Using Output Dir: {}", args.output_path.display());

    let config = ReportConfig::from_path(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let reporter = MpsReporter::new(&config, args.excel_header_row, &args.project_code_template)?;

    let report_paths = ingestion::discover_reports(&args.input_path)
        .with_context(|| format!("scanning {}", args.input_path.display()))?;
    if report_paths.is_empty() {
        println!(
            "No finance reports found in \"{}\".",
            args.input_path.display()
        );
        println!("Done.");
        return Ok(());
    }

    let mut reports = Vec::new();
    for path in &report_paths {
        let sheet = ingestion::read_report(path)?;
        if !sheet.is_profit_and_loss() {
            println!(
                "WARNING: Ignoring \"{}\", format does not match profit and loss report.",
                path.display()
            );
            continue;
        }
        reports.push(reporter.normalize(&sheet)?);
    }

    let ledger = merge_reports(&reports);

    fs::create_dir_all(&args.output_path)
        .with_context(|| format!("creating {}", args.output_path.display()))?;
    let report_name = format!("mps_report.{}.csv", Local::now().format("%Y.%m.%d"));
    let out_path = args.output_path.join(report_name);
    let file = fs::File::create(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    ledger.write_csv(file)?;

    println!("Written {}.", out_path.display());
    println!("Done.");
    Ok(())
}
