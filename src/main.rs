//! CLI for the review extraction engine. Thin routing layer: argument
//! parsing and result printing live here, everything else is delegated to
//! the application services.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use review_miner::application::inspect_service::{probe_document, ProbeResolution};
use review_miner::application::{ExtractionService, ExtractionSummary, ValidationReport};
use review_miner::infrastructure::document_loader::load_document;
use review_miner::infrastructure::site_config::{SiteConfig, PRESET_NAMES};
use review_miner::infrastructure::{csv_export, files, logging};

#[derive(Parser)]
#[command(
    name = "review-miner",
    version,
    about = "Extract review records from saved HTML listing pages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reviews from all matching files in a directory
    Extract(ExtractArgs),
    /// Probe one document's structure against a site configuration
    Inspect(InspectArgs),
    /// List the built-in site presets
    Sites,
}

#[derive(Args)]
struct ExtractArgs {
    /// Built-in site preset to use
    #[arg(long, default_value = "yelp")]
    site: String,

    /// JSON site configuration file (overrides --site)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the saved HTML files
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Override the configuration's input file pattern
    #[arg(long)]
    pattern: Option<String>,

    /// Output CSV path (default: the configuration's output file)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the year filter's first kept year
    #[arg(long, requires = "end_year", conflicts_with = "no_year_filter")]
    start_year: Option<i32>,

    /// Override the year filter's last kept year
    #[arg(long, requires = "start_year", conflicts_with = "no_year_filter")]
    end_year: Option<i32>,

    /// Disable the year filter regardless of the configuration
    #[arg(long)]
    no_year_filter: bool,

    /// Print a data validation report after extraction
    #[arg(long)]
    validate: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Built-in site preset to probe against
    #[arg(long, default_value = "yelp")]
    site: String,

    /// JSON site configuration file (overrides --site)
    #[arg(long)]
    config: Option<PathBuf>,

    /// The HTML file to probe
    file: PathBuf,
}

fn main() -> Result<()> {
    logging::init();
    match Cli::parse().command {
        Commands::Extract(args) => run_extract(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Sites => {
            for name in PRESET_NAMES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_site_config(site: &str, config_file: Option<&PathBuf>) -> Result<SiteConfig> {
    let config = match config_file {
        Some(path) => SiteConfig::from_json_file(path)?,
        None => SiteConfig::preset(site)?,
    };
    Ok(config)
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let mut config = load_site_config(&args.site, args.config.as_ref())?;
    if args.no_year_filter {
        config.year_filter.enabled = false;
    }
    if let (Some(start), Some(end)) = (args.start_year, args.end_year) {
        config.year_filter = review_miner::infrastructure::site_config::YearFilter {
            enabled: true,
            start_year: start,
            end_year: end,
        };
    }

    let service = ExtractionService::new(&config)?;
    let pattern = args
        .pattern
        .unwrap_or_else(|| config.file_pattern.clone());
    let inputs = files::find_input_files(&args.dir, &pattern)
        .with_context(|| format!("cannot scan {}", args.dir.display()))?;
    if inputs.is_empty() {
        bail!(
            "no input files matching '{pattern}' in {}",
            args.dir.display()
        );
    }

    println!("Site: {}", config.name);
    println!("Found {} input files", inputs.len());

    let summary = service.run(&inputs);
    print_summary(&service, &summary);

    let output = args
        .output
        .or_else(|| config.output_file.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("{}_reviews.csv", config.name)));
    csv_export::write_file(&output, &service.config().columns, &summary.records)
        .with_context(|| format!("cannot write {}", output.display()))?;
    println!(
        "Saved {} reviews -> {}",
        summary.records.len(),
        output.display()
    );

    if args.validate {
        print_validation(&ValidationReport::build(
            &summary.records,
            &service.config().columns,
        ));
    }
    Ok(())
}

fn print_summary(service: &ExtractionService, summary: &ExtractionSummary) {
    println!(
        "Processed {} documents ({} failed)",
        summary.documents_processed,
        summary.failures.len()
    );
    for failure in &summary.failures {
        println!("  failed: {} ({})", failure.path.display(), failure.error);
    }
    println!("Total extracted: {}", summary.total_extracted);
    println!("Unique reviews: {}", summary.unique_records);
    if let Some((start, end)) = service.config().year_range {
        println!(
            "After year filter ({start}-{end}): {}",
            summary.records.len()
        );
    }
    if !summary.year_histogram.is_empty() {
        println!("Reviews by year:");
        for (year, count) in &summary.year_histogram {
            println!("  {year}: {count}");
        }
    }
    for (i, record) in summary.records.iter().take(2).enumerate() {
        let preview: String = record.review_text().chars().take(60).collect();
        println!("[{}] {}: {preview}...", i + 1, record.username());
    }
    println!(
        "Done in {:.1}s",
        summary.duration().num_milliseconds() as f64 / 1000.0
    );
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = load_site_config(&args.site, args.config.as_ref())?.compile()?;
    let document = load_document(&args.file)?;
    let probe = probe_document(&document, &config);

    println!("File: {}", args.file.display());
    println!("Candidate nodes: {}", probe.candidates);
    println!("Identity nodes:  {}", probe.identity_nodes);
    if !probe.ancestor_chain.is_empty() {
        println!("Ancestor chain of first candidate:");
        for level in &probe.ancestor_chain {
            let mut flags = String::new();
            if level.is_container_tag {
                flags.push_str(" container-tag");
            }
            if level.has_identity {
                flags.push_str(" identity");
            }
            println!("  [{}] <{}>{}", level.level, level.tag, flags);
        }
    }
    match probe.resolution {
        Some(ProbeResolution::Resolved { ref tag }) => println!("Resolution: resolved in <{tag}>"),
        Some(ProbeResolution::Fallback { ref tag }) => {
            println!("Resolution: fallback to <{tag}> (no qualifying container)");
        }
        None => println!("Resolution: none (no candidates)"),
    }
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    println!("Validation report ({} records)", report.total);
    println!("Empty fields:");
    for fill in &report.column_fill {
        let pct = if report.total == 0 {
            0.0
        } else {
            fill.empty as f64 * 100.0 / report.total as f64
        };
        println!("  {}: {} empty ({pct:.1}%)", fill.column, fill.empty);
    }
    if !report.rating_distribution.is_empty() || report.invalid_ratings > 0 {
        println!("Ratings:");
        for (value, count) in &report.rating_distribution {
            println!("  {value} stars: {count}");
        }
        if report.invalid_ratings > 0 {
            println!("  invalid: {}", report.invalid_ratings);
        }
    }
}
