use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use offcut_core::search::distinct_permutation_count;
use offcut_core::{CutRequest, CutSearch, LengthSpec, SearchReport, SearchWarning};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "offcut")]
#[command(about = "Offcut - find the cut order that wastes the least raw stock", long_about = None)]
struct Cli {
    /// Log search progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a request file
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search inline length maps, e.g. --needed '{"30": 2}' --raw '{"100": 2}'
    Run {
        /// Required cuts as a JSON {length: count} map
        #[arg(short, long)]
        needed: String,

        /// Raw stock as a JSON {length: count} map
        #[arg(short, long)]
        raw: String,

        /// Blade width added to every cut
        #[arg(short, long, default_value_t = offcut_core::DEFAULT_BLADE_WIDTH)]
        blade_width: u64,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count the cut orders a search would visit
    Estimate {
        /// Required cuts as a JSON {length: count} map
        #[arg(short, long)]
        needed: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Optimize { input, output } => {
            let request = load_request(&input)?;
            search_command(request, output)?;
        }
        Commands::Run {
            needed,
            raw,
            blade_width,
            output,
        } => {
            let mut request = CutRequest::from_json_counts(&needed, &raw)?;
            request.blade_width = blade_width;
            search_command(request, output)?;
        }
        Commands::Estimate { needed } => {
            estimate_command(&needed)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(input: &Path) -> Result<CutRequest> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let content = std::fs::read_to_string(input)?;
    let request: CutRequest = if input.extension().and_then(|s| s.to_str()) == Some("yaml")
        || input.extension().and_then(|s| s.to_str()) == Some("yml")
    {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    Ok(request)
}

fn search_command(request: CutRequest, output: Option<PathBuf>) -> Result<()> {
    let mut search = CutSearch::from_request(&request)?;

    println!(
        "  raw_lengths: {}",
        format!("{:?}", search.raw_stock().lengths()).bright_white()
    );
    println!(
        "  lengths_needed: {}",
        format!("{:?}", search.cut_requirement().lengths()).bright_white()
    );
    println!("  blade width: {}", request.blade_width.to_string().bright_white());
    println!();

    println!("{}", "🚀 Calculating cuts...".bright_blue());
    let report = search.run();

    println!();
    println!(
        "{} tested {} cut orders in {:.2}s",
        "✅ Complete!".bright_green().bold(),
        report.permutations_tested.to_string().bright_white(),
        report.elapsed_secs
    );
    println!();

    print_report(&report);

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved report to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn print_report(report: &SearchReport) {
    let Some(best) = &report.best else {
        println!("{}", "❌ No solution found".bright_red().bold());
        println!();
        return;
    };

    println!("{}", "📊 Results:".bright_yellow().bold());
    for (i, (cuts, offcut)) in best
        .packing
        .pieces
        .iter()
        .zip(&best.packing.offcuts)
        .enumerate()
    {
        println!(
            "  - {}: cuts {} total {} offcut {}",
            i,
            format!("{:?}", cuts).bright_white(),
            cuts.iter().sum::<u64>().to_string().bright_white(),
            offcut.to_string().bright_cyan()
        );
    }
    println!();
    println!(
        "  Offcuts: {}",
        format!("{:?}", best.sorted_offcuts).bright_white()
    );
    println!(
        "  Total offcut: {}",
        best.total_offcut.to_string().bright_white().bold()
    );
    if let Some(summary) = &report.summary {
        println!("  Waste: {:.1}%", summary.waste_percentage);
    }

    for warning in &report.warnings {
        match warning {
            SearchWarning::UnplacedCuts { cuts } => {
                println!(
                    "  {} not all required cuts were placed: {}",
                    "⚠".bright_yellow(),
                    format!("{:?}", cuts).bright_red()
                );
            }
        }
    }
    println!();
}

fn estimate_command(needed: &str) -> Result<()> {
    let spec: LengthSpec = serde_json::from_str(needed)?;
    spec.validate_cuts(0)?;
    let lengths = spec.expand();

    match distinct_permutation_count(&lengths) {
        Some(count) => println!(
            "{} cuts, {} distinct cut orders",
            lengths.len().to_string().bright_white(),
            count.to_string().bright_white().bold()
        ),
        None => println!(
            "{} cuts, {}",
            lengths.len().to_string().bright_white(),
            "more distinct cut orders than fit in 128 bits".bright_red()
        ),
    }

    Ok(())
}
