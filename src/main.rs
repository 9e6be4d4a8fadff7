use autograder_eval::analysis::Analysis;
use autograder_eval::storage::{self, REPORT_FILE, RESULTS_DIR};
use autograder_eval::{logging, report};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Autograder results analysis - consistency, accuracy vs human labels, category difficulty and failure cases
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an experiment results JSON file (default: newest file in results/)
    results_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(false);

    let results_dir = Path::new(RESULTS_DIR);
    let path = match args.results_file {
        Some(path) => path,
        None => storage::find_latest_results(results_dir)?,
    };
    info!(path = %path.display(), "Loading results");

    let results = storage::load_results(&path)?;
    let analysis = Analysis::run(&results);
    let report = report::generate_report(&results, &analysis);

    println!("{}", report);

    let report_path = results_dir.join(REPORT_FILE);
    storage::write_report(&report, &report_path)?;
    println!("\nReport saved to: {}", report_path.display());

    Ok(())
}
