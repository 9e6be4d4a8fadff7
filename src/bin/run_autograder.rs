use autograder_eval::config::Config;
use autograder_eval::driver::Driver;
use autograder_eval::{logging, storage, test_cases};
use clap::Parser;
use std::path::PathBuf;

/// Autograder experiment runner - score the labelled test cases with each prompting strategy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file (built-in defaults when omitted)
    run_file: Option<PathBuf>,

    /// Verbose output - log details of failed scoring calls
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match &args.run_file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let cases = test_cases::select(&config.categories);
    let mut driver = Driver::new(config.clone())?;
    let results = driver.run_experiment(&cases).await;

    let path = storage::save_results(&results, &config.output_dir)?;

    let calls: usize = results
        .evaluations
        .iter()
        .flat_map(|case| case.evaluations.values())
        .map(Vec::len)
        .sum();
    println!("Results saved to: {}", path.display());
    println!("Total API calls: {}", calls);
    println!("Total tokens: {}", results.metadata.total_tokens.unwrap_or(0));
    println!(
        "Estimated cost: ${:.4}",
        results.metadata.estimated_cost_usd.unwrap_or(0.0)
    );

    Ok(())
}
