//! Page-Harvest main entry point
//!
//! This is the command-line interface for the Page-Harvest pagination harvester.

use clap::Parser;
use page_harvest::config::{apply_overrides, load_config_with_hash, Config};
use page_harvest::crawler::run_harvest;
use page_harvest::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Harvest: a bounded-concurrency pagination harvester
///
/// Page-Harvest reads the page count of a paginated listing, fetches every
/// page with a fixed cap on in-flight requests, and writes the sorted,
/// deduplicated items it extracts.
#[derive(Parser, Debug)]
#[command(name = "page-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency pagination harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override the maximum number of pages in flight (1-100)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
    concurrency: Option<u32>,

    /// Override the output destination
    #[arg(
        short,
        long,
        value_name = "PATH",
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let config = match apply_overrides(config, cli.concurrency, cli.output) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid command-line override: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_harvest(&config, config_hash, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_harvest=info,warn"),
            1 => EnvFilter::new("page_harvest=debug,info"),
            2 => EnvFilter::new("page_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Page-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nSite:");
    println!("  Reference page: {}", config.site.reference_url);
    println!("  Page URL template: {}", config.site.page_url_template);
    println!(
        "  Last page marker: {} (parameter '{}')",
        config.site.last_page_selector, config.site.page_parameter
    );
    println!(
        "  Items: {} within {}",
        config.site.item_selector, config.site.row_selector
    );

    println!("\nOutput:");
    println!(
        "  Destination: {} ({})",
        config.output.destination, config.output.format
    );
    println!("  Collection field: {}", config.output.collection_field);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    config_hash: String,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match run_harvest(config, Some(config_hash)).await {
        Ok(summary) => {
            tracing::info!("Harvest completed successfully");
            if !quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
