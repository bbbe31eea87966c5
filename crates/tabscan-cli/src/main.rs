mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tabscan",
    version,
    about = "Extract tables from scanned PDFs into spreadsheets using OCR"
)]
struct Cli {
    /// Log every pipeline step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR a PDF and write its table to an .xlsx file
    Extract {
        /// Path to the TOML run configuration
        config: PathBuf,

        /// Override the PDF path from the config
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Override the output directory from the config
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also write the extracted table as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Print the first N rows of the table
        #[arg(long, value_name = "N")]
        preview: Option<usize>,
    },
    /// Show how a document of PAGES pages would be split
    Plan {
        /// Number of pages in the document
        pages: usize,

        /// Maximum pages per partition
        #[arg(short, long, default_value_t = tabscan_core::config::DEFAULT_SPLIT_THRESHOLD)]
        threshold: usize,
    },
    /// Validate a configuration and the external tools it needs
    Check {
        /// Path to the TOML run configuration
        config: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "tabscan_core=debug,tabscan=debug"
    } else {
        "tabscan_core=warn,tabscan=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            config,
            pdf,
            output,
            json,
            preview,
        } => commands::extract::run(&config, pdf, output, json, preview),
        Commands::Plan { pages, threshold } => commands::plan::run(pages, threshold),
        Commands::Check { config } => commands::check::run(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
