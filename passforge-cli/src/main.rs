//! Passforge CLI - run analysis and inlining passes over IR modules

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::run::RunOptions;

#[derive(Parser)]
#[command(name = "passforge")]
#[command(about = "Run analysis and inlining passes over IR modules", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run passes over a module
    Run {
        /// Path to the module JSON file
        file: PathBuf,

        /// Passes to run, in order
        #[arg(short, long, value_delimiter = ',')]
        passes: Vec<String>,

        /// Function whose call sites `all-inline` inlines
        #[arg(long, env = "PASSFORGE_INLINE_ONLY_IN_FUNCTION")]
        inline_only_in_function: Option<String>,

        /// Function whose definition site `function-line-number` prints
        #[arg(long)]
        function_name: Option<String>,

        /// Write the resulting module as JSON
        #[arg(long)]
        emit: Option<PathBuf>,

        /// Print the resulting module as text
        #[arg(long)]
        print: bool,

        /// Print pass statistics
        #[arg(long)]
        stats: bool,
    },

    /// List available passes
    List,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    // Load configuration
    let config = config::load_config(cli.config)?;

    match cli.command {
        Commands::Run {
            file,
            passes,
            inline_only_in_function,
            function_name,
            emit,
            print,
            stats,
        } => {
            let options = RunOptions {
                file,
                passes,
                inline_only_in_function,
                function_name,
                emit,
                print,
                stats,
            };
            commands::run::run(options, &config)?;
        }

        Commands::List => commands::list::list(),
    }

    Ok(())
}
