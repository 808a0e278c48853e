use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use strata_engine::logging::{LoggingConfig, init_logging};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Rendered page → layer IR → auto-layout scene", arg_required_else_help = true)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a page snapshot into an interchange document
    Capture {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 10_000)]
        max_nodes: usize,
        #[arg(long, default_value_t = 128)]
        max_depth: usize,
        /// Wall-clock limit in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Validate a document and print its layer tree
    Inspect {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
    /// Build a document into an in-memory scene and print it
    Build {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
        #[arg(long, default_value_t = 50)]
        batch_size: usize,
        /// Family used when a requested font is unavailable
        #[arg(long, default_value = "Inter")]
        fallback_font: String,
    },
    /// Extract color, typography and spacing tokens as JSON
    Tokens {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
    /// List repeated structures as JSON
    Components {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::with_verbosity(cli.verbose));

    match cli.command {
        Command::Capture { snapshot, output, max_nodes, max_depth, timeout } => {
            commands::capture(&snapshot, output.as_deref(), max_nodes, max_depth, timeout).await
        }
        Command::Inspect { document } => commands::inspect(&document),
        Command::Build { document, batch_size, fallback_font } => {
            commands::build(&document, batch_size, fallback_font)
        }
        Command::Tokens { document } => commands::tokens(&document),
        Command::Components { document } => commands::components(&document),
    }
}
