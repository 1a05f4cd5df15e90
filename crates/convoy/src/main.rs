mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Declarative Vultr infrastructure from a YAML file", long_about = None)]
struct Cli {
    /// Infrastructure file (searched for in the working directory when omitted)
    #[arg(short, long, global = true, env = "CONVOY_CONFIG_PATH")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update everything the file declares
    Provision {
        /// Show the decisions without calling the provider
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete everything the file declares
    Destroy {
        /// Show the decisions without calling the provider
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Parse the file and resolve every reference without changing anything
    Validate,
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("convoy {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let path = convoy_config::find_infrastructure_file(cli.file.as_deref())?;
    let document = commands::open(&path)?;

    match cli.command {
        Commands::Provision { dry_run } => commands::provision::handle(&document, dry_run).await,
        Commands::Destroy { dry_run, yes } => {
            commands::destroy::handle(&document, dry_run, yes).await
        }
        Commands::Validate => commands::validate::handle(&document).await,
        Commands::Version => Ok(()),
    }
}
