//! Covenant CLI - inspect the bundled predicate catalog and check values.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use covenant_demo::{Catalog, DemoResult, Settings};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "covenant")]
#[command(about = "Check values against composable predicates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log definitions, class builds and rejected checks
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered predicates with their check chains
    List,
    /// Check a JSON value against a predicate
    Check {
        /// Predicate name
        predicate: String,
        /// JSON literal, e.g. 5, "text", [1, 2]
        value: String,
        /// Print the outcome of every link
        #[arg(short, long)]
        report: bool,
    },
    /// Run the bundled Point / move scenario
    Demo,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> DemoResult<ExitCode> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let catalog = Catalog::new(&settings)?;

    match cli.command {
        Commands::List => {
            for line in catalog.listing()? {
                println!("{}", line);
            }
        }
        Commands::Check {
            predicate,
            value,
            report,
        } => {
            let outcome = catalog.check(&predicate, &value)?;
            if report {
                print!("{}", outcome);
            }
            if let Err(err) = outcome.into_result() {
                println!("{}", err);
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Commands::Demo => {
            for line in catalog.demo()? {
                println!("{}", line);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_violation() {
                ExitCode::FAILURE
            } else {
                ExitCode::from(2)
            }
        }
    }
}
