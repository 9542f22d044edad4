//! linkaudit CLI
//!
//! Exit codes are part of the contract relied on by wrapping tooling:
//! verify exits 1 when dead links were found (or input was unreadable),
//! replace exits 0/2/1 for high-confidence / needs-review / no candidates.

use clap::{Parser, Subcommand};
use linkaudit::replace::{run_replace, ReplaceArgs};
use linkaudit::verify::{run_verify, VerifyArgs};

#[derive(Parser)]
#[command(name = "linkaudit")]
#[command(version)]
#[command(about = "Audit hyperlinks in text documents and rank replacements for dead ones")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every link in a document
    Verify(VerifyArgs),
    /// Search replacement candidates for a dead URL
    Replace(ReplaceArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Verify(args) => run_verify(args).await,
        Commands::Replace(args) => run_replace(args).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}
