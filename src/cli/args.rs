use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::domain::RepoSlug;

/// prbot - finds unformatted Rust files in a GitHub repository and opens a
/// pull request that formats them
#[derive(Debug, Parser)]
#[command(name = "prbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository to scan, as OWNER/REPO
    #[arg(value_name = "OWNER/REPO")]
    pub repo: RepoSlug,
}

/// Parse the command line, exiting with usage text on error.
pub fn parse() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        if err.kind() == ErrorKind::ValueValidation {
            let _ = err.print();
            eprintln!("\n{}", Cli::command().render_usage());
            std::process::exit(2);
        }
        err.exit()
    })
}
