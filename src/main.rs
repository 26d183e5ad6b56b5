use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod cli;
mod config;
mod credentials;
mod domain;
mod format;
mod patch;
#[cfg(test)]
mod test_support;
mod workflow;

use api::{ApiClient, RepoHost};
use config::WorkflowConfig;
use credentials::CredentialStore;
use format::{Formatter, Rustfmt};
use workflow::Outcome;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = WorkflowConfig::from_env()?;
    let token = CredentialStore::new()?.load()?;
    let host: Arc<dyn RepoHost> = Arc::new(ApiClient::from_env(token)?);
    let formatter: Arc<dyn Formatter> = Arc::new(Rustfmt::from_env());

    match workflow::run(host, formatter, &cli.repo, &config).await? {
        Outcome::NoChanges { failed, .. } if failed > 0 => {
            println!(
                "No changes needed in the files that could be checked ({} skipped)",
                failed
            );
        }
        Outcome::NoChanges { .. } => println!("No changes needed"),
        Outcome::PullRequest { url, head, files } => {
            println!("Opened {} from {} ({} file(s) formatted)", url, head, files);
        }
    }

    Ok(())
}
