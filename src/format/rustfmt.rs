use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{CheckOutcome, FormatError, Formatter};

pub const RUSTFMT_ENV: &str = "PRBOT_RUSTFMT";
pub const EDITION_ENV: &str = "PRBOT_EDITION";

const DEFAULT_PROGRAM: &str = "rustfmt";
const DEFAULT_EDITION: &str = "2021";

/// Runs `rustfmt` over stdin and reads the formatted source from stdout.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    program: String,
    edition: String,
}

impl Rustfmt {
    pub fn new(program: impl Into<String>, edition: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            edition: edition.into(),
        }
    }

    /// `PRBOT_RUSTFMT` / `PRBOT_EDITION`, falling back to `rustfmt` and 2021.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(RUSTFMT_ENV).unwrap_or_else(|_| DEFAULT_PROGRAM.to_string()),
            std::env::var(EDITION_ENV).unwrap_or_else(|_| DEFAULT_EDITION.to_string()),
        )
    }
}

#[async_trait]
impl Formatter for Rustfmt {
    async fn check(&self, raw: &[u8]) -> Result<CheckOutcome, FormatError> {
        let mut child = Command::new(&self.program)
            .arg("--edition")
            .arg(&self.edition)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin concurrently with reading output so large files cannot
        // deadlock on a full pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("rustfmt stdin was not captured"))?;
        let input = raw.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let written = writer.await.map_err(std::io::Error::other)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} exited with {}", self.program, output.status);
            return Err(FormatError::Syntax(stderr));
        }
        written?;

        Ok(CheckOutcome {
            canonical: output.stdout,
        })
    }
}
