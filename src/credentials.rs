//! Access token lookup.
//!
//! The token comes from the `PRBOT_TOKEN` environment variable when set,
//! otherwise from `~/.prbot-token`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable that overrides the token file
pub const TOKEN_ENV: &str = "PRBOT_TOKEN";

/// Token file name inside the home directory
pub const TOKEN_FILE_NAME: &str = ".prbot-token";

/// GitHub access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Locates and reads the access token.
pub struct CredentialStore {
    token_path: PathBuf,
}

impl CredentialStore {
    /// Store backed by `~/.prbot-token`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::with_path(home.join(TOKEN_FILE_NAME)))
    }

    pub fn with_path(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    /// Load the token from `PRBOT_TOKEN` or the token file.
    pub fn load(&self) -> Result<Token> {
        self.load_with_override(std::env::var(TOKEN_ENV).ok())
    }

    /// Load the token, preferring `env_value` when it is non-empty.
    pub fn load_with_override(&self, env_value: Option<String>) -> Result<Token> {
        if let Some(value) = env_value {
            let value = value.trim();
            if !value.is_empty() {
                info!("Using access token from {} environment variable", TOKEN_ENV);
                return Ok(Token::new(value));
            }
        }

        debug!("Reading access token from {}", self.token_path.display());
        let raw = std::fs::read_to_string(&self.token_path).with_context(|| {
            format!(
                "Reading auth token from {} (or set {})",
                self.token_path.display(),
                TOKEN_ENV
            )
        })?;

        let secret = raw.trim();
        if secret.is_empty() {
            anyhow::bail!("Auth token file {} is empty", self.token_path.display());
        }

        Ok(Token::new(secret))
    }
}
