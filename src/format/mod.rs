//! Canonical form checking.
//!
//! A `Formatter` takes the raw bytes of a file and returns its canonical
//! form, or a syntax error when the file cannot be parsed.

mod rustfmt;

pub use rustfmt::Rustfmt;

use async_trait::async_trait;

/// Result of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub canonical: Vec<u8>,
}

impl CheckOutcome {
    /// True when `raw` is already byte-for-byte canonical.
    pub fn is_canonical(&self, raw: &[u8]) -> bool {
        self.canonical == raw
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The input could not be parsed
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The formatter itself could not be run
    #[error("formatter unavailable: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Formatter: Send + Sync {
    async fn check(&self, raw: &[u8]) -> Result<CheckOutcome, FormatError>;
}
