//! Output format selection for structured command output.

use std::io::IsTerminal;

use anyhow::{Result, bail};
use serde::Serialize;

/// Output format for structured data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact plain text — stable for pipes and scripts.
    Text,
    /// Machine-parseable JSON.
    Json,
    /// Colored, human-friendly text.
    Pretty,
}

impl OutputFormat {
    /// Resolve an optional flag value: pretty on a TTY, text otherwise.
    pub fn resolve(flag: Option<Self>) -> Self {
        flag.unwrap_or_else(|| {
            if std::io::stdout().is_terminal() {
                Self::Pretty
            } else {
                Self::Text
            }
        })
    }

    pub fn should_use_color(self) -> bool {
        self == Self::Pretty && std::io::stdout().is_terminal()
    }

    /// Serialize data for the `Json` format.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data)
                .map_err(|err| anyhow::anyhow!("JSON serialization failed: {err}")),
            Self::Text | Self::Pretty => {
                // Text formats print directly; reaching here is a bug.
                bail!("text formats should not use serialize()")
            }
        }
    }
}
