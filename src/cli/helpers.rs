//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Role, TariffRateStore, Workspace};
use crate::core::tariff::MemoryPersistence;

/// Everything a command needs about its surroundings
#[derive(Debug)]
pub struct Context {
    pub workspace: Option<Workspace>,
    pub config: Config,
    pub role: Role,
    pub format: OutputFormat,
}

impl Context {
    /// Locate the workspace (if any), load config, and settle role and format.
    ///
    /// Precedence for role and format: command-line flag, then config.
    pub fn load(global: &GlobalOpts) -> Self {
        let workspace = Workspace::locate(global.workspace.as_deref()).ok();
        let config = Config::load(workspace.as_ref());
        let role = global.role.unwrap_or_else(|| config.role());

        let format = match global.format {
            OutputFormat::Auto => config
                .default_format
                .as_deref()
                .and_then(|f| f.parse().ok())
                .unwrap_or(OutputFormat::Auto),
            other => other,
        };

        Self {
            workspace,
            config,
            role,
            format,
        }
    }

    /// The workspace, or an error telling the user to create one
    pub fn require_workspace(&self, global: &GlobalOpts) -> Result<&Workspace> {
        match &self.workspace {
            Some(workspace) => Ok(workspace),
            None => {
                let err = Workspace::locate(global.workspace.as_deref())
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no workspace".to_string());
                Err(miette::miette!("{}", err))
            }
        }
    }

    /// Open the tariff table with this context's role.
    ///
    /// Outside a workspace the built-in defaults are used and nothing persists.
    pub fn tariff_store(&self) -> TariffRateStore {
        let access = self.role.tariff_access();
        match &self.workspace {
            Some(workspace) => workspace.tariff_store(access),
            None => {
                debug!("no workspace found, using built-in tariff rates");
                TariffRateStore::open(MemoryPersistence::new(), access)
            }
        }
    }
}

/// Format a USD amount
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Format a fractional rate (0.156) as a percentage ("15.60%")
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Escape a string for TSV output (tabs and newlines become spaces)
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Render records as CSV, quoting fields that need it
pub fn to_csv<R, F>(records: impl IntoIterator<Item = R>) -> Result<String>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.write_record(record).into_diagnostic()?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| miette::miette!("Failed to write CSV: {}", e.error()))?;
    String::from_utf8(bytes).into_diagnostic()
}

/// Write to a file if given, otherwise stdout
pub fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            eprintln!("Output written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(10.8), "$10.80");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(-2.5), "-$2.50");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.156), "15.60%");
        assert_eq!(format_rate(0.15), "15.00%");
    }

    #[test]
    fn test_to_csv_quotes_commas() {
        let csv = to_csv([
            vec!["country", "rate"],
            vec!["Korea, Republic of", "0.2"],
            vec!["Say \"hi\"", "0"],
        ])
        .unwrap();
        assert_eq!(
            csv,
            "country,rate\n\"Korea, Republic of\",0.2\n\"Say \"\"hi\"\"\",0\n"
        );
    }

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb\nc"), "a b c");
    }
}
