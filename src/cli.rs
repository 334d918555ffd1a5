//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Severity;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// SecopLens - lifecycle analyzer for SECOP public-contracting records
///
/// Merges signed contracts and in-flight procurement processes,
/// classifies each record against a reference date, and produces KPI
/// reports, lifecycle alerts, and CSV exports.
///
/// Examples:
///   secoplens --nit 890000000
///   secoplens --contratos contratos.json --procesos procesos.json
///   secoplens --nit 890000000 --corte 2024-02-15 --format json
///   secoplens --contratos contratos.json --procesos procesos.json --csv export.csv
///   secoplens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Entity tax ID (NIT) to filter by when fetching
    ///
    /// Required for fetch mode unless set in .secoplens.toml.
    #[arg(short, long, value_name = "NIT", env = "SECOPLENS_NIT")]
    pub nit: Option<String>,

    /// Local JSON file with signed-contract records
    ///
    /// When given together with --procesos, no network fetch happens.
    #[arg(long, value_name = "FILE", requires = "procesos")]
    pub contratos: Option<PathBuf>,

    /// Local JSON file with procurement-process records
    #[arg(long, value_name = "FILE", requires = "contratos")]
    pub procesos: Option<PathBuf>,

    /// Signed-contracts endpoint URL (overrides config)
    #[arg(long, value_name = "URL", env = "SECOPLENS_CONTRATOS_URL")]
    pub contratos_url: Option<String>,

    /// Procurement-processes endpoint URL (overrides config)
    #[arg(long, value_name = "URL", env = "SECOPLENS_PROCESOS_URL")]
    pub procesos_url: Option<String>,

    /// Start of the date range (YYYY-MM-DD)
    ///
    /// Defaults to the config value (2020-01-01 out of the box).
    #[arg(long, value_name = "FECHA")]
    pub desde: Option<String>,

    /// End of the date range (YYYY-MM-DD), defaults to the cut-off date
    #[arg(long, value_name = "FECHA")]
    pub hasta: Option<String>,

    /// Reference date for lifecycle classification (YYYY-MM-DD)
    ///
    /// Defaults to the local date. Pin it for reproducible runs.
    #[arg(long, value_name = "FECHA")]
    pub corte: Option<String>,

    /// Output file path for the report
    #[arg(short, long, default_value = "informe_secoplens.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also write the record set as CSV to this file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .secoplens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (fetch mode)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if alerts at or above this severity exist
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is hit.
    /// Values: advertencia, critica
    #[arg(long, value_name = "NIVEL")]
    pub fail_on: Option<AlertLevel>,

    /// Dry run: load the two sources and print counts, no analysis
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .secoplens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum AlertLevel {
    Advertencia,
    Critica,
}

impl From<AlertLevel> for Severity {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Advertencia => Severity::Advertencia,
            AlertLevel::Critica => Severity::Critica,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the run reads local files instead of fetching.
    pub fn local_mode(&self) -> bool {
        self.contratos.is_some() && self.procesos.is_some()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // The config file may still provide a NIT for fetch mode; main
        // re-checks. Only the half-local case is rejected here.
        if self.contratos.is_some() != self.procesos.is_some() {
            return Err("Local mode needs both --contratos and --procesos".to_string());
        }

        for (flag, value) in [
            ("--desde", &self.desde),
            ("--hasta", &self.hasta),
            ("--corte", &self.corte),
        ] {
            if let Some(raw) = value {
                if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
                    return Err(format!("{} must be a YYYY-MM-DD date, got '{}'", flag, raw));
                }
            }
        }

        if let (Some(desde), Some(hasta)) = (&self.desde, &self.hasta) {
            let d = NaiveDate::parse_from_str(desde, "%Y-%m-%d");
            let h = NaiveDate::parse_from_str(hasta, "%Y-%m-%d");
            if let (Ok(d), Ok(h)) = (d, h) {
                if d > h {
                    return Err("--desde must not be after --hasta".to_string());
                }
            }
        }

        if let Some(ref url) = self.contratos_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("--contratos-url must start with 'http://' or 'https://'".to_string());
            }
        }
        if let Some(ref url) = self.procesos_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("--procesos-url must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for (flag, path) in [("--contratos", &self.contratos), ("--procesos", &self.procesos)] {
            if let Some(p) = path {
                if !p.exists() {
                    return Err(format!("{} file does not exist: {}", flag, p.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            nit: Some("890000000".to_string()),
            contratos: None,
            procesos: None,
            contratos_url: None,
            procesos_url: None,
            desde: None,
            hasta: None,
            corte: None,
            output: PathBuf::from("informe.md"),
            format: OutputFormat::Markdown,
            csv: None,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_bad_date() {
        let mut args = make_args();
        args.corte = Some("15/02/2024".to_string());
        assert!(args.validate().is_err());

        args.corte = Some("2024-02-15".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_inverted_range() {
        let mut args = make_args();
        args.desde = Some("2024-06-01".to_string());
        args.hasta = Some("2024-01-01".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_url() {
        let mut args = make_args();
        args.contratos_url = Some("ftp://example".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_alert_level_maps_to_severity() {
        assert_eq!(Severity::from(AlertLevel::Critica), Severity::Critica);
        assert_eq!(Severity::from(AlertLevel::Advertencia), Severity::Advertencia);
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
