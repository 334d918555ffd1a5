//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.secoplens.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data-source settings.
    #[serde(default)]
    pub fuente: FuenteConfig,

    /// Report settings.
    #[serde(default)]
    pub reporte: ReporteConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "informe_secoplens.md".to_string()
}

/// Data-source settings for the two SECOP endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuenteConfig {
    /// Signed-contracts endpoint URL.
    #[serde(default = "default_contratos_url")]
    pub contratos_url: String,

    /// Procurement-processes endpoint URL.
    #[serde(default = "default_procesos_url")]
    pub procesos_url: String,

    /// Entity tax ID to filter by.
    #[serde(default)]
    pub nit: Option<String>,

    /// Default start of the analyzed date range.
    #[serde(default = "default_fecha_desde")]
    pub fecha_desde: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries per endpoint on failure.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for FuenteConfig {
    fn default() -> Self {
        Self {
            contratos_url: default_contratos_url(),
            procesos_url: default_procesos_url(),
            nit: None,
            fecha_desde: default_fecha_desde(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_contratos_url() -> String {
    "https://api.transparencia.gov.co/secop/contratos".to_string()
}

fn default_procesos_url() -> String {
    "https://api.transparencia.gov.co/secop/procesos".to_string()
}

fn default_fecha_desde() -> String {
    "2020-01-01".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> usize {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporteConfig {
    /// Maximum alerts detailed in the Markdown report.
    #[serde(default = "default_max_alertas")]
    pub max_alertas: usize,

    /// Include the per-alert detail section.
    #[serde(default = "default_true")]
    pub incluir_alertas: bool,
}

impl Default for ReporteConfig {
    fn default() -> Self {
        Self {
            max_alertas: default_max_alertas(),
            incluir_alertas: true,
        }
    }
}

fn default_max_alertas() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".secoplens.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref nit) = args.nit {
            self.fuente.nit = Some(nit.clone());
        }
        if let Some(ref url) = args.contratos_url {
            self.fuente.contratos_url = url.clone();
        }
        if let Some(ref url) = args.procesos_url {
            self.fuente.procesos_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.fuente.timeout_seconds = timeout;
        }
        if let Some(ref desde) = args.desde {
            self.fuente.fecha_desde = desde.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
