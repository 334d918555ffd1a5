//! Fetching record sets from the two SECOP open-data endpoints.
//!
//! The analysis core never sees this layer; it only receives the two
//! arrays once both requests resolve. Failures surface as
//! [`SourceError`] and abort the run.

use crate::source::records::{ProcurementProcess, SignedContract};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the SECOP endpoints.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Retries exhausted for {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },
}

/// Options for fetching from the endpoints.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Entity tax ID to filter by.
    pub nit: Option<String>,
    /// Start of the date range.
    pub fecha_desde: NaiveDate,
    /// End of the date range.
    pub fecha_hasta: NaiveDate,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retries per endpoint on failure.
    pub retries: usize,
    /// Whether to show a progress spinner.
    pub show_progress: bool,
}

/// Client for the two SECOP query endpoints.
pub struct SourceClient {
    client: reqwest::Client,
    contratos_url: String,
    procesos_url: String,
    options: FetchOptions,
}

impl SourceClient {
    /// Creates a client for the given endpoint URLs.
    pub fn new(
        contratos_url: String,
        procesos_url: String,
        options: FetchOptions,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            contratos_url,
            procesos_url,
            options,
        })
    }

    /// Fetches the signed-contracts record set.
    pub async fn fetch_contracts(&self) -> Result<Vec<SignedContract>, SourceError> {
        self.fetch_array(&self.contratos_url, "contratos").await
    }

    /// Fetches the procurement-processes record set.
    pub async fn fetch_processes(&self) -> Result<Vec<ProcurementProcess>, SourceError> {
        self.fetch_array(&self.procesos_url, "procesos").await
    }

    async fn fetch_array<T: DeserializeOwned>(
        &self,
        url: &str,
        label: &str,
    ) -> Result<Vec<T>, SourceError> {
        let mut query: Vec<(&str, String)> = vec![
            ("fechaDesde", self.options.fecha_desde.to_string()),
            ("fechaHasta", self.options.fecha_hasta.to_string()),
        ];
        if let Some(ref nit) = self.options.nit {
            query.push(("nitEntidad", nit.clone()));
        }

        let spinner = if self.options.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(format!("Consultando {label}..."));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let attempts = self.options.retries.max(1);
        let mut result: Result<Vec<T>, SourceError> = Err(SourceError::RetriesExhausted {
            url: url.to_string(),
            attempts,
        });

        for attempt in 1..=attempts {
            debug!(url, attempt, "fetching record set");

            match self.try_fetch::<T>(url, &query).await {
                Ok(records) => {
                    result = Ok(records);
                    break;
                }
                Err(e) => {
                    warn!("Fetch attempt {}/{} failed: {}", attempt, attempts, e);
                    result = Err(e);
                }
            }
        }

        if let Some(pb) = spinner {
            match &result {
                Ok(records) => {
                    pb.finish_with_message(format!("{label}: {} registros", records.len()))
                }
                Err(_) => pb.finish_with_message(format!("{label}: error")),
            }
        }

        if let Ok(ref records) = result {
            info!("Fetched {} {} records", records.len(), label);
        }

        result
    }

    async fn try_fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.json::<Vec<T>>().await?)
    }
}
