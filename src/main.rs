//! SecopLens - Lifecycle Analyzer for SECOP Contracting Records
//!
//! A CLI tool that merges signed contracts and in-flight procurement
//! processes, classifies each record against a reference date, and
//! produces KPI reports, lifecycle alerts, and CSV exports.
//!
//! Exit codes:
//!   0 - Success (no alerts above threshold, or no --fail-on set)
//!   1 - Runtime error (fetch, input file, config failure, etc.)
//!   2 - Alerts found at or above the --fail-on threshold

mod analysis;
mod cli;
mod config;
mod export;
mod models;
mod report;
mod source;

use analysis::{compute_kpis, generate_alerts, merge, sort_alerts_by_severity};
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use cli::{Args, OutputFormat};
use config::Config;
use models::{AlertSummary, ContractRecord, Report, ReportMetadata, Severity};
use source::{FetchOptions, SourceClient};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SecopLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run_analysis(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .secoplens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".secoplens.toml");

    if path.exists() {
        eprintln!("⚠️  .secoplens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .secoplens.toml")?;

    println!("✅ Created .secoplens.toml with default settings.");
    println!("   Edit it to set the entity NIT, endpoints, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Resolve the date range and the classification cut-off.
    let hoy = match args.corte.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .context("Invalid --corte date")?,
        None => Local::now().date_naive(),
    };
    let fecha_desde = NaiveDate::parse_from_str(&config.fuente.fecha_desde, "%Y-%m-%d")
        .with_context(|| format!("Invalid fecha_desde: {}", config.fuente.fecha_desde))?;
    let fecha_hasta = match args.hasta.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .context("Invalid --hasta date")?,
        None => hoy,
    };

    // Step 1: Acquire both record sets.
    let (contracts, processes) =
        acquire_records(&args, &config, fecha_desde, fecha_hasta).await?;
    let contratos_origen = contracts.len();
    let procesos_origen = processes.len();

    println!(
        "📥 Fuentes: {} contratos firmados, {} procesos en curso",
        contratos_origen, procesos_origen
    );

    // Handle --dry-run: report counts and exit.
    if args.dry_run {
        println!("\n✅ Dry run complete. No analysis performed.");
        return Ok(0);
    }

    // Step 2: Merge and deduplicate.
    let records = merge(contracts, processes);
    info!("Deduplicated down to {} records", records.len());

    // Step 3: Classify and aggregate.
    println!("🔬 Analizando {} registros (corte: {})...", records.len(), hoy);
    let kpis = compute_kpis(&records, hoy);
    let mut alerts = generate_alerts(&records, hoy);
    sort_alerts_by_severity(&mut alerts);
    let summary = AlertSummary::from_alerts(&alerts);

    // Step 4: Build the report.
    let metadata = ReportMetadata {
        nit_entidad: config.fuente.nit.clone(),
        fecha_desde,
        fecha_hasta,
        fecha_corte: hoy,
        generated_at: Utc::now(),
        contratos_origen,
        procesos_origen,
        registros_analizados: records.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let mut report_alerts = alerts.clone();
    if !config.reporte.incluir_alertas {
        report_alerts.clear();
    } else if report_alerts.len() > config.reporte.max_alertas {
        report_alerts.truncate(config.reporte.max_alertas);
    }

    let report = Report {
        metadata,
        kpis: kpis.clone(),
        alerts: report_alerts,
        summary: summary.clone(),
    };

    // Step 5: Write the report (and the optional CSV export).
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    if let Some(ref csv_path) = args.csv {
        let csv = export::to_csv_string(&records);
        std::fs::write(csv_path, &csv)
            .with_context(|| format!("Failed to write CSV to {}", csv_path.display()))?;
        println!("📄 CSV exportado a: {}", csv_path.display());
    }

    // Print summary
    println!("\n📊 Resumen:");
    println!("   Registros analizados: {}", kpis.total_procesos);
    println!(
        "   Vencidos: {} | Próximos a vencer: {} | Ejecución retrasada: {}",
        kpis.contratos_vencidos,
        kpis.contratos_proximo_vencimiento,
        kpis.contratos_retrasados
    );
    println!(
        "   Alertas: {} - 🔴 Críticas: {} | 🟡 Advertencias: {}",
        summary.total, summary.criticas, summary.advertencias
    );
    println!("   Duración: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Análisis completo. Informe guardado en: {}",
        args.output.display()
    );

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold: Severity = fail_level.into();
        let has_alerts_above = alerts.iter().any(|a| a.severity >= threshold);

        if has_alerts_above {
            eprintln!(
                "\n⛔ Alerts found at or above {:?} severity. Failing (exit code 2).",
                fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Acquire the two record sets, either from local files or by fetching
/// from the configured endpoints, and apply the date-range filter.
async fn acquire_records(
    args: &Args,
    config: &Config,
    fecha_desde: NaiveDate,
    fecha_hasta: NaiveDate,
) -> Result<(Vec<ContractRecord>, Vec<ContractRecord>)> {
    let (contracts, processes) = if args.local_mode() {
        let contratos_path = args.contratos.as_ref().expect("validated");
        let procesos_path = args.procesos.as_ref().expect("validated");

        info!("Using local files: {} / {}", contratos_path.display(), procesos_path.display());
        let signed: Vec<source::SignedContract> = source::loader::load_records(contratos_path)?;
        let procs: Vec<source::ProcurementProcess> = source::loader::load_records(procesos_path)?;
        (signed, procs)
    } else {
        if config.fuente.nit.is_none() {
            bail!("Fetch mode needs an entity NIT (use --nit or .secoplens.toml)");
        }

        let options = FetchOptions {
            nit: config.fuente.nit.clone(),
            fecha_desde,
            fecha_hasta,
            timeout_seconds: config.fuente.timeout_seconds,
            retries: config.fuente.retries,
            show_progress: !args.quiet,
        };
        let client = SourceClient::new(
            config.fuente.contratos_url.clone(),
            config.fuente.procesos_url.clone(),
            options,
        )
        .context("Failed to build HTTP client")?;

        let signed = client
            .fetch_contracts()
            .await
            .context("Failed to fetch signed contracts")?;
        let procs = client
            .fetch_processes()
            .await
            .context("Failed to fetch procurement processes")?;
        (signed, procs)
    };

    let contracts: Vec<ContractRecord> =
        contracts.into_iter().map(|c| c.into_contract()).collect();
    let processes: Vec<ContractRecord> =
        processes.into_iter().map(|p| p.into_contract()).collect();

    // Local files were not filtered server-side; apply the same range.
    let contracts = source::loader::filter_by_range(contracts, fecha_desde, fecha_hasta);
    let processes = source::loader::filter_by_range(processes, fecha_desde, fecha_hasta);

    if contracts.is_empty() && processes.is_empty() {
        warn!("Both sources are empty for the given filters");
    }

    Ok((contracts, processes))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .secoplens.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertKind;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Full pipeline over the fixture files: load, map, range-filter,
    /// merge, classify, aggregate.
    #[test]
    fn test_pipeline_over_fixtures() {
        let corte = date(2024, 2, 15);
        let desde = date(2020, 1, 1);

        let signed: Vec<source::SignedContract> =
            source::loader::load_records(&fixture("contratos.json")).unwrap();
        let procs: Vec<source::ProcurementProcess> =
            source::loader::load_records(&fixture("procesos.json")).unwrap();
        assert_eq!(signed.len(), 5);
        assert_eq!(procs.len(), 3);

        let contracts: Vec<ContractRecord> =
            signed.into_iter().map(|c| c.into_contract()).collect();
        let processes: Vec<ContractRecord> =
            procs.into_iter().map(|p| p.into_contract()).collect();

        // CO-005 was signed in 2019, outside the range.
        let contracts = source::loader::filter_by_range(contracts, desde, corte);
        assert_eq!(contracts.len(), 4);
        let processes = source::loader::filter_by_range(processes, desde, corte);
        assert_eq!(processes.len(), 3);

        // P-2024-009 appears in both sources; the signed version wins.
        let records = merge(contracts, processes);
        assert_eq!(records.len(), 6);
        let dup = records
            .iter()
            .find(|r| r.referencia_contrato.as_deref() == Some("P-2024-009"))
            .unwrap();
        assert_eq!(dup.estado_contrato.as_deref(), Some("Celebrado"));
        assert_eq!(dup.valor_contrato, serde_json::json!(12000000));

        let kpis = compute_kpis(&records, corte);
        assert_eq!(kpis.total_procesos, 6);
        assert_eq!(kpis.total_adjudicados, 3); // En Ejecución, Celebrado x2
        assert_eq!(kpis.tasa_adjudicacion, 0.5);
        assert_eq!(kpis.suma_adjudicado, 170_500_000.0);
        assert_eq!(kpis.contratos_vencidos, 1);
        assert_eq!(kpis.contratos_proximo_vencimiento, 1);
        assert_eq!(kpis.contratos_retrasados, 1);
        assert_eq!(kpis.contratos_por_anio.get("2023"), Some(&2));
        assert_eq!(kpis.contratos_por_anio.get("2024"), Some(&1));
        assert_eq!(kpis.distribucion_tipos.get("Suministro"), Some(&2));
        assert_eq!(kpis.distribucion_tipos.get("N/D"), Some(&2));
        assert_eq!(kpis.tiempo_ejecucion_promedio, 100); // round(301/3)
        assert_eq!(kpis.tiempo_ejecucion_rango.min, 41);
        assert_eq!(kpis.tiempo_ejecucion_rango.max, 184);

        let mut alerts = generate_alerts(&records, corte);
        sort_alerts_by_severity(&mut alerts);
        assert_eq!(alerts.len(), 3);
        // CO-002: overdue 26 days (advertencia) and active-overdue (crítica).
        assert_eq!(alerts[0].kind, AlertKind::EjecucionRetrasada);
        assert_eq!(alerts[0].severity, Severity::Critica);
        assert_eq!(alerts[0].dias_delta, 26);
        assert!(alerts
            .iter()
            .any(|a| a.kind == AlertKind::Vencido && a.dias_delta == 26));
        // CO-003: due in 15 days.
        assert!(alerts
            .iter()
            .any(|a| a.kind == AlertKind::ProximoVencimiento && a.dias_delta == 15));

        let summary = AlertSummary::from_alerts(&alerts);
        assert_eq!(summary.criticas, 1);
        assert_eq!(summary.advertencias, 2);

        // The CSV shape covers every merged record.
        let csv = export::to_csv_string(&records);
        assert_eq!(csv.lines().count(), 7);
    }
}
