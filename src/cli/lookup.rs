//! Lookup command implementation

use crate::cli::output::{format_report, format_report_json};
use crate::cli::{Console, LookupArgs, StdinChooser};
use crate::clients::CsvTransactionTable;
use crate::config::{DiagnosticQuery, FicheConfig};
use crate::logging::init_tracing;
use crate::pipeline::{QueryOutcome, QueryPipeline, Report};
use crate::record::Source;
use crate::reduce::FirstOption;
use std::cell::RefCell;
use std::io::{BufRead, Write};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &LookupArgs,
) -> Result<FicheConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        FicheConfig::load(Some(&args.config))?
    } else {
        FicheConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref path) = args.dvf {
        config.transactions.path = path.clone();
    }
    if args.by_address {
        config.diagnostics.query = DiagnosticQuery::Address;
    }
    if args.no_parcels {
        config.parcels.enabled = false;
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Prompt for every field still holding several values.
pub fn settle_ambiguous_fields<R: BufRead, W: Write>(
    report: &mut Report,
    console: &RefCell<Console<R, W>>,
) -> std::io::Result<()> {
    let pending: Vec<(String, Source, Vec<String>)> = report
        .record
        .ambiguous()
        .map(|f| {
            let options = f.value.candidates().iter().map(|v| v.to_string()).collect();
            (f.name.clone(), f.source, options)
        })
        .collect();

    for (name, source, options) in pending {
        let title = format!("{} '{}' has several values:", source, name);
        if let Some(index) = console.borrow_mut().ask(&title, &options)? {
            report.select(&name, source, index);
        }
    }
    Ok(())
}

/// Handle `fiche lookup` command
pub async fn handle_lookup(args: LookupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let token = config.resolve_token()?;
    let table = CsvTransactionTable::load(&config.transactions.path)?;
    let pipeline = QueryPipeline::from_config(&config, token, table)?;

    let console = RefCell::new(Console::stdio());
    let address = match args.address {
        Some(ref address) => address.clone(),
        None => console
            .borrow_mut()
            .read_line("Address: ")?
            .unwrap_or_default(),
    };

    let outcome = if args.non_interactive {
        pipeline
            .run(&address, &mut FirstOption, &mut FirstOption)
            .await
    } else {
        let mut dpe = StdinChooser::new(&console, Source::Dpe);
        let mut dvf = StdinChooser::new(&console, Source::Dvf);
        pipeline.run(&address, &mut dpe, &mut dvf).await
    };

    let mut report = match outcome {
        QueryOutcome::NoInput => {
            eprintln!("No address given, nothing to look up.");
            return Ok(());
        }
        QueryOutcome::LookupFailed(e) => {
            return Err(format!("Address lookup failed: {}", e).into());
        }
        QueryOutcome::Completed(report) => report,
    };

    if !args.non_interactive {
        settle_ambiguous_fields(&mut report, &console)?;
    }

    if args.json {
        println!("{}", format_report_json(&report)?);
    } else {
        println!("{}", format_report(&report));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit;
    use crate::clients::GeoLocation;
    use crate::reconcile::{reconcile, ReconciledValue};
    use crate::record::{CandidateRow, CandidateSet, FieldValue};
    use std::path::PathBuf;

    fn lookup_args(config: PathBuf) -> LookupArgs {
        LookupArgs {
            address: None,
            config,
            dvf: None,
            by_address: false,
            no_parcels: false,
            non_interactive: true,
            json: false,
            log_level: None,
        }
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = lookup_args(temp_dir.path().join("absent.toml"));

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.transactions.fields.len(), 3);
    }

    #[test]
    fn test_cli_flags_override_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("fiche.toml");
        std::fs::write(
            &path,
            "[parcels]\nenabled = true\n[logging]\nlevel = \"info\"\n[transactions]\npath = \"file.csv\"\n",
        )
        .unwrap();

        let args = LookupArgs {
            dvf: Some(PathBuf::from("flag.csv")),
            by_address: true,
            no_parcels: true,
            log_level: Some("debug".to_string()),
            ..lookup_args(path)
        };
        let config = load_config_with_overrides(&args).unwrap();

        assert_eq!(config.transactions.path, PathBuf::from("flag.csv"));
        assert_eq!(config.diagnostics.query, DiagnosticQuery::Address);
        assert!(!config.parcels.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("fiche.toml");
        std::fs::write(&path, "[diagnostics\n").unwrap();

        assert!(load_config_with_overrides(&lookup_args(path)).is_err());
    }

    #[test]
    fn test_settle_ambiguous_fields() {
        let transactions = CandidateSet::from_rows(
            Source::Dvf,
            vec![
                CandidateRow::new(Source::Dvf)
                    .with("surface_reelle_bati", 80i64)
                    .with("nombre_pieces_principales", 3i64),
                CandidateRow::new(Source::Dvf)
                    .with("surface_reelle_bati", 95i64)
                    .with("nombre_pieces_principales", 4i64),
            ],
        );
        let diagnostics = CandidateSet::new(Source::Dpe);
        let no_fields: [&str; 0] = [];
        let record = reconcile(
            &transactions,
            &diagnostics,
            &["surface_reelle_bati", "nombre_pieces_principales"],
            &no_fields,
        );
        let mut report = Report {
            query_id: "q".to_string(),
            input: "x".to_string(),
            normalized_address: "X".to_string(),
            location: GeoLocation {
                label: "x".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                city_code: None,
                postal_code: None,
                x: 0.0,
                y: 0.0,
            },
            parcels: vec![],
            transaction_usage: audit(&record, &transactions, Source::Dvf),
            diagnostic_usage: audit(&record, &diagnostics, Source::Dpe),
            transactions,
            diagnostics,
            record,
            warnings: vec![],
        };

        // second value for the surface, keep both room counts
        let console = RefCell::new(Console::new("2\n\n".as_bytes(), Vec::new()));
        settle_ambiguous_fields(&mut report, &console).unwrap();

        assert_eq!(
            report.record.get("surface_reelle_bati", Source::Dvf).unwrap().value,
            ReconciledValue::Single(FieldValue::from(95i64))
        );
        assert!(report
            .record
            .get("nombre_pieces_principales", Source::Dvf)
            .unwrap()
            .value
            .is_multiple());
    }
}
