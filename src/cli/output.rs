//! Output formatting helpers for the lookup report

use crate::audit::UsageMap;
use crate::pipeline::Report;
use crate::reconcile::ReconciledValue;
use crate::record::{CandidateSet, Source};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Header lines: geocoded label, coordinates and parcels.
pub fn format_location(report: &Report) -> String {
    let location = &report.location;
    let mut lines = vec![
        format!("{} {}", "Address:".bold(), location.label),
        format!(
            "{} {:.6}, {:.6} (x {}, y {})",
            "Position:".bold(),
            location.latitude,
            location.longitude,
            location.x,
            location.y
        ),
    ];
    if let Some(code) = &location.city_code {
        lines.push(format!("{} {}", "INSEE code:".bold(), code));
    }
    if !report.parcels.is_empty() {
        lines.push(format!("{} {}", "Parcels:".bold(), report.parcels.join(", ")));
    }
    lines.join("\n")
}

/// The reconciled record: one line per field with its source.
pub fn format_record_table(report: &Report) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Source", "Value"]);

    for field in report.record.fields() {
        let value = match &field.value {
            ReconciledValue::Missing => "-".dimmed().to_string(),
            ReconciledValue::Single(v) => v.to_string(),
            ReconciledValue::Multiple(_) => field.value.to_string().yellow().to_string(),
        };
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.source),
            Cell::new(value),
        ]);
    }

    table.to_string()
}

/// Remaining rows of one source, used columns first and highlighted.
pub fn format_rows_table(set: &CandidateSet, usage: &UsageMap) -> String {
    let columns = usage.used_first();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.iter().map(|&name| {
        if usage.is_used(name) {
            Cell::new(name.magenta().bold())
        } else {
            Cell::new(name)
        }
    }));

    for row in set.rows() {
        table.add_row(columns.iter().map(|&name| {
            let text = row.get(name).to_string();
            if usage.is_used(name) {
                Cell::new(text.magenta())
            } else {
                Cell::new(text)
            }
        }));
    }

    table.to_string()
}

fn section(title: &str) -> String {
    format!("\n{}", title.bold().underline())
}

/// Full human-readable report.
pub fn format_report(report: &Report) -> String {
    let mut out = vec![format_location(report)];

    for warning in &report.warnings {
        out.push(format!("{} {}", "!".yellow().bold(), warning));
    }

    out.push(section("Reconciled record"));
    out.push(format_record_table(report));

    let sources = [
        (Source::Dvf, &report.transactions, &report.transaction_usage),
        (Source::Dpe, &report.diagnostics, &report.diagnostic_usage),
    ];
    for (source, set, usage) in sources {
        if set.is_empty() {
            continue;
        }
        out.push(section(&format!("{} rows ({})", source, set.len())));
        out.push(format_rows_table(set, usage));
    }

    out.join("\n")
}

/// Report as pretty JSON.
pub fn format_report_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit;
    use crate::clients::GeoLocation;
    use crate::pipeline::QueryWarning;
    use crate::reconcile::reconcile;
    use crate::record::{CandidateRow, FieldValue};

    fn create_test_report() -> Report {
        let transactions = CandidateSet::from_rows(
            Source::Dvf,
            vec![
                CandidateRow::new(Source::Dvf)
                    .with("date_mutation", "2021-03-04")
                    .with("surface_reelle_bati", 80i64)
                    .with("surface_terrain", FieldValue::Null),
                CandidateRow::new(Source::Dvf)
                    .with("date_mutation", "2021-03-04")
                    .with("surface_reelle_bati", 95i64)
                    .with("surface_terrain", FieldValue::Null),
            ],
        );
        let diagnostics = CandidateSet::new(Source::Dpe);
        let no_fields: [&str; 0] = [];
        let record = reconcile(
            &transactions,
            &diagnostics,
            &["surface_reelle_bati", "surface_terrain"],
            &no_fields,
        );

        Report {
            query_id: "q-1".to_string(),
            input: "1 place gambetta".to_string(),
            normalized_address: "1 PLACE GAMBETTA 80000 AMIENS".to_string(),
            location: GeoLocation {
                label: "1 Place Gambetta 80000 Amiens".to_string(),
                latitude: 49.894,
                longitude: 2.295,
                city_code: Some("80021".to_string()),
                postal_code: Some("80000".to_string()),
                x: 648000.0,
                y: 6977000.0,
            },
            parcels: vec!["80021000AB0012".to_string()],
            transaction_usage: audit(&record, &transactions, Source::Dvf),
            diagnostic_usage: audit(&record, &diagnostics, Source::Dpe),
            transactions,
            diagnostics,
            record,
            warnings: vec![QueryWarning::NoDiagnosticOnFile],
        }
    }

    #[test]
    fn test_format_report_sections() {
        let output = format_report(&create_test_report());
        assert!(output.contains("1 Place Gambetta 80000 Amiens"));
        assert!(output.contains("80021000AB0012"));
        assert!(output.contains("No energy diagnostic on file"));
        assert!(output.contains("Reconciled record"));
        assert!(output.contains("DVF rows (2)"));
        assert!(!output.contains("DPE rows"));
    }

    #[test]
    fn test_format_record_table_values() {
        let output = format_record_table(&create_test_report());
        assert!(output.contains("Field"));
        assert!(output.contains("surface_reelle_bati"));
        assert!(output.contains("80 | 95"));
        assert!(output.contains("DVF"));
    }

    #[test]
    fn test_rows_table_puts_used_columns_first() {
        let report = create_test_report();
        let output = format_rows_table(&report.transactions, &report.transaction_usage);
        let header = output.lines().nth(1).unwrap();

        let used = header.find("surface_reelle_bati").unwrap();
        let unused = header.find("date_mutation").unwrap();
        assert!(used < unused);
    }

    #[test]
    fn test_format_report_json_valid() {
        let output = format_report_json(&create_test_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["query_id"], "q-1");
        assert_eq!(parsed["record"][0]["value"], serde_json::json!([80, 95]));
        assert_eq!(parsed["record"][1]["value"], serde_json::Value::Null);
        assert_eq!(parsed["warnings"][0]["kind"], "no_diagnostic_on_file");
        assert_eq!(parsed["transaction_usage"][0]["field"], "date_mutation");
        assert_eq!(parsed["transaction_usage"][0]["used"], false);
        assert_eq!(parsed["transaction_usage"][1]["used"], true);
    }
}
