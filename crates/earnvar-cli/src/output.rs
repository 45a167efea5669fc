use std::io::Write;

use earnvar_core::{ReportTiming, ScanReport, SymbolVarianceResult};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::CommandOutcome;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SymbolOutput<'a> {
    #[serde(flatten)]
    result: &'a SymbolVarianceResult,
    significant: bool,
}

pub fn render(outcome: &CommandOutcome, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Json => render_json(outcome, pretty)?,
        OutputFormat::Table => render_table(outcome),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

fn render_json(outcome: &CommandOutcome, pretty: bool) -> Result<String, serde_json::Error> {
    let value = match outcome {
        CommandOutcome::Scan(report) => serde_json::to_value(report)?,
        CommandOutcome::Symbol {
            result,
            significant,
        } => serde_json::to_value(SymbolOutput {
            result,
            significant: *significant,
        })?,
    };

    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}

fn render_table(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Scan(report) => scan_table(report),
        CommandOutcome::Symbol {
            result,
            significant,
        } => {
            let marker = if *significant { "significant" } else { "below threshold" };
            format!("{}  [{marker}]", table_row(result))
        }
    }
}

fn scan_table(report: &ScanReport) -> String {
    let mut lines = vec![format!(
        "{}: {} calendar rows, {} watched, {} retained",
        report.date,
        report.calendar_rows,
        report.watched,
        report.entries.len()
    )];

    for entry in &report.entries {
        let mut line = table_row(&entry.result);
        if !entry.platforms.is_empty() {
            line.push_str(&format!("  [{}]", entry.platforms.join(", ")));
        }
        lines.push(line);
    }

    lines.join("\n")
}

fn table_row(result: &SymbolVarianceResult) -> String {
    let glyph = match result.timing {
        ReportTiming::PreMarket => "AM",
        ReportTiming::AfterHours | ReportTiming::Unspecified => "PM",
    };
    let variances = result
        .percents()
        .map(|percent| percent.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{glyph}  {:<8} {variances} ({})",
        result.symbol.as_str(),
        result.average
    )
}
