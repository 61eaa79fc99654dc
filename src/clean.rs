use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::CleanArgs,
    io_utils,
    normalize::{NormalizeReport, NormalizeStats, Normalizer, RawLayout},
    printable_delimiter,
    record::CLEAN_COLUMNS,
    table,
};

const REPORT_COLUMNS: [&str; 4] = ["record_index", "field", "code", "reason"];

pub fn execute(args: &CleanArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Cleaning '{}' using delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );

    let mut reader = io_utils::open_csv_reader(&args.input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let layout = RawLayout::from_headers(&headers)
        .with_context(|| format!("Validating raw columns of {:?}", args.input))?;

    let output_path = args.output.as_deref();
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path, None, io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(output_path, output_delimiter)?;
    writer.write_record(CLEAN_COLUMNS)?;

    let mut normalizer = Normalizer::new();
    for (record_index, row) in reader.byte_records().enumerate() {
        if args.limit.is_some_and(|limit| record_index >= limit) {
            break;
        }
        let row = row
            .with_context(|| format!("Reading row {} of {:?}", record_index + 2, args.input))?;
        let decoded = io_utils::decode_record(&row, encoding)?;
        let raw = layout.record_from_row(&decoded);
        if let Some(record) = normalizer.ingest(record_index, &raw) {
            writer.serialize(&record)?;
        }
    }
    writer.flush()?;

    let report = normalizer.finish();
    for (field, count) in report.failures_by_field() {
        warn!("Skipped {count} row(s) with an unrecognized {field} value");
    }
    if let Some(path) = &args.report {
        write_report(path, &report)?;
        info!(
            "Wrote {} normalization failure(s) to {:?}",
            report.failures.len(),
            path
        );
    }

    let stats = report.stats;
    info!(
        "Normalized {} of {} row(s) ({} out of scope, {} incomplete, {} failed)",
        stats.normalized, stats.read, stats.out_of_scope, stats.incomplete, stats.failed
    );
    let writes_to_stdout = output_path.is_none_or(io_utils::is_dash);
    if !writes_to_stdout {
        print_summary(&stats);
    }
    Ok(())
}

fn write_report(path: &Path, report: &NormalizeReport) -> Result<()> {
    let delimiter =
        io_utils::resolve_output_delimiter(Some(path), None, io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(Some(path), delimiter)?;
    writer.write_record(REPORT_COLUMNS)?;
    for failure in &report.failures {
        writer.write_record([
            failure.record_index.to_string().as_str(),
            failure.field(),
            failure.code(),
            failure.error.reason(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Writing failure report {path:?}"))?;
    Ok(())
}

fn print_summary(stats: &NormalizeStats) {
    let headers = vec!["stage".to_string(), "rows".to_string()];
    let rows = [
        ("read", stats.read),
        ("out_of_scope", stats.out_of_scope),
        ("incomplete", stats.incomplete),
        ("failed", stats.failed),
        ("written", stats.normalized),
    ]
    .into_iter()
    .map(|(stage, count)| vec![stage.to_string(), count.to_string()])
    .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}
