//! Filter-view commands: each one builds a [`FilterSpec`] from the view's
//! configured defaults plus any flags, runs it through the engine and
//! reports the result.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{ConfigArgs, DatasetArgs, FilterArgs, HeatmapArgs, OptionsArgs, ScatterArgs},
    config::{DashboardConfig, View},
    dataset::Dataset,
    engine::{FilterResult, RegionAggregate, Summary, Viewport},
    filter::{Choice, FilterSpec, Selection},
    io_utils,
    record::{BridgeRecord, CLEAN_COLUMNS, RouteType},
    table,
};

const REGION_HEADERS: [&str; 7] = [
    "fips",
    "state_abv",
    "state_name",
    "latitude",
    "longitude",
    "eval_rating",
    "count",
];

const BRIDGE_HEADERS: [&str; 14] = [
    "feature_intersect",
    "latitude",
    "longitude",
    "eval_rating",
    "eval_rating_v",
    "deck",
    "super",
    "sub",
    "bridge_type",
    "year_built",
    "num_span",
    "max_span",
    "bridge_length",
    "marker_size",
];

/// Overlays command-line filters on the view's default spec.
pub fn build_spec(
    filters: &FilterArgs,
    config: &DashboardConfig,
    view: View,
) -> Result<FilterSpec> {
    let mut spec = config.view_spec(view)?;
    if !filters.states.is_empty() {
        spec.regions = Selection::from_tokens(&filters.states);
    }
    if let Some(token) = &filters.route_type {
        spec.route_type = Choice::<RouteType>::parse(token)?;
    }
    if let Some(token) = &filters.route_number {
        spec.route_number = Choice::parse(token)?;
    }
    if let Some(token) = &filters.bridge_type {
        spec.bridge_type = Choice::parse(token)?;
    }
    if let Some(years) = filters.years {
        spec.years = years;
    }
    if let Some(length) = filters.length {
        spec.length = length;
    }
    if let Some(spans) = filters.spans {
        spec.spans = spans;
    }
    if let Some(ratings) = filters.ratings {
        spec.ratings = ratings;
    }
    Ok(spec)
}

pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let (low, high) = summary.length_range_meters;
    let mean_rating = summary
        .mean_rating
        .map_or_else(|| "n/a".to_string(), |rating| format!("{rating:.2}"));
    vec![
        format!("Number of Bridges Selected: {}", summary.count),
        format!("Selected length range: [{low:.2}, {high:.2}]"),
        format!("Mean evaluation rating: {mean_rating}"),
    ]
}

fn viewport_line(viewport: &Viewport) -> String {
    format!(
        "Map center: ({:.4}, {:.4}), zoom {}",
        viewport.center.lat, viewport.center.lon, viewport.zoom
    )
}

#[derive(Debug, Serialize)]
struct HeatmapReport<'a> {
    filters: &'a FilterSpec,
    summary: Summary,
    viewport: Viewport,
    route_number_options: &'a [Choice<String>],
    regions: &'a [RegionAggregate],
}

#[derive(Debug, Serialize)]
struct ScatterReport<'a> {
    filters: &'a FilterSpec,
    summary: Summary,
    viewport: Viewport,
    route_number_options: &'a [Choice<String>],
    bridges: &'a [&'a BridgeRecord],
}

pub fn execute_heatmap(args: &HeatmapArgs, config: &DashboardConfig) -> Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    let spec = build_spec(&args.filters, config, View::Heatmap)?;
    let engine = dataset.engine(config.viewport);
    let result = engine.apply(&spec);
    info!(
        "Heatmap selected {} bridge(s) across {} county region(s)",
        result.summary.count,
        result.region_aggregates.len()
    );

    if args.json {
        let report = HeatmapReport {
            filters: &spec,
            summary: result.summary,
            viewport: result.viewport,
            route_number_options: &result.route_number_options,
            regions: &result.region_aggregates,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_header(&result);
    let headers = REGION_HEADERS.map(String::from);
    let rows = result
        .region_aggregates
        .iter()
        .map(|row| {
            vec![
                row.region_id.clone(),
                row.state_abbrev.clone(),
                row.state_name.clone(),
                format!("{:.4}", row.latitude),
                format!("{:.4}", row.longitude),
                format!("{:.3}", row.eval_rating),
                row.count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

pub fn execute_scatter(args: &ScatterArgs, config: &DashboardConfig) -> Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    let spec = build_spec(&args.filters, config, View::Scatter)?;
    let engine = dataset.engine(config.viewport);
    let result = engine.apply(&spec);
    let limit = args.limit.unwrap_or(usize::MAX);
    let bridges = &result.filtered[..result.filtered.len().min(limit)];
    info!(
        "Scatter selected {} bridge(s); emitting {}",
        result.summary.count,
        bridges.len()
    );

    if args.json {
        let report = ScatterReport {
            filters: &spec,
            summary: result.summary,
            viewport: result.viewport,
            route_number_options: &result.route_number_options,
            bridges,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.table {
        print_header(&result);
        let headers = BRIDGE_HEADERS.map(String::from);
        let rows = bridges.iter().copied().map(hover_row).collect::<Vec<_>>();
        table::print_table(&headers, &rows);
        return Ok(());
    }

    let output_path = args.output.as_deref();
    let input_delimiter =
        io_utils::resolve_input_delimiter(&args.dataset.input, args.dataset.delimiter);
    let delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, input_delimiter);
    let mut writer = io_utils::open_csv_writer(output_path, delimiter)?;
    writer.write_record(CLEAN_COLUMNS)?;
    for bridge in bridges {
        writer.serialize(bridge)?;
    }
    writer.flush().context("Writing selected bridges")?;

    match output_path {
        Some(path) if !io_utils::is_dash(path) => {
            for line in summary_lines(&result.summary) {
                println!("{line}");
            }
            info!("Wrote {} bridge(s) to {:?}", bridges.len(), path);
        }
        _ => {
            for line in summary_lines(&result.summary) {
                info!("{line}");
            }
        }
    }
    Ok(())
}

pub fn execute_options(args: &OptionsArgs, config: &DashboardConfig) -> Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    if args.filters.is_empty() {
        let options = dataset.options();
        print_options("state", &options.states);
        print_options("route_type", &options.route_types);
        print_options("route_num", &options.route_numbers);
        print_options("bridge_type", &options.bridge_types);
        print_options("bridge_material", &options.bridge_materials);
        return Ok(());
    }

    let spec = build_spec(&args.filters, config, args.view)?;
    let engine = dataset.engine(config.viewport);
    let result = engine.apply(&spec);
    info!(
        "{} route number option(s) remain after filtering",
        result.route_number_options.len() - 1
    );
    print_options("route_num", &result.route_number_options);
    Ok(())
}

pub fn execute_config(args: &ConfigArgs) -> Result<()> {
    DashboardConfig::default()
        .save(&args.write)
        .with_context(|| format!("Writing default config to {:?}", args.write))?;
    info!("Default dashboard configuration written to {:?}", args.write);
    Ok(())
}

fn load_dataset(args: &DatasetArgs) -> Result<Dataset> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    Dataset::load(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading bridge dataset {:?}", args.input))
}

fn print_header(result: &FilterResult<'_>) {
    for line in summary_lines(&result.summary) {
        println!("{line}");
    }
    println!("{}", viewport_line(&result.viewport));
    println!();
}

fn print_options<T: std::fmt::Display>(name: &str, options: &[Choice<T>]) {
    println!("{name}:");
    for option in options {
        println!("  {option}");
    }
}

fn hover_row(bridge: &BridgeRecord) -> Vec<String> {
    let condition = |value: Option<u8>| value.map_or_else(String::new, |v| v.to_string());
    vec![
        bridge.feature_intersect.clone(),
        format!("{:.4}", bridge.latitude),
        format!("{:.4}", bridge.longitude),
        bridge.eval_rating.to_string(),
        bridge.eval_rating_verbose.clone(),
        condition(bridge.deck_condition),
        condition(bridge.superstructure_condition),
        condition(bridge.substructure_condition),
        bridge.bridge_type.clone(),
        bridge.year_built.to_string(),
        bridge.num_spans.to_string(),
        format!("{:.1}", bridge.max_span_length),
        format!("{:.1}", bridge.bridge_length),
        format!("{:.0}", bridge.marker_size()),
    ]
}
