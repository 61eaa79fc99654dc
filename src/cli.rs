use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{config::View, filter::Range};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore US highway bridges from the National Bridge Inventory",
    long_about = None
)]
pub struct Cli {
    /// Dashboard configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a raw NBI export into the cleaned bridge dataset
    Clean(CleanArgs),
    /// Mean evaluation rating and bridge count per county
    Heatmap(HeatmapArgs),
    /// Per-bridge records matching the filters
    Scatter(ScatterArgs),
    /// List selector options, or the route numbers left by a set of filters
    Options(OptionsArgs),
    /// Write the default dashboard configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Raw NBI export (CSV)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Cleaned output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write rejected rows (index, field, code) to this CSV file
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Limit number of raw rows read
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DatasetArgs {
    /// Cleaned bridge dataset
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

/// Selector and slider values; anything omitted keeps the view's default.
#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// State name to include (repeatable; `All` clears the restriction)
    #[arg(long = "state", action = clap::ArgAction::Append)]
    pub states: Vec<String>,
    /// Route type such as `Interstate highway`, or `All`
    #[arg(long = "route-type")]
    pub route_type: Option<String>,
    /// Route number, or `All`
    #[arg(long = "route-num")]
    pub route_number: Option<String>,
    /// Bridge structure type such as `Slab`, or `All`
    #[arg(long = "bridge-type")]
    pub bridge_type: Option<String>,
    /// Year built range `LOW:HIGH`
    #[arg(long = "years", value_parser = parse_year_range)]
    pub years: Option<Range<i32>>,
    /// Length slider range `LOW:HIGH` in log10 meters (0 means zero)
    #[arg(long = "length", value_parser = parse_length_range)]
    pub length: Option<Range<f64>>,
    /// Number of spans range `LOW:HIGH`
    #[arg(long = "spans", value_parser = parse_span_range)]
    pub spans: Option<Range<u32>>,
    /// Evaluation rating range `LOW:HIGH` (-1 includes unrated bridges)
    #[arg(long = "rating", value_parser = parse_rating_range, allow_hyphen_values = true)]
    pub ratings: Option<Range<i8>>,
}

impl FilterArgs {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.route_type.is_none()
            && self.route_number.is_none()
            && self.bridge_type.is_none()
            && self.years.is_none()
            && self.length.is_none()
            && self.spans.is_none()
            && self.ratings.is_none()
    }
}

#[derive(Debug, Args)]
pub struct HeatmapArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Emit the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ScatterArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output CSV file for the selected bridges (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Render the selected bridges as a table instead of CSV
    #[arg(long)]
    pub table: bool,
    /// Limit number of bridges emitted
    #[arg(long)]
    pub limit: Option<usize>,
    /// Emit the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// View whose defaults seed the filters
    #[arg(long, value_enum, default_value = "heatmap")]
    pub view: View,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file
    #[arg(long = "write")]
    pub write: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

fn parse_year_range(value: &str) -> Result<Range<i32>, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

fn parse_length_range(value: &str) -> Result<Range<f64>, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

fn parse_span_range(value: &str) -> Result<Range<u32>, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

fn parse_rating_range(value: &str) -> Result<Range<i8>, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn filter_flags_parse_into_ranges() {
        let cli = Cli::try_parse_from([
            "bridge-map",
            "heatmap",
            "-i",
            "clean.csv",
            "--state",
            "Ohio",
            "--state",
            "Utah",
            "--rating",
            "-1:9",
            "--length",
            "0:2.5",
        ])
        .unwrap();
        let Commands::Heatmap(args) = cli.command else {
            panic!("expected heatmap command");
        };
        assert_eq!(args.filters.states, vec!["Ohio", "Utah"]);
        assert_eq!(args.filters.ratings, Some(Range::new(-1, 9)));
        assert_eq!(args.filters.length, Some(Range::new(0.0, 2.5)));
        assert!(args.filters.years.is_none());
    }
}
