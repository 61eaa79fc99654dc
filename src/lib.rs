pub mod clean;
pub mod cli;
pub mod codes;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod filter;
pub mod io_utils;
pub mod normalize;
pub mod record;
pub mod table;
pub mod view;

use std::{env, path::Path, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::DashboardConfig,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("bridge_map", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Clean(args) => clean::execute(args),
        Commands::Heatmap(args) => view::execute_heatmap(args, &load_config(config_path)?),
        Commands::Scatter(args) => view::execute_scatter(args, &load_config(config_path)?),
        Commands::Options(args) => view::execute_options(args, &load_config(config_path)?),
        Commands::Config(args) => view::execute_config(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let config = DashboardConfig::load_or_default(path)?;
    match path {
        Some(path) => info!("Using dashboard configuration {path:?}"),
        None => debug!("Using built-in dashboard configuration"),
    }
    Ok(config)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
