//! Dashboard configuration.
//!
//! A YAML file supplies the slider extents, map framing, and the starting
//! filter state of each view. Every section is optional; missing values fall
//! back to the dashboard defaults.
//!
//! ```yaml
//! sliders:
//!   years: { low: 1697, high: 2023 }
//! viewport:
//!   selection_zoom: 5
//! scatter:
//!   route_type: Interstate highway
//! ```

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    engine::ViewportSettings,
    filter::{ALL_SENTINEL, Choice, FilterSpec, Selection, SliderDomains},
    record::RouteType,
};

const MAX_ZOOM: u8 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum View {
    Heatmap,
    Scatter,
}

/// Starting selector values for one view; `All` means unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub states: Vec<String>,
    pub route_type: String,
    pub route_number: String,
    pub bridge_type: String,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            states: vec![ALL_SENTINEL.to_string()],
            route_type: ALL_SENTINEL.to_string(),
            route_number: ALL_SENTINEL.to_string(),
            bridge_type: ALL_SENTINEL.to_string(),
        }
    }
}

impl ViewDefaults {
    pub fn to_spec(&self, domains: &SliderDomains) -> Result<FilterSpec> {
        Ok(FilterSpec {
            regions: Selection::from_tokens(&self.states),
            route_type: Choice::<RouteType>::parse(&self.route_type)?,
            route_number: Choice::parse(&self.route_number)?,
            bridge_type: Choice::parse(&self.bridge_type)?,
            ..FilterSpec::unrestricted(domains)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sliders: SliderDomains,
    pub viewport: ViewportSettings,
    pub heatmap: ViewDefaults,
    pub scatter: ViewDefaults,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sliders: SliderDomains::default(),
            viewport: ViewportSettings::default(),
            heatmap: ViewDefaults::default(),
            scatter: ViewDefaults {
                route_type: RouteType::Interstate.label().to_string(),
                ..ViewDefaults::default()
            },
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .with_context(|| format!("Reading config file {path:?}"))?;
        let config: DashboardConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config
            .validate()
            .with_context(|| format!("Validating config file {path:?}"))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing config")?;
        let mut file =
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        file.write_all(serialized.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let sliders = &self.sliders;
        if !sliders.years.is_valid() {
            bail!("Year slider low bound exceeds its high bound");
        }
        if !sliders.length.is_valid() {
            bail!("Length slider low bound exceeds its high bound");
        }
        if !sliders.spans.is_valid() {
            bail!("Span slider low bound exceeds its high bound");
        }
        if !sliders.ratings.is_valid() {
            bail!("Rating slider low bound exceeds its high bound");
        }
        for (name, zoom) in [
            ("default_zoom", self.viewport.default_zoom),
            ("selection_zoom", self.viewport.selection_zoom),
        ] {
            if zoom > MAX_ZOOM {
                bail!("Viewport {name} {zoom} is above the maximum of {MAX_ZOOM}");
            }
        }
        for view in [View::Heatmap, View::Scatter] {
            self.view_spec(view)?;
        }
        Ok(())
    }

    pub fn view_defaults(&self, view: View) -> &ViewDefaults {
        match view {
            View::Heatmap => &self.heatmap,
            View::Scatter => &self.scatter,
        }
    }

    /// Starting filter spec for `view`.
    pub fn view_spec(&self, view: View) -> Result<FilterSpec> {
        self.view_defaults(view)
            .to_spec(&self.sliders)
            .with_context(|| format!("Default filters for the {view:?} view"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_defaults_to_interstates() {
        let config = DashboardConfig::default();
        let spec = config.view_spec(View::Scatter).unwrap();
        assert_eq!(spec.route_type, Choice::Only(RouteType::Interstate));
        let heatmap = config.view_spec(View::Heatmap).unwrap();
        assert_eq!(heatmap, FilterSpec::unrestricted(&config.sliders));
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "viewport:\n  selection_zoom: 5\nheatmap:\n  states: [Ohio]\n";
        let config: DashboardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.viewport.selection_zoom, 5);
        assert_eq!(config.viewport.default_zoom, 3);
        assert_eq!(config.heatmap.states, vec!["Ohio".to_string()]);
        assert_eq!(config.heatmap.route_type, "All");
        assert_eq!(config.sliders, SliderDomains::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_sliders_and_bad_route_types() {
        let mut config = DashboardConfig::default();
        config.sliders.years.low = 2050;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.heatmap.route_type = "Toll road".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.viewport.selection_zoom = 30;
        assert!(config.validate().is_err());
    }
}
