//! Filter and aggregate engine behind both dashboard views.
//!
//! [`FilterEngine::apply`] runs one full scan of the immutable base set per
//! call and returns everything a view renders: the filtered records, the
//! dependent route-number options, per-region aggregates, a viewport, and
//! summary values. The engine holds no mutable state, so one instance can
//! serve both views (and overlapping calls) over the same shared records.
//!
//! Two aggregation rules are reproduced as observed in the dashboard:
//!
//! - a region's `count` includes unrated records while its mean rating does
//!   not;
//! - the summary mean rating is the mean of the per-region means, and the
//!   viewport centers on the aggregated rows rather than on raw records.

use std::{collections::BTreeMap, sync::Arc};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    filter::{Choice, FilterSpec, Selection},
    record::BridgeRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Map framing rules. Single-state deployments raise `selection_zoom` to 5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub default_center: Coordinate,
    pub default_zoom: u8,
    pub selection_zoom: u8,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            default_center: Coordinate {
                lat: 38.0,
                lon: -95.7129,
            },
            default_zoom: 3,
            selection_zoom: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAggregate {
    pub region_id: String,
    pub state_abbrev: String,
    pub state_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub eval_rating: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    /// `None` when no rated record survived the filters.
    pub mean_rating: Option<f64>,
    pub length_range_meters: (f64, f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterResult<'a> {
    pub filtered: Vec<&'a BridgeRecord>,
    /// Distinct route numbers left after every other filter, then `All`.
    pub route_number_options: Vec<Choice<String>>,
    pub region_aggregates: Vec<RegionAggregate>,
    pub viewport: Viewport,
    pub summary: Summary,
}

#[derive(Debug, Clone)]
pub struct FilterEngine {
    base: Arc<[BridgeRecord]>,
    viewport: ViewportSettings,
}

impl FilterEngine {
    pub fn new(base: impl Into<Arc<[BridgeRecord]>>) -> Self {
        Self {
            base: base.into(),
            viewport: ViewportSettings::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: ViewportSettings) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn records(&self) -> &[BridgeRecord] {
        &self.base
    }

    pub fn apply(&self, spec: &FilterSpec) -> FilterResult<'_> {
        let (filtered, route_number_options) = if spec.is_degenerate() {
            debug!("Inverted or NaN range in filter spec; returning an empty selection");
            (Vec::new(), vec![Choice::All])
        } else {
            self.scan(spec)
        };

        let region_aggregates = aggregate_regions(&filtered);
        let viewport = derive_viewport(&spec.regions, &region_aggregates, &self.viewport);
        let length = spec.length_meters();
        let summary = Summary {
            count: filtered.len(),
            mean_rating: mean(region_aggregates.iter().map(|row| row.eval_rating)),
            length_range_meters: (length.low, length.high),
        };
        debug!(
            "Filter selected {} of {} record(s) across {} region(s)",
            summary.count,
            self.base.len(),
            region_aggregates.len()
        );

        FilterResult {
            filtered,
            route_number_options,
            region_aggregates,
            viewport,
            summary,
        }
    }

    fn scan(&self, spec: &FilterSpec) -> (Vec<&BridgeRecord>, Vec<Choice<String>>) {
        let candidates = self
            .base
            .iter()
            .filter(|record| spec.matches_attributes(record))
            .collect::<Vec<_>>();
        let route_number_options = route_number_options(&candidates);
        debug!(
            "{} record(s) pass the attribute filters; {} route number option(s)",
            candidates.len(),
            route_number_options.len() - 1
        );
        let filtered = if spec.route_number.is_all() {
            candidates
        } else {
            candidates
                .into_iter()
                .filter(|record| spec.matches_route_number(record))
                .collect()
        };
        (filtered, route_number_options)
    }
}

/// Distinct route numbers in first-appearance order, followed by `All`.
pub fn route_number_options(records: &[&BridgeRecord]) -> Vec<Choice<String>> {
    let mut options = records
        .iter()
        .map(|record| record.route_number.as_str())
        .unique()
        .map(|number| Choice::Only(number.to_string()))
        .collect::<Vec<_>>();
    options.push(Choice::All);
    options
}

#[derive(Default)]
struct RegionAccumulator<'a> {
    state_abbrev: &'a str,
    state_name: &'a str,
    latitude: f64,
    longitude: f64,
    rating: f64,
    rated: usize,
    total: usize,
}

/// Groups rated records by region id, ordered by region id. Regions whose
/// records are all unrated produce no row.
pub fn aggregate_regions(filtered: &[&BridgeRecord]) -> Vec<RegionAggregate> {
    let mut groups: BTreeMap<&str, RegionAccumulator<'_>> = BTreeMap::new();
    for record in filtered {
        let group = groups
            .entry(record.region_id.as_str())
            .or_insert_with(|| RegionAccumulator {
                state_abbrev: &record.state_abbrev,
                state_name: &record.state_name,
                ..RegionAccumulator::default()
            });
        group.total += 1;
        if record.is_rated() {
            group.rated += 1;
            group.latitude += record.latitude;
            group.longitude += record.longitude;
            group.rating += f64::from(record.eval_rating);
        }
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.rated > 0)
        .map(|(region_id, group)| {
            let rated = group.rated as f64;
            RegionAggregate {
                region_id: region_id.to_string(),
                state_abbrev: group.state_abbrev.to_string(),
                state_name: group.state_name.to_string(),
                latitude: group.latitude / rated,
                longitude: group.longitude / rated,
                eval_rating: group.rating / rated,
                count: group.total,
            }
        })
        .collect()
}

/// Unrestricted region selections frame the default view. A restricted one
/// centers on the aggregated rows, falling back to the default view when
/// there are none.
pub fn derive_viewport(
    regions: &Selection<String>,
    aggregates: &[RegionAggregate],
    settings: &ViewportSettings,
) -> Viewport {
    let fallback = Viewport {
        center: settings.default_center,
        zoom: settings.default_zoom,
    };
    if regions.is_all() {
        return fallback;
    }
    match (
        mean(aggregates.iter().map(|row| row.latitude)),
        mean(aggregates.iter().map(|row| row.longitude)),
    ) {
        (Some(lat), Some(lon)) => Viewport {
            center: Coordinate { lat, lon },
            zoom: settings.selection_zoom,
        },
        _ => fallback,
    }
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
