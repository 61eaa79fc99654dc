//! The cleaned bridge dataset, loaded once and shared read-only.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use encoding_rs::Encoding;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    engine::{FilterEngine, ViewportSettings},
    filter::Choice,
    io_utils,
    record::{BridgeRecord, RouteType, UNRATED, pad_region_id, rating_label},
};

/// Older cleaned files persisted the unrated lookup key instead of `-1`.
const LEGACY_UNRATED: i8 = 10;

/// Initial option lists for the dashboard selectors, each ending in `All`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorOptions {
    pub states: Vec<Choice<String>>,
    pub route_types: Vec<Choice<RouteType>>,
    pub route_numbers: Vec<Choice<String>>,
    pub bridge_types: Vec<Choice<String>>,
    pub bridge_materials: Vec<Choice<String>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[BridgeRecord]>,
}

impl Dataset {
    pub fn from_records(records: Vec<BridgeRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Reads a cleaned dataset. Region ids are re-padded to five characters,
    /// a persisted rating of 10 is read as unrated, and each verbose rating
    /// must agree with its numeric rating.
    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(path, delimiter)?;
        let headers = StringRecord::from(io_utils::reader_headers(&mut reader, encoding)?);
        let mut records = Vec::new();
        for (row_idx, row) in reader.byte_records().enumerate() {
            let row_number = row_idx + 2;
            let row = row.with_context(|| format!("Reading row {row_number} of {path:?}"))?;
            let decoded = StringRecord::from(io_utils::decode_record(&row, encoding)?);
            let mut record: BridgeRecord = decoded
                .deserialize(Some(&headers))
                .with_context(|| format!("Parsing row {row_number} of {path:?}"))?;
            record.region_id = pad_region_id(&record.region_id);
            if record.eval_rating == LEGACY_UNRATED {
                record.eval_rating = UNRATED;
            }
            if rating_label(record.eval_rating) != Some(record.eval_rating_verbose.as_str()) {
                bail!(
                    "Row {row_number} of {path:?}: rating {} does not match label '{}'",
                    record.eval_rating,
                    record.eval_rating_verbose
                );
            }
            records.push(record);
        }
        info!("Loaded {} bridge record(s) from {:?}", records.len(), path);
        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[BridgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Engine sharing this dataset's records without copying them.
    pub fn engine(&self, viewport: ViewportSettings) -> FilterEngine {
        FilterEngine::new(Arc::clone(&self.records)).with_viewport(viewport)
    }

    pub fn options(&self) -> SelectorOptions {
        SelectorOptions {
            states: distinct(&self.records, |r| r.state_name.clone()),
            route_types: distinct(&self.records, |r| r.route_type),
            route_numbers: distinct(&self.records, |r| r.route_number.clone()),
            bridge_types: distinct(&self.records, |r| r.bridge_type.clone()),
            bridge_materials: distinct(&self.records, |r| r.bridge_material.clone()),
        }
    }
}

fn distinct<T, F>(records: &[BridgeRecord], key: F) -> Vec<Choice<T>>
where
    T: Eq + std::hash::Hash + Clone,
    F: Fn(&BridgeRecord) -> T,
{
    records
        .iter()
        .map(key)
        .unique()
        .map(Choice::Only)
        .chain(std::iter::once(Choice::All))
        .collect()
}
