//! Raw survey rows to [`BridgeRecord`]s.
//!
//! Normalization runs in five steps: project the required raw fields (rows
//! with a blank required field are dropped as incomplete), keep only
//! Interstate / U.S. numbered / State routes, decode every categorical code
//! through the closed tables in [`crate::codes`], recode the structural
//! evaluation, and rename into the domain vocabulary.
//!
//! A code missing from its table fails that row only. Failures are collected
//! with the row index so the batch always completes (skip-and-report).

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use serde::Serialize;
use thiserror::Error;

use crate::{
    codes::{self, RATING_LABELS, UNRATED_KEY},
    record::{BridgeRecord, RouteType, UNRATED},
};

const UNRATED_SENTINEL: &str = "*";
const NOT_APPLICABLE: &str = "N";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawField {
    Latitude,
    Longitude,
    StateCode,
    CountyCode,
    RoutePrefix,
    RouteNumber,
    FeaturesIntersected,
    Owner,
    YearBuilt,
    ServiceOn,
    StructureKind,
    StructureType,
    ApproachKind,
    ApproachType,
    MainSpans,
    ApproachSpans,
    MaxSpanLength,
    StructureLength,
    DeckWidth,
    StructuralEval,
    DeckCondition,
    SuperstructureCondition,
    SubstructureCondition,
}

impl RawField {
    pub const ALL: [RawField; 23] = [
        RawField::Latitude,
        RawField::Longitude,
        RawField::StateCode,
        RawField::CountyCode,
        RawField::RoutePrefix,
        RawField::RouteNumber,
        RawField::FeaturesIntersected,
        RawField::Owner,
        RawField::YearBuilt,
        RawField::ServiceOn,
        RawField::StructureKind,
        RawField::StructureType,
        RawField::ApproachKind,
        RawField::ApproachType,
        RawField::MainSpans,
        RawField::ApproachSpans,
        RawField::MaxSpanLength,
        RawField::StructureLength,
        RawField::DeckWidth,
        RawField::StructuralEval,
        RawField::DeckCondition,
        RawField::SuperstructureCondition,
        RawField::SubstructureCondition,
    ];

    /// Column name in the upstream NBI export.
    pub fn column(self) -> &'static str {
        match self {
            RawField::Latitude => "LATDD",
            RawField::Longitude => "LONGDD",
            RawField::StateCode => "STATE_CODE",
            RawField::CountyCode => "COUNTY_COD",
            RawField::RoutePrefix => "ROUTE_PREF",
            RawField::RouteNumber => "ROUTE_NUMB",
            RawField::FeaturesIntersected => "FEATURES_D",
            RawField::Owner => "OWNER_022",
            RawField::YearBuilt => "YEAR_BUILT",
            RawField::ServiceOn => "SERVICE_ON",
            RawField::StructureKind => "STRUCTUR_2",
            RawField::StructureType => "STRUCTUR_3",
            RawField::ApproachKind => "APPR_KIND_",
            RawField::ApproachType => "APPR_TYPE_",
            RawField::MainSpans => "MAIN_UNIT_",
            RawField::ApproachSpans => "APPR_SPANS",
            RawField::MaxSpanLength => "MAX_SPAN_L",
            RawField::StructureLength => "STRUCTUR_4",
            RawField::DeckWidth => "DECK_WIDTH",
            RawField::StructuralEval => "STRUCTURAL",
            RawField::DeckCondition => "DECK_COND_",
            RawField::SuperstructureCondition => "SUPERSTRUC",
            RawField::SubstructureCondition => "SUBSTRUCTU",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(
            self,
            RawField::DeckCondition
                | RawField::SuperstructureCondition
                | RawField::SubstructureCondition
        )
    }
}

/// One row of the raw survey export, keyed by [`RawField`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    values: HashMap<RawField, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: RawField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: RawField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Trimmed value, or `None` when the field is absent or blank.
    pub fn get(&self, field: RawField) -> Option<&str> {
        self.values
            .get(&field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Column positions of the raw fields within a header row.
#[derive(Debug, Clone)]
pub struct RawLayout {
    positions: Vec<(RawField, usize)>,
}

impl RawLayout {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let mut positions = Vec::with_capacity(RawField::ALL.len());
        let mut missing = Vec::new();
        for field in RawField::ALL {
            match headers
                .iter()
                .position(|header| header.trim() == field.column())
            {
                Some(idx) => positions.push((field, idx)),
                None if field.is_required() => missing.push(field.column()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(anyhow!(
                "Raw file is missing required column(s): {}",
                missing.join(", ")
            ));
        }
        Ok(Self { positions })
    }

    pub fn record_from_row(&self, row: &[String]) -> RawRecord {
        let mut record = RawRecord::new();
        for (field, idx) in &self.positions {
            if let Some(value) = row.get(*idx) {
                record.set(*field, value.as_str());
            }
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unknown {field} code '{code}'")]
    UnknownCode { field: &'static str, code: String },
    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

impl NormalizeError {
    pub fn field(&self) -> &'static str {
        match self {
            NormalizeError::UnknownCode { field, .. }
            | NormalizeError::InvalidValue { field, .. } => *field,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            NormalizeError::UnknownCode { code, .. } => code,
            NormalizeError::InvalidValue { value, .. } => value,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            NormalizeError::UnknownCode { .. } => "unknown_code",
            NormalizeError::InvalidValue { .. } => "invalid_value",
        }
    }

    fn unknown(field: RawField, code: &str) -> Self {
        NormalizeError::UnknownCode {
            field: field.column(),
            code: code.to_string(),
        }
    }

    fn invalid(field: RawField, value: &str) -> Self {
        NormalizeError::InvalidValue {
            field: field.column(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeFailure {
    pub record_index: usize,
    pub error: NormalizeError,
}

impl NormalizeFailure {
    pub fn field(&self) -> &'static str {
        self.error.field()
    }

    pub fn code(&self) -> &str {
        self.error.code()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub read: usize,
    pub out_of_scope: usize,
    pub incomplete: usize,
    pub failed: usize,
    pub normalized: usize,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub stats: NormalizeStats,
    pub failures: Vec<NormalizeFailure>,
}

impl NormalizeReport {
    /// Failure counts per raw column, sorted by column name.
    pub fn failures_by_field(&self) -> Vec<(&'static str, usize)> {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for failure in &self.failures {
            *counts.entry(failure.field()).or_insert(0) += 1;
        }
        let mut counts = counts.into_iter().collect::<Vec<_>>();
        counts.sort_unstable();
        counts
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<BridgeRecord>,
    pub report: NormalizeReport,
}

enum Disposition {
    Kept(Box<BridgeRecord>),
    OutOfScope,
    Incomplete,
}

/// Streaming accumulator behind [`normalize`]; the `clean` command feeds it
/// one row at a time.
#[derive(Debug, Default)]
pub struct Normalizer {
    report: NormalizeReport,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, record_index: usize, raw: &RawRecord) -> Option<BridgeRecord> {
        let stats = &mut self.report.stats;
        stats.read += 1;
        match normalize_record(raw) {
            Ok(Disposition::Kept(record)) => {
                stats.normalized += 1;
                Some(*record)
            }
            Ok(Disposition::OutOfScope) => {
                stats.out_of_scope += 1;
                None
            }
            Ok(Disposition::Incomplete) => {
                stats.incomplete += 1;
                None
            }
            Err(error) => {
                stats.failed += 1;
                self.report.failures.push(NormalizeFailure {
                    record_index,
                    error,
                });
                None
            }
        }
    }

    pub fn stats(&self) -> NormalizeStats {
        self.report.stats
    }

    pub fn finish(self) -> NormalizeReport {
        self.report
    }
}

/// Normalizes a batch of raw rows. Never fails as a whole: rows with codes
/// outside the lookup tables are skipped and listed in the report.
pub fn normalize(raw_records: &[RawRecord]) -> NormalizeOutcome {
    let mut normalizer = Normalizer::new();
    let records = raw_records
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| normalizer.ingest(idx, raw))
        .collect();
    NormalizeOutcome {
        records,
        report: normalizer.finish(),
    }
}

fn normalize_record(raw: &RawRecord) -> Result<Disposition, NormalizeError> {
    if RawField::ALL
        .iter()
        .any(|field| field.is_required() && raw.get(*field).is_none())
    {
        return Ok(Disposition::Incomplete);
    }
    let required = |field: RawField| raw.get(field).unwrap_or_default();

    let route_code = parse_code(RawField::RoutePrefix, required(RawField::RoutePrefix))?;
    let route_type = match RouteType::from_code(route_code) {
        Some(route) if route.is_highway() => route,
        _ => return Ok(Disposition::OutOfScope),
    };

    let state_raw = required(RawField::StateCode);
    let state_code = parse_code(RawField::StateCode, state_raw)?;
    let (state_abbrev, state_name) = codes::state(state_code)
        .ok_or_else(|| NormalizeError::unknown(RawField::StateCode, state_raw))?;
    let county_raw = required(RawField::CountyCode);
    let county = parse_code(RawField::CountyCode, county_raw)?;
    if county > 999 {
        return Err(NormalizeError::invalid(RawField::CountyCode, county_raw));
    }

    let decode = |field: RawField,
                  table: fn(u16) -> Option<&'static str>|
     -> Result<String, NormalizeError> {
        let code = required(field);
        table(parse_code(field, code)?)
            .map(str::to_string)
            .ok_or_else(|| NormalizeError::unknown(field, code))
    };
    let owner = decode(RawField::Owner, codes::owner)?;
    let service_type = decode(RawField::ServiceOn, codes::service_type)?;
    let bridge_material = decode(RawField::StructureKind, codes::material)?;
    let bridge_type = decode(RawField::StructureType, codes::structure_type)?;
    let approach_material = decode(RawField::ApproachKind, codes::material)?;
    let approach_type = decode(RawField::ApproachType, codes::structure_type)?;

    let (eval_rating, eval_rating_verbose) =
        decode_rating(required(RawField::StructuralEval))?;

    let measure = |field: RawField| parse_measure(field, required(field));
    let latitude = measure(RawField::Latitude)?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(NormalizeError::invalid(
            RawField::Latitude,
            required(RawField::Latitude),
        ));
    }
    let longitude = measure(RawField::Longitude)?;
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(NormalizeError::invalid(
            RawField::Longitude,
            required(RawField::Longitude),
        ));
    }
    let bridge_length = measure(RawField::StructureLength)?;
    if bridge_length < 0.0 {
        return Err(NormalizeError::invalid(
            RawField::StructureLength,
            required(RawField::StructureLength),
        ));
    }
    let year_raw = required(RawField::YearBuilt);
    let year_built = i32::try_from(parse_whole(RawField::YearBuilt, year_raw)?)
        .map_err(|_| NormalizeError::invalid(RawField::YearBuilt, year_raw))?;

    let record = BridgeRecord {
        region_id: format!("{:05}", u32::from(state_code) * 1000 + u32::from(county)),
        state_abbrev: state_abbrev.to_string(),
        state_name: state_name.to_string(),
        latitude,
        longitude,
        route_type,
        route_number: canonical_route_number(required(RawField::RouteNumber)),
        feature_intersect: clean_feature_text(required(RawField::FeaturesIntersected)),
        owner,
        year_built,
        service_type,
        bridge_material,
        bridge_type,
        approach_material,
        approach_type,
        num_spans: parse_count(RawField::MainSpans, required(RawField::MainSpans))?,
        num_approach_spans: parse_count(
            RawField::ApproachSpans,
            required(RawField::ApproachSpans),
        )?,
        max_span_length: measure(RawField::MaxSpanLength)?,
        bridge_length,
        bridge_width: measure(RawField::DeckWidth)?,
        eval_rating,
        eval_rating_verbose: eval_rating_verbose.to_string(),
        deck_condition: parse_condition(raw, RawField::DeckCondition)?,
        superstructure_condition: parse_condition(raw, RawField::SuperstructureCondition)?,
        substructure_condition: parse_condition(raw, RawField::SubstructureCondition)?,
    };
    Ok(Disposition::Kept(Box::new(record)))
}

/// Recodes the structural evaluation. The unrated sentinel looks up the
/// label table at slot 10 but persists as `-1`.
fn decode_rating(raw: &str) -> Result<(i8, &'static str), NormalizeError> {
    if raw == UNRATED_SENTINEL {
        return Ok((UNRATED, RATING_LABELS[UNRATED_KEY]));
    }
    match raw.parse::<u8>() {
        Ok(rating) if rating <= 9 => Ok((rating as i8, RATING_LABELS[rating as usize])),
        _ => Err(NormalizeError::unknown(RawField::StructuralEval, raw)),
    }
}

fn parse_condition(raw: &RawRecord, field: RawField) -> Result<Option<u8>, NormalizeError> {
    match raw.get(field) {
        None => Ok(None),
        Some(value) if value.eq_ignore_ascii_case(NOT_APPLICABLE) => Ok(None),
        Some(value) => match value.parse::<u8>() {
            Ok(rating) if rating <= 9 => Ok(Some(rating)),
            _ => Err(NormalizeError::invalid(field, value)),
        },
    }
}

fn parse_whole(field: RawField, value: &str) -> Result<i64, NormalizeError> {
    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(parsed);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(parsed as i64),
        _ => Err(NormalizeError::invalid(field, value)),
    }
}

fn parse_code(field: RawField, value: &str) -> Result<u16, NormalizeError> {
    u16::try_from(parse_whole(field, value)?).map_err(|_| NormalizeError::unknown(field, value))
}

fn parse_count(field: RawField, value: &str) -> Result<u32, NormalizeError> {
    u32::try_from(parse_whole(field, value)?).map_err(|_| NormalizeError::invalid(field, value))
}

fn parse_measure(field: RawField, value: &str) -> Result<f64, NormalizeError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(NormalizeError::invalid(field, value)),
    }
}

/// Purely numeric route numbers lose their zero padding (`00095` -> `95`).
pub fn canonical_route_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

fn clean_feature_text(raw: &str) -> String {
    raw.trim().trim_matches('\'').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interstate_row() -> RawRecord {
        RawRecord::new()
            .with(RawField::Latitude, "40.7")
            .with(RawField::Longitude, "-74.0")
            .with(RawField::StateCode, "36")
            .with(RawField::CountyCode, "61")
            .with(RawField::RoutePrefix, "1")
            .with(RawField::RouteNumber, "00095")
            .with(RawField::FeaturesIntersected, "'HARLEM RIVER'")
            .with(RawField::Owner, "1")
            .with(RawField::YearBuilt, "1962")
            .with(RawField::ServiceOn, "1")
            .with(RawField::StructureKind, "3")
            .with(RawField::StructureType, "2")
            .with(RawField::ApproachKind, "0")
            .with(RawField::ApproachType, "0")
            .with(RawField::MainSpans, "3")
            .with(RawField::ApproachSpans, "0")
            .with(RawField::MaxSpanLength, "45.1")
            .with(RawField::StructureLength, "120.4")
            .with(RawField::DeckWidth, "30.2")
            .with(RawField::StructuralEval, "6")
    }

    #[test]
    fn decode_rating_maps_sentinel_to_unrated() {
        assert_eq!(decode_rating("*").unwrap(), (UNRATED, "None"));
        assert_eq!(decode_rating("0").unwrap(), (0, "Failed"));
        assert_eq!(decode_rating("9").unwrap(), (9, "Excellent"));
        assert!(decode_rating("10").is_err());
        assert!(decode_rating("X").is_err());
    }

    #[test]
    fn canonical_route_number_strips_numeric_padding() {
        assert_eq!(canonical_route_number("00095"), "95");
        assert_eq!(canonical_route_number("00000"), "0");
        assert_eq!(canonical_route_number(" 9A "), "9A");
    }

    #[test]
    fn parse_code_accepts_integral_floats() {
        assert_eq!(parse_code(RawField::Owner, "27.0").unwrap(), 27);
        assert!(parse_code(RawField::Owner, "27.5").is_err());
        assert!(parse_code(RawField::Owner, "-3").is_err());
    }

    #[test]
    fn normalize_record_builds_domain_fields() {
        let Disposition::Kept(record) = normalize_record(&interstate_row()).unwrap() else {
            panic!("expected record to be kept");
        };
        assert_eq!(record.region_id, "36061");
        assert_eq!(record.state_abbrev, "NY");
        assert_eq!(record.route_number, "95");
        assert_eq!(record.feature_intersect, "HARLEM RIVER");
        assert_eq!(record.bridge_material, "Steel");
        assert_eq!(record.approach_type, "Other");
        assert_eq!(record.eval_rating_verbose, "Satisfactory");
        assert_eq!(record.deck_condition, None);
    }

    #[test]
    fn conditions_accept_not_applicable() {
        let raw = interstate_row()
            .with(RawField::DeckCondition, "N")
            .with(RawField::SuperstructureCondition, "7");
        let Disposition::Kept(record) = normalize_record(&raw).unwrap() else {
            panic!("expected record to be kept");
        };
        assert_eq!(record.deck_condition, None);
        assert_eq!(record.superstructure_condition, Some(7));

        let bad = interstate_row().with(RawField::SubstructureCondition, "Q");
        assert!(matches!(
            normalize_record(&bad),
            Err(NormalizeError::InvalidValue { field: "SUBSTRUCTU", .. })
        ));
    }
}
