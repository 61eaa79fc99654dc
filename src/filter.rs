use std::{borrow::Borrow, collections::BTreeSet, fmt::Display, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::record::{BridgeRecord, RouteType, UNRATED};

/// Selector token meaning "no restriction".
pub const ALL_SENTINEL: &str = "All";

/// Multi-select filter value. An empty `Specific` set restricts nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T: Ord> {
    All,
    Specific(BTreeSet<T>),
}

impl<T: Ord> Selection<T> {
    pub fn is_all(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Specific(values) => values.is_empty(),
        }
    }

    pub fn matches<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Selection::All => true,
            Selection::Specific(values) => values.is_empty() || values.contains(value),
        }
    }
}

impl Selection<String> {
    /// Builds a selection from selector tokens; any `All` token wins.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.eq_ignore_ascii_case(ALL_SENTINEL) {
                return Selection::All;
            }
            if !token.is_empty() {
                values.insert(token.to_string());
            }
        }
        if values.is_empty() {
            Selection::All
        } else {
            Selection::Specific(values)
        }
    }
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

/// Single-select filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn matches<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        match self {
            Choice::All => true,
            Choice::Only(expected) => expected.borrow() == value,
        }
    }
}

impl<T> Choice<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T: FromStr> Choice<T> {
    pub fn parse(token: &str) -> Result<Self, T::Err> {
        let trimmed = token.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            Ok(Choice::All)
        } else {
            trimmed.parse().map(Choice::Only)
        }
    }
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: Display> Display for Choice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::All => f.write_str(ALL_SENTINEL),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

/// Inclusive `[low, high]` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub low: T,
    pub high: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    /// `false` when `low > high` or a bound is not comparable (NaN).
    pub fn is_valid(&self) -> bool {
        matches!(
            self.low.partial_cmp(&self.high),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        )
    }

    pub fn contains(&self, value: T) -> bool {
        self.low <= value && value <= self.high
    }
}

impl<T: FromStr> FromStr for Range<T>
where
    T::Err: Display,
{
    type Err = anyhow::Error;

    /// Parses `LOW:HIGH` (or `LOW..HIGH`).
    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (low, high) = trimmed
            .split_once("..")
            .or_else(|| trimmed.split_once(':'))
            .ok_or_else(|| anyhow!("Range '{trimmed}' must look like LOW:HIGH"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<T>()
                .map_err(|err| anyhow!("Invalid range bound '{}': {err}", part.trim()))
        };
        Ok(Range {
            low: parse(low)?,
            high: parse(high)?,
        })
    }
}

/// Maps a raw length-slider value to meters: `0` stays `0`, anything else
/// becomes `10^v`.
pub fn transform_length(raw: f64) -> f64 {
    if raw == 0.0 { 0.0 } else { 10f64.powf(raw) }
}

/// Full extents of every range control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderDomains {
    pub years: Range<i32>,
    pub length: Range<f64>,
    pub spans: Range<u32>,
    pub ratings: Range<i8>,
}

impl Default for SliderDomains {
    fn default() -> Self {
        Self {
            years: Range::new(1697, 2023),
            length: Range::new(0.0, 5.0),
            spans: Range::new(0, 771),
            ratings: Range::new(UNRATED, 9),
        }
    }
}

/// One view's filter state, built fresh for every filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    /// State names; union semantics across the set.
    pub regions: Selection<String>,
    pub route_type: Choice<RouteType>,
    pub route_number: Choice<String>,
    pub bridge_type: Choice<String>,
    pub years: Range<i32>,
    /// Raw slider units; see [`transform_length`].
    pub length: Range<f64>,
    pub spans: Range<u32>,
    /// A low bound of `-1` admits unrated records.
    pub ratings: Range<i8>,
}

impl FilterSpec {
    /// Spec that admits every record within `domains`.
    pub fn unrestricted(domains: &SliderDomains) -> Self {
        Self {
            regions: Selection::All,
            route_type: Choice::All,
            route_number: Choice::All,
            bridge_type: Choice::All,
            years: domains.years,
            length: domains.length,
            spans: domains.spans,
            ratings: domains.ratings,
        }
    }

    pub fn length_meters(&self) -> Range<f64> {
        Range::new(
            transform_length(self.length.low),
            transform_length(self.length.high),
        )
    }

    /// True when any range is inverted or NaN; such a spec matches nothing.
    pub fn is_degenerate(&self) -> bool {
        !(self.years.is_valid()
            && self.length.is_valid()
            && self.spans.is_valid()
            && self.ratings.is_valid())
    }

    /// Every predicate except the route number, in evaluation order.
    pub fn matches_attributes(&self, record: &BridgeRecord) -> bool {
        let length = self.length_meters();
        self.regions.matches(record.state_name.as_str())
            && self.route_type.matches(&record.route_type)
            && self.bridge_type.matches(record.bridge_type.as_str())
            && self.years.contains(record.year_built)
            && length.contains(record.bridge_length)
            && self.spans.contains(record.num_spans)
            && self.ratings.contains(record.eval_rating)
    }

    pub fn matches_route_number(&self, record: &BridgeRecord) -> bool {
        self.route_number.matches(record.route_number.as_str())
    }
}
