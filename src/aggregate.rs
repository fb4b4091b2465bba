//! Chart-ready aggregates over a list of events.
//!
//! Every transform is a single pass over its input and returns an empty
//! vector for empty input. Grouped outputs keep first-seen key order so a
//! chart lists buckets and regions in the order the feed produced them.

use chrono::{DateTime, FixedOffset, Local, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::EventRecord;
use crate::region::region_key;

/// Time zone used when formatting event times for a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The host's local zone
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Build a zone from an offset in minutes east of UTC.
    ///
    /// `None` selects the host's local zone.
    #[must_use]
    pub fn from_offset_minutes(minutes: Option<i32>) -> Option<Self> {
        match minutes {
            None => Some(Self::Local),
            Some(m) => FixedOffset::east_opt(m.checked_mul(60)?).map(Self::Fixed),
        }
    }

    /// Format an instant in this zone.
    #[must_use]
    pub fn format(&self, instant: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            Self::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
        }
    }

    fn format_millis(&self, millis: i64, fmt: &str) -> String {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|t| self.format(t, fmt))
            .unwrap_or_else(|| "unknown".into())
    }
}

/// Count of events whose magnitude floors to `bucket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagnitudeBucket {
    pub bucket: i64,
    pub count: usize,
}

/// One event's magnitude at its local `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeAtTime {
    pub time: String,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthMagnitude {
    pub depth: f64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDepth {
    pub region: String,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionAverage {
    pub region: String,
    pub avg_magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

/// One row of the largest-events table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargestRow {
    pub date: String,
    pub place: Option<String>,
    pub magnitude: f64,
    pub depth: f64,
    pub url: Option<String>,
}

/// Ordering of the largest-events table by magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The order a table header toggles to.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("unknown sort order: {s} (expected: asc, desc)")),
        }
    }
}

/// Floor a magnitude to its histogram bucket.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn magnitude_bucket(magnitude: f64) -> i64 {
    magnitude.floor() as i64
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Histogram of events per integer magnitude.
#[must_use]
pub fn magnitude_frequency(events: &[EventRecord]) -> Vec<MagnitudeBucket> {
    let mut groups: IndexMap<i64, usize> = IndexMap::new();
    for event in events {
        *groups.entry(magnitude_bucket(event.magnitude())).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(bucket, count)| MagnitudeBucket { bucket, count })
        .collect()
}

/// One row per event, in input order.
#[must_use]
pub fn magnitude_over_time(events: &[EventRecord], zone: &DisplayZone) -> Vec<MagnitudeAtTime> {
    events
        .iter()
        .map(|e| MagnitudeAtTime {
            time: zone.format_millis(e.time, "%H:%M"),
            magnitude: e.magnitude(),
        })
        .collect()
}

/// One (depth, magnitude) pair per event. Depth is taken as published.
#[must_use]
pub fn depth_vs_magnitude(events: &[EventRecord]) -> Vec<DepthMagnitude> {
    events
        .iter()
        .map(|e| DepthMagnitude {
            depth: e.depth_km,
            magnitude: e.magnitude(),
        })
        .collect()
}

/// One (region, depth) pair per event, in input order.
#[must_use]
pub fn depth_by_region(events: &[EventRecord]) -> Vec<RegionDepth> {
    events
        .iter()
        .map(|e| RegionDepth {
            region: region_key(e.place.as_deref()).to_string(),
            depth: e.depth_km,
        })
        .collect()
}

/// Mean magnitude per region, rounded to two decimals.
#[must_use]
pub fn average_magnitude_by_region(events: &[EventRecord]) -> Vec<RegionAverage> {
    let mut groups: IndexMap<&str, (f64, usize)> = IndexMap::new();
    for event in events {
        let (sum, count) = groups
            .entry(region_key(event.place.as_deref()))
            .or_default();
        *sum += event.magnitude();
        *count += 1;
    }
    groups
        .into_iter()
        .map(|(region, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / count as f64;
            RegionAverage {
                region: region.to_string(),
                avg_magnitude: round2(mean),
            }
        })
        .collect()
}

/// Number of events per region.
#[must_use]
pub fn count_by_region(events: &[EventRecord]) -> Vec<RegionCount> {
    let mut groups: IndexMap<&str, usize> = IndexMap::new();
    for event in events {
        *groups.entry(region_key(event.place.as_deref())).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(region, count)| RegionCount {
            region: region.to_string(),
            count,
        })
        .collect()
}

/// Rows for the largest-events table, sorted by magnitude.
///
/// The sort is stable, so equal magnitudes keep feed order.
#[must_use]
pub fn largest_events(events: &[EventRecord], order: SortOrder, zone: &DisplayZone) -> Vec<LargestRow> {
    let mut sorted: Vec<&EventRecord> = events.iter().collect();
    match order {
        SortOrder::Asc => sorted.sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude())),
        SortOrder::Desc => sorted.sort_by(|a, b| b.magnitude().total_cmp(&a.magnitude())),
    }
    sorted
        .into_iter()
        .map(|e| LargestRow {
            date: zone.format_millis(e.time, "%Y-%m-%d"),
            place: e.place.clone(),
            magnitude: e.magnitude(),
            depth: e.depth_km,
            url: e.url.clone(),
        })
        .collect()
}

/// Everything the seismic-patterns dashboard draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub magnitude_frequency: Vec<MagnitudeBucket>,
    pub magnitude_over_time: Vec<MagnitudeAtTime>,
    pub depth_vs_magnitude: Vec<DepthMagnitude>,
    pub depth_by_region: Vec<RegionDepth>,
    pub average_magnitude_by_region: Vec<RegionAverage>,
    pub count_by_region: Vec<RegionCount>,
    pub largest: Vec<LargestRow>,
}

impl Dashboard {
    /// Derive every chart from the recent feed and the table from the
    /// historical query.
    #[must_use]
    pub fn build(
        recent: &[EventRecord],
        historical: &[EventRecord],
        order: SortOrder,
        zone: &DisplayZone,
    ) -> Self {
        Self {
            magnitude_frequency: magnitude_frequency(recent),
            magnitude_over_time: magnitude_over_time(recent, zone),
            depth_vs_magnitude: depth_vs_magnitude(recent),
            depth_by_region: depth_by_region(recent),
            average_magnitude_by_region: average_magnitude_by_region(recent),
            count_by_region: count_by_region(recent),
            largest: largest_events(historical, order, zone),
        }
    }
}
