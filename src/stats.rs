//! Descriptive statistics over a filtered [`TripTable`].
//!
//! Every report returns `None` for a table without trips.

use std::collections::BTreeMap;

use crate::data::model::{CellValue, TripTable};

// ---------------------------------------------------------------------------
// Aggregation primitives
// ---------------------------------------------------------------------------

/// Count each distinct value, most frequent first.
/// Equal counts stay in ascending value order.
pub fn value_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut counts: Vec<(K, usize)> = counts.into_iter().collect();
    // stable sort keeps the BTreeMap's key order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent value; the smallest one wins a tie. `None` for no input.
pub fn mode<K, I>(values: I) -> Option<K>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    value_counts(values).into_iter().next().map(|(k, _)| k)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TimeReport {
    pub month: u32,
    pub week_day: &'static str,
    pub hour: u32,
}

/// Most frequent month, weekday and start hour.
pub fn time_stats(table: &TripTable) -> Option<TimeReport> {
    Some(TimeReport {
        month: mode(table.trips.iter().map(|t| t.month))?,
        // by name, so ties resolve alphabetically
        week_day: mode(table.trips.iter().map(|t| t.week_day_name()))?,
        hour: mode(table.trips.iter().map(|t| t.hour()))?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub start: String,
    pub end: String,
    /// Most frequent (start, end) combination, counted jointly.
    pub route: (String, String),
}

pub fn station_stats(table: &TripTable) -> Option<StationReport> {
    let start = mode(table.trips.iter().map(|t| t.start_station.as_str()))?;
    let end = mode(table.trips.iter().map(|t| t.end_station.as_str()))?;
    let (route_start, route_end) = mode(
        table
            .trips
            .iter()
            .map(|t| (t.start_station.as_str(), t.end_station.as_str())),
    )?;

    Some(StationReport {
        start: start.to_string(),
        end: end.to_string(),
        route: (route_start.to_string(), route_end.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationReport {
    /// Seconds.
    pub total: f64,
    /// Seconds.
    pub mean: f64,
}

pub fn trip_duration_stats(table: &TripTable) -> Option<DurationReport> {
    if table.is_empty() {
        return None;
    }
    let total: f64 = table.trips.iter().map(|t| t.duration).sum();
    Some(DurationReport {
        total,
        mean: total / table.len() as f64,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirthYearStats {
    pub most_common: i64,
    pub most_recent: i64,
    pub earliest: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Demographics {
    /// `None` when the source has no gender column. Missing genders are not counted.
    pub genders: Option<Vec<(CellValue, usize)>>,
    /// `None` when the source has no birth year column or every value is missing.
    pub birth_years: Option<BirthYearStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserReport {
    /// Missing user types are counted under `CellValue::Null`.
    pub user_types: Vec<(CellValue, usize)>,
    /// `None` when the source carries neither gender nor birth year.
    pub demographics: Option<Demographics>,
}

pub fn user_stats(table: &TripTable) -> Option<UserReport> {
    if table.is_empty() {
        return None;
    }
    let user_types = value_counts(table.trips.iter().map(|t| t.user_type.clone()));

    let demographics = table.has_demographics().then(|| Demographics {
        genders: table.has_gender.then(|| {
            value_counts(
                table
                    .trips
                    .iter()
                    .filter(|t| !t.gender.is_null())
                    .map(|t| t.gender.clone()),
            )
        }),
        birth_years: birth_year_stats(table),
    });

    Some(UserReport {
        user_types,
        demographics,
    })
}

fn birth_year_stats(table: &TripTable) -> Option<BirthYearStats> {
    let years: Vec<i64> = table.trips.iter().filter_map(|t| t.birth_year).collect();
    Some(BirthYearStats {
        most_common: mode(years.iter().copied())?,
        most_recent: *years.iter().max()?,
        earliest: *years.iter().min()?,
    })
}
