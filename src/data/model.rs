use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use super::error::DataError;
use crate::config::{
    COL_BIRTH_YEAR, COL_END_STATION, COL_GENDER, COL_START_STATION, COL_START_TIME,
    COL_TRIP_DURATION, COL_USER_TYPE, WEEKDAYS,
};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a trip source
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from CSV, JSON or Parquet.
/// Used as a `BTreeMap` key by the statistics, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can count CellValues in a BTreeMap --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Cell for a delimited-text field: empty → Null, otherwise the text as written.
    /// Numeric columns are parsed later, so station names like `007` survive.
    pub fn from_field(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// Parse a start/end timestamp as written by the trip sources.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Title-case English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

// ---------------------------------------------------------------------------
// RawTable – header plus untyped rows, common output of every source format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Trip – one row of a city's trip table
// ---------------------------------------------------------------------------

/// A single trip with its typed fields and all of its original cells.
#[derive(Debug, Clone)]
pub struct Trip {
    pub start_time: NaiveDateTime,
    pub start_station: String,
    pub end_station: String,
    /// Seconds.
    pub duration: f64,
    pub user_type: CellValue,
    /// `Null` when the source has no gender column.
    pub gender: CellValue,
    pub birth_year: Option<i64>,
    /// Calendar month of `start_time`, 1–12.
    pub month: u32,
    pub week_day: Weekday,
    /// Original cells in header order.
    pub cells: Vec<CellValue>,
}

impl Trip {
    /// Hour of day the trip started, 0–23.
    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    pub fn week_day_name(&self) -> &'static str {
        weekday_name(self.week_day)
    }
}

/// Positions of the columns a [`Trip`] is built from.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    start_time: usize,
    start_station: usize,
    end_station: usize,
    duration: usize,
    user_type: usize,
    gender: Option<usize>,
    birth_year: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, DataError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(DataError::MissingColumn(name));

        Ok(ColumnIndex {
            start_time: require(COL_START_TIME)?,
            start_station: require(COL_START_STATION)?,
            end_station: require(COL_END_STATION)?,
            duration: require(COL_TRIP_DURATION)?,
            user_type: require(COL_USER_TYPE)?,
            gender: find(COL_GENDER),
            birth_year: find(COL_BIRTH_YEAR),
        })
    }
}

fn cell(cells: &[CellValue], idx: usize) -> &CellValue {
    cells.get(idx).unwrap_or(&CellValue::Null)
}

fn required_text(
    cells: &[CellValue],
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<String, DataError> {
    match cell(cells, idx) {
        CellValue::Null => Err(DataError::MissingValue { row, column }),
        other => Ok(other.to_string()),
    }
}

impl Trip {
    fn from_cells(row: usize, cells: Vec<CellValue>, cols: &ColumnIndex) -> Result<Self, DataError> {
        let start_time = match cell(&cells, cols.start_time) {
            CellValue::Null => {
                return Err(DataError::MissingValue { row, column: COL_START_TIME })
            }
            CellValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
        .ok_or_else(|| DataError::BadTimestamp {
            row,
            value: cell(&cells, cols.start_time).to_string(),
        })?;

        let duration = match cell(&cells, cols.duration) {
            CellValue::Null => {
                return Err(DataError::MissingValue { row, column: COL_TRIP_DURATION })
            }
            other => other.as_f64().ok_or_else(|| DataError::BadDuration {
                row,
                value: other.to_string(),
            })?,
        };

        let birth_year = match cols.birth_year.map(|idx| cell(&cells, idx)) {
            None | Some(CellValue::Null) => None,
            Some(CellValue::Integer(y)) => Some(*y),
            Some(other) => match other.as_f64() {
                // NaN marks a missing year in exported data frames
                Some(y) if y.is_nan() => None,
                Some(y) if y.fract() == 0.0 => Some(y as i64),
                _ => {
                    return Err(DataError::BadBirthYear {
                        row,
                        value: other.to_string(),
                    })
                }
            },
        };

        Ok(Trip {
            start_station: required_text(&cells, cols.start_station, row, COL_START_STATION)?,
            end_station: required_text(&cells, cols.end_station, row, COL_END_STATION)?,
            user_type: cell(&cells, cols.user_type).clone(),
            gender: cols
                .gender
                .map(|idx| cell(&cells, idx).clone())
                .unwrap_or(CellValue::Null),
            birth_year,
            month: start_time.month(),
            week_day: start_time.weekday(),
            start_time,
            duration,
            cells,
        })
    }
}

// ---------------------------------------------------------------------------
// TripTable – all trips of one city, possibly filtered
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TripTable {
    /// Original column names, in source order.
    pub columns: Vec<String>,
    pub trips: Vec<Trip>,
    pub has_gender: bool,
    pub has_birth_year: bool,
}

impl TripTable {
    /// Type every row of a raw table and derive the calendar fields.
    pub fn from_raw(raw: RawTable) -> Result<Self, DataError> {
        let cols = ColumnIndex::resolve(&raw.headers)?;
        let trips = raw
            .rows
            .into_iter()
            .enumerate()
            .map(|(row, cells)| Trip::from_cells(row, cells, &cols))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TripTable {
            columns: raw.headers,
            trips,
            has_gender: cols.gender.is_some(),
            has_birth_year: cols.birth_year.is_some(),
        })
    }

    /// Same columns, different rows.
    pub fn with_trips(&self, trips: Vec<Trip>) -> Self {
        TripTable {
            columns: self.columns.clone(),
            trips,
            has_gender: self.has_gender,
            has_birth_year: self.has_birth_year,
        }
    }

    /// Whether the source carries any demographic column.
    pub fn has_demographics(&self) -> bool {
        self.has_gender || self.has_birth_year
    }

    /// Rows `offset..offset + size`; empty once past the end.
    pub fn page(&self, offset: usize, size: usize) -> &[Trip] {
        let start = offset.min(self.trips.len());
        let end = offset.saturating_add(size).min(self.trips.len());
        &self.trips[start..end]
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
