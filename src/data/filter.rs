use std::fmt;

use chrono::Weekday;

use super::model::{weekday_name, TripTable};
use crate::config::{ALL, CITY_DATA, MONTHS, WEEKDAYS};

// ---------------------------------------------------------------------------
// Selection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Case-insensitive lookup of a city name.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        City::ALL.into_iter().find(|c| c.name() == input)
    }

    fn index(self) -> usize {
        match self {
            City::Chicago => 0,
            City::NewYorkCity => 1,
            City::Washington => 2,
        }
    }

    pub fn name(self) -> &'static str {
        CITY_DATA[self.index()].0
    }

    pub fn file_stem(self) -> &'static str {
        CITY_DATA[self.index()].1
    }
}

/// Month restriction; `Month(n)` holds the calendar month, 1–6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Month(u32),
}

impl MonthFilter {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input == ALL {
            return Some(MonthFilter::All);
        }
        MONTHS
            .iter()
            .position(|m| *m == input)
            .map(|i| MonthFilter::Month(i as u32 + 1))
    }

    pub fn matches(self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(m) => m == month,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => write!(f, "{ALL}"),
            MonthFilter::Month(m) => match MONTHS.get((*m as usize).wrapping_sub(1)) {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "{m}"),
            },
        }
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    Day(Weekday),
}

impl DayFilter {
    /// Accepts full weekday names only, in any case.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input == ALL {
            return Some(DayFilter::All);
        }
        WEEKDAYS
            .iter()
            .position(|d| d.to_lowercase() == input)
            .map(|i| DayFilter::Day(WEEK[i]))
    }

    pub fn matches(self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Day(d) => d == day,
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => write!(f, "{ALL}"),
            DayFilter::Day(d) => write!(f, "{}", weekday_name(*d)),
        }
    }
}

/// What the user asked to explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSelection {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of trips that pass both filters, in table order.
pub fn filtered_indices(table: &TripTable, month: MonthFilter, day: DayFilter) -> Vec<usize> {
    table
        .trips
        .iter()
        .enumerate()
        .filter(|(_, t)| month.matches(t.month) && day.matches(t.week_day))
        .map(|(i, _)| i)
        .collect()
}

/// A new table holding only the trips that pass both filters.
pub fn apply_filters(table: &TripTable, month: MonthFilter, day: DayFilter) -> TripTable {
    let trips = filtered_indices(table, month, day)
        .into_iter()
        .map(|i| table.trips[i].clone())
        .collect();
    table.with_trips(trips)
}
