//! Fixed enumerations shared by the whole program.

/// Directory the city sources are resolved against.
pub const DEFAULT_DATA_DIR: &str = ".";

/// Supported cities and the file stem of their trip source.
pub const CITY_DATA: [(&str, &str); 3] = [
    ("chicago", "chicago"),
    ("new york city", "new_york_city"),
    ("washington", "washington"),
];

/// Extensions tried, in order, when resolving a city source.
pub const SOURCE_EXTENSIONS: [&str; 3] = ["csv", "parquet", "json"];

/// Months covered by the datasets; position + 1 is the calendar month.
pub const MONTHS: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

/// Weekday names in title case, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Answer meaning "no filter" for month and day prompts.
pub const ALL: &str = "all";

pub const YES: [&str; 2] = ["yes", "y"];
pub const NO: [&str; 2] = ["no", "n"];

/// Rows shown per page of raw trip data.
pub const PAGE_SIZE: usize = 5;

// Column names in the trip sources.
pub const COL_START_TIME: &str = "Start Time";
pub const COL_START_STATION: &str = "Start Station";
pub const COL_END_STATION: &str = "End Station";
pub const COL_TRIP_DURATION: &str = "Trip Duration";
pub const COL_USER_TYPE: &str = "User Type";
pub const COL_GENDER: &str = "Gender";
pub const COL_BIRTH_YEAR: &str = "Birth Year";

// Derived columns appended when rows are displayed.
pub const COL_MONTH: &str = "month";
pub const COL_WEEK_DAY: &str = "week_day";
