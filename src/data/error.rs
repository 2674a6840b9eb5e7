use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a city source into a trip table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no trip data found for {city}: expected {}", .path.display())]
    MissingSource { city: String, path: PathBuf },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("source is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: '{value}' is not a valid start time")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: trip duration '{value}' is not a number")]
    BadDuration { row: usize, value: String },

    #[error("row {row}: birth year '{value}' is not a whole number")]
    BadBirthYear { row: usize, value: String },
}
