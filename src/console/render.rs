use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::config::{COL_MONTH, COL_WEEK_DAY};
use crate::data::model::{CellValue, Trip};
use crate::stats::{DurationReport, StationReport, TimeReport, UserReport};

pub const NO_DATA: &str = "No data available for the selected filters.";

pub fn separator() -> String {
    "-".repeat(40)
}

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

/// Write one report: heading, figures (or the no-data note), elapsed time.
pub fn write_section<W, R>(
    out: &mut W,
    heading: &str,
    report: Option<&R>,
    elapsed: Duration,
) -> io::Result<()>
where
    W: Write,
    R: fmt::Display,
{
    writeln!(out, "\n{heading}\n")?;
    match report {
        Some(report) => write!(out, "{report}")?,
        None => writeln!(out, "{NO_DATA}")?,
    }
    writeln!(out, "\nThis took {:.3} seconds.", elapsed.as_secs_f64())?;
    writeln!(out, "{}", separator())
}

impl fmt::Display for TimeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Most Frequent Month is : {}", self.month)?;
        writeln!(f, "Most Frequent Day is : {}", self.week_day)?;
        writeln!(f, "Most Frequent Start Hour is : {}", self.hour)
    }
}

impl fmt::Display for StationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Most Commonly used Start Station is: {}", self.start)?;
        writeln!(f, "Most Commonly used End Station is: {}", self.end)?;
        writeln!(
            f,
            "Most Frequent Combination of Start Station and End Station trip : {}, {}",
            self.route.0, self.route.1
        )
    }
}

impl fmt::Display for DurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Travel Time: {}", self.total)?;
        writeln!(f, "Mean Travel Time: {}", self.mean)
    }
}

impl fmt::Display for UserReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_counts(f, "User Type", &self.user_types)?;

        let Some(demo) = &self.demographics else {
            return writeln!(f, "\nGender and birth year stats can't be determined for this city.");
        };

        writeln!(f)?;
        match &demo.genders {
            Some(genders) => write_counts(f, "Gender", genders)?,
            None => writeln!(f, "Gender stats can't be determined.")?,
        }
        match &demo.birth_years {
            Some(years) => {
                writeln!(f, "\nThe most common birth year: {}", years.most_common)?;
                writeln!(f, "The most recent birth year: {}", years.most_recent)?;
                writeln!(f, "The earliest birth year: {}", years.earliest)
            }
            None => writeln!(f, "\nBirth year stats can't be determined."),
        }
    }
}

/// Value counts as a two-column listing under a header line.
fn write_counts(f: &mut fmt::Formatter<'_>, header: &str, counts: &[(CellValue, usize)]) -> fmt::Result {
    let labels: Vec<String> = counts.iter().map(|(v, _)| v.to_string()).collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
    writeln!(f, "{header}")?;
    for (label, (_, n)) in labels.iter().zip(counts) {
        writeln!(f, "{label:<width$}    {n}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw row pages
// ---------------------------------------------------------------------------

/// Format trips as an ASCII table: the original columns, then `month` and `week_day`.
pub fn format_page(columns: &[String], trips: &[Trip]) -> Result<String> {
    let mut fields = Vec::with_capacity(columns.len() + 2);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len() + 2);

    for (idx, name) in columns.iter().enumerate() {
        fields.push(Field::new(name, DataType::Utf8, true));
        let values: Vec<Option<String>> = trips
            .iter()
            .map(|t| {
                t.cells
                    .get(idx)
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string())
            })
            .collect();
        arrays.push(Arc::new(StringArray::from(values)));
    }

    fields.push(Field::new(COL_MONTH, DataType::UInt32, false));
    arrays.push(Arc::new(UInt32Array::from(
        trips.iter().map(|t| t.month).collect::<Vec<_>>(),
    )));
    fields.push(Field::new(COL_WEEK_DAY, DataType::Utf8, false));
    arrays.push(Arc::new(StringArray::from(
        trips.iter().map(|t| t.week_day_name()).collect::<Vec<_>>(),
    )));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building row page")?;
    let table = pretty_format_batches(&[batch]).context("formatting row page")?;
    Ok(table.to_string())
}
